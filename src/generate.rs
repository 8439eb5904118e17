//! Image tag generation.
//!
//! Turns an image URL into `<img>` markup. With a usable Rokka backend
//! configured, the tag carries `srcset`/`sizes` attributes pointing at the
//! CDN's width-specific resize endpoints; otherwise the renderer degrades to
//! a plain tag, and to no tag at all only when there is no URL to render.
//!
//! ## Fallback Ladder
//!
//! Template rendering cannot recover from an error mid-page, so no input
//! raises one. Each missing precondition logs a warning with its reason and
//! drops to the next simpler output:
//!
//! 1. No image URL → nothing to render.
//! 2. No options, no `[storage]` section, unknown active backend, or a
//!    backend missing its organization/stack → plain `<img src="..." />`.
//! 3. Fully configured backend → responsive tag.
//!
//! ## URL Shape
//!
//! ```text
//! src:    https://{org}.rokka.io/{stack}/-{encoded}-.jpg
//! srcset: https://{org}.rokka.io/{stack}/resize-width-{W}/-{encoded}-.jpg {W}{unit}
//! ```
//!
//! The image URL is percent-encoded into the path segment of every generated
//! URL. The `src` URL is the un-resized canonical image; each srcset entry
//! points at the resize endpoint for one configured width.

use crate::config::{ResolvedImageConfiguration, StorageConfig};
use maud::{Markup, PreEscaped, html};
use tracing::warn;

/// Per-call options supplied by the invoking template.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Value for the `alt` attribute. Renders as `alt=""` when unset.
    pub alt_text: Option<String>,
}

/// Render `<img>` markup for `image_url`.
///
/// Returns `None` only when there is no URL to render; the caller omits the
/// tag. Every other degraded input yields a plain tag, and a fully
/// configured storage section yields the responsive one. The returned
/// [`Markup`] is pre-escaped: splicing it into a maud template emits it
/// verbatim.
pub fn render_image_tag(
    image_url: Option<&str>,
    options: Option<&RenderOptions>,
    storage: Option<&StorageConfig>,
) -> Option<Markup> {
    let Some(image_url) = image_url else {
        warn_degraded("no image URL was passed");
        return None;
    };

    let Some(options) = options else {
        warn_degraded("no options were passed to the helper");
        return Some(plain_image(image_url));
    };

    let Some(storage) = storage else {
        warn_degraded("storage not defined in configuration");
        return Some(plain_image(image_url));
    };

    let Some(backend) = storage.active_backend() else {
        warn_degraded("no active backend config found");
        return Some(plain_image(image_url));
    };

    if !backend.is_usable() {
        warn_degraded("backend config is missing organization or default stack");
        return Some(plain_image(image_url));
    }

    let image_config = backend.resolved_image_configuration();
    let encoded = urlencoding::encode(image_url);
    let src = format!(
        "https://{}.rokka.io/{}/-{}-.jpg",
        backend.organization, backend.default_stack, encoded
    );
    let srcset = srcset(
        &backend.organization,
        &backend.default_stack,
        &image_config,
        &encoded,
    );
    let alt = options.alt_text.as_deref().unwrap_or("");

    Some(html! {
        img src=(src) srcset=(srcset) sizes=(image_config.sizes) alt=(alt);
    })
}

/// The unresponsive fallback tag, with the URL left exactly as passed.
///
/// Emitted verbatim, keeping the legacy self-closing form.
fn plain_image(image_url: &str) -> Markup {
    PreEscaped(format!(r#"<img src="{image_url}" />"#))
}

fn warn_degraded(reason: &str) {
    warn!("cannot generate responsive Rokka img: {reason}");
}

/// One `url width-descriptor` entry per configured width, comma-joined.
fn srcset(
    organization: &str,
    stack: &str,
    config: &ResolvedImageConfiguration,
    encoded_url: &str,
) -> String {
    config
        .srcsets
        .iter()
        .map(|width| {
            format!(
                "https://{organization}.rokka.io/{stack}/resize-width-{width}/-{encoded_url}-.jpg {width}{}",
                config.unit
            )
        })
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BackendConfig, ImageConfiguration};

    fn rokka_storage(backend: BackendConfig) -> StorageConfig {
        StorageConfig {
            active: "rokka".to_string(),
            backends: [("rokka".to_string(), backend)].into(),
        }
    }

    fn usable_backend() -> BackendConfig {
        BackendConfig {
            organization: "acme".to_string(),
            default_stack: "main".to_string(),
            image_configuration: None,
        }
    }

    #[test]
    fn no_url_renders_nothing() {
        let storage = rokka_storage(usable_backend());
        let options = RenderOptions::default();
        assert!(render_image_tag(None, Some(&options), Some(&storage)).is_none());
    }

    #[test]
    fn missing_options_renders_plain_tag() {
        let storage = rokka_storage(usable_backend());
        let markup = render_image_tag(Some("photo.jpg"), None, Some(&storage)).unwrap();
        assert_eq!(markup.into_string(), r#"<img src="photo.jpg" />"#);
    }

    #[test]
    fn missing_storage_renders_plain_tag() {
        let options = RenderOptions::default();
        let markup = render_image_tag(Some("photo.jpg"), Some(&options), None).unwrap();
        assert_eq!(markup.into_string(), r#"<img src="photo.jpg" />"#);
    }

    #[test]
    fn unknown_active_backend_renders_plain_tag() {
        let storage = StorageConfig {
            active: "rokka".to_string(),
            backends: [("s3".to_string(), usable_backend())].into(),
        };
        let options = RenderOptions::default();
        let markup = render_image_tag(Some("photo.jpg"), Some(&options), Some(&storage)).unwrap();
        assert_eq!(markup.into_string(), r#"<img src="photo.jpg" />"#);
    }

    #[test]
    fn incomplete_backend_renders_plain_tag() {
        // A full image_configuration does not rescue a backend that lacks
        // its URL identifiers
        let backend = BackendConfig {
            organization: String::new(),
            default_stack: "main".to_string(),
            image_configuration: Some(ImageConfiguration {
                srcsets: Some(vec![400, 800]),
                sizes: Some("100vw".to_string()),
                unit: Some("w".to_string()),
            }),
        };
        let storage = rokka_storage(backend);
        let options = RenderOptions::default();
        let markup = render_image_tag(Some("photo.jpg"), Some(&options), Some(&storage)).unwrap();
        assert_eq!(markup.into_string(), r#"<img src="photo.jpg" />"#);
    }

    #[test]
    fn responsive_tag_with_stock_defaults() {
        let storage = rokka_storage(usable_backend());
        let options = RenderOptions::default();
        let html = render_image_tag(Some("photo.jpg"), Some(&options), Some(&storage))
            .unwrap()
            .into_string();

        assert!(html.contains(r#"src="https://acme.rokka.io/main/-photo.jpg-.jpg""#));
        assert!(html.contains("https://acme.rokka.io/main/resize-width-300/-photo.jpg-.jpg 300w"));
        assert!(html.contains("https://acme.rokka.io/main/resize-width-600/-photo.jpg-.jpg 600w"));
        assert!(
            html.contains("https://acme.rokka.io/main/resize-width-1000/-photo.jpg-.jpg 1000w")
        );
        assert!(
            html.contains("https://acme.rokka.io/main/resize-width-2000/-photo.jpg-.jpg 2000w")
        );
        assert!(html.contains(r#"sizes="(min-width: 1400px) 1400px, 92vw""#));
        assert!(html.contains(r#"alt="""#));
    }

    #[test]
    fn configured_srcsets_replace_defaults() {
        let backend = BackendConfig {
            image_configuration: Some(ImageConfiguration {
                srcsets: Some(vec![400, 800]),
                sizes: None,
                unit: None,
            }),
            ..usable_backend()
        };
        let config = backend.resolved_image_configuration();
        let set = srcset("acme", "main", &config, "photo.jpg");

        let entries: Vec<&str> = set.split(',').collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[0],
            "https://acme.rokka.io/main/resize-width-400/-photo.jpg-.jpg 400w"
        );
        assert_eq!(
            entries[1],
            "https://acme.rokka.io/main/resize-width-800/-photo.jpg-.jpg 800w"
        );

        // Unset fields still render with their stock defaults
        let storage = rokka_storage(backend);
        let options = RenderOptions::default();
        let html = render_image_tag(Some("photo.jpg"), Some(&options), Some(&storage))
            .unwrap()
            .into_string();
        assert!(html.contains(r#"sizes="(min-width: 1400px) 1400px, 92vw""#));
        assert!(!html.contains("resize-width-300"));
    }

    #[test]
    fn srcset_entries_are_comma_joined_in_order() {
        let config = ResolvedImageConfiguration::default();
        let set = srcset("acme", "main", &config, "photo.jpg");
        let widths: Vec<&str> = set
            .split(',')
            .map(|entry| entry.rsplit_once(' ').unwrap().1)
            .collect();
        assert_eq!(widths, vec!["300w", "600w", "1000w", "2000w"]);
    }

    #[test]
    fn alt_text_is_rendered() {
        let storage = rokka_storage(usable_backend());
        let options = RenderOptions {
            alt_text: Some("Dawn over the bay".to_string()),
        };
        let html = render_image_tag(Some("photo.jpg"), Some(&options), Some(&storage))
            .unwrap()
            .into_string();
        assert!(html.contains(r#"alt="Dawn over the bay""#));
    }

    #[test]
    fn alt_text_is_escaped() {
        let storage = rokka_storage(usable_backend());
        let options = RenderOptions {
            alt_text: Some(r#"a "quoted" title"#.to_string()),
        };
        let html = render_image_tag(Some("photo.jpg"), Some(&options), Some(&storage))
            .unwrap()
            .into_string();
        assert!(html.contains("&quot;quoted&quot;"));
        assert!(!html.contains(r#"alt="a "quoted""#));
    }

    #[test]
    fn reserved_characters_are_percent_encoded() {
        let storage = rokka_storage(usable_backend());
        let options = RenderOptions::default();
        let html = render_image_tag(
            Some("my photo.jpg?v=1#frag"),
            Some(&options),
            Some(&storage),
        )
        .unwrap()
        .into_string();

        assert!(html.contains("/-my%20photo.jpg%3Fv%3D1%23frag-.jpg"));
        assert!(!html.contains("my photo.jpg?v=1#frag"));
    }

    #[test]
    fn plain_tag_keeps_url_unencoded() {
        let options = RenderOptions::default();
        let markup = render_image_tag(Some("my photo.jpg?v=1"), Some(&options), None).unwrap();
        assert_eq!(markup.into_string(), r#"<img src="my photo.jpg?v=1" />"#);
    }

    #[test]
    fn rendering_twice_is_identical() {
        let backend = BackendConfig {
            image_configuration: Some(ImageConfiguration {
                srcsets: Some(vec![400, 800]),
                sizes: None,
                unit: None,
            }),
            ..usable_backend()
        };
        let storage = rokka_storage(backend);
        let options = RenderOptions::default();

        let first = render_image_tag(Some("photo.jpg"), Some(&options), Some(&storage))
            .unwrap()
            .into_string();
        let second = render_image_tag(Some("photo.jpg"), Some(&options), Some(&storage))
            .unwrap()
            .into_string();
        assert_eq!(first, second);
    }

    #[test]
    fn src_points_at_unresized_url() {
        let storage = rokka_storage(usable_backend());
        let options = RenderOptions::default();
        let html = render_image_tag(Some("photo.jpg"), Some(&options), Some(&storage))
            .unwrap()
            .into_string();

        let src_attr = html
            .split(r#"src=""#)
            .nth(1)
            .and_then(|rest| rest.split('"').next())
            .unwrap();
        assert_eq!(src_attr, "https://acme.rokka.io/main/-photo.jpg-.jpg");
        assert!(!src_attr.contains("resize-width"));
    }
}
