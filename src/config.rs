//! Storage configuration module.
//!
//! Handles loading and validating `config.toml`, resolving the active
//! storage backend, and normalizing partial image-configuration tables into
//! the immutable form the renderer consumes.
//!
//! ## Config File Shape
//!
//! ```toml
//! [storage]
//! active = "rokka"
//!
//! [storage.rokka]
//! organization = "acme"
//! default_stack = "main"
//!
//! [storage.rokka.image_configuration]
//! srcsets = [300, 600, 1000, 2000]
//! sizes = "(min-width: 1400px) 1400px, 92vw"
//! unit = "w"
//! ```
//!
//! Backend tables live next to the `active` key, so several backends can be
//! configured at once and `active` picks the one in use.
//!
//! ## Partial Configuration
//!
//! Everything is optional. A site with no `[storage]` section at all still
//! renders plain tags, and an `image_configuration` table may set any subset
//! of its keys:
//!
//! ```toml
//! # Only override the widths; sizes and unit keep their stock defaults
//! [storage.rokka.image_configuration]
//! srcsets = [400, 800]
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// Every section is optional. User config files need only specify the
/// values they want to set; the renderer degrades gracefully around the
/// rest. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Image storage settings. Absent means no resizing service is
    /// configured and only plain tags are rendered.
    pub storage: Option<StorageConfig>,
}

impl SiteConfig {
    /// Validate configured values that would otherwise produce broken
    /// markup at render time.
    ///
    /// Incompleteness (missing backend table, empty organization) is not an
    /// error here — the renderer handles those by falling back. Validation
    /// only rejects values that are present but unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let Some(storage) = &self.storage else {
            return Ok(());
        };
        for (name, backend) in &storage.backends {
            let Some(srcsets) = backend
                .image_configuration
                .as_ref()
                .and_then(|ic| ic.srcsets.as_ref())
            else {
                continue;
            };
            if srcsets.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "storage.{name}.image_configuration.srcsets must not be empty"
                )));
            }
            if srcsets.contains(&0) {
                return Err(ConfigError::Validation(format!(
                    "storage.{name}.image_configuration.srcsets widths must be positive"
                )));
            }
        }
        Ok(())
    }
}

/// The `[storage]` section: which backend is in use, plus one table per
/// configured backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Name of the backend in use, e.g. `"rokka"`.
    pub active: String,
    /// Backend tables keyed by name (`[storage.rokka]` etc.).
    #[serde(flatten)]
    pub backends: BTreeMap<String, BackendConfig>,
}

impl StorageConfig {
    /// Look up the backend table named by `active`.
    pub fn active_backend(&self) -> Option<&BackendConfig> {
        self.backends.get(&self.active)
    }
}

/// A single storage backend entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackendConfig {
    /// Rokka organization, the `{org}` in `https://{org}.rokka.io/...`.
    pub organization: String,
    /// Rokka stack used for URL construction, e.g. `"main"`.
    pub default_stack: String,
    /// Responsive rendering settings. Partial tables are fine; see
    /// [`ImageConfiguration::resolve`].
    pub image_configuration: Option<ImageConfiguration>,
}

impl BackendConfig {
    /// Whether both identifiers needed for URL construction are set.
    pub fn is_usable(&self) -> bool {
        !self.organization.is_empty() && !self.default_stack.is_empty()
    }

    /// The effective image configuration, with unset fields defaulted.
    pub fn resolved_image_configuration(&self) -> ResolvedImageConfiguration {
        self.image_configuration
            .as_ref()
            .map(ImageConfiguration::resolve)
            .unwrap_or_default()
    }
}

/// Stock widths offered when `srcsets` is not configured.
pub const DEFAULT_SRCSETS: [u32; 4] = [300, 600, 1000, 2000];

/// Stock `sizes` expression when not configured.
pub const DEFAULT_SIZES: &str = "(min-width: 1400px) 1400px, 92vw";

/// Stock width-descriptor unit when not configured.
pub const DEFAULT_UNIT: &str = "w";

/// Responsive rendering settings as written in `config.toml`.
///
/// All fields are optional; each unset field falls back independently to
/// its stock default when resolved.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImageConfiguration {
    /// Pixel widths to offer in `srcset`, in emission order.
    pub srcsets: Option<Vec<u32>>,
    /// CSS media-condition expression for the `sizes` attribute.
    pub sizes: Option<String>,
    /// Width-descriptor unit appended to each srcset entry.
    pub unit: Option<String>,
}

impl ImageConfiguration {
    /// Fill unset fields with the stock defaults.
    ///
    /// Resolution is pure: the same partial input always resolves to the
    /// same value, so repeated renders see identical settings.
    pub fn resolve(&self) -> ResolvedImageConfiguration {
        let stock = ResolvedImageConfiguration::default();
        ResolvedImageConfiguration {
            srcsets: self.srcsets.clone().unwrap_or(stock.srcsets),
            sizes: self.sizes.clone().unwrap_or(stock.sizes),
            unit: self.unit.clone().unwrap_or(stock.unit),
        }
    }
}

/// Fully-defaulted image configuration consumed by the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImageConfiguration {
    /// Pixel widths to offer in `srcset`, in emission order.
    pub srcsets: Vec<u32>,
    /// CSS media-condition expression for the `sizes` attribute.
    pub sizes: String,
    /// Width-descriptor unit appended to each srcset entry.
    pub unit: String,
}

impl Default for ResolvedImageConfiguration {
    fn default() -> Self {
        Self {
            srcsets: DEFAULT_SRCSETS.to_vec(),
            sizes: DEFAULT_SIZES.to_string(),
            unit: DEFAULT_UNIT.to_string(),
        }
    }
}

// =============================================================================
// Config loading
// =============================================================================

/// Load config from `config.toml` in the given directory.
///
/// A missing file yields the default (empty) config, so an unconfigured
/// site renders plain tags rather than failing. A file that exists but does
/// not parse or validate is an error.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let config_path = root.join("config.toml");
    if !config_path.exists() {
        return Ok(SiteConfig::default());
    }
    let content = fs::read_to_string(&config_path)?;
    let config: SiteConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Rokka Img Configuration
# =======================
# All settings are optional. With no [storage] section, every image renders
# as a plain <img> tag. Values shown below are the stock defaults.

# ---------------------------------------------------------------------------
# Storage
# ---------------------------------------------------------------------------
[storage]
# Name of the backend table in use.
active = "rokka"

[storage.rokka]
# Rokka organization: the {org} in https://{org}.rokka.io/...
# Required for responsive rendering; empty falls back to plain tags.
organization = ""

# Rokka stack used in generated URLs.
# Required for responsive rendering; empty falls back to plain tags.
default_stack = ""

# Responsive rendering settings. Any subset of keys may be set; the rest
# keep their stock defaults.
[storage.rokka.image_configuration]
# Pixel widths offered in srcset, one resize endpoint per width.
srcsets = [300, 600, 1000, 2000]

# CSS media-condition expression emitted as the sizes attribute.
sizes = "(min-width: 1400px) 1400px, 92vw"

# Width-descriptor unit appended to each srcset entry.
unit = "w"
"##
}
