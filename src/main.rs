use clap::{Parser, Subcommand};
use rokka_img::{config, generate};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rokka-img")]
#[command(about = "Responsive <img> tag rendering for the Rokka image CDN")]
#[command(long_about = "\
Responsive <img> tag rendering for the Rokka image CDN

Reads the site's storage configuration from config.toml and renders image
tags the same way the in-template helper does: a responsive tag with
srcset/sizes when a Rokka backend is fully configured, a plain tag
otherwise.

Config structure:

  [storage]
  active = \"rokka\"              # Which backend table is in use

  [storage.rokka]
  organization = \"acme\"         # {org} in https://{org}.rokka.io/...
  default_stack = \"main\"        # Stack used in generated URLs

  [storage.rokka.image_configuration]
  srcsets = [300, 600, 1000, 2000]
  sizes = \"(min-width: 1400px) 1400px, 92vw\"
  unit = \"w\"

Run 'rokka-img gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Directory containing config.toml
    #[arg(long, default_value = ".", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render an <img> tag for an image URL
    Render {
        /// Image URL to render
        image_url: String,
        /// Value for the alt attribute
        #[arg(long)]
        alt: Option<String>,
    },
    /// Report which rendering tier the current config supports
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Respect RUST_LOG if set; degraded render paths warn by default
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Render { image_url, alt } => {
            let site = config::load_config(&cli.config)?;
            let options = generate::RenderOptions { alt_text: alt };
            if let Some(markup) =
                generate::render_image_tag(Some(&image_url), Some(&options), site.storage.as_ref())
            {
                println!("{}", markup.into_string());
            }
        }
        Command::Check => {
            let site = config::load_config(&cli.config)?;
            println!("==> Checking {}", cli.config.display());
            println!("{}", rendering_tier(&site));
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Describe which rendering tier the loaded config supports, mirroring the
/// renderer's fallback ladder.
fn rendering_tier(site: &config::SiteConfig) -> String {
    let Some(storage) = &site.storage else {
        return "plain fallback: storage not defined in configuration".to_string();
    };
    let Some(backend) = storage.active_backend() else {
        return format!(
            "plain fallback: no config table for active backend \"{}\"",
            storage.active
        );
    };
    if !backend.is_usable() {
        return "plain fallback: backend config is missing organization or default stack"
            .to_string();
    }
    let image_config = backend.resolved_image_configuration();
    format!(
        "responsive: {} srcset widths via https://{}.rokka.io/{}/",
        image_config.srcsets.len(),
        backend.organization,
        backend.default_stack
    )
}
