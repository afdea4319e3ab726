mod brand;
mod config;
mod inline;
mod page;
mod serve;
mod web_assets;

use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
    process,
};

use clap::{Args, Parser, Subcommand};

use brand::BrandAssets;
use config::EditionConfig;

/// Where the edition data and its asset files come from.
#[derive(Args)]
struct SourceArgs {
    /// Edition YAML file (defaults to the built-in 2025 edition)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory that relative logo and document paths are resolved against
    #[arg(long, default_value = ".")]
    asset_dir: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the page to a standalone HTML file
    Build {
        #[command(flatten)]
        source: SourceArgs,
        /// Output file (stdout when omitted)
        #[arg(long, short)]
        out: Option<PathBuf>,
    },
    /// Serve the rendered page over HTTP
    Serve {
        #[command(flatten)]
        source: SourceArgs,
        /// Interface address to bind to
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
        /// Starting port number for the HTTP server
        #[arg(long, default_value = "8501")]
        port: u16,
    },
    /// Print a JSON report of which logos and documents were found
    Assets {
        #[command(flatten)]
        source: SourceArgs,
    },
}

#[derive(Parser)]
#[command(
    name = "exchange-site",
    version,
    about = "Standalone page generator for the Social Service Investment Exchange"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Load the edition or exit with a message.
fn load_edition(source: &SourceArgs) -> EditionConfig {
    EditionConfig::load_or_embedded(source.config.as_deref()).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        process::exit(1);
    })
}

/// Load the edition, inline its assets once, and render the page.
fn render(source: &SourceArgs) -> String {
    let config = load_edition(source);
    let brand = BrandAssets::collect(&config, &source.asset_dir);
    let html = page::build_page(&config, &brand);
    eprintln!("[build] size={}", html.len());
    html
}

fn run_build(source: &SourceArgs, out: Option<PathBuf>) -> io::Result<()> {
    let html = render(source);
    match out {
        Some(path) => {
            if let Err(e) = fs::write(&path, &html) {
                eprintln!("Error writing '{}': {e}", path.display());
                process::exit(1);
            }
            eprintln!("[build] wrote {}", path.display());
            Ok(())
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(html.as_bytes())?;
            stdout.flush()
        }
    }
}

fn run_assets(source: &SourceArgs) -> io::Result<()> {
    let config = load_edition(source);
    let brand = BrandAssets::collect(&config, &source.asset_dir);
    let report = brand.report(&source.asset_dir);
    let json = serde_json::to_string_pretty(&report)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    println!("{json}");
    Ok(())
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Build { source, out } => run_build(&source, out),
        Commands::Serve { source, bind, port } => {
            let html = render(&source);
            let rt = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
            rt.block_on(serve::run_serve(html, bind, port))
        }
        Commands::Assets { source } => run_assets(&source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_defaults() {
        let cli = Cli::try_parse_from(["exchange-site", "serve"]).unwrap();
        match cli.command {
            Commands::Serve { source, bind, port } => {
                assert_eq!(bind, "127.0.0.1");
                assert_eq!(port, 8501);
                assert_eq!(source.asset_dir, PathBuf::from("."));
                assert!(source.config.is_none());
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn build_accepts_config_and_out() {
        let cli = Cli::try_parse_from([
            "exchange-site",
            "build",
            "--config",
            "edition.yaml",
            "--asset-dir",
            "brand",
            "-o",
            "index.html",
        ])
        .unwrap();
        match cli.command {
            Commands::Build { source, out } => {
                assert_eq!(source.config, Some(PathBuf::from("edition.yaml")));
                assert_eq!(source.asset_dir, PathBuf::from("brand"));
                assert_eq!(out, Some(PathBuf::from("index.html")));
            }
            _ => panic!("expected build"),
        }
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["exchange-site"]).is_err());
    }

    #[test]
    fn render_embedded_edition_without_assets() {
        let dir = tempfile::tempdir().unwrap();
        let source = SourceArgs {
            config: None,
            asset_dir: dir.path().to_path_buf(),
        };
        let html = render(&source);
        assert!(html.contains("id=\"section-hero\""));
        assert!(html.contains("header-logo-placeholder"));
    }
}
