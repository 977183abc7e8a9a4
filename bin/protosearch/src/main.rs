//! Protosearch CLI
//!
//! Developer tooling for the Protosearch search coordinator.
//!
//! This is the binary entry point. The library functionality is in `lib.rs`.

use clap::Parser;
use color_eyre::eyre::Result;
use protosearch::cmd;

/// Command-line interface for Protosearch.
#[derive(Parser)]
#[command(
    name = "protosearch",
    version,
    about = "Inspect Protosearch configuration and preview renderers"
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(clap::Subcommand)]
enum Commands {
    /// Show the configuration a page resolves to
    Resolve {
        /// URL of the search script
        #[arg(short, long)]
        script: String,
        /// URL of the page, including its query string
        #[arg(short, long)]
        page: String,
        /// Page attribute (key=value), repeatable
        #[arg(short = 'a', long = "attr", value_parser = cmd::parse_attribute)]
        attrs: Vec<(String, String)>,
    },
    /// Render a JSON list of hits
    Render {
        /// JSON file holding an array of hits
        #[arg(long)]
        hits: std::path::PathBuf,
        /// Renderer name (defaults to the page attributes, then the default renderer)
        #[arg(short, long)]
        renderer: Option<String>,
        /// URL of the search script, used to build result links
        #[arg(short, long, default_value = cmd::render::DEFAULT_SCRIPT_URL)]
        script: String,
        /// Page attribute (key=value), repeatable
        #[arg(short = 'a', long = "attr", value_parser = cmd::parse_attribute)]
        attrs: Vec<(String, String)>,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    protosearch::init_tracing(cli.verbose);

    match cli.command {
        Commands::Resolve {
            script,
            page,
            attrs,
        } => {
            cmd::resolve::run(&script, &page, &attrs)?;
        }
        Commands::Render {
            hits,
            renderer,
            script,
            attrs,
        } => {
            cmd::render::run(&hits, renderer.as_deref(), &script, &attrs)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_cli_resolve_command_parsing() {
        let args = [
            "protosearch",
            "resolve",
            "--script",
            "https://example.com/search/search.js",
            "--page",
            "https://example.com/?q=rust",
            "-a",
            "show-score=true",
            "--attr",
            "renderer=cards",
        ];
        let cli = Cli::parse_from(args);

        assert_eq!(cli.verbose, 0);
        match cli.command {
            Commands::Resolve {
                script,
                page,
                attrs,
            } => {
                assert_eq!(script, "https://example.com/search/search.js");
                assert_eq!(page, "https://example.com/?q=rust");
                assert_eq!(
                    attrs,
                    vec![
                        ("show-score".to_string(), "true".to_string()),
                        ("renderer".to_string(), "cards".to_string()),
                    ]
                );
            }
            _ => panic!("Expected Resolve command"),
        }
    }

    #[test]
    fn test_cli_render_command_parsing() {
        let args = ["protosearch", "render", "--hits", "hits.json", "-r", "cards"];
        let cli = Cli::parse_from(args);

        match cli.command {
            Commands::Render {
                hits,
                renderer,
                script,
                attrs,
            } => {
                assert_eq!(hits, std::path::PathBuf::from("hits.json"));
                assert_eq!(renderer.as_deref(), Some("cards"));
                assert_eq!(script, cmd::render::DEFAULT_SCRIPT_URL);
                assert!(attrs.is_empty());
            }
            _ => panic!("Expected Render command"),
        }
    }

    #[test]
    fn test_cli_rejects_malformed_attribute() {
        let args = ["protosearch", "render", "--hits", "h.json", "-a", "show-score"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_cli_verbosity_flags() {
        let args = ["protosearch", "-vvv", "render", "--hits", "h.json"];
        let cli = Cli::parse_from(args);
        assert_eq!(cli.verbose, 3);
    }
}
