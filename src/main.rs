use clap::{Parser, Subcommand, ValueEnum};
use drive_media::{config, CollectionKind, MediaFile, MediaKind, MediaPipeline};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "drive-media", version, about = "Resolve Google Drive links into displayable media URLs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Image,
    Video,
}

impl From<KindArg> for MediaKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Image => MediaKind::Image,
            KindArg::Video => MediaKind::Video,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Media(MediaCommand),
    /// Print the effective configuration
    Config {
        /// Print the config file location instead
        #[arg(long)]
        show_path: bool,
    },
}

#[derive(Subcommand)]
enum MediaCommand {
    /// Show whether a link is a Drive file, a Drive folder, or a local path
    Classify { url: String },
    /// List display URLs for a link, best first
    Candidates {
        url: String,
        #[arg(long, value_enum, default_value = "image")]
        kind: KindArg,
    },
    /// Ask the server whether a Drive link is publicly viewable
    Check { url: String },
    /// Resolve a link into the files a viewer would show
    Open {
        url: String,
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CollectionOutput<'a> {
    kind: CollectionKind,
    current_index: usize,
    items: &'a [MediaFile],
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = config::get_config()?;

    match cli.command {
        Commands::Config { show_path } => {
            if show_path {
                println!("{}", config::config_path().display());
            } else {
                print!("{}", serde_yaml::to_string(&config)?);
            }
        }
        Commands::Media(command) => {
            let pipeline = MediaPipeline::new(config)?;
            run(&pipeline, command).await?;
        }
    }

    Ok(())
}

async fn run(pipeline: &MediaPipeline, command: MediaCommand) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        MediaCommand::Classify { url } => print_json(&pipeline.classify_url(&url)),
        MediaCommand::Candidates { url, kind } => print_json(&pipeline.candidate_urls(&url, kind.into())),
        MediaCommand::Check { url } => {
            let result = pipeline.check_access(&url).await;
            if let Some(notice) = result.folder_notice() {
                tracing::warn!("{}", notice);
            }
            print_json(&result)
        }
        MediaCommand::Open { url, kind } => {
            let collection = pipeline.open_media(&url, kind.map(Into::into)).await?;
            print_json(&CollectionOutput {
                kind: collection.kind(),
                current_index: collection.current_index(),
                items: collection.items(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_config_and_media_commands_parse_separately() {
        let cli = Cli::try_parse_from(["drive-media", "config", "--show-path"]).unwrap();
        assert!(matches!(cli.command, Commands::Config { show_path: true }));

        let cli = Cli::try_parse_from([
            "drive-media",
            "candidates",
            "https://drive.google.com/file/d/ABC/view",
            "--kind",
            "video",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Media(MediaCommand::Candidates { kind: KindArg::Video, .. })
        ));

        let cli = Cli::try_parse_from(["drive-media", "open", "/img/x.png"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Media(MediaCommand::Open { kind: None, .. })
        ));
    }
}
