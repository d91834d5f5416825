use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use yt_captions::{
    ExtractorConfig, PageSource, TranscriptExtractor, TranscriptMode, TranscriptReply,
};

#[derive(Parser, Debug)]
#[command(name = "yt-captions")]
#[command(about = "Extract clean or timestamped transcripts from YouTube videos", long_about = None)]
struct Cli {
    /// YouTube video URL or ID (or any page URL with --page-text)
    video: String,

    /// Preferred caption language
    #[arg(short, long)]
    lang: Option<String>,

    /// Prefix each line with its [MM:SS] start time
    #[arg(short, long)]
    timestamps: bool,

    /// Print a JSON reply ({"success": ..., "transcript" | "error": ...})
    #[arg(long)]
    json: bool,

    /// List available caption tracks instead of fetching a transcript
    #[arg(long)]
    list_tracks: bool,

    /// Print the readable text of the page instead of a transcript
    #[arg(long)]
    page_text: bool,

    /// Read page markup from a file instead of fetching it
    #[arg(long, value_name = "PATH")]
    markup_file: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write the output to a file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "yt_captions=debug"
    } else {
        "yt_captions=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn page_source(cli: &Cli) -> Result<PageSource> {
    if let Some(path) = &cli.markup_file {
        let markup = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read markup from {}", path.display()))?;
        return Ok(PageSource::Markup(markup));
    }
    if cli.page_text && (cli.video.starts_with("http://") || cli.video.starts_with("https://")) {
        return Ok(PageSource::Url(cli.video.clone()));
    }
    Ok(PageSource::video(&cli.video)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => ExtractorConfig::load(path)?,
        None => ExtractorConfig::default(),
    };
    if let Some(lang) = &cli.lang {
        config.preferred_language = lang.clone();
    }
    config.validate()?;

    let page = page_source(&cli)?;
    let lang = config.preferred_language.clone();
    let extractor = TranscriptExtractor::with_config(config)?;

    let result = if cli.list_tracks {
        extractor.list_tracks(&page).await.map(|tracks| {
            tracks
                .iter()
                .map(|t| t.to_string())
                .collect::<Vec<_>>()
                .join("\n")
        })
    } else if cli.page_text {
        extractor.page_text(&page).await
    } else {
        let mode = if cli.timestamps {
            TranscriptMode::Timed
        } else {
            TranscriptMode::Flat
        };
        extractor
            .extract(&page, &lang, mode)
            .await
            .map(|t| t.to_string())
    };

    let output = if cli.json {
        serde_json::to_string_pretty(&TranscriptReply::from_result(result))?
    } else {
        match result {
            Ok(text) => text,
            Err(e) => {
                warn!("Failed ({:?}): {}", e.kind(), e);
                return Err(e.into());
            }
        }
    };

    match &cli.output {
        Some(path) => {
            std::fs::write(path, format!("{}\n", output))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Saved to {}", path.display());
        }
        None => println!("{}", output),
    }

    Ok(())
}
