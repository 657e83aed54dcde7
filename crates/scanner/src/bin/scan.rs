use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use scanner::preprocess::CropRegion;
use scanner::recognizer::{DEFAULT_MODEL, DEFAULT_OLLAMA_URL};
use scanner::{OllamaRecognizer, ScreenshotScanner};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mk-scan")]
#[command(about = "Read kills and revives from a Masterkill scoreboard screenshot", long_about = None)]
#[command(version)]
struct Cli {
    /// Screenshot to read
    image: PathBuf,

    #[arg(long, env = "OLLAMA_URL", default_value = DEFAULT_OLLAMA_URL)]
    ollama_url: String,

    #[arg(long, env = "OLLAMA_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// The image is already cropped to the scoreboard
    #[arg(long)]
    full_frame: bool,

    /// Also write the preprocessed PNG here
    #[arg(long)]
    dump: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("mk_scan={},scanner={}", log_level, log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let recognizer = OllamaRecognizer::new(&cli.ollama_url, &cli.model)
        .context("Failed to create Ollama client")?;

    if !recognizer
        .client()
        .verify_model()
        .await
        .with_context(|| format!("Ollama is not reachable at {}", cli.ollama_url))?
    {
        anyhow::bail!("Model {} is not available, run `ollama pull {}`", cli.model, cli.model);
    }

    let mut scanner = ScreenshotScanner::new(Arc::new(recognizer));
    if cli.full_frame {
        scanner = scanner.with_region(CropRegion {
            top: 0.0,
            bottom: 1.0,
            left: 0.0,
            right: 1.0,
        });
    }

    let image = tokio::fs::read(&cli.image)
        .await
        .with_context(|| format!("Failed to read {}", cli.image.display()))?;

    if let Some(ref dump) = cli.dump {
        let png = scanner.prepare(image.clone()).await?;
        tokio::fs::write(dump, png)
            .await
            .with_context(|| format!("Failed to write {}", dump.display()))?;
        tracing::info!("Preprocessed image written to {}", dump.display());
    }

    let lines = scanner.scan(image).await.context("Failed to scan screenshot")?;

    println!("{}", serde_json::to_string_pretty(&lines)?);

    Ok(())
}
