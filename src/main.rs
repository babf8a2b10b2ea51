use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ytscribe::transcript::LanguageListing;
use ytscribe::{Cli, Config, TranscriptError, TranscriptPipeline};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose { "ytscribe=debug" } else { "ytscribe=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<TranscriptError>() {
                Some(e) => println!("Error: {}", e),
                None => {
                    tracing::error!("Unhandled error while running CLI: {:?}", err);
                    println!("An unexpected error occurred: {}", err);
                }
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(backend) = cli.backend {
        config.provider.backend = backend;
    }
    if let Some(mode) = cli.mode {
        config.output.mode = mode;
    }

    if cli.show_config {
        config.display();
        return Ok(());
    }

    let url = match cli.url.as_deref() {
        Some(url) => url.to_string(),
        None => prompt("Please enter the YouTube video URL: ")?,
    };

    let pipeline = TranscriptPipeline::from_config(&config, config.provider.backend)?;

    if cli.list_languages {
        let listing = with_spinner(cli.quiet, "Listing transcript languages...", pipeline.list_languages(&url)).await?;
        print_languages(&listing);
        return Ok(());
    }

    tracing::info!("Fetching transcript for URL: {}", url);
    let (transcript, markdown) = with_spinner(
        cli.quiet,
        "Fetching transcript...",
        pipeline.fetch_and_render(&url, cli.requested_language(), config.output.mode),
    )
    .await?;
    tracing::debug!(
        "Rendered {} segments of '{}' as {}",
        transcript.segments.len(),
        transcript.title,
        config.output.mode
    );

    let output = cli.output.unwrap_or_else(|| config.output.default_file.clone());
    let path = ytscribe::output::save_to_file(&markdown, &output)?;
    println!("Transcript saved to {}", path.display());

    Ok(())
}

/// Read one trimmed line from stdin after printing `message`
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Drive `task` while showing a spinner on stderr, unless `quiet` is set
async fn with_spinner<T>(quiet: bool, message: &'static str, task: impl std::future::Future<Output = T>) -> T {
    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}") {
        progress.set_style(style);
    }
    progress.set_message(message);
    progress.enable_steady_tick(Duration::from_millis(100));

    let result = task.await;
    progress.finish_and_clear();
    result
}

fn print_languages(listing: &LanguageListing) {
    if listing.is_empty() {
        println!("No transcripts are available for this video.");
        return;
    }

    println!("Available transcript languages:");
    if !listing.manual.is_empty() {
        println!("  Manual:    {}", listing.manual.join(", "));
    }
    if !listing.generated.is_empty() {
        println!("  Generated: {}", listing.generated.join(", "));
    }
}
