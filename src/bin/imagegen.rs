//! CLI for imagegen - generate one image and save it.

use anyhow::Context;
use clap::{ArgAction, Parser};
use imagegen::image::{DEFAULT_MODEL, DEFAULT_OUTPUT, DEFAULT_PROMPT, DEFAULT_SIZE};
use imagegen::{run_from_lookup, GenerationRequest, OpenAiImageProvider};
use std::path::{Path, PathBuf};
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser)]
#[command(name = "imagegen")]
#[command(about = "Generate an image with the OpenAI Images API and save it to a file")]
#[command(version)]
struct Cli {
    /// The text prompt describing the image
    #[arg(long, default_value = DEFAULT_PROMPT)]
    prompt: String,

    /// Model identifier
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Output size as WIDTHxHEIGHT
    #[arg(long, default_value = DEFAULT_SIZE, value_parser = parse_size)]
    size: String,

    /// Output file path (overwritten if it exists)
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Dotenv file to load before reading OPENAI_API_KEY [default: ./.env if present]
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn parse_size(s: &str) -> Result<String, String> {
    let valid = s
        .split_once('x')
        .is_some_and(|(w, h)| w.parse::<u32>().is_ok() && h.parse::<u32>().is_ok());
    if valid {
        Ok(s.to_string())
    } else {
        Err(format!("expected WIDTHxHEIGHT (e.g. 1024x1024), got '{s}'"))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);
    load_env_file(cli.env_file.as_deref())?;

    let request = GenerationRequest::new(&cli.prompt)
        .with_model(&cli.model)
        .with_size(&cli.size);

    let report = run_from_lookup(
        |name| std::env::var(name).ok(),
        OpenAiImageProvider::from_settings,
        &request,
        &cli.output,
    )
    .await
    .context("image generation failed")?;

    if cli.json {
        let result = serde_json::json!({
            "type": "image",
            "success": true,
            "report": report,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", report.confirmation());
        let format = report.format.map_or("unknown format", |f| f.extension());
        println!(
            "{} bytes ({}) via {} in {}ms",
            report.size_bytes, format, report.provider, report.duration_ms
        );
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_target(false)
        .compact()
        .try_init()
        .ok();
}

/// Loads key-value pairs into the process environment. Variables already set
/// take precedence over the file.
fn load_env_file(path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            dotenvy::from_path(path)
                .with_context(|| format!("failed to load env file {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded env file");
        }
        None => match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "loaded env file"),
            Err(e) if e.not_found() => tracing::debug!("no .env file found"),
            Err(e) => return Err(e).context("failed to load .env"),
        },
    }
    Ok(())
}
