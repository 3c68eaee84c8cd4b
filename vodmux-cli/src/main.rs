mod error;

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use tracing::{Level, error, info};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};
use vodmux_engine::{
    ConvertConfig, Converter, EngineConfig, FfmpegEngine, HttpFetcher, Progress, RelayConfig,
};

use crate::error::Result;

#[derive(Parser)]
#[command(name = "vodmux")]
#[command(author, version, about = "Downloads an HLS stream and remuxes it into a playable MP4")]
struct Args {
    /// The `.m3u8` URL to convert
    url: String,

    /// Route every request through the relay proxy
    #[arg(long)]
    proxy: bool,

    /// Relay proxy endpoint, implies --proxy
    #[arg(long, value_name = "URL")]
    proxy_url: Option<String>,

    /// Where to write the produced MP4
    #[arg(short, long, default_value = "output.mp4")]
    output: PathBuf,

    /// Path to the ffmpeg binary
    #[arg(long, default_value = "ffmpeg")]
    ffmpeg: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = run(args).await {
        error!("Conversion failed: {e}");
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    init_logging(args.verbose, args.quiet);

    let use_proxy = args.proxy || args.proxy_url.is_some();
    let relay = match args.proxy_url {
        Some(endpoint) => RelayConfig { endpoint },
        None => RelayConfig::default(),
    };
    let config = ConvertConfig {
        relay,
        use_proxy,
        ..ConvertConfig::default()
    };

    let fetcher = HttpFetcher::new(&config.fetch, config.relay.clone())?;
    let engine = FfmpegEngine::load(EngineConfig {
        ffmpeg_path: args.ffmpeg,
    })
    .await?;

    let converter = Converter::new(Arc::new(fetcher), Arc::new(engine), config)
        .with_progress(Progress::new(|event| info!("{event}")));

    let output = converter.convert(&args.url).await?;
    tokio::fs::write(&args.output, &output).await?;
    info!(
        path = %args.output.display(),
        bytes = output.len(),
        "wrote output file"
    );
    println!("{}", args.output.display());
    Ok(())
}

fn init_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_level(verbose))
        .init();
}
