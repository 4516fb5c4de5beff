//! metube - mirror YouTube subscriptions and pull from them.
//!
//! `metube vids` writes the recent video IDs of every subscribed channel
//! to a file for a downloader to pick up. `metube imgs` drops channel
//! posters into a media library.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use metube_core::api::client::DEFAULT_RECENT_VIDEOS;
use metube_core::sync::{ChannelFailure, RunSummary};
use metube_core::utils::expand_home;
use metube_core::{ApiClient, Config, Mode, RunOptions, SubscriptionCache, Syncer, VideoOptions};

#[derive(Parser, Debug)]
#[command(name = "metube", version, about, long_about = None)]
struct Cli {
    /// Re-cache the list of subs before running the command
    #[arg(long)]
    reload_subs: bool,

    /// Config file (default: ~/.config/metube/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Get recent videos from subscriptions
    Vids {
        /// Output file with video ids to download
        #[arg(long, default_value = "vids.txt")]
        out_file: PathBuf,

        /// Number of recent videos per channel
        #[arg(long, default_value_t = DEFAULT_RECENT_VIDEOS)]
        max_results: u32,

        /// Skip channels whose lookup fails instead of stopping
        #[arg(long)]
        keep_going: bool,
    },

    /// Load images for channels
    Imgs {
        /// Media library of channels
        media_dir: PathBuf,
    },
}

/// Initialize the tracing subscriber for logging.
/// The returned guard flushes the log file on drop.
fn init_tracing(log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(filter)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(filter)
                .init();
            Ok(None)
        }
    }
}

impl Command {
    fn into_mode(self) -> Mode {
        match self {
            Command::Vids { out_file, max_results, keep_going } => Mode::Videos {
                output: expand_home(&out_file),
                options: VideoOptions { max_results, keep_going },
            },
            Command::Imgs { media_dir } => Mode::Thumbnails {
                media_dir: expand_home(&media_dir),
            },
        }
    }
}

fn report_failures(failed: &[ChannelFailure]) {
    for failure in failed {
        eprintln!("Error pulling {}: {}", failure.channel, failure.reason);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = init_tracing(cli.log_file.as_deref())?;

    let config = match cli.config {
        Some(ref path) => Config::load_from(&expand_home(path))?,
        None => Config::load()?,
    };
    let settings = config.with_env().resolve()?;

    let client = ApiClient::new(settings.api_config())?;
    let cache = SubscriptionCache::new(settings.cache_file.clone());
    let syncer = Syncer::new(client, cache, settings.my_channel.clone());

    let options = RunOptions {
        refresh: cli.reload_subs,
        mode: cli.command.into_mode(),
    };

    match syncer.run(&options).await? {
        RunSummary::Videos(report) => {
            println!("{} videos from {} channels", report.video_ids.len(), report.channels);
            report_failures(&report.failed);
        }
        RunSummary::Thumbnails(report) => {
            println!("{} posters saved", report.saved.len());
            report_failures(&report.failed);
        }
    }

    info!("metube finished");
    println!("Done!");
    Ok(())
}
