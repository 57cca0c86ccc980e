use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "dirplay")]
#[command(about = "Browse a music folder and play it from the terminal")]
struct CliArgs {
    /// Config file (defaults to $DIRPLAY_CONFIG, then ./dirplay.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start browsing this folder instead of asking
    #[arg(long)]
    folder: Option<PathBuf>,

    /// Where to write logs; stdout belongs to the player
    #[arg(long, default_value = "dirplay.log")]
    log_file: PathBuf,
}

fn init_logging(log_file: &Path) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let dir = log_file
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = log_file
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("dirplay.log"));
    std::fs::create_dir_all(dir)?;

    let appender = tracing_appender::rolling::never(dir, name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,dirplay=debug"));

    let subscriber = tracing_subscriber::fmt()
        .with_writer(writer)
        .with_target(true)
        .with_ansi(false)
        .with_env_filter(filter)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(guard)
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    let _guard = init_logging(&args.log_file)?;
    tracing::info!("dirplay starting");

    dirplay::app::run_with_startup(dirplay::app::AppStartupOptions {
        config_path: dirplay::config::config_path(args.config.as_deref()),
        folder: args.folder,
    })
}
