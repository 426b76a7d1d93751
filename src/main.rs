// cplayer - terminal audio player
// Browse a directory or saved playlist, play it top to bottom

use anyhow::{Context, Result};
use clap::Parser;
use cplayer::{
    audio::{MusicScanner, PlaybackSession, PlaylistStore, RodioTransport, Tracklist},
    config::Config,
    ui::{App, EventHandler, TerminalManager},
};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cplayer")]
#[command(about = "A terminal audio player with playlists")]
struct Args {
    /// Directory or audio file to open instead of the last playlist
    #[arg(long)]
    path: Option<PathBuf>,

    /// Config file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Keep stderr attached and log at debug level
    #[arg(long)]
    dev: bool,
}

fn init_logging(config: &Config, dev: bool) -> Result<WorkerGuard> {
    let log_dir = config.log_directory();
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "cplayer.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let default_level = if dev { "debug" } else { config.development.level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::fmt()
        .with_writer(file_writer)
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_env_filter(filter)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(guard)
}

/// Audio backends print device warnings on stderr, which would garble the TUI
#[cfg(unix)]
fn redirect_stderr_to_null() -> Result<()> {
    // SAFETY: plain fd syscalls on a descriptor we just opened
    unsafe {
        let null_fd = libc::open(b"/dev/null\0".as_ptr() as *const libc::c_char, libc::O_WRONLY);
        if null_fd == -1 {
            anyhow::bail!("Failed to open /dev/null");
        }
        if libc::dup2(null_fd, libc::STDERR_FILENO) == -1 {
            libc::close(null_fd);
            anyhow::bail!("Failed to redirect stderr");
        }
        libc::close(null_fd);
    }
    Ok(())
}

#[cfg(not(unix))]
fn redirect_stderr_to_null() -> Result<()> {
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let _log_guard = init_logging(&config, args.dev)?;
    info!("cplayer starting");

    if args.dev {
        debug!("Dev mode: keeping stderr");
    } else if let Err(e) = redirect_stderr_to_null() {
        warn!("Could not silence stderr: {:#}", e);
    }

    let scanner = MusicScanner::from_config(&config.player);
    let store = PlaylistStore::new(&config.playlist.directory)?;
    let transport = RodioTransport::new(config.player.volume)?;
    let session = PlaybackSession::new(Tracklist::new(config.playlist.order), transport, &config.player);

    let mut terminal = TerminalManager::new()?;
    let mut events = EventHandler::new(config.tick_interval());
    let mut app = App::new(config, session, scanner, store);
    app.restore_library(args.path.as_deref());
    app.run(&mut terminal, &mut events).await
}
