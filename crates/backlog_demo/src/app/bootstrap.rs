use std::io;
use std::path::PathBuf;

use backlog::console::CommandError;
use backlog::{ConfigError, ConsoleConfig, StoreError};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

const CONFIG_PATH_ENV_VAR: &str = "BACKLOG_CONFIG";
const FRAMES_ENV_VAR: &str = "BACKLOG_DEMO_FRAMES";
pub(crate) const DEFAULT_FRAMES: u32 = 240;

#[derive(Debug, Error)]
pub(crate) enum DemoError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("BACKLOG_DEMO_FRAMES must be a positive integer, got '{value}'")]
    InvalidFrames { value: String },
    #[error("failed to spawn producer thread")]
    Spawn(#[source] io::Error),
}

pub(crate) struct AppWiring {
    pub(crate) config: ConsoleConfig,
    pub(crate) frames: u32,
}

pub(crate) fn build_app() -> Result<AppWiring, DemoError> {
    init_tracing();
    info!("=== Backlog Demo Startup ===");

    let config = match config_path_from_env() {
        Some(path) => {
            info!(path = %path.display(), "loading_console_config");
            ConsoleConfig::load(&path)?
        }
        None => ConsoleConfig::default(),
    };
    let frames = parse_frames(std::env::var(FRAMES_ENV_VAR).ok().as_deref())?;

    Ok(AppWiring { config, frames })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var_os(CONFIG_PATH_ENV_VAR)
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from)
}

fn parse_frames(raw: Option<&str>) -> Result<u32, DemoError> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(DEFAULT_FRAMES);
    };
    match raw.parse::<u32>() {
        Ok(frames) if frames > 0 => Ok(frames),
        _ => Err(DemoError::InvalidFrames {
            value: raw.to_string(),
        }),
    }
}
