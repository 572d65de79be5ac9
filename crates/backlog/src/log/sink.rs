use std::env;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use super::atomic_io::replace_log_file;
use super::Severity;

pub const LOG_FILE_NAME: &str = "log.txt";

/// Secondary channel every admitted entry is echoed to.
pub trait DebugMirror: Send + Sync {
    fn emit(&self, text: &str, severity: Severity);
}

/// Durable destination for the full log buffer.
///
/// Each call receives the complete concatenated buffer and overwrites whatever
/// the previous call wrote.
pub trait LogWriter: Send + Sync {
    fn write_log(&self, text: &str) -> io::Result<()>;

    fn describe(&self) -> String {
        "log writer".to_string()
    }
}

/// Forwards entries to `tracing` under the `backlog` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMirror;

impl DebugMirror for TracingMirror {
    fn emit(&self, text: &str, severity: Severity) {
        let line = text.trim_end_matches('\n');
        match severity {
            Severity::None | Severity::Default => info!(target: "backlog", "{}", line),
            Severity::Warning => warn!(target: "backlog", "{}", line),
            Severity::Error | Severity::Critical => error!(target: "backlog", "{}", line),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullMirror;

impl DebugMirror for NullMirror {
    fn emit(&self, _text: &str, _severity: Severity) {}
}

#[derive(Debug, Clone)]
pub struct FileLogWriter {
    path: PathBuf,
}

impl FileLogWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `log.txt` in the current working directory, or a relative `log.txt`
    /// when the working directory cannot be resolved.
    pub fn in_current_dir() -> Self {
        let path = env::current_dir()
            .map(|dir| dir.join(LOG_FILE_NAME))
            .unwrap_or_else(|_| PathBuf::from(LOG_FILE_NAME));
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogWriter for FileLogWriter {
    fn write_log(&self, text: &str) -> io::Result<()> {
        replace_log_file(&self.path, text)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
