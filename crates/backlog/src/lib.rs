//! In-process developer console: a bounded, thread-safe log store with an
//! optional durable log file, a command prompt with history, and a slide-in
//! overlay drawn through a pluggable canvas.

pub mod config;
pub mod console;
pub mod log;
pub mod render;
mod util;

pub use config::{ConfigError, ConsoleConfig};
pub use console::{Console, ConsoleCommands, ConsoleInput, ConsoleKey, InputCollector};
pub use log::{LogEntry, LogStore, Severity, StoreError};
