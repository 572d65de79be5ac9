use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod atomic_io;
mod sink;
mod store;

pub use sink::{DebugMirror, FileLogWriter, LogWriter, NullMirror, TracingMirror, LOG_FILE_NAME};
pub use store::{LogStore, StoreError, DEFAULT_MAX_ENTRIES};

/// Importance tag attached to every log entry.
///
/// `None` is the "no severity" sentinel. It sorts lowest so it can seed
/// watermark comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Severity {
    None = 0,
    Default = 1,
    Warning = 2,
    Error = 3,
    Critical = 4,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::None,
        Severity::Default,
        Severity::Warning,
        Severity::Error,
        Severity::Critical,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::None => "none",
            Severity::Default => "default",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Critical => "critical",
        }
    }

    /// Tag written in front of the message text.
    pub fn prefix(self) -> &'static str {
        match self {
            Severity::None | Severity::Default => "",
            Severity::Warning => "[Warning] ",
            Severity::Error => "[Error] ",
            Severity::Critical => "[Critical] ",
        }
    }

    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => Severity::None,
            1 => Severity::Default,
            2 => Severity::Warning,
            3 => Severity::Error,
            _ => Severity::Critical,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown severity '{0}' (expected none|default|warning|error|critical)")]
pub struct ParseSeverityError(String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let lower = raw.trim().to_ascii_lowercase();
        Severity::ALL
            .into_iter()
            .find(|level| level.as_str() == lower)
            .ok_or_else(|| ParseSeverityError(raw.to_string()))
    }
}

/// One stored line of console output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    text: String,
    level: Severity,
}

impl LogEntry {
    /// Builds the stored form: severity prefix, message, trailing newline.
    pub fn format(message: &str, level: Severity) -> Self {
        let prefix = level.prefix();
        let mut text = String::with_capacity(prefix.len() + message.len() + 1);
        text.push_str(prefix);
        text.push_str(message);
        text.push('\n');
        Self { text, level }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn level(&self) -> Severity {
        self.level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering_puts_none_lowest() {
        assert!(Severity::None < Severity::Default);
        assert!(Severity::Default < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert!(Severity::Error < Severity::Critical);
    }

    #[test]
    fn severity_parses_case_insensitively() {
        assert_eq!("Warning".parse::<Severity>(), Ok(Severity::Warning));
        assert_eq!(" error ".parse::<Severity>(), Ok(Severity::Error));
        assert!("loud".parse::<Severity>().is_err());
    }

    #[test]
    fn severity_survives_u8_conversion() {
        for level in Severity::ALL {
            assert_eq!(Severity::from_u8(level as u8), level);
        }
    }

    #[test]
    fn entry_format_adds_prefix_and_newline() {
        assert_eq!(LogEntry::format("x", Severity::Default).text(), "x\n");
        assert_eq!(
            LogEntry::format("y", Severity::Warning).text(),
            "[Warning] y\n"
        );
        assert_eq!(LogEntry::format("z", Severity::Error).text(), "[Error] z\n");
    }
}
