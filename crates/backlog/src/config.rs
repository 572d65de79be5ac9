use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::console::DEFAULT_MAX_HISTORY;
use crate::log::{FileLogWriter, Severity, DEFAULT_MAX_ENTRIES};
use crate::render::TextStyle;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read console config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse console config at {location}: {source}")]
    Parse {
        location: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid console config field {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Tunables for the console and its log store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConsoleConfig {
    pub max_entries: usize,
    pub max_history: usize,
    pub filter_level: Severity,
    /// Slide speed in logical pixels per second.
    pub slide_speed: f32,
    pub page_scroll_speed: f32,
    pub wheel_scroll_factor: f32,
    /// Distance kept between the last output line and the viewport bottom.
    pub refit_bottom_margin: f32,
    pub input_height: f32,
    /// Gap between the bottom of the output clip and the input field.
    pub clip_gap: f32,
    pub text_left: f32,
    pub log_file: Option<PathBuf>,
    pub execution_blocked: bool,
    pub font: TextStyle,
    pub background_color: [u8; 4],
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            max_history: DEFAULT_MAX_HISTORY,
            filter_level: Severity::Default,
            slide_speed: 4000.0,
            page_scroll_speed: 1000.0,
            wheel_scroll_factor: 20.0,
            refit_bottom_margin: 50.0,
            input_height: 20.0,
            clip_gap: 15.0,
            text_left: 5.0,
            log_file: None,
            execution_blocked: false,
            font: TextStyle::default(),
            background_color: [29, 29, 29, 255],
        }
    }
}

impl ConsoleConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let config = serde_path_to_error::deserialize::<_, ConsoleConfig>(&mut deserializer)
            .map_err(|error| {
                let path = error.path().to_string();
                let location = if path.is_empty() || path == "." {
                    "<root>".to_string()
                } else {
                    path
                };
                ConfigError::Parse {
                    location,
                    source: error.into_inner(),
                }
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_entries == 0 {
            return Err(invalid("max_entries", "must be at least 1"));
        }
        if self.max_history == 0 {
            return Err(invalid("max_history", "must be at least 1"));
        }
        for (field, value) in [
            ("slide_speed", self.slide_speed),
            ("font.size", self.font.size),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(field, format!("expected > 0, got {value}")));
            }
        }
        for (field, value) in [
            ("page_scroll_speed", self.page_scroll_speed),
            ("wheel_scroll_factor", self.wheel_scroll_factor),
            ("refit_bottom_margin", self.refit_bottom_margin),
            ("input_height", self.input_height),
            ("clip_gap", self.clip_gap),
            ("text_left", self.text_left),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(field, format!("expected >= 0, got {value}")));
            }
        }
        Ok(())
    }

    /// Where the durable log goes: `log_file` if set, else `log.txt` in the
    /// working directory.
    pub fn log_file_path(&self) -> PathBuf {
        match &self.log_file {
            Some(path) => path.clone(),
            None => FileLogWriter::in_current_dir().path().to_path_buf(),
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config = ConsoleConfig::from_json_str("{}").expect("config");
        assert_eq!(config, ConsoleConfig::default());
        assert_eq!(config.max_entries, 500);
        assert_eq!(config.slide_speed, 4000.0);
    }

    #[test]
    fn partial_config_overrides_fields() {
        let config = ConsoleConfig::from_json_str(
            r#"{ "max_entries": 3, "filter_level": "warning", "font": { "size": 20.0 } }"#,
        )
        .expect("config");

        assert_eq!(config.max_entries, 3);
        assert_eq!(config.filter_level, Severity::Warning);
        assert_eq!(config.font.size, 20.0);
        assert_eq!(config.font.row_spacing, TextStyle::default().row_spacing);
    }

    #[test]
    fn type_errors_report_field_path() {
        let error = ConsoleConfig::from_json_str(r#"{ "font": { "size": "big" } }"#)
            .expect_err("should fail");
        match error {
            ConfigError::Parse { location, .. } => assert_eq!(location, "font.size"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(matches!(
            ConsoleConfig::from_json_str(r#"{ "max_entires": 3 }"#),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn zero_capacity_is_invalid() {
        let error = ConsoleConfig::from_json_str(r#"{ "max_history": 0 }"#).expect_err("invalid");
        assert!(matches!(
            error,
            ConfigError::Invalid {
                field: "max_history",
                ..
            }
        ));
    }

    #[test]
    fn load_reads_file_and_reports_missing_path() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("console.json");
        fs::write(&path, r#"{ "execution_blocked": true }"#).expect("write config");

        let config = ConsoleConfig::load(&path).expect("load");
        assert!(config.execution_blocked);

        let missing = ConsoleConfig::load(&temp.path().join("missing.json"));
        assert!(matches!(missing, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn explicit_log_file_wins_over_default() {
        let config = ConsoleConfig {
            log_file: Some(PathBuf::from("out/console.log")),
            ..ConsoleConfig::default()
        };
        assert_eq!(config.log_file_path(), PathBuf::from("out/console.log"));
        assert!(ConsoleConfig::default().log_file_path().ends_with("log.txt"));
    }
}
