use std::fs;
use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::AppError;

// ── Print sink ───────────────────────────────────────────────────

/// Where `📢` output goes in the generated script.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS, JsonSchema, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum PrintSink {
    /// `console.log(...)`, available in every host.
    #[default]
    Plain,
    /// `window.alert(...)`, for browser hosts.
    Rich,
}

impl PrintSink {
    /// Callee prefix up to and including the opening parenthesis.
    pub fn callee(self) -> &'static str {
        match self {
            PrintSink::Plain => "console.log(",
            PrintSink::Rich => "window.alert(",
        }
    }
}

// ── Compile settings ─────────────────────────────────────────────

/// Options fixed for the duration of one generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS, JsonSchema)]
#[serde(default)]
#[ts(export)]
pub struct CompileSettings {
    pub print_sink: PrintSink,
}

impl CompileSettings {
    pub fn with_sink(print_sink: PrintSink) -> Self {
        Self { print_sink }
    }
}

/// Load settings from a JSON file. Missing fields take their defaults.
pub fn read_settings(path: &Path) -> Result<CompileSettings, AppError> {
    let data = fs::read_to_string(path)?;
    let settings = serde_json::from_str(&data)?;
    Ok(settings)
}

/// JSON schema for the settings file, pretty-printed.
pub fn settings_schema() -> Result<String, AppError> {
    let schema = schemars::schema_for!(CompileSettings);
    Ok(serde_json::to_string_pretty(&schema)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sink_is_plain() {
        let settings = CompileSettings::default();
        assert_eq!(settings.print_sink, PrintSink::Plain);
        assert_eq!(settings.print_sink.callee(), "console.log(");
        assert_eq!(PrintSink::Rich.callee(), "window.alert(");
    }

    #[test]
    fn test_settings_round_trip() {
        let dir = std::env::temp_dir().join("emojiscript_test_settings");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.json");

        let settings = CompileSettings::with_sink(PrintSink::Rich);
        fs::write(&path, serde_json::to_string_pretty(&settings).unwrap()).unwrap();

        let loaded = read_settings(&path).unwrap();
        assert_eq!(loaded, settings);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let loaded: CompileSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(loaded.print_sink, PrintSink::Plain);
        let rich: CompileSettings = serde_json::from_str(r#"{"print_sink":"rich"}"#).unwrap();
        assert_eq!(rich.print_sink, PrintSink::Rich);
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("emojiscript_test_no_such_settings.json");
        let _ = fs::remove_file(&path);
        assert!(matches!(read_settings(&path), Err(AppError::Io { .. })));
    }

    #[test]
    fn test_bad_json_is_json_error() {
        let dir = std::env::temp_dir().join("emojiscript_test_bad_settings");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.json");
        fs::write(&path, r#"{"print_sink":"loud"}"#).unwrap();

        assert!(matches!(read_settings(&path), Err(AppError::Json { .. })));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_schema_names_sink_values() {
        let schema = settings_schema().unwrap();
        assert!(schema.contains("print_sink"));
        assert!(schema.contains("rich"));
    }
}
