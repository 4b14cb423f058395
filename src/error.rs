use std::fmt;

use serde::Serialize;
use ts_rs::TS;

use crate::dsl::error::CompileError;

/// Structured error type for the application layer (CLI and embedders).
/// Pipeline errors keep their own types; this wraps them for display.
#[derive(Debug, Clone, Serialize, TS)]
#[serde(tag = "code", content = "detail")]
#[ts(export)]
pub enum AppError {
    Io { message: String },
    Json { message: String },
    Compile { message: String },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Io { message } => write!(f, "I/O error: {message}"),
            AppError::Json { message } => write!(f, "JSON error: {message}"),
            AppError::Compile { message } => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Io {
            message: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Json {
            message: e.to_string(),
        }
    }
}

impl From<CompileError> for AppError {
    fn from(e: CompileError) -> Self {
        AppError::Compile {
            message: e.to_string(),
        }
    }
}
