use forkline_history::{ConfigError, HistoryError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("script line {line}: {message}")]
    Script { line: usize, message: String },

    #[error("script line {line}: {source}")]
    History {
        line: usize,
        #[source]
        source: HistoryError,
    },
}

impl CliError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        1
    }

    #[must_use]
    pub fn script(line: usize, message: impl Into<String>) -> Self {
        Self::Script {
            line,
            message: message.into(),
        }
    }

    /// The 1-based script line this error points at, if any.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Script { line, .. } | Self::History { line, .. } => Some(*line),
            _ => None,
        }
    }
}
