//! Domain error types.

/// Top-level error type for folioback.
#[derive(Debug, thiserror::Error)]
pub enum FoliobackError {
    #[error("insufficient data for {code}: no candles in lookback window")]
    InsufficientData { code: String },

    #[error("period mismatch: no common start date across assets")]
    PeriodMismatch,

    #[error("history persistence failed: {reason}")]
    Persistence { reason: String },

    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FoliobackError {
    /// Process exit status for this error category.
    pub fn exit_status(&self) -> u8 {
        match self {
            FoliobackError::Io(_) | FoliobackError::Json(_) => 1,
            FoliobackError::ConfigParse { .. }
            | FoliobackError::ConfigMissing { .. }
            | FoliobackError::ConfigInvalid { .. }
            | FoliobackError::InvalidRequest { .. } => 2,
            FoliobackError::Database { .. }
            | FoliobackError::DatabaseQuery { .. }
            | FoliobackError::Persistence { .. } => 3,
            FoliobackError::InsufficientData { .. } | FoliobackError::PeriodMismatch => 5,
        }
    }
}

impl From<&FoliobackError> for std::process::ExitCode {
    fn from(err: &FoliobackError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}
