//! Domain error types.

/// Top-level error type for macross.
///
/// Sentinel outcomes (`no_data`, `no_returns`) are not errors; see
/// [`crate::domain::outcome`].
#[derive(Debug, thiserror::Error)]
pub enum MacrossError {
    #[error("data source error: {reason}")]
    DataSource { reason: String },

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

    #[error("model error: {reason}")]
    Model { reason: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&MacrossError> for std::process::ExitCode {
    fn from(err: &MacrossError) -> Self {
        let code: u8 = match err {
            MacrossError::Io(_) | MacrossError::Json(_) => 1,
            MacrossError::ConfigParse { .. }
            | MacrossError::ConfigMissing { .. }
            | MacrossError::ConfigInvalid { .. } => 2,
            MacrossError::DataSource { .. } => 3,
            MacrossError::Model { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
