//! Domain error types.

use crate::domain::universe::UniverseError;

/// Top-level error type for sleevebuilder.
#[derive(Debug, thiserror::Error)]
pub enum SleeveError {
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

    #[error("invalid ticker list for sleeve {sleeve}: {source}")]
    Universe {
        sleeve: String,
        #[source]
        source: UniverseError,
    },

    #[error("metrics provider failed for {ticker}: {reason}")]
    Provider { ticker: String, reason: String },

    #[error("no metrics available for {ticker}")]
    NoMetrics { ticker: String },

    #[error("sleeve {sleeve} has no candidates to select from")]
    EmptySleeve { sleeve: String },

    #[error("cannot normalize target weights: total weight is {total}")]
    ZeroTotalWeight { total: f64 },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&SleeveError> for std::process::ExitCode {
    fn from(err: &SleeveError) -> Self {
        let code: u8 = match err {
            SleeveError::Io(_) | SleeveError::Csv(_) => 1,
            SleeveError::ConfigParse { .. }
            | SleeveError::ConfigMissing { .. }
            | SleeveError::ConfigInvalid { .. }
            | SleeveError::Universe { .. } => 2,
            SleeveError::Provider { .. } | SleeveError::NoMetrics { .. } => 3,
            SleeveError::EmptySleeve { .. } | SleeveError::ZeroTotalWeight { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
