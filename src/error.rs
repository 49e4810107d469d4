use thiserror::Error;

/// Everything that can go wrong while building a dataset or clustering it.
#[derive(Debug, Error)]
pub enum KMeansError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("dimension mismatch: expected {expected} values, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("cluster {cluster} received no samples in iteration {iteration}")]
    EmptyCluster { cluster: usize, iteration: usize },

    #[error("assignments did not stabilize within {iterations} iterations")]
    NonConvergence { iterations: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("could not parse {value:?} in column {column} as a number")]
    ParseFloat {
        value: String,
        column: usize,
        #[source]
        source: std::num::ParseFloatError,
    },
}

impl KMeansError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        KMeansError::InvalidArgument(msg.into())
    }

    /// True for the invalid-argument family, which includes dimension mismatches.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            KMeansError::InvalidArgument(_) | KMeansError::DimensionMismatch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, KMeansError>;
