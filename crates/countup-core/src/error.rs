use thiserror::Error;

/// Why a counter's `data-count` attribute could not be used as a target.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
    #[error("target attribute is missing")]
    Missing,

    #[error("target attribute is empty")]
    Empty,

    #[error("target is not a number: {raw:?}")]
    NotANumber { raw: String },

    #[error("target is not finite: {raw:?}")]
    NotFinite { raw: String },
}

/// Rejected [`CounterConfig`](crate::config::CounterConfig) values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("visibility threshold must be within [0, 1], got {threshold}")]
    ThresholdOutOfRange { threshold: f64 },

    #[error("frames_per_run must be at least 1")]
    ZeroFrames,

    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
}

/// Failure to load options from JSON: either syntax or a rejected value.
#[derive(Debug, Error)]
pub enum ConfigFromJsonError {
    #[error("options JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

impl TargetError {
    #[must_use]
    pub fn not_a_number(raw: impl Into<String>) -> Self {
        Self::NotANumber { raw: raw.into() }
    }

    #[must_use]
    pub fn not_finite(raw: impl Into<String>) -> Self {
        Self::NotFinite { raw: raw.into() }
    }
}
