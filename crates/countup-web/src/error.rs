use countup_core::{ConfigError, ConfigFromJsonError, TargetError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StartError>;

/// Failures while wiring counters into the page.
///
/// Page-level variants abort page setup entirely; per-counter variants
/// (`MissingDisplay`, `Target`) only skip the counter they name.
#[derive(Debug, Error)]
pub enum StartError {
    #[error("no global window")]
    NoWindow,

    #[error("window has no document")]
    NoDocument,

    #[error("counter {index} has no display node matching {selector:?}")]
    MissingDisplay { index: usize, selector: String },

    #[error("counter {index}: {source}")]
    Target {
        index: usize,
        #[source]
        source: TargetError,
    },

    #[error("invalid options: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Options(#[from] ConfigFromJsonError),

    #[error("JavaScript error: {0}")]
    Js(String),
}

impl StartError {
    /// Whether the error only affects one counter.
    #[must_use]
    pub fn is_per_counter(&self) -> bool {
        matches!(self, Self::MissingDisplay { .. } | Self::Target { .. })
    }

    #[must_use]
    pub fn target(index: usize, source: TargetError) -> Self {
        Self::Target { index, source }
    }
}

#[cfg(target_arch = "wasm32")]
impl StartError {
    pub(crate) fn js(value: wasm_bindgen::JsValue) -> Self {
        Self::Js(
            value
                .as_string()
                .unwrap_or_else(|| format!("{value:?}")),
        )
    }
}

#[cfg(target_arch = "wasm32")]
impl From<StartError> for wasm_bindgen::JsValue {
    fn from(err: StartError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}
