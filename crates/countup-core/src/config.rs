//! Page-level counter options.
//!
//! Every field has a built-in default matching the stock markup contract, so
//! `CounterConfig::default()` is what a page gets unless the host passes an
//! options object. Unknown JSON fields are rejected.

use serde::{Deserialize, Serialize};

use crate::animation::{CountUp, DEFAULT_FRAMES_PER_RUN};
use crate::error::{ConfigError, ConfigFromJsonError};
use crate::target::Target;
use crate::visibility::{DEFAULT_THRESHOLD, VisibilityWatcher};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CounterConfig {
    /// Visible fraction required before a counter starts.
    pub threshold: f64,
    /// Frames a jitter-free run takes.
    pub frames_per_run: u32,
    /// Selector for counter elements.
    pub counter_selector: String,
    /// Selector, relative to the counter, for the node whose text is updated.
    pub display_selector: String,
    /// Attribute holding the target number.
    pub target_attribute: String,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            frames_per_run: DEFAULT_FRAMES_PER_RUN,
            counter_selector: ".counter".to_string(),
            display_selector: ".counter-count".to_string(),
            target_attribute: "data-count".to_string(),
        }
    }
}

impl CounterConfig {
    /// Parse an options object and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigFromJsonError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ConfigError::ThresholdOutOfRange {
                threshold: self.threshold,
            });
        }
        if self.frames_per_run == 0 {
            return Err(ConfigError::ZeroFrames);
        }
        for (field, value) in [
            ("counter_selector", &self.counter_selector),
            ("display_selector", &self.display_selector),
            ("target_attribute", &self.target_attribute),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyField { field });
            }
        }
        Ok(())
    }

    /// Animator for one counter under these options.
    #[must_use]
    pub fn animator(&self, target: Target) -> CountUp {
        CountUp::with_frames(target, self.frames_per_run)
    }

    /// Watcher using the configured threshold.
    #[must_use]
    pub fn watcher<K: Eq + std::hash::Hash + Clone>(&self) -> VisibilityWatcher<K> {
        VisibilityWatcher::new(self.threshold)
    }
}
