#![forbid(unsafe_code)]

//! Core: count-up animation, target parsing, jitter, and visibility tracking.
//!
//! Nothing in this crate touches a browser API. The host (see `countup-web`)
//! feeds it intersection samples and animation frames; everything here is
//! deterministic given a [`jitter::JitterSource`], so the whole counter
//! lifecycle can be exercised natively.

pub mod animation;
pub mod config;
pub mod error;
pub mod jitter;
pub mod target;
pub mod trace;
pub mod visibility;

pub use animation::{CountUp, Frame};
pub use config::CounterConfig;
pub use error::{ConfigError, ConfigFromJsonError, TargetError};
pub use jitter::{DefaultJitter, JitterSource, NoJitter, RandJitter, ScriptedJitter};
pub use target::Target;
pub use visibility::{IntersectionSample, VisibilityWatcher};
