//! Counter targets parsed from the `data-count` attribute.
//!
//! # Failure Modes
//!
//! - Missing attribute: [`TargetError::Missing`].
//! - Blank attribute: [`TargetError::Empty`].
//! - Unparseable text: [`TargetError::NotANumber`].
//! - `NaN` / `inf`: [`TargetError::NotFinite`]. The animator would never
//!   terminate on these, so they are rejected up front.
//!
//! Negative and fractional targets are accepted.
//!
//! Parsing follows Rust's `f64` grammar rather than JavaScript's unary `+`:
//! hex and binary literals such as `0x10` are [`TargetError::NotANumber`].
//! Display prints integral values in full (`1e21` shows as
//! `1000000000000000000000`, not `1e+21`).

use std::fmt;

use crate::error::TargetError;

/// The final value a counter animates toward. Always finite.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Target(f64);

impl Target {
    /// Parse the raw attribute value (`None` when the attribute is absent).
    pub fn parse(raw: Option<&str>) -> Result<Self, TargetError> {
        let raw = raw.ok_or(TargetError::Missing)?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TargetError::Empty);
        }
        let value: f64 = trimmed
            .parse()
            .map_err(|_| TargetError::not_a_number(raw))?;
        Self::new(value).ok_or_else(|| TargetError::not_finite(raw))
    }

    /// Wrap a finite value. Returns `None` for `NaN` or infinities.
    #[must_use]
    pub fn new(value: f64) -> Option<Self> {
        value.is_finite().then_some(Self(value))
    }

    #[inline]
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Text shown on the final frame: exactly the target.
    #[must_use]
    pub fn display(self) -> String {
        format_number(self.0)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_number(self.0))
    }
}

/// Render a finite number the way the page shows it: integral values with no
/// fraction, and never a negative zero.
#[must_use]
pub fn format_number(value: f64) -> String {
    // -0.0 + 0.0 == +0.0
    let value = value + 0.0;
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
