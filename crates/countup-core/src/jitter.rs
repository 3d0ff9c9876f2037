//! Per-frame jitter: an extra 0 or 1 added to the running count.
//!
//! The random source is injected so the animator stays deterministic under
//! test. Production uses [`RandJitter`] over a `rand` generator.

use rand::{Rng, SeedableRng, rngs::StdRng};

/// Source of per-frame jitter. Every value must be `0.0` or `1.0`.
pub trait JitterSource {
    fn next_jitter(&mut self) -> f64;
}

impl<J: JitterSource + ?Sized> JitterSource for &mut J {
    fn next_jitter(&mut self) -> f64 {
        (**self).next_jitter()
    }
}

/// Jitter used by the browser host.
pub type DefaultJitter = RandJitter<StdRng>;

/// Uniform jitter in {0, 1} drawn from a `rand` generator.
#[derive(Debug, Clone)]
pub struct RandJitter<R> {
    rng: R,
}

impl<R: Rng> RandJitter<R> {
    #[must_use]
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Independent generator seeded from this one, so each counter owns its
    /// own jitter stream.
    #[must_use]
    pub fn split(&mut self) -> DefaultJitter {
        RandJitter::seeded(self.rng.next_u64())
    }
}

impl RandJitter<StdRng> {
    /// Seeded standard generator. The browser host seeds this once per page.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> JitterSource for RandJitter<R> {
    fn next_jitter(&mut self) -> f64 {
        f64::from(self.rng.next_u32() & 1)
    }
}

/// No jitter at all: the count advances by exactly `target / frames` per frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl JitterSource for NoJitter {
    fn next_jitter(&mut self) -> f64 {
        0.0
    }
}

/// Replays a fixed jitter pattern, cycling when exhausted.
///
/// An empty pattern behaves like [`NoJitter`]. Any non-zero entry counts as 1.
#[derive(Debug, Clone)]
pub struct ScriptedJitter {
    pattern: Vec<bool>,
    pos: usize,
}

impl ScriptedJitter {
    #[must_use]
    pub fn new(pattern: impl IntoIterator<Item = u8>) -> Self {
        Self {
            pattern: pattern.into_iter().map(|b| b != 0).collect(),
            pos: 0,
        }
    }

    /// Number of jitter values handed out so far.
    #[must_use]
    pub fn draws(&self) -> usize {
        self.pos
    }
}

impl JitterSource for ScriptedJitter {
    fn next_jitter(&mut self) -> f64 {
        if self.pattern.is_empty() {
            return 0.0;
        }
        let hit = self.pattern[self.pos % self.pattern.len()];
        self.pos += 1;
        if hit { 1.0 } else { 0.0 }
    }
}
