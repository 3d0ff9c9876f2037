//! Exactly-once visibility watcher.
//!
//! The browser's intersection observer delivers batches of samples whenever
//! an element's visible fraction crosses one of its thresholds, in either
//! direction. [`VisibilityWatcher`] turns that stream into a single "became
//! visible" event per element: the first sample at or above the threshold
//! fires the element and drops it from the observed set, so later crossings
//! are ignored.
//!
//! # Invariants
//!
//! 1. A key fires at most once over the watcher's lifetime.
//! 2. A key never fires on a sample whose ratio is below the threshold or
//!    that is not intersecting.
//! 3. A fired key cannot be re-observed.
//! 4. `process` returns fired keys in batch order.

use std::collections::HashSet;
use std::hash::Hash;

/// Fraction of the element area that must be visible before it fires.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// One entry from a host intersection callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionSample<K> {
    pub key: K,
    pub is_intersecting: bool,
    /// Visible fraction of the element, `0.0..=1.0`.
    pub ratio: f64,
}

impl<K> IntersectionSample<K> {
    #[must_use]
    pub fn new(key: K, is_intersecting: bool, ratio: f64) -> Self {
        Self {
            key,
            is_intersecting,
            ratio,
        }
    }
}

/// Tracks which elements are still waiting for their first visibility event.
#[derive(Debug, Clone)]
pub struct VisibilityWatcher<K> {
    threshold: f64,
    observed: HashSet<K>,
    fired: HashSet<K>,
}

impl<K: Eq + Hash + Clone> VisibilityWatcher<K> {
    /// Watcher firing at `threshold`, clamped into `[0, 1]`.
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        let threshold = if threshold.is_nan() {
            DEFAULT_THRESHOLD
        } else {
            threshold.clamp(0.0, 1.0)
        };
        Self {
            threshold,
            observed: HashSet::new(),
            fired: HashSet::new(),
        }
    }

    /// Start watching `key`. Returns `false` if it is already watched or has
    /// already fired.
    pub fn observe(&mut self, key: K) -> bool {
        if self.fired.contains(&key) {
            return false;
        }
        self.observed.insert(key)
    }

    /// Stop watching `key` without firing it.
    pub fn unobserve(&mut self, key: &K) -> bool {
        self.observed.remove(key)
    }

    /// Consume a batch of samples; returns the keys that became visible for
    /// the first time. Those keys are no longer observed afterwards.
    pub fn process<I>(&mut self, samples: I) -> Vec<K>
    where
        I: IntoIterator<Item = IntersectionSample<K>>,
    {
        let mut fired = Vec::new();
        for sample in samples {
            if !self.crosses(&sample) {
                continue;
            }
            if self.observed.remove(&sample.key) {
                self.fired.insert(sample.key.clone());
                fired.push(sample.key);
            }
        }
        if !fired.is_empty() {
            tracing::debug!(
                fired = fired.len(),
                remaining = self.observed.len(),
                "visibility.fired"
            );
        }
        fired
    }

    fn crosses(&self, sample: &IntersectionSample<K>) -> bool {
        sample.is_intersecting && sample.ratio >= self.threshold
    }

    #[inline]
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    #[must_use]
    pub fn is_observing(&self, key: &K) -> bool {
        self.observed.contains(key)
    }

    #[must_use]
    pub fn has_fired(&self, key: &K) -> bool {
        self.fired.contains(key)
    }

    /// Number of elements still waiting to fire.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.observed.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }
}

impl<K: Eq + Hash + Clone> Default for VisibilityWatcher<K> {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}
