//! Count-up animator: one instance per counter element.
//!
//! A [`CountUp`] advances an accumulator once per animation frame by
//! `target / frames_per_run` plus a jitter of 0 or 1, and reports the text the
//! host should write into the counter's display node.
//!
//! # Usage
//!
//! ```
//! use countup_core::{CountUp, Frame, NoJitter, Target};
//!
//! let target = Target::parse(Some("3")).unwrap();
//! let mut anim = CountUp::new(target);
//! let mut jitter = NoJitter;
//! loop {
//!     match anim.step(&mut jitter) {
//!         Frame::Running { .. } => continue,
//!         Frame::Finished { text } => {
//!             assert_eq!(text, "3");
//!             break;
//!         }
//!     }
//! }
//! ```
//!
//! # Invariants
//!
//! 1. The accumulator starts at 0 and only grows for non-negative targets, so
//!    the displayed ceiling never decreases for integer targets. A fractional
//!    target can step down on the finished frame (`100` then `99.5`).
//! 2. The finished frame always shows exactly the target.
//! 3. Once finished, `step` is idempotent and draws no more jitter.
//! 4. A target `<= 0` finishes on the first frame.
//!
//! # Failure Modes
//!
//! None: targets are validated by [`Target::parse`], so the loop always
//! terminates for non-negative targets within `frames_per_run + 1` frames
//! (float accumulation can fall just short on frame `frames_per_run`).

use crate::jitter::JitterSource;
use crate::target::{Target, format_number};

/// Frames a full run takes when no jitter is added.
pub const DEFAULT_FRAMES_PER_RUN: u32 = 300;

/// Outcome of one animation frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Show `text` and schedule another frame.
    Running { text: String },
    /// Show `text` (exactly the target) and stop scheduling.
    Finished { text: String },
}

impl Frame {
    /// Text to write into the display node.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Running { text } | Self::Finished { text } => text,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished { .. })
    }
}

/// Animation state for a single counter.
#[derive(Debug, Clone)]
pub struct CountUp {
    target: Target,
    count: f64,
    speed: f64,
    frames: u32,
    finished: bool,
}

impl CountUp {
    /// Animator with the default 300-frame run.
    #[must_use]
    pub fn new(target: Target) -> Self {
        Self::with_frames(target, DEFAULT_FRAMES_PER_RUN)
    }

    /// Animator whose jitter-free run lasts `frames_per_run` frames.
    ///
    /// `frames_per_run` of 0 is treated as 1.
    #[must_use]
    pub fn with_frames(target: Target, frames_per_run: u32) -> Self {
        let frames_per_run = frames_per_run.max(1);
        Self {
            target,
            count: 0.0,
            speed: target.value() / f64::from(frames_per_run),
            frames: 0,
            finished: false,
        }
    }

    /// Advance one frame.
    pub fn step<J: JitterSource>(&mut self, jitter: &mut J) -> Frame {
        if self.finished {
            return self.finished_frame();
        }

        self.count += self.speed + jitter.next_jitter();
        self.frames += 1;

        if self.count < self.target.value() {
            let text = format_number(self.count.ceil());
            tracing::trace!(frame = self.frames, count = self.count, %text, "countup.frame");
            Frame::Running { text }
        } else {
            self.finished = true;
            tracing::debug!(
                target_value = self.target.value(),
                frames = self.frames,
                "countup.finished"
            );
            self.finished_frame()
        }
    }

    /// Step until finished or `max_frames` have run; returns every frame
    /// produced by this call.
    pub fn run_to_completion<J: JitterSource>(
        &mut self,
        jitter: &mut J,
        max_frames: usize,
    ) -> Vec<Frame> {
        let mut out = Vec::new();
        while !self.finished && out.len() < max_frames {
            out.push(self.step(jitter));
        }
        out
    }

    fn finished_frame(&self) -> Frame {
        Frame::Finished {
            text: self.target.display(),
        }
    }

    #[inline]
    #[must_use]
    pub fn target(&self) -> Target {
        self.target
    }

    /// Current accumulator value.
    #[inline]
    #[must_use]
    pub fn count(&self) -> f64 {
        self.count
    }

    /// Increment per frame before jitter.
    #[inline]
    #[must_use]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Frames stepped so far.
    #[inline]
    #[must_use]
    pub fn frames_run(&self) -> u32 {
        self.frames
    }

    #[inline]
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}
