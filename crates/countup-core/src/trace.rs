//! Frame trace for a single counter run.
//!
//! Records what each frame displayed so a run can be checked or exported
//! after the fact. The browser host keeps no trace; this is for native
//! tooling and tests.
//!
//! ```
//! use countup_core::{CountUp, NoJitter, Target};
//! use countup_core::trace::CounterTrace;
//!
//! let mut anim = CountUp::with_frames(Target::new(4.0).unwrap(), 4);
//! let trace = CounterTrace::record("hero", &mut anim, &mut NoJitter, 100);
//! assert_eq!(trace.texts(), vec!["1", "2", "3", "4"]);
//! assert!(trace.is_monotonic());
//! ```

use serde::Serialize;

use crate::animation::{CountUp, Frame};
use crate::jitter::JitterSource;

/// One recorded frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSample {
    pub frame_idx: u32,
    pub count: f64,
    pub text: String,
    pub finished: bool,
}

/// All frames of one counter run plus a summary.
#[derive(Debug, Clone, Serialize)]
pub struct CounterTrace {
    pub counter_id: String,
    pub target: f64,
    pub speed: f64,
    pub frames: Vec<FrameSample>,
}

impl CounterTrace {
    #[must_use]
    pub fn new(counter_id: &str, anim: &CountUp) -> Self {
        Self {
            counter_id: counter_id.to_string(),
            target: anim.target().value(),
            speed: anim.speed(),
            frames: Vec::new(),
        }
    }

    /// Drive `anim` to completion (at most `max_frames`), recording each frame.
    pub fn record<J: JitterSource>(
        counter_id: &str,
        anim: &mut CountUp,
        jitter: &mut J,
        max_frames: usize,
    ) -> Self {
        let mut trace = Self::new(counter_id, anim);
        while !anim.is_finished() && trace.frames.len() < max_frames {
            let frame = anim.step(jitter);
            trace.push(anim, &frame);
        }
        trace
    }

    /// Append the frame `anim` just produced.
    pub fn push(&mut self, anim: &CountUp, frame: &Frame) {
        self.frames.push(FrameSample {
            frame_idx: anim.frames_run(),
            count: anim.count(),
            text: frame.text().to_string(),
            finished: frame.is_finished(),
        });
    }

    #[must_use]
    pub fn texts(&self) -> Vec<&str> {
        self.frames.iter().map(|f| f.text.as_str()).collect()
    }

    /// Text of the last frame, if any.
    #[must_use]
    pub fn final_text(&self) -> Option<&str> {
        self.frames.last().map(|f| f.text.as_str())
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.frames.last().is_some_and(|f| f.finished)
    }

    /// Whether displayed values never decrease from frame to frame.
    #[must_use]
    pub fn is_monotonic(&self) -> bool {
        let values: Vec<f64> = self
            .frames
            .iter()
            .filter_map(|f| f.text.parse::<f64>().ok())
            .collect();
        values.windows(2).all(|w| w[0] <= w[1])
    }

    /// Serialize the whole trace (machine-readable for CI gating).
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// One JSON object per frame, newline-terminated.
    #[must_use]
    pub fn to_jsonl(&self) -> String {
        let mut out = String::new();
        for sample in &self.frames {
            if let Ok(line) = serde_json::to_string(sample) {
                out.push_str(&line);
                out.push('\n');
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jitter::{NoJitter, ScriptedJitter};
    use crate::target::Target;

    #[test]
    fn empty_trace_is_unfinished() {
        let anim = CountUp::new(Target::new(10.0).unwrap());
        let trace = CounterTrace::new("c0", &anim);
        assert!(!trace.is_finished());
        assert_eq!(trace.final_text(), None);
        assert!(trace.is_monotonic());
    }

    #[test]
    fn records_until_finished() {
        let mut anim = CountUp::new(Target::new(10.0).unwrap());
        let trace = CounterTrace::record("c1", &mut anim, &mut ScriptedJitter::new([1]), 1_000);
        assert!(trace.is_finished());
        assert_eq!(trace.final_text(), Some("10"));
        assert!(trace.is_monotonic());
        // 1 + 1/30 per frame crosses 10 on frame 10.
        assert_eq!(trace.frames.len(), 10);
    }

    #[test]
    fn max_frames_caps_recording() {
        let mut anim = CountUp::new(Target::new(300.0).unwrap());
        let trace = CounterTrace::record("c2", &mut anim, &mut NoJitter, 5);
        assert_eq!(trace.frames.len(), 5);
        assert!(!trace.is_finished());
    }

    #[test]
    fn json_exports_parse() {
        let mut anim = CountUp::with_frames(Target::new(3.0).unwrap(), 3);
        let trace = CounterTrace::record("c3", &mut anim, &mut NoJitter, 10);
        let parsed: serde_json::Value = serde_json::from_str(&trace.to_json()).unwrap();
        assert_eq!(parsed["counter_id"], "c3");
        assert_eq!(parsed["frames"].as_array().map(Vec::len), Some(3));

        let jsonl = trace.to_jsonl();
        let lines: Vec<&str> = jsonl.lines().collect();
        assert_eq!(lines.len(), 3);
        for line in lines {
            assert!(serde_json::from_str::<serde_json::Value>(line).is_ok());
        }
    }
}
