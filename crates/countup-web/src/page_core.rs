//! Browser-independent page bookkeeping.
//!
//! [`PageCore`] is everything the intersection callback needs besides DOM
//! handles: the options, the exactly-once watcher keyed by counter index,
//! and the seed stream that gives each started counter its own jitter.
//! The wasm layer maps DOM elements to indices and applies the text each
//! [`CounterRun`] produces.

use countup_core::{
    CountUp, CounterConfig, DefaultJitter, Frame, IntersectionSample, Target, VisibilityWatcher,
};

use crate::error::{Result, StartError};

/// Page-wide state shared by all counters on one page.
#[derive(Debug)]
pub(crate) struct PageCore {
    config: CounterConfig,
    watcher: VisibilityWatcher<usize>,
    seeder: DefaultJitter,
    registered: usize,
    started: usize,
    skipped: usize,
}

impl PageCore {
    pub(crate) fn new(config: CounterConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        let watcher = config.watcher();
        Ok(Self {
            config,
            watcher,
            seeder: DefaultJitter::seeded(seed),
            registered: 0,
            started: 0,
            skipped: 0,
        })
    }

    pub(crate) fn config(&self) -> &CounterConfig {
        &self.config
    }

    /// Watch counters `0..count`.
    pub(crate) fn register(&mut self, count: usize) {
        for index in 0..count {
            self.watcher.observe(index);
        }
        self.registered = count;
        tracing::debug!(count, threshold = self.config.threshold, "countup.registered");
    }

    /// Feed one intersection batch; returns the counters to start now.
    pub(crate) fn on_intersections<I>(&mut self, samples: I) -> Vec<usize>
    where
        I: IntoIterator<Item = IntersectionSample<usize>>,
    {
        self.watcher.process(samples)
    }

    /// Build the animator for counter `index` from its raw target attribute.
    ///
    /// Invalid targets are logged, counted as skipped, and returned as errors.
    pub(crate) fn start(&mut self, index: usize, raw_target: Option<&str>) -> Result<CounterRun> {
        let target = match Target::parse(raw_target) {
            Ok(target) => target,
            Err(source) => {
                let err = StartError::target(index, source);
                self.fail(index, &err);
                return Err(err);
            }
        };
        self.started += 1;
        tracing::debug!(index, value = %target, "countup.started");
        Ok(CounterRun {
            index,
            anim: self.config.animator(target),
            jitter: self.seeder.split(),
        })
    }

    /// Record a counter that failed to start. Per-counter failures (bad
    /// target, no display node) count it as skipped; anything else is only
    /// logged.
    pub(crate) fn fail(&mut self, index: usize, err: &StartError) {
        if err.is_per_counter() {
            self.skipped += 1;
            tracing::warn!(index, %err, "countup.skipped");
        } else {
            tracing::warn!(index, %err, "countup.start_failed");
        }
    }

    /// Counters still waiting to become visible.
    pub(crate) fn pending(&self) -> usize {
        self.watcher.len()
    }

    pub(crate) fn started(&self) -> usize {
        self.started
    }

    pub(crate) fn skipped(&self) -> usize {
        self.skipped
    }

    pub(crate) fn registered(&self) -> usize {
        self.registered
    }

    /// Every registered counter has fired; the observer can be disconnected.
    pub(crate) fn is_settled(&self) -> bool {
        self.watcher.is_empty()
    }
}

/// One counter's animation, owned by its frame loop.
#[derive(Debug)]
pub(crate) struct CounterRun {
    index: usize,
    anim: CountUp,
    jitter: DefaultJitter,
}

impl CounterRun {
    pub(crate) fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn step(&mut self) -> Frame {
        self.anim.step(&mut self.jitter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use countup_core::{ConfigError, NoJitter, TargetError};
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};
    use tracing::Subscriber;
    use tracing_subscriber::Layer;
    use tracing_subscriber::layer::{Context, SubscriberExt};

    fn page(count: usize) -> PageCore {
        let mut core = PageCore::new(CounterConfig::default(), 7).expect("default options are valid");
        core.register(count);
        core
    }

    fn hit(index: usize, ratio: f64) -> IntersectionSample<usize> {
        IntersectionSample::new(index, ratio > 0.0, ratio)
    }

    fn drive(run: &mut CounterRun) -> Vec<Frame> {
        let mut frames = Vec::new();
        loop {
            let frame = run.step();
            let done = frame.is_finished();
            frames.push(frame);
            if done || frames.len() > 10_000 {
                return frames;
            }
        }
    }

    #[test]
    fn page_core_rejects_invalid_options() {
        let config = CounterConfig {
            threshold: 2.0,
            ..CounterConfig::default()
        };
        let err = PageCore::new(config, 0).unwrap_err();
        assert!(matches!(
            err,
            StartError::Config(ConfigError::ThresholdOutOfRange { .. })
        ));
    }

    #[test]
    fn page_core_fires_each_counter_once() {
        let mut core = page(3);
        assert_eq!(core.registered(), 3);
        assert_eq!(core.on_intersections([hit(0, 0.4), hit(1, 0.5)]), vec![1]);
        assert_eq!(core.on_intersections([hit(1, 1.0), hit(0, 0.9)]), vec![0]);
        assert_eq!(core.pending(), 1);
        assert!(!core.is_settled());
        assert_eq!(core.on_intersections([hit(2, 0.75)]), vec![2]);
        assert!(core.is_settled());
    }

    #[test]
    fn page_core_started_counter_reaches_target() {
        let mut core = page(1);
        let mut run = core.start(0, Some("10")).expect("valid target");
        assert_eq!(run.index(), 0);
        let frames = drive(&mut run);
        assert_eq!(frames.last().map(Frame::text), Some("10"));
        assert_eq!(core.started(), 1);
    }

    #[test]
    fn page_core_zero_target_single_frame() {
        let mut core = page(1);
        let mut run = core.start(0, Some("0")).expect("valid target");
        assert_eq!(drive(&mut run), vec![Frame::Finished { text: "0".into() }]);
    }

    #[test]
    fn page_core_counters_get_independent_jitter() {
        let mut core = page(2);
        let mut a = core.start(0, Some("500")).expect("valid target");
        let mut b = core.start(1, Some("500")).expect("valid target");
        let fa: Vec<Frame> = drive(&mut a);
        let fb: Vec<Frame> = drive(&mut b);
        assert_eq!(fa.last(), fb.last());
        // Distinct seeds: the two runs almost surely differ somewhere.
        assert_ne!(fa, fb);
    }

    #[test]
    fn page_core_same_seed_replays_identically() {
        let mut first = page(1);
        let mut second = page(1);
        let fa = drive(&mut first.start(0, Some("42")).expect("valid"));
        let fb = drive(&mut second.start(0, Some("42")).expect("valid"));
        assert_eq!(fa, fb);
    }

    #[test]
    fn page_core_invalid_target_is_skipped() {
        let mut core = page(2);
        let err = core.start(0, None).unwrap_err();
        assert!(matches!(
            err,
            StartError::Target {
                index: 0,
                source: TargetError::Missing
            }
        ));
        assert!(core.start(1, Some("nope")).is_err());
        assert_eq!(core.skipped(), 2);
        assert_eq!(core.started(), 0);
    }

    #[test]
    fn page_core_counts_only_per_counter_failures_as_skipped() {
        let mut core = page(3);
        core.fail(
            0,
            &StartError::MissingDisplay {
                index: 0,
                selector: ".counter-count".into(),
            },
        );
        assert_eq!(core.skipped(), 1);
        core.fail(1, &StartError::NoWindow);
        core.fail(2, &StartError::Js("SyntaxError".into()));
        assert_eq!(core.skipped(), 1);
        assert_eq!(core.started(), 0);
    }

    #[test]
    fn page_core_run_without_jitter_takes_configured_frames() {
        let config = CounterConfig {
            frames_per_run: 20,
            ..CounterConfig::default()
        };
        let mut core = PageCore::new(config, 1).expect("valid options");
        core.register(1);
        assert_eq!(core.config().frames_per_run, 20);
        let mut run = core.start(0, Some("20")).expect("valid target");
        assert_eq!(run.anim.run_to_completion(&mut NoJitter, 1_000).len(), 20);
    }

    // ── Tracing ─────────────────────────────────────────────────────────

    #[derive(Default)]
    struct Captured {
        messages: Vec<String>,
    }

    struct CaptureLayer {
        state: Arc<Mutex<Captured>>,
    }

    impl<S: Subscriber> Layer<S> for CaptureLayer {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            struct Msg {
                message: Option<String>,
            }
            impl tracing::field::Visit for Msg {
                fn record_debug(
                    &mut self,
                    field: &tracing::field::Field,
                    value: &dyn std::fmt::Debug,
                ) {
                    if field.name() == "message" {
                        self.message = Some(format!("{value:?}").trim_matches('"').to_string());
                    }
                }
            }
            let mut msg = Msg { message: None };
            event.record(&mut msg);
            if let Some(message) = msg.message {
                self.state
                    .lock()
                    .expect("capture lock")
                    .messages
                    .push(message);
            }
        }
    }

    #[test]
    fn page_core_logs_lifecycle_events() {
        let state = Arc::new(Mutex::new(Captured::default()));
        let subscriber = tracing_subscriber::registry().with(CaptureLayer {
            state: Arc::clone(&state),
        });
        let _guard = tracing::subscriber::set_default(subscriber);

        let mut core = page(2);
        let _ = core.start(0, Some("3"));
        let _ = core.start(1, Some(""));
        core.fail(1, &StartError::NoWindow);

        let captured = state.lock().expect("capture lock");
        for expected in [
            "countup.registered",
            "countup.started",
            "countup.skipped",
            "countup.start_failed",
        ] {
            assert!(
                captured.messages.iter().any(|m| m == expected),
                "expected {expected} event, got: {:?}",
                captured.messages
            );
        }
    }
}
