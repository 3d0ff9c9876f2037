//! wasm-bindgen exports: page discovery, the intersection observer, and the
//! per-counter animation-frame loops.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use countup_core::{CounterConfig, IntersectionSample};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
};

use crate::error::{Result, StartError};
use crate::page_core::{CounterRun, PageCore};

type IntersectCallback = Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>;
type FrameCallback = Closure<dyn FnMut()>;

/// Discover and animate counters using the default options.
#[wasm_bindgen]
pub fn start() -> std::result::Result<CounterPage, JsValue> {
    Ok(CounterPage::launch(CounterConfig::default())?)
}

/// Like [`start`], with a JSON options object overriding the defaults.
#[wasm_bindgen(js_name = startWithOptions)]
pub fn start_with_options(options_json: &str) -> std::result::Result<CounterPage, JsValue> {
    let config = CounterConfig::from_json(options_json).map_err(StartError::from)?;
    Ok(CounterPage::launch(config)?)
}

/// Handle owning the page's observer. Dropping it stops watching; counters
/// already animating run to completion.
#[wasm_bindgen]
pub struct CounterPage {
    inner: Rc<RefCell<Option<Attached>>>,
}

/// Live page state, present once the document has been scanned.
struct Attached {
    core: PageCore,
    elements: Vec<Element>,
    observer: Option<IntersectionObserver>,
    _on_intersect: Option<IntersectCallback>,
}

impl Drop for Attached {
    fn drop(&mut self) {
        if let Some(observer) = &self.observer {
            observer.disconnect();
        }
    }
}

#[wasm_bindgen]
impl CounterPage {
    /// Counters still waiting to become visible.
    pub fn pending(&self) -> usize {
        self.with_core(PageCore::pending)
    }

    /// Counters whose animation has started.
    pub fn started(&self) -> usize {
        self.with_core(PageCore::started)
    }

    /// Counters skipped for a bad target or missing display node.
    pub fn skipped(&self) -> usize {
        self.with_core(PageCore::skipped)
    }

    /// Counters found on the page.
    pub fn registered(&self) -> usize {
        self.with_core(PageCore::registered)
    }

    /// Stop watching for visibility.
    pub fn disconnect(&self) {
        let _ = self.inner.borrow_mut().take();
    }
}

impl CounterPage {
    fn launch(config: CounterConfig) -> Result<Self> {
        crate::logging::install();
        config.validate()?;
        let window = web_sys::window().ok_or(StartError::NoWindow)?;
        let document = window.document().ok_or(StartError::NoDocument)?;
        check_selectors(&document, &config)?;
        let page = Self {
            inner: Rc::new(RefCell::new(None)),
        };

        if document.ready_state() == "loading" {
            let slot = Rc::downgrade(&page.inner);
            let on_ready = Closure::once_into_js(move || {
                if let Err(err) = attach(&slot, config) {
                    tracing::error!(%err, "countup.attach_failed");
                }
            });
            window
                .add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref())
                .map_err(StartError::js)?;
        } else {
            attach(&Rc::downgrade(&page.inner), config)?;
        }
        Ok(page)
    }

    fn with_core(&self, f: impl FnOnce(&PageCore) -> usize) -> usize {
        self.inner.borrow().as_ref().map_or(0, |attached| f(&attached.core))
    }
}

/// Reject selectors the browser cannot parse, before any deferral.
fn check_selectors(document: &Document, config: &CounterConfig) -> Result<()> {
    for selector in [&config.counter_selector, &config.display_selector] {
        document.query_selector(selector).map_err(StartError::js)?;
    }
    Ok(())
}

fn attach(slot: &Weak<RefCell<Option<Attached>>>, config: CounterConfig) -> Result<()> {
    let Some(inner) = slot.upgrade() else {
        // Handle dropped before the document finished parsing.
        return Ok(());
    };
    let window = web_sys::window().ok_or(StartError::NoWindow)?;
    let document = window.document().ok_or(StartError::NoDocument)?;
    let elements = discover(&document, &config.counter_selector)?;

    let mut core = PageCore::new(config, page_seed())?;
    core.register(elements.len());

    let (observer, on_intersect) = match observe(slot, &core, &elements) {
        Ok(pair) => (Some(pair.0), Some(pair.1)),
        Err(err) => {
            // Without an observer counters simply never start.
            tracing::warn!(%err, "countup.observer_unavailable");
            (None, None)
        }
    };

    *inner.borrow_mut() = Some(Attached {
        core,
        elements,
        observer,
        _on_intersect: on_intersect,
    });
    Ok(())
}

fn discover(document: &Document, selector: &str) -> Result<Vec<Element>> {
    let nodes = document
        .query_selector_all(selector)
        .map_err(StartError::js)?;
    Ok((0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect())
}

fn observe(
    slot: &Weak<RefCell<Option<Attached>>>,
    core: &PageCore,
    elements: &[Element],
) -> Result<(IntersectionObserver, IntersectCallback)> {
    let slot = slot.clone();
    let on_intersect: IntersectCallback = Closure::new(
        move |entries: js_sys::Array, observer: IntersectionObserver| {
            if let Some(inner) = slot.upgrade() {
                if let Some(attached) = inner.borrow_mut().as_mut() {
                    on_intersections(attached, &entries, &observer);
                }
            }
        },
    );

    let init = IntersectionObserverInit::new();
    init.set_threshold(&JsValue::from_f64(core.config().threshold));
    let observer =
        IntersectionObserver::new_with_options(on_intersect.as_ref().unchecked_ref(), &init)
            .map_err(StartError::js)?;
    for element in elements {
        observer.observe(element);
    }
    Ok((observer, on_intersect))
}

fn on_intersections(attached: &mut Attached, entries: &js_sys::Array, observer: &IntersectionObserver) {
    let samples: Vec<IntersectionSample<usize>> = entries
        .iter()
        .filter_map(|value| value.dyn_into::<IntersectionObserverEntry>().ok())
        .filter_map(|entry| {
            let target = entry.target();
            let index = attached.elements.iter().position(|el| *el == target)?;
            Some(IntersectionSample::new(
                index,
                entry.is_intersecting(),
                entry.intersection_ratio(),
            ))
        })
        .collect();

    for index in attached.core.on_intersections(samples) {
        let element = &attached.elements[index];
        observer.unobserve(element);
        start_counter(&mut attached.core, index, element);
    }

    if attached.core.is_settled() {
        observer.disconnect();
    }
}

fn start_counter(core: &mut PageCore, index: usize, element: &Element) {
    let config = core.config();
    let display = match element.query_selector(&config.display_selector) {
        Ok(Some(display)) => display,
        Ok(None) => {
            let err = StartError::MissingDisplay {
                index,
                selector: config.display_selector.clone(),
            };
            core.fail(index, &err);
            return;
        }
        // The selector parsed at launch; this is the browser refusing it.
        Err(err) => {
            core.fail(index, &StartError::js(err));
            return;
        }
    };
    let raw_target = element.get_attribute(&config.target_attribute);
    // Bad targets are recorded by `PageCore::start`.
    let Ok(run) = core.start(index, raw_target.as_deref()) else {
        return;
    };
    if let Err(err) = run_frames(display, run) {
        core.fail(index, &err);
    }
}

/// Run the first frame now and the rest on animation frames until finished.
fn run_frames(display: Element, mut run: CounterRun) -> Result<()> {
    let frame = run.step();
    display.set_text_content(Some(frame.text()));
    if frame.is_finished() {
        return Ok(());
    }

    let window = web_sys::window().ok_or(StartError::NoWindow)?;
    let slot: Rc<RefCell<Option<FrameCallback>>> = Rc::new(RefCell::new(None));
    let this = Rc::clone(&slot);
    let next_window = window.clone();

    *slot.borrow_mut() = Some(Closure::new(move || {
        let frame = run.step();
        display.set_text_content(Some(frame.text()));
        if frame.is_finished() {
            // Drop our own registration; ends the Rc cycle.
            let _ = this.borrow_mut().take();
            return;
        }
        let scheduled = this
            .borrow()
            .as_ref()
            .map(|cb| next_window.request_animation_frame(cb.as_ref().unchecked_ref()));
        if let Some(Err(err)) = scheduled {
            tracing::warn!(index = run.index(), err = ?err, "countup.frame_request_failed");
            let _ = this.borrow_mut().take();
        }
    }));

    if let Some(cb) = slot.borrow().as_ref() {
        window
            .request_animation_frame(cb.as_ref().unchecked_ref())
            .map_err(StartError::js)?;
    }
    Ok(())
}

/// Seed for the page's jitter stream, drawn from `Math.random()`.
fn page_seed() -> u64 {
    let hi = (js_sys::Math::random() * f64::from(u32::MAX)) as u64;
    let lo = (js_sys::Math::random() * f64::from(u32::MAX)) as u64;
    (hi << 32) | lo
}
