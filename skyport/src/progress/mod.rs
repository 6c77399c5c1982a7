//! Per-bundle download progress tracking.
//!
//! The download transport reports raw `(downloaded, total, endpoint)`
//! events; this module turns them into per-bundle indicators. Indicator
//! creation is abstracted behind [`IndicatorFactory`] so the CLI can plug
//! in terminal progress bars while tests plug in recorders.
//!
//! The tracker owns an explicit name-to-indicator registry: an indicator
//! is created on the first event for a bundle, updated on subsequent
//! events, and finalized exactly once when the bundle's download task
//! finishes. Events that arrive after finalization are ignored rather than
//! resurrecting the indicator, and a tracker built with
//! [`ProgressTracker::disabled`] turns every call into a no-op.

use std::collections::HashMap;

use parking_lot::Mutex;

/// Path segment preceding the bundle name in transport endpoints.
const ENDPOINT_MARKER: &str = "bundles";

/// A single progress indicator bound to one bundle download.
pub trait Indicator: Send + Sync {
    /// Update the downloaded byte count.
    fn update(&self, downloaded: u64);

    /// Finalize the indicator; no further updates will arrive.
    fn finish(&self);
}

/// Creates indicators on the first progress event for a bundle.
pub trait IndicatorFactory: Send + Sync {
    /// Create an indicator initialized to `(total, downloaded)`.
    fn create(&self, name: &str, total: u64, downloaded: u64) -> Box<dyn Indicator>;
}

enum Slot {
    Active(Box<dyn Indicator>),
    Finished,
}

/// Registry of per-bundle progress indicators.
pub struct ProgressTracker {
    factory: Option<Box<dyn IndicatorFactory>>,
    slots: Mutex<HashMap<String, Slot>>,
}

impl ProgressTracker {
    /// Tracker that renders through the given factory.
    pub fn new(factory: Box<dyn IndicatorFactory>) -> Self {
        Self {
            factory: Some(factory),
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Tracker that ignores every event.
    pub fn disabled() -> Self {
        Self {
            factory: None,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Whether progress reporting is active for this run.
    pub fn is_enabled(&self) -> bool {
        self.factory.is_some()
    }

    /// Record a progress event for a bundle.
    ///
    /// The first event for a name creates its indicator; later events
    /// update it. Events for an already-finalized bundle are dropped.
    pub fn on_progress(&self, name: &str, downloaded: u64, total: u64) {
        let Some(factory) = &self.factory else {
            return;
        };
        let mut slots = self.slots.lock();
        match slots.get(name) {
            Some(Slot::Active(indicator)) => indicator.update(downloaded),
            Some(Slot::Finished) => {}
            None => {
                let indicator = factory.create(name, total, downloaded);
                slots.insert(name.to_string(), Slot::Active(indicator));
            }
        }
    }

    /// Record a progress event keyed by transport endpoint.
    ///
    /// Events whose endpoint does not identify a bundle are dropped.
    pub fn on_endpoint_progress(&self, endpoint: &str, downloaded: u64, total: u64) {
        if let Some(name) = bundle_name_from_endpoint(endpoint) {
            self.on_progress(&name, downloaded, total);
        }
    }

    /// Finalize the indicator for a bundle.
    ///
    /// Idempotent, and safe to call for bundles that never reported
    /// progress; either way later events for the name are ignored.
    pub fn on_done(&self, name: &str) {
        if self.factory.is_none() {
            return;
        }
        let mut slots = self.slots.lock();
        if let Some(Slot::Active(indicator)) = slots.insert(name.to_string(), Slot::Finished) {
            indicator.finish();
        }
    }
}

/// Derive a bundle name from a transport endpoint.
///
/// Takes the path segment following the first `bundles` segment, ignoring
/// any query or fragment: `https://host/api/bundles/app?channel=beta`
/// yields `app`. Returns `None` when no such segment exists.
pub fn bundle_name_from_endpoint(endpoint: &str) -> Option<String> {
    let path = endpoint
        .split(['?', '#'])
        .next()
        .unwrap_or(endpoint);
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    while let Some(segment) = segments.next() {
        if segment == ENDPOINT_MARKER {
            return segments.next().map(str::to_string);
        }
    }
    None
}
