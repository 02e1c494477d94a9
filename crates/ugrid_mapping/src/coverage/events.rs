//! Change notifications emitted while a coverage is edited.
//!
//! This module defines [`CoverageEvent`] and sinks to collect, filter, or forward to a closure
//! the events raised by an [`crate::coverage::EditSession`], the
//! [`crate::regrid::CoverageGridBinder`], and [`crate::regrid::load_bathymetry_with_events`].

/// Describes events emitted while a coverage changes.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub enum CoverageEvent {
    /// An edit session was opened.
    EditStarted {
        /// Name of the edited coverage.
        coverage: String,
        /// Label passed when the session was opened.
        label: String,
    },

    /// An edit session was closed. Sent exactly once per session, also on early return.
    EditFinished {
        coverage: String,
        label: String,
    },

    /// The argument was rebuilt as `0..count`.
    ArgumentReset { coverage: String, count: usize },

    /// A single value was assigned.
    ValueChanged {
        coverage: String,
        component: usize,
        location: usize,
    },

    /// All values of a component were replaced by one fill value.
    ComponentFilled {
        coverage: String,
        component: usize,
        count: usize,
        value: f64,
    },

    /// Interpolation produced new values for a component.
    ComponentInterpolated {
        coverage: String,
        component: usize,
        /// Number of samples passed to the engine.
        samples: usize,
        /// Number of target locations.
        targets: usize,
    },

    /// The coverage now references a different grid.
    GridRebound {
        coverage: String,
        /// Location count of the new grid for the coverage's location kind.
        location_count: usize,
    },

    /// Non-fatal diagnostic.
    Warning {
        /// Context string (e.g. coverage name).
        context: String,
        /// Human-readable message.
        message: String,
    },
}

/// Discriminant of [`CoverageEvent`], used by sinks to opt out of event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoverageEventKind {
    EditStarted,
    EditFinished,
    ArgumentReset,
    ValueChanged,
    ComponentFilled,
    ComponentInterpolated,
    GridRebound,
    Warning,
}

impl CoverageEvent {
    pub fn kind(&self) -> CoverageEventKind {
        match self {
            CoverageEvent::EditStarted { .. } => CoverageEventKind::EditStarted,
            CoverageEvent::EditFinished { .. } => CoverageEventKind::EditFinished,
            CoverageEvent::ArgumentReset { .. } => CoverageEventKind::ArgumentReset,
            CoverageEvent::ValueChanged { .. } => CoverageEventKind::ValueChanged,
            CoverageEvent::ComponentFilled { .. } => CoverageEventKind::ComponentFilled,
            CoverageEvent::ComponentInterpolated { .. } => CoverageEventKind::ComponentInterpolated,
            CoverageEvent::GridRebound { .. } => CoverageEventKind::GridRebound,
            CoverageEvent::Warning { .. } => CoverageEventKind::Warning,
        }
    }
}

/// A generic event sink that accepts [`CoverageEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: CoverageEvent);

    /// Whether events of this kind should be built and sent at all.
    fn wants(&self, _kind: CoverageEventKind) -> bool {
        true
    }
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: CoverageEvent) {}

    #[inline]
    fn wants(&self, _kind: CoverageEventKind) -> bool {
        false
    }
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F>
where
    F: FnMut(CoverageEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(CoverageEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(CoverageEvent),
{
    #[inline]
    fn send(&mut self, event: CoverageEvent) {
        (self.f)(event);
    }
}

/// An event sink that collects all events in a `Vec`.
#[derive(Default)]
pub struct VecSink {
    events: Vec<CoverageEvent>,
}

impl VecSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn into_inner(self) -> Vec<CoverageEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[CoverageEvent] {
        &self.events
    }

    /// Number of collected events of the given kind.
    pub fn count(&self, kind: CoverageEventKind) -> usize {
        self.events.iter().filter(|e| e.kind() == kind).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: CoverageEvent) {
        self.events.push(event);
    }
}

/// Forwards only the listed event kinds to an inner sink.
pub struct FilterSink<S: EventSink> {
    inner: S,
    kinds: Vec<CoverageEventKind>,
}

impl<S: EventSink> FilterSink<S> {
    pub fn new(inner: S, kinds: impl IntoIterator<Item = CoverageEventKind>) -> Self {
        Self {
            inner,
            kinds: kinds.into_iter().collect(),
        }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: EventSink> EventSink for FilterSink<S> {
    fn send(&mut self, event: CoverageEvent) {
        if self.wants(event.kind()) {
            self.inner.send(event);
        }
    }

    fn wants(&self, kind: CoverageEventKind) -> bool {
        self.kinds.contains(&kind) && self.inner.wants(kind)
    }
}
