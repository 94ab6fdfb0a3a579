//! Event notification.
//!
//! The controller reports three conditions, each tagged with the axis id:
//! a move finished, the home switch closed, the end switch closed. Sinks are
//! called synchronously from inside the tick or command that detected the
//! condition; nothing is queued unless the sink itself queues.

use heapless::Deque;

/// Kind of axis event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AxisEventKind {
    /// The current command ended (completed, stopped or refused at a limit).
    MoveComplete,
    /// Home switch went from released to pressed.
    HomeLimit,
    /// End switch went from released to pressed.
    EndLimit,
}

/// An event tagged with the axis that raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisEvent {
    /// Identifier of the axis.
    pub axis: u8,
    /// What happened.
    pub kind: AxisEventKind,
}

/// Receiver for axis events.
///
/// All methods default to doing nothing, so a sink only overrides what it
/// cares about.
pub trait AxisEventSink {
    /// The current command ended.
    fn move_complete(&mut self, _axis: u8) {}

    /// Home switch pressed.
    fn home_limit(&mut self, _axis: u8) {}

    /// End switch pressed.
    fn end_limit(&mut self, _axis: u8) {}

    /// Dispatch a tagged event to the matching method.
    fn dispatch(&mut self, event: AxisEvent) {
        match event.kind {
            AxisEventKind::MoveComplete => self.move_complete(event.axis),
            AxisEventKind::HomeLimit => self.home_limit(event.axis),
            AxisEventKind::EndLimit => self.end_limit(event.axis),
        }
    }
}

/// Discards every event.
impl AxisEventSink for () {}

impl<S: AxisEventSink + ?Sized> AxisEventSink for &mut S {
    fn move_complete(&mut self, axis: u8) {
        (**self).move_complete(axis);
    }

    fn home_limit(&mut self, axis: u8) {
        (**self).home_limit(axis);
    }

    fn end_limit(&mut self, axis: u8) {
        (**self).end_limit(axis);
    }
}

/// Fan-out: both listeners see every event, first `A` then `B`.
impl<A: AxisEventSink, B: AxisEventSink> AxisEventSink for (A, B) {
    fn move_complete(&mut self, axis: u8) {
        self.0.move_complete(axis);
        self.1.move_complete(axis);
    }

    fn home_limit(&mut self, axis: u8) {
        self.0.home_limit(axis);
        self.1.home_limit(axis);
    }

    fn end_limit(&mut self, axis: u8) {
        self.0.end_limit(axis);
        self.1.end_limit(axis);
    }
}

/// Three independently registered callback slots.
#[derive(Debug, Clone, Copy, Default)]
pub struct Callbacks {
    move_complete: Option<fn(u8)>,
    home_limit: Option<fn(u8)>,
    end_limit: Option<fn(u8)>,
}

impl Callbacks {
    /// No callbacks registered.
    pub const fn new() -> Self {
        Self {
            move_complete: None,
            home_limit: None,
            end_limit: None,
        }
    }

    /// Register the move-complete callback.
    pub fn on_move_complete(mut self, f: fn(u8)) -> Self {
        self.move_complete = Some(f);
        self
    }

    /// Register the home-limit callback.
    pub fn on_home_limit(mut self, f: fn(u8)) -> Self {
        self.home_limit = Some(f);
        self
    }

    /// Register the end-limit callback.
    pub fn on_end_limit(mut self, f: fn(u8)) -> Self {
        self.end_limit = Some(f);
        self
    }

    /// Replace or clear the move-complete callback in place.
    pub fn set_move_complete(&mut self, f: Option<fn(u8)>) {
        self.move_complete = f;
    }

    /// Replace or clear the home-limit callback in place.
    pub fn set_home_limit(&mut self, f: Option<fn(u8)>) {
        self.home_limit = f;
    }

    /// Replace or clear the end-limit callback in place.
    pub fn set_end_limit(&mut self, f: Option<fn(u8)>) {
        self.end_limit = f;
    }
}

impl AxisEventSink for Callbacks {
    fn move_complete(&mut self, axis: u8) {
        if let Some(f) = self.move_complete {
            f(axis);
        }
    }

    fn home_limit(&mut self, axis: u8) {
        if let Some(f) = self.home_limit {
            f(axis);
        }
    }

    fn end_limit(&mut self, axis: u8) {
        if let Some(f) = self.end_limit {
            f(axis);
        }
    }
}

/// Fixed-capacity event buffer for hosts that poll instead of reacting.
///
/// When full, the oldest event is dropped to make room.
#[derive(Debug, Default)]
pub struct EventQueue<const N: usize> {
    events: Deque<AxisEvent, N>,
    dropped: u32,
}

impl<const N: usize> EventQueue<N> {
    /// Create an empty queue.
    pub const fn new() -> Self {
        Self {
            events: Deque::new(),
            dropped: 0,
        }
    }

    /// Append an event, evicting the oldest when full.
    pub fn push(&mut self, event: AxisEvent) {
        if self.events.is_full() {
            self.events.pop_front();
            self.dropped = self.dropped.saturating_add(1);
        }
        let _ = self.events.push_back(event);
    }

    /// Take the oldest event.
    pub fn pop(&mut self) -> Option<AxisEvent> {
        self.events.pop_front()
    }

    /// Number of queued events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events evicted because the queue was full.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Count queued events of one kind.
    pub fn count(&self, kind: AxisEventKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }

    /// Drop all queued events.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl<const N: usize> AxisEventSink for EventQueue<N> {
    fn move_complete(&mut self, axis: u8) {
        self.push(AxisEvent {
            axis,
            kind: AxisEventKind::MoveComplete,
        });
    }

    fn home_limit(&mut self, axis: u8) {
        self.push(AxisEvent {
            axis,
            kind: AxisEventKind::HomeLimit,
        });
    }

    fn end_limit(&mut self, axis: u8) {
        self.push(AxisEvent {
            axis,
            kind: AxisEventKind::EndLimit,
        });
    }
}
