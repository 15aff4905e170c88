//! Navigation events and listener registry
//!
//! The path follower reports what the agent did during a tick as a list of
//! [`NavEvent`]s. Consumers hook in two ways:
//!
//! - **Listeners**: callbacks registered on [`EventListeners`] run
//!   synchronously as soon as the navigator has produced the events.
//! - **Queue**: the double-buffered [`EventQueue`] makes a frame's events
//!   readable during the next frame, for systems that poll.
//!
//! # Example
//!
//! ```ignore
//! let id = navigator.listeners_mut().subscribe(|event| {
//!     if matches!(event, NavEvent::MovedLeft) {
//!         sprite.flip_x(true);
//!     }
//! });
//!
//! // On disable, tear down symmetrically
//! navigator.listeners_mut().unsubscribe(id);
//! ```

use std::collections::VecDeque;

// ============================================================================
// Event Types
// ============================================================================

/// Events emitted while an agent follows a path.
///
/// Direction events are edge-triggered: they fire when the agent starts
/// moving in a new direction, not on every tick spent moving that way.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NavEvent {
    // -------------------------------------------------------------------------
    // Motion
    // -------------------------------------------------------------------------
    /// Position started changing after standing still.
    StartMove,
    /// Position stopped changing.
    EndMove,

    // -------------------------------------------------------------------------
    // Direction
    // -------------------------------------------------------------------------
    /// Horizontal motion turned towards -x.
    MovedLeft,
    /// Horizontal motion turned towards +x.
    MovedRight,
    /// Paired with [`NavEvent::MovedLeft`] / [`NavEvent::MovedRight`].
    ChangedHorizontalSide,
    /// Vertical motion turned towards +y.
    MovedUp,
    /// Vertical motion turned towards -y.
    MovedDown,
    /// Paired with [`NavEvent::MovedUp`] / [`NavEvent::MovedDown`].
    ChangedVerticalSide,

    // -------------------------------------------------------------------------
    // Path progress
    // -------------------------------------------------------------------------
    /// A new path replaced the active one.
    PathAssigned {
        /// Number of waypoints in the new path
        waypoints: usize,
    },
    /// The waypoint at `index` was reached and the follower moved on.
    WaypointReached {
        /// Index of the reached waypoint
        index: usize,
    },
    /// The last waypoint was reached; the follower is idle.
    PathCompleted,
}

impl NavEvent {
    /// Whether this event reports a reversal of horizontal or vertical motion.
    #[must_use]
    pub fn is_direction_change(&self) -> bool {
        matches!(
            self,
            Self::ChangedHorizontalSide | Self::ChangedVerticalSide
        )
    }
}

// ============================================================================
// Listener Registry
// ============================================================================

/// Handle returned by [`EventListeners::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Callback = Box<dyn FnMut(&NavEvent)>;

/// Explicit observer registry.
///
/// Every `subscribe` must be paired with an `unsubscribe` when the
/// consumer goes away; nothing is removed implicitly.
#[derive(Default)]
pub struct EventListeners {
    listeners: Vec<(ListenerId, Callback)>,
    next_id: u64,
}

impl EventListeners {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback invoked for every dispatched event.
    pub fn subscribe(&mut self, callback: impl FnMut(&NavEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(callback)));
        id
    }

    /// Remove a callback. Returns `false` if the id was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener, _)| *listener != id);
        self.listeners.len() != before
    }

    /// Invoke every listener, in subscription order.
    pub fn dispatch(&mut self, event: &NavEvent) {
        for (_, callback) in &mut self.listeners {
            callback(event);
        }
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Check if no listener is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl std::fmt::Debug for EventListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventListeners")
            .field("count", &self.listeners.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

// ============================================================================
// Event Queue
// ============================================================================

/// Double-buffered event queue for frame-consistent event processing.
///
/// Events pushed during frame N are available for reading during frame N+1.
#[derive(Debug)]
pub struct EventQueue {
    /// Events being written this frame
    pending: VecDeque<NavEvent>,
    /// Events from previous frame, ready for processing
    processing: VecDeque<NavEvent>,
}

impl EventQueue {
    /// Default initial capacity for event queues.
    const DEFAULT_CAPACITY: usize = 16;

    /// Create a new event queue with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create a new event queue with specified initial capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: VecDeque::with_capacity(capacity),
            processing: VecDeque::with_capacity(capacity),
        }
    }

    /// Push an event to be processed next frame.
    #[inline]
    pub fn push(&mut self, event: NavEvent) {
        self.pending.push_back(event);
    }

    /// Swap the pending and processing queues.
    ///
    /// Call this once per frame. Afterwards `iter()` returns the events
    /// pushed during the previous frame.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.pending, &mut self.processing);
        self.pending.clear();
    }

    /// Iterate over events from the previous frame.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &NavEvent> {
        self.processing.iter()
    }

    /// Drain all events from the previous frame.
    #[inline]
    pub fn drain(&mut self) -> impl Iterator<Item = NavEvent> + '_ {
        self.processing.drain(..)
    }

    /// Check if there are any events to process.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.processing.is_empty()
    }

    /// Get the number of events ready for processing.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.processing.len()
    }

    /// Get the number of events pending for next frame.
    #[must_use]
    #[inline]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Clear all events (both pending and processing).
    pub fn clear(&mut self) {
        self.pending.clear();
        self.processing.clear();
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
