//! Time management for edge devices
//!
//! The scheduler only ever sees a [`Timestamp`]; where it comes from is up
//! to the [`TimeSource`] the application is built with:
//! - Monotonic counter (hardware timer, or `Instant` on hosted builds)
//! - Fixed, manually advanced clock (tests, simulations)

use core::cell::Cell;

/// Timestamp in milliseconds since an arbitrary origin (usually boot)
pub type Timestamp = u64;

/// Source of time for the scheduler
///
/// ```rust
/// use tankline_core::{TimeSource, Timestamp};
///
/// struct Systick {
///     // ... timer peripheral
/// }
///
/// impl TimeSource for Systick {
///     fn now(&self) -> Timestamp {
///         // Read the millisecond counter
///         0 // placeholder
///     }
/// }
/// ```
pub trait TimeSource {
    /// Current timestamp in milliseconds
    fn now(&self) -> Timestamp;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for alloc::rc::Rc<T> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Monotonic time source backed by `std::time::Instant`
///
/// Starts at 0 when created, always increases.
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct MonotonicTime {
    start: std::time::Instant,
}

#[cfg(feature = "std")]
impl MonotonicTime {
    /// Start counting from now
    pub fn new() -> Self {
        Self { start: std::time::Instant::now() }
    }
}

#[cfg(feature = "std")]
impl Default for MonotonicTime {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl TimeSource for MonotonicTime {
    fn now(&self) -> Timestamp {
        self.start.elapsed().as_millis() as Timestamp
    }
}

/// Manually driven clock for tests and simulations
///
/// Uses a `Cell` so the clock can be advanced through a shared reference
/// while an [`Application`](crate::app::Application) holds `&FixedTime`.
#[derive(Debug, Clone, Default)]
pub struct FixedTime {
    timestamp: Cell<Timestamp>,
}

impl FixedTime {
    /// Clock stopped at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp: Cell::new(timestamp) }
    }

    /// Jump to `timestamp`
    pub fn set(&self, timestamp: Timestamp) {
        self.timestamp.set(timestamp);
    }

    /// Move forward by `ms`
    pub fn advance(&self, ms: u64) {
        self.timestamp.set(self.timestamp.get().saturating_add(ms));
    }
}

impl TimeSource for FixedTime {
    fn now(&self) -> Timestamp {
        self.timestamp.get()
    }
}
