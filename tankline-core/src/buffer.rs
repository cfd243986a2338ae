//! Fixed-Capacity Sample Window
//!
//! ## Overview
//!
//! Ring buffer of `f32` samples backing the moving average. Storage is an
//! inline array sized at compile time (`CAP`), while the *window* (how many
//! of the most recent samples count) is chosen at run time, `1..=CAP`. This
//! lets the window be reconfigured between ticks without touching the heap.
//!
//! ```text
//! SampleWindow<8> with window = 5, after 7 pushes (a..g):
//! ┌───┬───┬───┬───┬───┬───┬───┬───┐
//! │ f │ g │ c │ d │ e │ - │ - │ - │  ← physical slots 0..window
//! └───┴───┴───┴───┴───┴───┴───┴───┘
//!           ↑
//!           └── write_pos = 2 (oldest sample, next to be overwritten)
//!
//! Logical view (oldest → newest): c d e f g
//! ```
//!
//! ## Warm-up
//!
//! Until `window` samples have been pushed, only the samples seen so far are
//! stored and averaged. There is no zero padding.
//!
//! ## Thread Safety
//!
//! Not synchronised. All mutation goes through `&mut self`, and the engine
//! only ever touches a window from the scheduler's call stack.

use crate::errors::{GraphError, GraphResult};

/// Ring buffer of the last `window` samples
#[derive(Debug, Clone)]
pub struct SampleWindow<const CAP: usize> {
    data: [f32; CAP],

    /// Number of samples that count, `1..=CAP`
    window: usize,

    /// Slot the next push writes to, always `< window`
    write_pos: usize,

    /// Samples currently held, `<= window`
    len: usize,
}

impl<const CAP: usize> SampleWindow<CAP> {
    /// Create an empty window of `window` samples
    pub fn new(window: usize) -> GraphResult<Self> {
        if window == 0 || window > CAP {
            return Err(GraphError::InvalidWindow { window, max: CAP });
        }

        Ok(Self {
            data: [0.0; CAP],
            window,
            write_pos: 0,
            len: 0,
        })
    }

    /// Add a sample, overwriting the oldest once the window is full
    pub fn push(&mut self, sample: f32) {
        if self.len < self.window {
            self.len += 1;
        }

        self.data[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.window;
    }

    /// Samples currently held
    pub fn len(&self) -> usize {
        self.len
    }

    /// True before the first push
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Configured window
    pub fn window(&self) -> usize {
        self.window
    }

    /// Change the window; history is discarded
    pub fn set_window(&mut self, window: usize) -> GraphResult<()> {
        if window == 0 || window > CAP {
            return Err(GraphError::InvalidWindow { window, max: CAP });
        }

        self.window = window;
        self.clear();
        Ok(())
    }

    /// Drop all samples
    pub fn clear(&mut self) {
        self.write_pos = 0;
        self.len = 0;
    }

    /// Arithmetic mean of the held samples, `None` while empty
    pub fn mean(&self) -> Option<f32> {
        if self.is_empty() {
            return None;
        }

        // No running sum: it drifts over long uptimes
        let sum: f32 = self.data[..self.len].iter().sum();
        Some(sum / self.len as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_window() {
        let window = SampleWindow::<8>::new(4).unwrap();
        assert!(window.is_empty());
        assert_eq!(window.len(), 0);
        assert!(window.mean().is_none());
    }

    #[test]
    fn rejects_bad_windows() {
        assert_eq!(
            SampleWindow::<8>::new(0).err(),
            Some(GraphError::InvalidWindow { window: 0, max: 8 })
        );
        assert!(SampleWindow::<8>::new(9).is_err());
        assert!(SampleWindow::<8>::new(8).is_ok());
    }

    #[test]
    fn evicts_oldest_once_full() {
        let mut window = SampleWindow::<8>::new(3).unwrap();

        for x in [1.0, 2.0, 3.0] {
            window.push(x);
        }
        assert_eq!(window.len(), 3);
        assert_eq!(window.mean(), Some(2.0));

        // 1 and 2 drop out
        window.push(4.0);
        window.push(5.0);
        assert_eq!(window.len(), 3);
        assert_eq!(window.mean(), Some(4.0));
    }

    #[test]
    fn mean_during_warm_up() {
        let mut window = SampleWindow::<8>::new(4).unwrap();
        window.push(10.0);
        window.push(20.0);
        assert_eq!(window.mean(), Some(15.0));
    }

    #[test]
    fn set_window_clears_history() {
        let mut window = SampleWindow::<8>::new(2).unwrap();
        window.push(1.0);
        window.push(2.0);

        window.set_window(5).unwrap();
        assert!(window.is_empty());
        assert_eq!(window.window(), 5);

        for i in 0..7 {
            window.push(i as f32);
        }
        // 2..=6
        assert_eq!(window.len(), 5);
        assert_eq!(window.mean(), Some(4.0));
    }
}
