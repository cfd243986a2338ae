//! Windowed mean: `y = scale * mean(last N inputs)`

use crate::buffer::SampleWindow;
use crate::constants::buffers::MAX_WINDOW;
use crate::errors::GraphResult;

/// Stateful moving average over the last `N` inputs
///
/// - During warm-up (fewer than `N` inputs seen) the output is the mean of
///   the inputs seen so far, never padded with zeros.
/// - Every input counts, sentinels included. A failed read fed in as `-1.0`
///   pulls the average down for the next `N` outputs.
///
/// ## Concurrency
///
/// Not thread-safe. It must only be invoked from the single scheduler call
/// stack that owns it; calling it from several threads is undefined by
/// contract and unsupported. `&mut self` on [`apply`](Self::apply) enforces
/// this in safe code.
#[derive(Debug, Clone)]
pub struct MovingAverage {
    samples: SampleWindow<MAX_WINDOW>,
    scale: f32,
}

impl MovingAverage {
    /// Average over `window` samples (`1..=MAX_WINDOW`), multiplied by `scale`
    pub fn new(window: usize, scale: f32) -> GraphResult<Self> {
        Ok(Self {
            samples: SampleWindow::new(window)?,
            scale,
        })
    }

    /// Push one sample and return the scaled mean
    pub fn apply(&mut self, x: f32) -> f32 {
        self.samples.push(x);
        // Never empty right after a push
        self.scale * self.samples.mean().unwrap_or(x)
    }

    /// Configured window
    pub fn window(&self) -> usize {
        self.samples.window()
    }

    /// Output multiplier
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Samples currently held
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True before the first sample
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Change the output multiplier; history is kept
    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
    }

    /// Change the window; history is discarded
    pub fn set_window(&mut self, window: usize) -> GraphResult<()> {
        self.samples.set_window(window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GraphError;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn rejects_zero_and_oversized_windows() {
        assert_eq!(
            MovingAverage::new(0, 1.0).err(),
            Some(GraphError::InvalidWindow { window: 0, max: MAX_WINDOW })
        );
        assert!(MovingAverage::new(MAX_WINDOW + 1, 1.0).is_err());
    }

    #[test]
    fn first_output_is_first_input() {
        let mut average = MovingAverage::new(10, 1.0).unwrap();
        assert_eq!(average.apply(42.0), 42.0);
    }

    #[test]
    fn no_zero_padding_during_warm_up() {
        let mut average = MovingAverage::new(4, 1.0).unwrap();
        average.apply(10.0);
        average.apply(20.0);
        assert!(close(average.apply(30.0), 20.0));
    }

    #[test]
    fn slides_after_warm_up() {
        let mut average = MovingAverage::new(3, 2.0).unwrap();
        for x in [1.0, 2.0, 3.0] {
            average.apply(x);
        }
        // window now [2, 3, 4]
        assert!(close(average.apply(4.0), 2.0 * 3.0));
        // window now [3, 4, 5]
        assert!(close(average.apply(5.0), 2.0 * 4.0));
    }

    #[test]
    fn sentinel_contributes_to_average() {
        let mut average = MovingAverage::new(4, 1.0).unwrap();
        average.apply(50.0);
        average.apply(50.0);
        average.apply(50.0);

        // (50 + 50 + 50 - 1) / 4
        assert!(close(average.apply(-1.0), 37.25));
        // (50 + 50 - 1 + 50) / 4, sentinel still inside the window
        assert!(close(average.apply(50.0), 37.25));
    }

    #[test]
    fn window_change_restarts_warm_up() {
        let mut average = MovingAverage::new(2, 1.0).unwrap();
        average.apply(100.0);
        average.apply(100.0);

        average.set_window(5).unwrap();
        assert!(average.is_empty());
        assert_eq!(average.apply(7.0), 7.0);
    }

    #[test]
    fn scale_change_keeps_history() {
        let mut average = MovingAverage::new(2, 1.0).unwrap();
        average.apply(10.0);
        average.set_scale(0.5);
        assert!(close(average.apply(20.0), 7.5));
    }

    #[cfg(feature = "std")]
    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn mean(xs: &[f32]) -> f32 {
            xs.iter().sum::<f32>() / xs.len() as f32
        }

        proptest! {
            #[test]
            fn warm_up_averages_exactly_what_was_seen(
                window in 1usize..=MAX_WINDOW,
                samples in proptest::collection::vec(-1000.0f32..1000.0, 1..MAX_WINDOW),
            ) {
                prop_assume!(samples.len() < window);

                let mut average = MovingAverage::new(window, 1.0).unwrap();
                let mut output = 0.0;
                for &x in &samples {
                    output = average.apply(x);
                }

                prop_assert!((output - mean(&samples)).abs() < 1e-2);
            }

            #[test]
            fn tracks_scaled_mean_of_last_n(
                window in 1usize..=16,
                scale in 0.1f32..10.0,
                samples in proptest::collection::vec(-1000.0f32..1000.0, 1..100),
            ) {
                let mut average = MovingAverage::new(window, scale).unwrap();

                for (i, &x) in samples.iter().enumerate() {
                    let output = average.apply(x);
                    let start = (i + 1).saturating_sub(window);
                    let expected = scale * mean(&samples[start..=i]);
                    prop_assert!(
                        (output - expected).abs() < 5e-2 + 1e-3 * expected.abs(),
                        "step {}: {} vs {}", i, output, expected
                    );
                }
            }
        }
    }
}
