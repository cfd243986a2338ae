//! Affine scaling: `y = x * multiplier + offset`

/// Stateless affine transform
///
/// No clamping: values outside the calibrated range pass through, so a
/// sentinel such as `-1.0` stays recognisably out of range downstream.
/// Derive the parameters from reference values with
/// [`LinearCalibration`](crate::config::LinearCalibration).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Linear {
    multiplier: f32,
    offset: f32,
}

impl Linear {
    /// Transform with the given slope and intercept
    pub const fn new(multiplier: f32, offset: f32) -> Self {
        Self { multiplier, offset }
    }

    /// Identity transform
    pub const fn identity() -> Self {
        Self::new(1.0, 0.0)
    }

    /// Apply to one sample
    #[inline]
    pub fn apply(&self, x: f32) -> f32 {
        x * self.multiplier + self.offset
    }

    /// Slope
    pub fn multiplier(&self) -> f32 {
        self.multiplier
    }

    /// Intercept
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Swap parameters between ticks
    pub fn set_params(&mut self, multiplier: f32, offset: f32) {
        self.multiplier = multiplier;
        self.offset = offset;
    }
}

impl Default for Linear {
    fn default() -> Self {
        Self::identity()
    }
}
