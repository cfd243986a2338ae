//! Calibration and transform parameters
//!
//! Everything here is plain data, supplied once when the graph is built or
//! between ticks through [`Scheduler::configure`]. With the `serde` feature
//! the types can be read straight from a configuration file.
//!
//! ## Level calibration
//!
//! An ultrasonic sensor under the tank reports the liquid height in mm. The
//! reading at an empty tank (`empty_value`) and at a full tank
//! (`full_value`) define a straight line onto the target range, by default
//! 0–100 %:
//!
//! ```text
//! divisor    = (full_value - empty_value) / (target_max - target_min)
//! multiplier = 1 / divisor
//! offset     = target_max - full_value * multiplier
//! ```
//!
//! [`Scheduler::configure`]: crate::scheduler::Scheduler::configure

use crate::constants::buffers::MAX_WINDOW;
use crate::errors::ConfigError;
use crate::transforms::Linear;

/// Reference values mapping raw sensor units onto a target range
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LinearCalibration {
    /// Raw reading at an empty tank
    pub empty_value: f32,
    /// Raw reading at a full tank
    pub full_value: f32,
    /// Output at `empty_value`
    pub target_min: f32,
    /// Output at `full_value`
    pub target_max: f32,
}

impl LinearCalibration {
    /// Map `empty_value..full_value` onto 0–100 %
    pub const fn percent(empty_value: f32, full_value: f32) -> Self {
        Self {
            empty_value,
            full_value,
            target_min: 0.0,
            target_max: 100.0,
        }
    }

    /// Map `empty_value..full_value` onto 0–1 (Signal K ratio)
    pub const fn ratio(empty_value: f32, full_value: f32) -> Self {
        Self {
            empty_value,
            full_value,
            target_min: 0.0,
            target_max: 1.0,
        }
    }

    /// Compute the affine transform for these reference values
    pub fn derive(&self) -> Result<Linear, ConfigError> {
        finite("empty_value", self.empty_value)?;
        finite("full_value", self.full_value)?;
        finite("target_min", self.target_min)?;
        finite("target_max", self.target_max)?;

        let range = self.full_value - self.empty_value;
        if range == 0.0 {
            return Err(ConfigError::DegenerateRange);
        }

        let span = self.target_max - self.target_min;
        if span == 0.0 {
            return Err(ConfigError::DegenerateTarget);
        }

        let divisor = range / span;
        let multiplier = 1.0 / divisor;
        let offset = self.target_max - self.full_value * multiplier;

        Ok(Linear::new(multiplier, offset))
    }
}

impl Default for LinearCalibration {
    fn default() -> Self {
        Self::percent(0.0, 1000.0)
    }
}

/// New parameters for a transform addressed by path
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum TransformConfig {
    /// Replace slope and intercept
    Linear {
        /// Slope
        multiplier: f32,
        /// Intercept
        offset: f32,
    },
    /// Replace window and output scale
    MovingAverage {
        /// Samples averaged, `1..=MAX_WINDOW`
        window: usize,
        /// Output multiplier
        scale: f32,
    },
}

impl TransformConfig {
    /// Check the parameters before they reach a node
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            TransformConfig::Linear { multiplier, offset } => {
                finite("multiplier", multiplier)?;
                finite("offset", offset)
            }
            TransformConfig::MovingAverage { window, scale } => {
                if window == 0 || window > MAX_WINDOW {
                    return Err(ConfigError::InvalidWindow { window, max: MAX_WINDOW });
                }
                finite("scale", scale)
            }
        }
    }
}

impl From<Linear> for TransformConfig {
    fn from(linear: Linear) -> Self {
        TransformConfig::Linear {
            multiplier: linear.multiplier(),
            offset: linear.offset(),
        }
    }
}

fn finite(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { name })
    }
}
