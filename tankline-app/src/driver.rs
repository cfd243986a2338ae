//! Level sensor drivers
//!
//! The pipeline only sees two callbacks: one returning a height in mm, one
//! returning a status code. [`LevelSensor`] is the seam a hardware driver
//! implements; [`SimulatedDs1603l`] stands in for the DS1603L ultrasonic
//! sensor when no hardware is attached.
//!
//! The level and status producers read the same device, so the driver is
//! shared through `Rc<RefCell<_>>`. Both producers run on the scheduler's
//! single call stack and never hold the borrow across a tick.

use std::cell::RefCell;
use std::rc::Rc;

use tankline_core::{SensorFault, SensorResult};

use crate::config::SimulationConfig;

/// Status code for a sensor that currently sees the liquid surface
pub const STATUS_OK: i32 = 1;

/// Status code for a sensor without a valid reading
pub const STATUS_NO_READING: i32 = 0;

/// A tank level sensor
pub trait LevelSensor {
    /// Height of the liquid surface in mm
    fn read_level(&mut self) -> SensorResult<f32>;

    /// Health code: [`STATUS_OK`] or [`STATUS_NO_READING`]
    fn status(&self) -> i32;
}

/// A driver shared between the level and status producers
pub type SharedSensor<S> = Rc<RefCell<S>>;

/// Wrap `sensor` for sharing between producers
pub fn shared<S: LevelSensor>(sensor: S) -> SharedSensor<S> {
    Rc::new(RefCell::new(sensor))
}

/// DS1603L stand-in: a fixed level with a small repeating ripple
///
/// Every `dropout_every`-th read fails with [`SensorFault::NoSignal`], the
/// way the real sensor loses its echo when the tank bottom is wet or the
/// coupling gel dries out.
#[derive(Debug, Clone)]
pub struct SimulatedDs1603l {
    level_mm: f32,
    ripple_mm: f32,
    dropout_every: u32,
    reads: u32,
    last_ok: bool,
}

impl SimulatedDs1603l {
    /// Valid range of the DS1603L, mm
    pub const RANGE_MM: (f32, f32) = (50.0, 2000.0);

    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            level_mm: config.level_mm,
            ripple_mm: config.ripple_mm,
            dropout_every: config.dropout_every,
            reads: 0,
            last_ok: false,
        }
    }

    /// Change the simulated liquid height
    pub fn set_level(&mut self, level_mm: f32) {
        self.level_mm = level_mm;
    }

    /// Reads attempted so far
    pub fn reads(&self) -> u32 {
        self.reads
    }

    fn ripple(&self) -> f32 {
        match self.reads % 4 {
            1 => self.ripple_mm,
            3 => -self.ripple_mm,
            _ => 0.0,
        }
    }
}

impl LevelSensor for SimulatedDs1603l {
    fn read_level(&mut self) -> SensorResult<f32> {
        self.reads = self.reads.wrapping_add(1);

        if self.dropout_every > 0 && self.reads % self.dropout_every == 0 {
            self.last_ok = false;
            return Err(SensorFault::NoSignal);
        }

        let reading = self.level_mm + self.ripple();
        let (min, max) = Self::RANGE_MM;
        if !(min..=max).contains(&reading) {
            self.last_ok = false;
            return Err(SensorFault::OutOfRange { value: reading });
        }

        self.last_ok = true;
        Ok(reading)
    }

    fn status(&self) -> i32 {
        if self.last_ok {
            STATUS_OK
        } else {
            STATUS_NO_READING
        }
    }
}
