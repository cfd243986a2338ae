//! Fuel tank level monitor
//!
//! Reads a DS1603L ultrasonic level sensor mounted under the tank, turns
//! the height into a calibrated, smoothed percentage and publishes it to
//! Signal K together with a sensor health flag and the device uptime.
//!
//! - `config`: JSON configuration file and its defaults
//! - `driver`: the sensor seam and a simulated DS1603L
//! - `tank`: wiring of the level, status and uptime chains

pub mod config;
pub mod driver;
pub mod tank;

pub use config::AppConfig;
pub use driver::{shared, LevelSensor, SimulatedDs1603l};
