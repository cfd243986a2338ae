//! Pipeline wiring for one tank
//!
//! ```text
//! level  ──► Linear ──► MovingAverage ──► tanks.fuel.currentLevel
//! status ──► Lambda(code == 1) ─────────► tanks.fuel.sensorStatus
//! uptime ──────────────────────────────► sensorDevice.<hostname>.uptime (whole seconds)
//! ```
//!
//! The level and status producers poll the same driver; the uptime producer
//! reads its own clock. Each chain is independent, so a failing sensor
//! changes the values published but never the shape of the graph.

use anyhow::{Context, Result};
use log::info;
use tankline_connectors::config_path;
use tankline_core::constants::MS_PER_SECOND;
use tankline_core::{
    Application, Chain, FailurePolicy, Lambda, MovingAverage, Node, Producer, Sink,
    TelemetryOutput, TimeSource, Value,
};

use crate::config::AppConfig;
use crate::driver::{LevelSensor, SharedSensor, STATUS_OK};

/// Configuration path leaf of the linear transform
pub const LINEAR_LEAF: &str = "linear";

/// Configuration path leaf of the moving average
pub const SAMPLES_LEAF: &str = "samples";

/// Signal K path for the uptime of `hostname`
///
/// The hostname becomes a single path segment: every character outside
/// `[A-Za-z0-9_-]` is replaced by `-`.
pub fn uptime_path(hostname: &str) -> String {
    let segment: String = hostname
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '-' })
        .collect();
    format!("sensorDevice.{segment}.uptime")
}

/// Sensor → linear calibration → moving average → level sink
pub fn level_producer<S>(config: &AppConfig, sensor: SharedSensor<S>) -> Result<Producer>
where
    S: LevelSensor + 'static,
{
    let level = &config.level;
    let linear = level
        .calibration
        .derive()
        .context("invalid level calibration")?;

    let chain = Chain::new()
        .then(Node::linear(linear).with_path(&config_path(&level.path, LINEAR_LEAF))?)
        .then(
            Node::moving_average(MovingAverage::new(level.samples, level.scale)?)
                .with_path(&config_path(&level.path, SAMPLES_LEAF))?,
        )
        .then(Node::sink(Sink::float(&level.path)?))
        .build()?;

    let producer = Producer::float("level", move || sensor.borrow_mut().read_level())
        .with_failure_policy(FailurePolicy::Sentinel(Value::Float(level.failure_value)))
        .connect(chain)?;

    Ok(producer)
}

/// Status code → `code == 1` → status sink
pub fn status_producer<S>(config: &AppConfig, sensor: SharedSensor<S>) -> Result<Producer>
where
    S: LevelSensor + 'static,
{
    let chain = Chain::new()
        .then(Node::lambda(Lambda::new(|code: i32| code == STATUS_OK)))
        .then(Node::sink(Sink::bool(&config.status.path)?))
        .build()?;

    let producer = Producer::int("status", move || Ok(sensor.borrow().status()))
        .with_failure_policy(FailurePolicy::Sentinel(Value::Int(0)))
        .connect(chain)?;

    Ok(producer)
}

/// Whole seconds since `clock` started → uptime sink
pub fn uptime_producer<T>(hostname: &str, clock: T) -> Result<Producer>
where
    T: TimeSource + 'static,
{
    let sink = Sink::int(&uptime_path(hostname))
        .with_context(|| format!("hostname {hostname:?} does not fit an uptime path"))?;

    // Integer division keeps the count exact for the life of the device
    let producer = Producer::int("uptime", move || {
        let seconds = clock.now() / MS_PER_SECOND;
        Ok(i32::try_from(seconds).unwrap_or(i32::MAX))
    })
    .connect(Node::sink(sink))?;

    Ok(producer)
}

/// Register every enabled chain with `app`
pub fn register<C, O, S, T>(
    app: &mut Application<C, O>,
    config: &AppConfig,
    hostname: &str,
    sensor: SharedSensor<S>,
    uptime_clock: T,
) -> Result<()>
where
    C: TimeSource,
    O: TelemetryOutput,
    S: LevelSensor + 'static,
    T: TimeSource + 'static,
{
    app.register(level_producer(config, sensor.clone())?, config.level.interval_ms)?;
    info!(
        "Level on {} every {} ms",
        config.level.path, config.level.interval_ms
    );

    if config.status.enabled {
        app.register(status_producer(config, sensor)?, config.status.interval_ms)?;
        info!(
            "Status on {} every {} ms",
            config.status.path, config.status.interval_ms
        );
    }

    if config.uptime.enabled {
        app.register(uptime_producer(hostname, uptime_clock)?, config.uptime.interval_ms)?;
        info!("Uptime on {}", uptime_path(hostname));
    }

    Ok(())
}
