//! Application-wide state and error types for the batterytop host

use std::path::PathBuf;

use batterytop_core::report::{self, ReportOptions};
use batterytop_core::sensors::{SensorInfo, SensorSource};
use batterytop_core::{BatteryMonitor, BatteryTelemetry, Observation, StatsRecord};
use chrono::FixedOffset;
use log::{info, warn};
use serde::Serialize;
use thiserror_no_std::Error;

use crate::config::{Config, OutputMode};
use crate::sysfs::{BatteryReader, HwmonSensors};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config {path:?}: {details}")]
    Config { path: PathBuf, details: String },
    #[error("No battery found under {0:?}")]
    NoBattery(PathBuf),
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// One JSON output line
#[derive(Serialize)]
struct JsonFrame<'a> {
    timestamp: i64,
    telemetry: &'a BatteryTelemetry,
    stats: &'a StatsRecord,
}

/// Main application state container
///
/// Holds the battery reader, the monitor that owns the estimator state for
/// this session, and the sensor listing captured once at startup.
pub struct AppState {
    config: Config,
    battery: BatteryReader,
    monitor: BatteryMonitor,
    sensors: Vec<SensorInfo>,
}

impl AppState {
    /// Discover the battery and query sensors once.
    pub fn new(config: Config, utc_offset: FixedOffset) -> Result<Self, AppError> {
        let battery = BatteryReader::discover(&config.power_supply_root, config.battery.as_deref())?;
        info!("Using battery at {:?}", battery.path());

        let sensors = if config.show_sensors {
            let mut hwmon = HwmonSensors::new(&config.hwmon_root);
            hwmon.sensors().unwrap_or_else(|e| {
                warn!("Sensor listing unavailable: {}", e);
                Vec::new()
            })
        } else {
            Vec::new()
        };
        info!("Found {} sensors", sensors.len());

        let monitor = BatteryMonitor::new(ReportOptions {
            source: config.track,
            utc_offset,
        });

        Ok(Self {
            config,
            battery,
            monitor,
            sensors,
        })
    }

    pub fn monitor(&self) -> &BatteryMonitor {
        &self.monitor
    }

    pub fn sensors(&self) -> &[SensorInfo] {
        &self.sensors
    }

    /// Read the battery once and deliver it to the monitor.
    ///
    /// A failed read is logged and skipped; the estimator keeps its state
    /// and the next poll tries again.
    pub fn poll(&mut self, now_ms: i64) -> Option<Observation> {
        match self.battery.read_extras() {
            Ok(extras) => Some(self.monitor.on_receive(&extras, now_ms)),
            Err(e) => {
                warn!("Skipping delivery: {}", e);
                None
            }
        }
    }

    /// Text for one screen: battery block, then the sensor listing.
    pub fn render_frame(&self, observation: &Observation) -> String {
        let mut frame = observation.text.clone();
        if self.config.show_sensors {
            frame.push('\n');
            frame.push_str(&report::render_sensors(&self.sensors));
        }
        frame
    }

    pub fn json_frame(&self, observation: &Observation, now_ms: i64) -> Result<String, AppError> {
        let frame = JsonFrame {
            timestamp: now_ms,
            telemetry: &observation.telemetry,
            stats: &observation.record,
        };
        Ok(serde_json::to_string(&frame)?)
    }

    /// Format an observation according to the configured output mode.
    pub fn format(&self, observation: &Observation, now_ms: i64) -> Result<String, AppError> {
        match self.config.output {
            OutputMode::Text => Ok(self.render_frame(observation)),
            OutputMode::Json => self.json_frame(observation, now_ms),
        }
    }
}
