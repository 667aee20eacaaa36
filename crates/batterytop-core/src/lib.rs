//! Platform-independent core library for batterytop
//!
//! This crate contains all host-agnostic logic of the battery monitor: the
//! trend estimator, telemetry extraction from a notification's extras,
//! the status/health/plug label tables, sensor listings and the text
//! report rendered for display.
//!
//! It is `#![no_std]` with `extern crate alloc` so the same logic runs
//! behind the Linux sysfs host, the desktop simulator and the unit tests.

#![no_std]

extern crate alloc;

pub mod estimator;
pub mod labels;
pub mod monitor;
pub mod report;
pub mod sensors;
pub mod telemetry;

pub use estimator::{
    DischargeStats, EstimatorState, Remaining, RemainingTime, Sample, StatsRecord, initialize,
    observe,
};
pub use monitor::{BatteryMonitor, Observation};
pub use telemetry::{BatteryTelemetry, ExtraValue, Extras, TrendSource};
