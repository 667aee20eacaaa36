//! Linux host for batterytop
//!
//! Polls the battery through sysfs, hands every reading to the
//! platform-independent [`batterytop_core::BatteryMonitor`], and formats
//! the result for the terminal.

pub mod app_state;
pub mod config;
pub mod sysfs;

pub use app_state::{AppError, AppState};
pub use config::{Config, OutputMode};
