//! Linux sysfs adapters
//!
//! `/sys/class/power_supply/<name>/uevent` is a key/value dump very close
//! to the extras a battery notification carries, so each poll reads it and
//! translates it into an [`Extras`](batterytop_core::Extras) bag.
//! `/sys/class/hwmon` provides the one-time sensor listing.

mod hwmon;
mod power_supply;

pub use hwmon::HwmonSensors;
pub use power_supply::{BatteryReader, parse_uevent, plugged_state, translate_uevent};

use std::fs;
use std::path::Path;

use crate::app_state::AppError;

/// Read a single-value attribute file, trimmed
fn read_attribute(path: &Path) -> Result<String, AppError> {
    fs::read_to_string(path)
        .map(|value| value.trim().to_string())
        .map_err(|e| AppError::io(path, e))
}

/// Sorted directory entries, so discovery order is stable across runs
fn sorted_entries(dir: &Path) -> Result<Vec<std::path::PathBuf>, AppError> {
    let mut entries = fs::read_dir(dir)
        .map_err(|e| AppError::io(dir, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect::<Vec<_>>();
    entries.sort();
    Ok(entries)
}
