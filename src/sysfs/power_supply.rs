use std::path::{Path, PathBuf};

use batterytop_core::Extras;
use batterytop_core::labels::{
    HEALTH_COLD, HEALTH_DEAD, HEALTH_GOOD, HEALTH_OVER_VOLTAGE, HEALTH_OVERHEAT, HEALTH_UNKNOWN,
    HEALTH_UNSPECIFIED_FAILURE, PLUGGED_AC, PLUGGED_NONE, PLUGGED_USB, PLUGGED_WIRELESS,
    STATUS_CHARGING, STATUS_DISCHARGING, STATUS_FULL, STATUS_NOT_CHARGING, STATUS_UNKNOWN,
};
use batterytop_core::telemetry::{
    KEY_HEALTH, KEY_LEVEL, KEY_PLUGGED, KEY_SCALE, KEY_STATUS, KEY_TEMPERATURE, KEY_VOLTAGE,
};
use log::{debug, warn};

use super::{read_attribute, sorted_entries};
use crate::app_state::AppError;

const UEVENT_PREFIX: &str = "POWER_SUPPLY_";

/// sysfs reports capacity as a percentage
const CAPACITY_SCALE: i64 = 100;

/// Microvolts per millivolt
const UV_PER_MV: i64 = 1000;

/// Reads one battery's telemetry from its power-supply directory
#[derive(Debug, Clone)]
pub struct BatteryReader {
    root: PathBuf,
    battery: PathBuf,
}

impl BatteryReader {
    /// Pick `preferred` under `root`, or the first supply of type `Battery`.
    pub fn discover(root: &Path, preferred: Option<&str>) -> Result<Self, AppError> {
        let battery = match preferred {
            Some(name) => {
                let dir = root.join(name);
                if !dir.join("uevent").is_file() {
                    return Err(AppError::NoBattery(dir));
                }
                dir
            }
            None => sorted_entries(root)?
                .into_iter()
                .find(|dir| supply_type(dir).as_deref() == Some("Battery"))
                .ok_or_else(|| AppError::NoBattery(root.to_path_buf()))?,
        };

        Ok(Self {
            root: root.to_path_buf(),
            battery,
        })
    }

    pub fn path(&self) -> &Path {
        &self.battery
    }

    /// One delivery: the battery uevent plus the current plugged state.
    pub fn read_extras(&self) -> Result<Extras, AppError> {
        let uevent = read_attribute(&self.battery.join("uevent"))?;
        let plugged = plugged_state(&self.root);
        Ok(translate_uevent(&parse_uevent(&uevent), plugged))
    }
}

fn supply_type(dir: &Path) -> Option<String> {
    read_attribute(&dir.join("type")).ok()
}

/// Split `KEY=VALUE` lines, dropping the `POWER_SUPPLY_` prefix.
pub fn parse_uevent(text: &str) -> Vec<(String, String)> {
    text.lines()
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let key = key.trim();
            let key = key.strip_prefix(UEVENT_PREFIX).unwrap_or(key);
            (key.to_string(), value.trim().to_string())
        })
        .collect()
}

/// Charging source code from the external supplies under `root`.
///
/// The first online supply wins; unreadable supplies are skipped.
pub fn plugged_state(root: &Path) -> i32 {
    let supplies = match sorted_entries(root) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Cannot list power supplies: {}", e);
            return PLUGGED_NONE;
        }
    };

    for dir in supplies {
        let code = match supply_type(&dir).as_deref() {
            Some("Mains") => PLUGGED_AC,
            Some("USB") => PLUGGED_USB,
            Some("Wireless") => PLUGGED_WIRELESS,
            _ => continue,
        };
        match read_attribute(&dir.join("online")) {
            Ok(online) if online == "1" => return code,
            Ok(_) => {}
            Err(e) => warn!("Skipping supply {:?}: {}", dir, e),
        }
    }
    PLUGGED_NONE
}

fn status_code(status: &str) -> i64 {
    match status {
        "Charging" => STATUS_CHARGING,
        "Discharging" => STATUS_DISCHARGING,
        "Not charging" => STATUS_NOT_CHARGING,
        "Full" => STATUS_FULL,
        _ => STATUS_UNKNOWN,
    }
}

fn health_code(health: &str) -> i64 {
    match health {
        "Good" => HEALTH_GOOD,
        "Overheat" => HEALTH_OVERHEAT,
        "Dead" => HEALTH_DEAD,
        "Over voltage" => HEALTH_OVER_VOLTAGE,
        "Unspecified failure" => HEALTH_UNSPECIFIED_FAILURE,
        "Cold" => HEALTH_COLD,
        _ => HEALTH_UNKNOWN,
    }
}

/// Translate parsed uevent pairs into battery extras.
///
/// Known attributes are mapped onto the keys the monitor interprets; the
/// remaining numeric attributes are passed through under their lowercased
/// names. Non-numeric attributes other than the technology are dropped.
pub fn translate_uevent(pairs: &[(String, String)], plugged: i32) -> Extras {
    let value_of = |key: &str| {
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    };
    let int_of = |key: &str| value_of(key).and_then(|v| v.parse::<i64>().ok()).unwrap_or(0);

    let mut extras = Extras::new();
    extras.insert(KEY_STATUS, status_code(value_of("STATUS").unwrap_or("")));
    extras.insert(KEY_HEALTH, health_code(value_of("HEALTH").unwrap_or("")));
    extras.insert("present", int_of("PRESENT"));
    extras.insert(KEY_LEVEL, int_of("CAPACITY"));
    extras.insert(KEY_SCALE, CAPACITY_SCALE);
    extras.insert(KEY_PLUGGED, plugged);
    extras.insert(KEY_VOLTAGE, int_of("VOLTAGE_NOW") / UV_PER_MV);
    extras.insert(KEY_TEMPERATURE, int_of("TEMP"));
    if let Some(technology) = value_of("TECHNOLOGY") {
        extras.insert("technology", technology);
    }

    const MAPPED: [&str; 8] = [
        "STATUS",
        "HEALTH",
        "PRESENT",
        "CAPACITY",
        "VOLTAGE_NOW",
        "TEMP",
        "TECHNOLOGY",
        "NAME",
    ];
    for (key, value) in pairs {
        if MAPPED.contains(&key.as_str()) {
            continue;
        }
        match value.parse::<i64>() {
            Ok(number) => extras.insert(key.to_lowercase(), number),
            Err(_) => debug!("Dropping non-numeric attribute {}={}", key, value),
        }
    }
    extras
}
