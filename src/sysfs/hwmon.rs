use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use batterytop_core::sensors::{SensorInfo, SensorSource};
use log::{debug, warn};

use super::{read_attribute, sorted_entries};
use crate::app_state::AppError;

/// First current channel, reported in milliamps
const CURRENT_INPUT: &str = "curr1_input";

/// Hardware monitors under `/sys/class/hwmon` that report a current draw
#[derive(Debug, Clone)]
pub struct HwmonSensors {
    root: PathBuf,
}

impl HwmonSensors {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn read_sensor(dir: &Path) -> Result<Option<SensorInfo>, AppError> {
        let current_path = dir.join(CURRENT_INPUT);
        if !current_path.is_file() {
            return Ok(None);
        }

        let name = read_attribute(&dir.join("name"))?;
        let raw = read_attribute(&current_path)?;
        match raw.parse::<f32>() {
            Ok(power_ma) => Ok(Some(SensorInfo::new(name, power_ma))),
            Err(_) => {
                warn!("Ignoring {:?}: unparsable current {:?}", current_path, raw);
                Ok(None)
            }
        }
    }
}

impl SensorSource for HwmonSensors {
    type Error = AppError;

    /// A missing hwmon class yields an empty list; individual unreadable
    /// monitors are skipped.
    fn sensors(&mut self) -> Result<Vec<SensorInfo>, AppError> {
        let entries = match sorted_entries(&self.root) {
            Ok(entries) => entries,
            Err(AppError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                debug!("No hwmon class at {:?}", self.root);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let mut sensors = Vec::new();
        for dir in entries {
            match Self::read_sensor(&dir) {
                Ok(Some(sensor)) => sensors.push(sensor),
                Ok(None) => {}
                Err(e) => warn!("Skipping hwmon {:?}: {}", dir, e),
            }
        }
        Ok(sensors)
    }
}
