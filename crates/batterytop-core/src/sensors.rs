//! Hardware sensor power-draw listing
//!
//! Sensors are queried once per session. Each entry is only a name and the
//! current it draws; the core does no further processing beyond listing
//! them in the report.

use alloc::string::String;
use alloc::vec::Vec;

use serde::Serialize;

/// One hardware sensor and its power draw
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorInfo {
    pub name: String,
    /// Milliamps
    pub power_ma: f32,
}

impl SensorInfo {
    pub fn new(name: impl Into<String>, power_ma: f32) -> Self {
        Self {
            name: name.into(),
            power_ma,
        }
    }
}

/// Trait for hosts that can enumerate hardware sensors.
pub trait SensorSource {
    /// Host-specific failure when the sensor list cannot be read at all
    type Error;

    /// Return every sensor the host knows about, in discovery order.
    fn sensors(&mut self) -> Result<Vec<SensorInfo>, Self::Error>;
}

/// Fixed sensor list, used by the simulator and in tests
impl SensorSource for Vec<SensorInfo> {
    type Error = core::convert::Infallible;

    fn sensors(&mut self) -> Result<Vec<SensorInfo>, Self::Error> {
        Ok(self.clone())
    }
}

/// Total draw of all listed sensors in milliamps
pub fn total_power_ma(sensors: &[SensorInfo]) -> f32 {
    sensors.iter().fold(0.0, |total, s| total + s.power_ma)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_fixed_source_returns_all() {
        let mut source = vec![
            SensorInfo::new("accelerometer", 0.25),
            SensorInfo::new("gyroscope", 6.1),
        ];
        let Ok(listed) = source.sensors();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[1].name, "gyroscope");
    }

    #[test]
    fn test_total_power() {
        let sensors = [
            SensorInfo::new("a", 0.5),
            SensorInfo::new("b", 1.25),
            SensorInfo::new("c", 0.0),
        ];
        assert!((total_power_ma(&sensors) - 1.75).abs() < 1e-6);
        assert_eq!(total_power_ma(&[]), 0.0);
    }
}
