//! Battery telemetry as delivered by the host
//!
//! Each notification carries an [`Extras`] bag of key/value pairs. The core
//! only interprets a handful of keys; the rest are echoed verbatim. Reading
//! an integer from a missing key, or from a key holding text, yields `0`
//! rather than an error.

use alloc::string::String;
use alloc::vec::Vec;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::estimator::Sample;

pub const KEY_LEVEL: &str = "level";
pub const KEY_SCALE: &str = "scale";
pub const KEY_VOLTAGE: &str = "voltage";
pub const KEY_PLUGGED: &str = "plugged";
pub const KEY_STATUS: &str = "status";
pub const KEY_HEALTH: &str = "health";
pub const KEY_TEMPERATURE: &str = "temperature";

/// Never echoed in the raw listing
pub const KEY_ICON_SMALL: &str = "icon-small";

/// A single extra value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ExtraValue {
    Int(i64),
    Text(String),
}

impl ExtraValue {
    /// Integer view of the value, `0` for text
    pub fn as_int(&self) -> i64 {
        match self {
            Self::Int(value) => *value,
            Self::Text(_) => 0,
        }
    }
}

impl From<i64> for ExtraValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ExtraValue {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<&str> for ExtraValue {
    fn from(value: &str) -> Self {
        Self::Text(String::from(value))
    }
}

impl From<String> for ExtraValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Ordered key/value bag of one telemetry notification.
///
/// Keys keep their delivery order; inserting an existing key replaces its
/// value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extras {
    entries: Vec<(String, ExtraValue)>,
}

impl Extras {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ExtraValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ExtraValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ExtraValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value)
    }

    /// Integer value of `key`, defaulting to `0`
    pub fn get_int(&self, key: &str) -> i64 {
        self.get(key).map(ExtraValue::as_int).unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExtraValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<ExtraValue>> FromIterator<(K, V)> for Extras {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut extras = Self::new();
        for (key, value) in iter {
            extras.insert(key, value);
        }
        extras
    }
}

impl Serialize for Extras {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Which quantity the trend estimator follows.
///
/// The two are not numerically comparable, so a monitor tracks exactly one
/// for its whole lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendSource {
    /// Charge fraction, `level / scale`
    #[default]
    #[serde(alias = "charge_level")]
    Level,
    /// Raw battery voltage in millivolts
    Voltage,
}

impl TrendSource {
    /// Unit name used in the rendered report
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Level => "level",
            Self::Voltage => "voltage",
        }
    }
}

/// Typed view of the keys the monitor interprets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatteryTelemetry {
    pub level: i64,
    pub scale: i64,
    /// Millivolts
    pub voltage: i64,
    pub plugged: i32,
    pub status: i64,
    pub health: i64,
    /// Tenths of a degree Celsius
    pub temperature: i64,
}

impl BatteryTelemetry {
    pub fn from_extras(extras: &Extras) -> Self {
        Self {
            level: extras.get_int(KEY_LEVEL),
            scale: extras.get_int(KEY_SCALE),
            voltage: extras.get_int(KEY_VOLTAGE),
            plugged: i32::try_from(extras.get_int(KEY_PLUGGED)).unwrap_or(i32::MAX),
            status: extras.get_int(KEY_STATUS),
            health: extras.get_int(KEY_HEALTH),
            temperature: extras.get_int(KEY_TEMPERATURE),
        }
    }

    /// `level / scale`, or 0 when no scale was delivered
    pub fn charge_fraction(&self) -> f32 {
        if self.scale == 0 {
            0.0
        } else {
            self.level as f32 / self.scale as f32
        }
    }

    /// Temperature in degrees Celsius
    pub fn temperature_celsius(&self) -> f32 {
        self.temperature as f32 / 10.0
    }

    /// Build the estimator sample for the selected quantity
    pub fn sample(&self, source: TrendSource, timestamp: i64) -> Sample {
        let level = match source {
            TrendSource::Level => self.charge_fraction(),
            TrendSource::Voltage => self.voltage as f32,
        };
        Sample::new(level, timestamp, self.plugged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn discharging_extras() -> Extras {
        Extras::new()
            .with(KEY_LEVEL, 42)
            .with(KEY_SCALE, 100)
            .with(KEY_VOLTAGE, 3870)
            .with(KEY_PLUGGED, 0)
            .with(KEY_STATUS, 3)
            .with(KEY_HEALTH, 2)
            .with(KEY_TEMPERATURE, 281)
            .with("technology", "Li-ion")
    }

    #[test]
    fn test_missing_and_text_keys_default_to_zero() {
        let extras = discharging_extras();
        assert_eq!(extras.get_int("technology"), 0);
        assert_eq!(extras.get_int("does-not-exist"), 0);
        assert_eq!(extras.get_int(KEY_LEVEL), 42);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut extras = Extras::new().with("a", 1).with("b", 2);
        extras.insert("a", 7);

        let keys: Vec<&str> = extras.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(extras.get_int("a"), 7);
        assert_eq!(extras.len(), 2);
    }

    #[test]
    fn test_from_iterator_keeps_order() {
        let extras: Extras = [("z", 1_i64), ("y", 2), ("x", 3)].into_iter().collect();
        let keys: Vec<&str> = extras.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["z", "y", "x"]);
    }

    #[test]
    fn test_telemetry_from_extras() {
        let telemetry = BatteryTelemetry::from_extras(&discharging_extras());

        assert_eq!(telemetry.level, 42);
        assert_eq!(telemetry.voltage, 3870);
        assert_eq!(telemetry.status, 3);
        assert!((telemetry.charge_fraction() - 0.42).abs() < 1e-6);
        assert!((telemetry.temperature_celsius() - 28.1).abs() < 1e-4);
    }

    #[test]
    fn test_zero_scale_gives_zero_fraction() {
        let telemetry = BatteryTelemetry::from_extras(&Extras::new().with(KEY_LEVEL, 50));
        assert_eq!(telemetry.charge_fraction(), 0.0);
    }

    #[test]
    fn test_sample_units() {
        let telemetry = BatteryTelemetry::from_extras(&discharging_extras());

        let by_level = telemetry.sample(TrendSource::Level, 5_000);
        assert!((by_level.level - 0.42).abs() < 1e-6);
        assert_eq!(by_level.timestamp, 5_000);
        assert!(by_level.is_discharging());

        let by_voltage = telemetry.sample(TrendSource::Voltage, 5_000);
        assert_eq!(by_voltage.level, 3870.0);
    }

    #[test]
    fn test_missing_plugged_reads_as_discharging() {
        let telemetry = BatteryTelemetry::from_extras(&Extras::new());
        assert!(telemetry.sample(TrendSource::Level, 0).is_discharging());
    }

    #[test]
    fn test_out_of_range_plugged_saturates() {
        let extras = Extras::new().with(KEY_PLUGGED, 1_i64 << 32);
        let telemetry = BatteryTelemetry::from_extras(&extras);
        assert_eq!(telemetry.plugged, i32::MAX);
        assert!(!telemetry.sample(TrendSource::Level, 0).is_discharging());

        let extras = Extras::new().with(KEY_PLUGGED, i64::MIN);
        assert_ne!(BatteryTelemetry::from_extras(&extras).plugged, 0);
    }
}
