//! Text report rendering
//!
//! Builds the multi-line block a host puts on screen after each
//! notification: a raw echo of every extra, the derived statistics and,
//! once per session, the sensor power listing.
//!
//! ```text
//! Battery (raw data)
//!   level 42
//!   ...
//!
//! Battery (additional statistics)
//!   status: discharging
//!   ...
//!   level/s -0.0001
//!   start time: 2024-03-01 09:15:00
//!   start level: 0.45
//!   depletion time: 1 hours, 10 min, 0 sec
//! ```

use alloc::string::String;
use core::fmt::{self, Write};

use chrono::{DateTime, FixedOffset, Offset, Utc};

use crate::estimator::{Remaining, StatsRecord};
use crate::labels::{self, describe};
use crate::sensors::{SensorInfo, total_power_ma};
use crate::telemetry::{BatteryTelemetry, Extras, KEY_ICON_SMALL, TrendSource};

const START_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Rendering settings fixed for a display session
#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    pub source: TrendSource,
    /// Offset the start time is shown in
    pub utc_offset: FixedOffset,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            source: TrendSource::default(),
            utc_offset: utc(),
        }
    }
}

fn utc() -> FixedOffset {
    Utc.fix()
}

/// Echo every extra as `key value`, integers only, skipping the icon key.
pub fn write_raw<W: Write>(out: &mut W, extras: &Extras) -> fmt::Result {
    writeln!(out, "Battery (raw data)")?;
    for (key, value) in extras.iter() {
        if key == KEY_ICON_SMALL {
            continue;
        }
        writeln!(out, "  {} {}", key, value.as_int())?;
    }
    Ok(())
}

/// Write the derived statistics for one observation.
pub fn write_statistics<W: Write>(
    out: &mut W,
    telemetry: &BatteryTelemetry,
    record: &StatsRecord,
    options: &ReportOptions,
) -> fmt::Result {
    let unit = options.source.unit();

    writeln!(out, "Battery (additional statistics)")?;
    writeln!(out, "  status: {}", describe(telemetry.status, labels::STATUS))?;
    writeln!(out, "  health: {}", describe(telemetry.health, labels::HEALTH))?;
    writeln!(
        out,
        "  plugged: {}",
        describe(telemetry.plugged.into(), labels::PLUGGED)
    )?;
    writeln!(
        out,
        "  temperature: {:.1} C",
        telemetry.temperature_celsius()
    )?;
    writeln!(out, "  {}/s {}", unit, record.rate)?;

    if let Some(discharge) = &record.discharge {
        writeln!(
            out,
            "  start time: {}",
            format_timestamp(discharge.start_time, options.utc_offset)
        )?;
        writeln!(out, "  start {}: {}", unit, discharge.start_level)?;

        match discharge.remaining.breakdown() {
            Some(time) => writeln!(out, "  depletion time: {}", time)?,
            None => writeln!(out, "  depletion time: unknown")?,
        }
    }
    Ok(())
}

/// List each sensor as `name: power mA`, followed by the total draw.
pub fn write_sensors<W: Write>(out: &mut W, sensors: &[SensorInfo]) -> fmt::Result {
    writeln!(out, "Sensors consumption")?;
    for sensor in sensors {
        writeln!(out, "  {}: {}mA", sensor.name, sensor.power_ma)?;
    }
    writeln!(out, "  total: {}mA", total_power_ma(sensors))
}

/// Full battery block: raw echo, a blank line, then statistics.
pub fn render(
    extras: &Extras,
    telemetry: &BatteryTelemetry,
    record: &StatsRecord,
    options: &ReportOptions,
) -> String {
    let mut out = String::new();
    // Writing into a String is infallible
    let _ = write_raw(&mut out, extras)
        .and_then(|_| writeln!(out))
        .and_then(|_| write_statistics(&mut out, telemetry, record, options));
    out
}

pub fn render_sensors(sensors: &[SensorInfo]) -> String {
    let mut out = String::new();
    let _ = write_sensors(&mut out, sensors);
    out
}

/// Short one-line summary, used for log output
pub fn summary(record: &StatsRecord, source: TrendSource) -> String {
    let mut out = String::new();
    let _ = match record.discharge.map(|d| d.remaining) {
        Some(Remaining::Estimated { seconds }) => write!(
            out,
            "{}/s {} (empty in {})",
            source.unit(),
            record.rate,
            crate::estimator::RemainingTime::from_seconds(seconds)
        ),
        Some(Remaining::Indeterminate) => {
            write!(out, "{}/s {} (evaluating)", source.unit(), record.rate)
        }
        None => write!(out, "{}/s {} (plugged)", source.unit(), record.rate),
    };
    out
}

/// Format epoch milliseconds in the given offset, falling back to the raw
/// number when it is out of chrono's range.
pub fn format_timestamp(millis: i64, offset: FixedOffset) -> String {
    let mut out = String::new();
    let _ = match DateTime::from_timestamp_millis(millis) {
        Some(time) => write!(
            out,
            "{}",
            time.with_timezone(&offset).format(START_TIME_FORMAT)
        ),
        None => write!(out, "{}", millis),
    };
    out
}
