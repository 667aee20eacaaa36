//! Desktop simulator for batterytop.
//!
//! Feeds synthetic battery telemetry through `batterytop-core` so the trend
//! estimator and the report can be exercised without a real battery. The
//! simulated clock runs much faster than wall time: the battery discharges
//! from full down to [`PLUG_IN_PERCENT`], then an AC adapter is plugged in
//! and it charges back up until the run ends.

use std::io::{self, Write};
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use chrono::{Offset, Utc};
use log::{info, warn};

use batterytop_core::labels::{
    HEALTH_GOOD, PLUGGED_AC, PLUGGED_NONE, STATUS_CHARGING, STATUS_DISCHARGING, STATUS_FULL,
};
use batterytop_core::report::{self, ReportOptions};
use batterytop_core::sensors::{SensorInfo, SensorSource};
use batterytop_core::telemetry::{
    KEY_HEALTH, KEY_LEVEL, KEY_PLUGGED, KEY_SCALE, KEY_STATUS, KEY_TEMPERATURE, KEY_VOLTAGE,
};
use batterytop_core::{BatteryMonitor, Extras, TrendSource};

// ---------------------------------------------------------------------------
// Simulation constants
// ---------------------------------------------------------------------------

/// Wall-clock delay between two deliveries
const FRAME_DURATION: Duration = Duration::from_millis(200);

/// Simulated time advanced per delivery
const SIM_STEP_MS: i64 = 60_000;

/// Deliveries before the simulator exits (10 simulated hours)
const SIM_TICKS: u32 = 600;

/// Percent of charge lost per simulated hour while unplugged
const DISCHARGE_PERCENT_PER_HOUR: f64 = 12.5;

/// Percent gained per simulated hour on the charger
const CHARGE_PERCENT_PER_HOUR: f64 = 40.0;

/// Level at which the simulated user plugs in
const PLUG_IN_PERCENT: f64 = 20.0;

/// Empty and full cell voltage in millivolts
const VOLTAGE_EMPTY_MV: f64 = 3300.0;
const VOLTAGE_FULL_MV: f64 = 4200.0;

const ANSI_CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

// ---------------------------------------------------------------------------
// Mock data generation
// ---------------------------------------------------------------------------

/// Generates battery extras that follow a discharge/charge cycle.
struct MockBatteryGenerator {
    /// Charge in percent, kept fractional between deliveries
    percent: f64,
    plugged: i32,
    elapsed_ms: i64,
}

impl MockBatteryGenerator {
    fn new() -> Self {
        Self {
            percent: 100.0,
            plugged: PLUGGED_NONE,
            elapsed_ms: 0,
        }
    }

    /// Advance the simulated clock and return the next notification.
    fn next_extras(&mut self, step_ms: i64) -> Extras {
        self.elapsed_ms += step_ms;
        let hours = step_ms as f64 / 3_600_000.0;

        if self.plugged == PLUGGED_NONE {
            self.percent -= DISCHARGE_PERCENT_PER_HOUR * hours;
            if self.percent <= PLUG_IN_PERCENT {
                info!("Plugging in AC at {:.1}%", self.percent);
                self.plugged = PLUGGED_AC;
            }
        } else {
            self.percent = (self.percent + CHARGE_PERCENT_PER_HOUR * hours).min(100.0);
        }

        let status = match (self.plugged, self.percent >= 100.0) {
            (PLUGGED_NONE, _) => STATUS_DISCHARGING,
            (_, true) => STATUS_FULL,
            (_, false) => STATUS_CHARGING,
        };

        let fraction = self.percent / 100.0;
        let voltage = VOLTAGE_EMPTY_MV + (VOLTAGE_FULL_MV - VOLTAGE_EMPTY_MV) * fraction;

        // Cell warms up on the charger, with a slow wobble either way
        let t = self.elapsed_ms as f64 / 60_000.0;
        let base_temperature = if self.plugged == PLUGGED_NONE { 280.0 } else { 340.0 };
        let temperature = base_temperature + 15.0 * (t / 17.0).sin();

        Extras::new()
            .with(KEY_LEVEL, self.percent.floor() as i64)
            .with(KEY_SCALE, 100_i64)
            .with(KEY_VOLTAGE, voltage as i64)
            .with(KEY_PLUGGED, self.plugged)
            .with(KEY_STATUS, status)
            .with(KEY_HEALTH, HEALTH_GOOD)
            .with(KEY_TEMPERATURE, temperature as i64)
            .with("present", 1_i64)
            .with("technology", "Li-ion")
            .with("icon-small", 17_303_457_i64)
    }
}

/// Sensor list of a typical phone, queried once like the real host does.
fn mock_sensors() -> Vec<SensorInfo> {
    vec![
        SensorInfo::new("BMI160 accelerometer", 0.18),
        SensorInfo::new("BMI160 gyroscope", 0.9),
        SensorInfo::new("AK09918 magnetometer", 1.1),
        SensorInfo::new("TMD3702V light", 0.13),
        SensorInfo::new("TMD3702V proximity", 0.13),
        SensorInfo::new("LPS22HB barometer", 0.004),
    ]
}

fn wall_clock_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    env_logger::init();
    info!("Starting batterytop simulator");
    info!(
        "{} deliveries, {} s simulated per delivery",
        SIM_TICKS,
        SIM_STEP_MS / 1000
    );

    let mut generator = MockBatteryGenerator::new();
    let mut source = mock_sensors();
    let Ok(sensors) = source.sensors();
    let sensor_block = report::render_sensors(&sensors);

    let mut monitor = BatteryMonitor::new(ReportOptions {
        source: TrendSource::Level,
        utc_offset: Utc.fix(),
    });

    let start_ms = wall_clock_ms();
    let stdout = io::stdout();

    for _ in 0..SIM_TICKS {
        let frame_start = Instant::now();

        let extras = generator.next_extras(SIM_STEP_MS);
        let observation = monitor.on_receive(&extras, start_ms + generator.elapsed_ms);
        info!(
            "{}",
            report::summary(&observation.record, monitor.source())
        );

        let mut out = stdout.lock();
        if let Err(e) = write!(
            out,
            "{}{}\n{}",
            ANSI_CLEAR_SCREEN, observation.text, sensor_block
        )
        .and_then(|_| out.flush())
        {
            warn!("Stdout closed: {}", e);
            break;
        }
        drop(out);

        // --- Frame pacing -------------------------------------------------
        let elapsed = frame_start.elapsed();
        if elapsed < FRAME_DURATION {
            thread::sleep(FRAME_DURATION - elapsed);
        }
    }

    info!("Simulator exiting after {} deliveries", monitor.deliveries());
}
