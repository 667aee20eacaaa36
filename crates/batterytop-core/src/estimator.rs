//! Battery trend estimation
//!
//! The estimator keeps a baseline (the first observed sample) and derives a
//! signed rate of change and, while discharging, a projected time until the
//! tracked quantity reaches zero.
//!
//! The rate is always measured against the baseline, never against the
//! previous sample, so it is a cumulative average over the whole session:
//!
//! ```text
//! rate = (level - start_level) * 1000 / (timestamp - start_time)
//! ```
//!
//! State is an explicit [`EstimatorState`] value threaded through the pure
//! [`observe`] function. [`BatteryMonitor`](crate::monitor::BatteryMonitor)
//! is the owner that keeps it alive for the lifetime of a display session.

use log::debug;
use serde::Serialize;

/// Milliseconds per second, used to express the rate per second
const MS_PER_SEC: f32 = 1000.0;

/// One battery telemetry snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    /// Tracked quantity: charge fraction in [0.0, 1.0], or millivolts when
    /// tracking voltage. Not validated.
    pub level: f32,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    /// 0 when running on battery, otherwise the charging source code
    pub plugged: i32,
}

impl Sample {
    pub const fn new(level: f32, timestamp: i64, plugged: i32) -> Self {
        Self {
            level,
            timestamp,
            plugged,
        }
    }

    /// Whether the device was running on battery when this sample was taken
    pub const fn is_discharging(&self) -> bool {
        self.plugged == 0
    }
}

/// Running baseline and rate for one display session.
///
/// `start_level` and `start_time` double as a zero sentinel: while both are
/// zero the next sample becomes the baseline. Once set they never change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EstimatorState {
    pub start_level: f32,
    pub start_time: i64,
    pub last_level: f32,
    /// Level units per second, 0 until the level first moves
    pub rate: f32,
}

impl EstimatorState {
    /// Whether a baseline has been captured yet
    pub fn has_baseline(&self) -> bool {
        !(self.start_level == 0.0 && self.start_time == 0)
    }
}

/// Produce a fresh estimator state with every field at zero.
pub fn initialize() -> EstimatorState {
    EstimatorState::default()
}

/// Fold one sample into the state and return the statistics for it.
///
/// Timestamps are expected to be non-decreasing. An out-of-order sample
/// does not fail, but the rate computed from it is meaningless.
pub fn observe(state: EstimatorState, sample: Sample) -> (EstimatorState, StatsRecord) {
    let mut state = state;

    if !state.has_baseline() {
        state.start_level = sample.level;
        state.start_time = sample.timestamp;
        state.last_level = sample.level;
        debug!(
            "Baseline captured: level {} at {} ms",
            sample.level, sample.timestamp
        );
    } else if sample.level != state.last_level && sample.timestamp != state.start_time {
        let elapsed_ms = (sample.timestamp - state.start_time) as f32;
        state.rate = (sample.level - state.start_level) * MS_PER_SEC / elapsed_ms;
        state.last_level = sample.level;
        debug!("Rate updated: {}/s over {} ms", state.rate, elapsed_ms);
    }

    let discharge = sample.is_discharging().then(|| DischargeStats {
        start_level: state.start_level,
        start_time: state.start_time,
        remaining: Remaining::project(sample.level, state.rate),
    });

    (
        state,
        StatsRecord {
            rate: state.rate,
            discharge,
        },
    )
}

/// Statistics derived from one observed sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatsRecord {
    /// Cumulative rate of change since the baseline, per second
    pub rate: f32,
    /// Only present while running on battery
    pub discharge: Option<DischargeStats>,
}

/// Depletion fields reported while discharging.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DischargeStats {
    pub start_level: f32,
    pub start_time: i64,
    pub remaining: Remaining,
}

/// Projected time until the tracked quantity reaches zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Remaining {
    Estimated { seconds: f32 },
    /// The rate is zero or positive, so no depletion can be projected yet
    Indeterminate,
}

impl Remaining {
    /// Project the remaining time from the current level and rate.
    ///
    /// Only a strictly negative rate yields an estimate.
    pub fn project(level: f32, rate: f32) -> Self {
        if rate < 0.0 {
            Self::Estimated {
                seconds: level / -rate,
            }
        } else {
            Self::Indeterminate
        }
    }

    pub fn seconds(&self) -> Option<f32> {
        match self {
            Self::Estimated { seconds } => Some(*seconds),
            Self::Indeterminate => None,
        }
    }

    /// Hours/minutes/seconds breakdown, `None` when indeterminate
    pub fn breakdown(&self) -> Option<RemainingTime> {
        self.seconds().map(RemainingTime::from_seconds)
    }
}

/// Whole hours, minutes and seconds of a remaining-time estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemainingTime {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl RemainingTime {
    /// Truncate fractional seconds and split into h/m/s.
    ///
    /// Non-finite or negative inputs saturate through the float cast.
    pub fn from_seconds(seconds: f32) -> Self {
        let total = seconds as u32;
        Self {
            hours: total / 3600,
            minutes: (total % 3600) / 60,
            seconds: total % 60,
        }
    }
}

impl core::fmt::Display for RemainingTime {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} hours, {} min, {} sec",
            self.hours, self.minutes, self.seconds
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    fn baseline(level: f32, timestamp: i64) -> EstimatorState {
        observe(initialize(), Sample::new(level, timestamp, 0)).0
    }

    #[test]
    fn test_initialize_is_zeroed() {
        let state = initialize();
        assert_eq!(state.start_level, 0.0);
        assert_eq!(state.start_time, 0);
        assert_eq!(state.last_level, 0.0);
        assert_eq!(state.rate, 0.0);
        assert!(!state.has_baseline());
    }

    #[test]
    fn test_first_sample_captures_baseline() {
        let (state, record) = observe(initialize(), Sample::new(0.8, 1_700_000_000_000, 0));

        assert_eq!(state.start_level, 0.8);
        assert_eq!(state.start_time, 1_700_000_000_000);
        assert_eq!(state.last_level, 0.8);
        assert_eq!(state.rate, 0.0);
        assert_eq!(record.rate, 0.0);
    }

    #[test]
    fn test_unchanged_level_keeps_rate() {
        let state = baseline(0.8, 1_000);
        let (state, record) = observe(state, Sample::new(0.8, 61_000, 0));

        assert_eq!(state.rate, 0.0);
        assert_eq!(record.rate, 0.0);
        assert_eq!(state.start_time, 1_000);
    }

    #[test]
    fn test_rate_from_baseline() {
        let state = baseline(1.0, 0);
        // Sentinel (0.0, 0) is only matched by a fresh state; 1.0 makes it
        // a real baseline even at time zero.
        assert!(state.has_baseline());

        let (state, record) = observe(state, Sample::new(0.5, 1000, 0));
        assert_eq!(state.rate, -0.5);
        assert_eq!(record.rate, -0.5);
        assert_eq!(state.last_level, 0.5);
    }

    #[test]
    fn test_rate_is_cumulative_not_instantaneous() {
        let state = baseline(1.0, 10_000);
        let (state, _) = observe(state, Sample::new(0.9, 20_000, 0));
        assert!((state.rate - (-0.01)).abs() < 1e-6);

        // A much steeper step is still averaged against the baseline
        let (state, _) = observe(state, Sample::new(0.5, 30_000, 0));
        assert!((state.rate - (-0.025)).abs() < 1e-6);
        assert_eq!(state.start_level, 1.0);
        assert_eq!(state.start_time, 10_000);
    }

    #[test]
    fn test_same_timestamp_as_baseline_skips_update() {
        let state = baseline(1.0, 5_000);
        let (state, record) = observe(state, Sample::new(0.9, 5_000, 0));

        assert_eq!(state.rate, 0.0);
        assert_eq!(state.last_level, 1.0);
        assert!(record.rate.is_finite());
    }

    #[test]
    fn test_baseline_never_resets() {
        let mut state = baseline(0.6, 2_000);
        for (i, level) in [0.59, 0.58, 0.6, 0.57].into_iter().enumerate() {
            state = observe(state, Sample::new(level, 3_000 + i as i64 * 1000, 0)).0;
        }
        assert_eq!(state.start_level, 0.6);
        assert_eq!(state.start_time, 2_000);
    }

    #[test]
    fn test_depletion_estimate() {
        let state = baseline(1.0, 0);
        let (_, record) = observe(state, Sample::new(0.5, 1000, 0));

        let discharge = record.discharge.expect("discharging sample");
        assert_eq!(discharge.start_level, 1.0);
        assert_eq!(discharge.start_time, 0);
        assert_eq!(discharge.remaining, Remaining::Estimated { seconds: 1.0 });

        let breakdown = discharge.remaining.breakdown().unwrap();
        assert_eq!(format!("{}", breakdown), "0 hours, 0 min, 1 sec");
    }

    #[test]
    fn test_indeterminate_while_discharging_without_drop() {
        let (_, record) = observe(initialize(), Sample::new(0.7, 1_000, 0));
        assert_eq!(
            record.discharge.map(|d| d.remaining),
            Some(Remaining::Indeterminate)
        );

        // Rising level on battery: rate positive, still indeterminate
        let state = baseline(0.5, 1_000);
        let (state, record) = observe(state, Sample::new(0.6, 2_000, 0));
        assert!(state.rate > 0.0);
        assert_eq!(
            record.discharge.map(|d| d.remaining),
            Some(Remaining::Indeterminate)
        );
    }

    #[test]
    fn test_plugged_omits_depletion() {
        let state = baseline(0.5, 1_000);
        let (state, record) = observe(state, Sample::new(0.6, 11_000, 2));

        assert!(record.discharge.is_none());
        assert!((record.rate - 0.01).abs() < 1e-6);
        assert_eq!(state.last_level, 0.6);
    }

    #[test]
    fn test_increasing_timestamps_yield_finite_rate() {
        let mut state = initialize();
        let mut level = 1.0_f32;
        for i in 0..500_i64 {
            level = if i % 7 == 0 { level + 0.003 } else { level - 0.002 };
            let (next, record) = observe(state, Sample::new(level, 1_000 + i * 997, 0));
            assert!(record.rate.is_finite(), "rate not finite at step {}", i);
            state = next;
        }
    }

    #[test]
    fn test_voltage_units_pass_through() {
        let state = baseline(4200.0, 0);
        let (state, record) = observe(state, Sample::new(4100.0, 100_000, 0));

        assert_eq!(state.rate, -1.0);
        assert_eq!(
            record.discharge.unwrap().remaining,
            Remaining::Estimated { seconds: 4100.0 }
        );
    }

    #[test]
    fn test_remaining_time_breakdown() {
        let time = RemainingTime::from_seconds(3725.9);
        assert_eq!(
            time,
            RemainingTime {
                hours: 1,
                minutes: 2,
                seconds: 5
            }
        );
        assert_eq!(format!("{}", time), "1 hours, 2 min, 5 sec");
    }
}
