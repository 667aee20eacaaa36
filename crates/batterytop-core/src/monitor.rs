//! Receiver for battery telemetry notifications
//!
//! [`BatteryMonitor`] plays the role of a broadcast receiver bound to one
//! display session: it owns the [`EstimatorState`] for as long as the
//! session lives, turns every delivered [`Extras`] bag into a
//! [`StatsRecord`], and renders the text block for the screen. Dropping the
//! monitor discards the baseline; nothing is persisted.
//!
//! Deliveries are processed synchronously and to completion, one at a time.

use alloc::string::String;

use log::{debug, info};

use crate::estimator::{EstimatorState, StatsRecord, initialize, observe};
use crate::report::{self, ReportOptions};
use crate::telemetry::{BatteryTelemetry, Extras, TrendSource};

/// Everything produced for one delivered notification
#[derive(Debug, Clone)]
pub struct Observation {
    pub telemetry: BatteryTelemetry,
    pub record: StatsRecord,
    /// Rendered battery block, ready for display
    pub text: String,
}

pub struct BatteryMonitor {
    state: EstimatorState,
    options: ReportOptions,
    deliveries: u64,
    last_record: Option<StatsRecord>,
}

impl BatteryMonitor {
    pub fn new(options: ReportOptions) -> Self {
        info!("Battery monitor tracking {}", options.source.unit());
        Self {
            state: initialize(),
            options,
            deliveries: 0,
            last_record: None,
        }
    }

    /// Handle one telemetry notification received at `now_ms`.
    pub fn on_receive(&mut self, extras: &Extras, now_ms: i64) -> Observation {
        let telemetry = BatteryTelemetry::from_extras(extras);
        let sample = telemetry.sample(self.options.source, now_ms);

        let (state, record) = observe(self.state, sample);
        self.state = state;
        self.deliveries += 1;
        self.last_record = Some(record);

        debug!(
            "Delivery {}: {}",
            self.deliveries,
            report::summary(&record, self.options.source)
        );

        let text = report::render(extras, &telemetry, &record, &self.options);
        Observation {
            telemetry,
            record,
            text,
        }
    }

    pub fn state(&self) -> &EstimatorState {
        &self.state
    }

    pub fn source(&self) -> TrendSource {
        self.options.source
    }

    /// Number of notifications handled so far
    pub fn deliveries(&self) -> u64 {
        self.deliveries
    }

    pub fn last_record(&self) -> Option<&StatsRecord> {
        self.last_record.as_ref()
    }
}

impl Default for BatteryMonitor {
    fn default() -> Self {
        Self::new(ReportOptions::default())
    }
}
