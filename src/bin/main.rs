//! batterytop: live battery trend and sensor power-consumption monitor.
//!
//! Every poll of the battery's sysfs uevent is one telemetry delivery. The
//! report is redrawn in place after each delivery until interrupted.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use batterytop::{AppError, AppState, Config, OutputMode};
use batterytop_core::TrendSource;
use chrono::{Local, Offset};
use clap::{Parser, ValueEnum};
use log::{error, info};

/// ANSI clear screen + cursor home
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print a single report and exit
    #[arg(long)]
    once: bool,

    /// Emit one JSON object per delivery instead of the text report
    #[arg(long)]
    json: bool,

    /// Delay between deliveries in milliseconds
    #[arg(short, long)]
    interval_ms: Option<u64>,

    /// Quantity the trend follows
    #[arg(short, long, value_enum)]
    track: Option<Track>,

    /// Battery directory name under the power-supply root, e.g. BAT1
    #[arg(short, long)]
    battery: Option<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Track {
    Level,
    Voltage,
}

impl From<Track> for TrendSource {
    fn from(track: Track) -> Self {
        match track {
            Track::Level => TrendSource::Level,
            Track::Voltage => TrendSource::Voltage,
        }
    }
}

impl Args {
    fn apply(&self, config: &mut Config) {
        if self.json {
            config.output = OutputMode::Json;
        }
        if let Some(interval) = self.interval_ms.filter(|ms| *ms > 0) {
            config.poll_interval_ms = interval;
        }
        if let Some(track) = self.track {
            config.track = track.into();
        }
        if let Some(battery) = &self.battery {
            config.battery = Some(battery.clone());
        }
    }
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

fn run(args: Args) -> Result<(), AppError> {
    let mut config = Config::load(args.config.as_deref())?;
    args.apply(&mut config);
    info!("Configuration: {:?}", config);

    let interval = Duration::from_millis(config.poll_interval_ms);
    let redraw = config.output == OutputMode::Text && !args.once;
    let mut app = AppState::new(config, Local::now().offset().fix())?;

    let stdout = io::stdout();
    loop {
        let now = now_ms();
        if let Some(observation) = app.poll(now) {
            let frame = app.format(&observation, now)?;

            let mut out = stdout.lock();
            let written = if redraw {
                write!(out, "{}{}", CLEAR_SCREEN, frame)
            } else {
                writeln!(out, "{}", frame)
            };
            written
                .and_then(|_| out.flush())
                .map_err(|e| AppError::io("<stdout>", e))?;
        }

        if args.once {
            return Ok(());
        }
        thread::sleep(interval);
    }
}

fn main() -> ExitCode {
    env_logger::init();
    info!("Starting batterytop");

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("batterytop: {}", e);
            ExitCode::FAILURE
        }
    }
}
