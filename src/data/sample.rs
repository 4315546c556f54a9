//! Synthetic household power readings.
//!
//! Produces a minute-level (or coarser) CSV in the same schema as the real
//! consumption dataset, so the service can be exercised without it. Values
//! follow a daily load shape plus Gaussian noise; a configurable share of
//! readings is written as `?` to mimic meter dropouts.

use std::f64::consts::PI;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::error::AppError;

pub const SAMPLE_HEADER: [&str; 9] = [
    "Date",
    "Time",
    "Global_active_power",
    "Global_reactive_power",
    "Voltage",
    "Global_intensity",
    "Sub_metering_1",
    "Sub_metering_2",
    "Sub_metering_3",
];

#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub start: NaiveDate,
    pub days: usize,
    /// Minutes between consecutive readings.
    pub step_minutes: u32,
    pub seed: u64,
    /// Probability that a reading is missing (`?` in every measurement field).
    pub missing_prob: f64,
    /// Average active power (kW).
    pub base_load_kw: f64,
    /// Peak-to-mean swing of the daily load shape (kW).
    pub daily_amplitude_kw: f64,
    /// Standard deviation of the active power noise (kW).
    pub noise_kw: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2006, 12, 16).unwrap_or_default(),
            days: 30,
            step_minutes: 1,
            seed: 42,
            missing_prob: 0.01,
            base_load_kw: 1.1,
            daily_amplitude_kw: 0.8,
            noise_kw: 0.25,
        }
    }
}

/// One meter reading.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleReading {
    pub timestamp: NaiveDateTime,
    /// `None` for a dropout.
    pub values: Option<Measurements>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Measurements {
    pub global_active_power: f64,
    pub global_reactive_power: f64,
    pub voltage: f64,
    pub global_intensity: f64,
    pub sub_metering: [u32; 3],
}

pub fn generate_sample(config: &SampleConfig) -> Result<Vec<SampleReading>, AppError> {
    if config.days == 0 {
        return Err(AppError::config("Sample days must be > 0."));
    }
    if config.step_minutes == 0 || config.step_minutes > 1440 {
        return Err(AppError::config("Sample step must be between 1 and 1440 minutes."));
    }
    if !(0.0..1.0).contains(&config.missing_prob) {
        return Err(AppError::config("Missing probability must be in [0, 1)."));
    }
    if !(config.base_load_kw.is_finite()
        && config.daily_amplitude_kw.is_finite()
        && config.noise_kw.is_finite()
        && config.base_load_kw > 0.0
        && config.daily_amplitude_kw >= 0.0
        && config.noise_kw >= 0.0)
    {
        return Err(AppError::config("Invalid load shape settings."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let noise = Normal::new(0.0, config.noise_kw)
        .map_err(|e| AppError::failed(format!("Noise distribution error: {e}")))?;
    let voltage_noise = Normal::new(0.0, 2.5)
        .map_err(|e| AppError::failed(format!("Noise distribution error: {e}")))?;

    let steps_per_day = (1440 / config.step_minutes).max(1) as usize;
    let total = steps_per_day * config.days;
    let origin = config.start.and_time(NaiveTime::MIN);

    let mut out = Vec::with_capacity(total);
    for i in 0..total {
        let timestamp = origin + Duration::minutes(i as i64 * config.step_minutes as i64);

        if rng.gen_range(0.0..1.0) < config.missing_prob {
            out.push(SampleReading {
                timestamp,
                values: None,
            });
            continue;
        }

        let shape = daily_shape(timestamp.time());
        let active = (config.base_load_kw + config.daily_amplitude_kw * shape + noise.sample(&mut rng))
            .max(0.076);
        let reactive = (0.12 + 0.05 * noise.sample(&mut rng).abs()).min(active);
        let voltage = 240.5 + voltage_noise.sample(&mut rng);
        let intensity = active * 1000.0 / voltage;

        // Sub-meters are whole watt-hours: kitchen bursts, laundry cycles,
        // and a water heater that follows the load shape.
        let kitchen = if rng.gen_range(0.0..1.0) < 0.05 { rng.gen_range(1..40) } else { 0 };
        let laundry = if rng.gen_range(0.0..1.0) < 0.1 { rng.gen_range(1..3) } else { 0 };
        let heater = if shape > 0.3 { 17 + rng.gen_range(0..2) } else { 0 };

        out.push(SampleReading {
            timestamp,
            values: Some(Measurements {
                global_active_power: active,
                global_reactive_power: reactive,
                voltage,
                global_intensity: intensity,
                sub_metering: [kitchen, laundry, heater],
            }),
        });
    }

    Ok(out)
}

/// Daily load shape in roughly `[-1, 1]`: low overnight, peak in the evening.
fn daily_shape(time: NaiveTime) -> f64 {
    let hours = time.num_seconds_from_midnight() as f64 / 3600.0;
    let evening = (-((hours - 19.5) / 2.5).powi(2)).exp();
    let morning = 0.5 * (-((hours - 8.0) / 1.5).powi(2)).exp();
    let night = (2.0 * PI * (hours - 4.0) / 24.0).cos();
    (1.6 * (evening + morning) - 0.4 * night - 0.5).clamp(-1.0, 1.0)
}

/// Write readings as CSV (day/month/year dates, `?` for dropouts).
pub fn write_sample_csv<W: Write>(writer: W, readings: &[SampleReading]) -> Result<(), AppError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(SAMPLE_HEADER)
        .map_err(|e| AppError::failed(format!("Failed to write sample header: {e}")))?;

    for r in readings {
        let date = r.timestamp.format("%-d/%-m/%Y").to_string();
        let time = r.timestamp.format("%H:%M:%S").to_string();
        let fields: Vec<String> = match &r.values {
            None => vec!["?".to_string(); 7],
            Some(m) => vec![
                format!("{:.3}", m.global_active_power),
                format!("{:.3}", m.global_reactive_power),
                format!("{:.2}", m.voltage),
                format!("{:.1}", m.global_intensity),
                m.sub_metering[0].to_string(),
                m.sub_metering[1].to_string(),
                m.sub_metering[2].to_string(),
            ],
        };
        let record = [date, time].into_iter().chain(fields);
        wtr.write_record(record)
            .map_err(|e| AppError::failed(format!("Failed to write sample row: {e}")))?;
    }

    wtr.flush()
        .map_err(|e| AppError::failed(format!("Failed to flush sample CSV: {e}")))?;
    Ok(())
}

/// Generate and write a sample file; returns the number of rows written.
pub fn write_sample_file(path: &Path, config: &SampleConfig) -> Result<usize, AppError> {
    let readings = generate_sample(config)?;
    let file = File::create(path)
        .map_err(|e| AppError::failed(format!("Failed to create sample CSV '{}': {e}", path.display())))?;
    write_sample_csv(file, &readings)?;
    Ok(readings.len())
}
