// Synthetic rate series for demo and test data
use crate::domain::rate::Observation;
use chrono::{NaiveDateTime, TimeDelta};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use std::f64::consts::PI;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum GeneratorError {
    #[error("sampling step must be positive, got {0}")]
    InvalidStep(TimeDelta),

    #[error("noise standard deviation must be finite and non-negative, got {0}")]
    InvalidNoise(f64),
}

/// Shape of the generated wave.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveParams {
    /// Full sine cycles over the whole range
    pub cycle_frequency: f64,
    pub amplitude: f64,
    /// Mean of the gaussian noise, i.e. the level the wave oscillates around
    pub mean: f64,
    pub std: f64,
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            cycle_frequency: 2.0,
            amplitude: 1.0,
            mean: 3.0,
            std: 0.1,
        }
    }
}

pub fn hourly() -> TimeDelta {
    TimeDelta::hours(1)
}

/// Samples `|amplitude * sin(2π * cycle_frequency * i / n) + N(mean, std)|`
/// every `step` from `start` to `end` inclusive. `start > end` gives an empty series.
pub fn create_timeseries<R: Rng + ?Sized>(
    start: NaiveDateTime,
    end: NaiveDateTime,
    step: TimeDelta,
    params: &WaveParams,
    rng: &mut R,
) -> Result<Vec<Observation>, GeneratorError> {
    if step <= TimeDelta::zero() {
        return Err(GeneratorError::InvalidStep(step));
    }
    if !params.std.is_finite() || params.std < 0.0 {
        return Err(GeneratorError::InvalidNoise(params.std));
    }
    let noise = Normal::new(params.mean, params.std)
        .map_err(|_| GeneratorError::InvalidNoise(params.std))?;

    let mut timestamps = Vec::new();
    let mut current = start;
    while current <= end {
        timestamps.push(current);
        match current.checked_add_signed(step) {
            Some(next) => current = next,
            None => break,
        }
    }

    let n = timestamps.len() as f64;
    let series = timestamps
        .into_iter()
        .enumerate()
        .map(|(i, timestamp)| {
            let wave = params.amplitude * (2.0 * PI * params.cycle_frequency * i as f64 / n).sin();
            Observation::new(timestamp, (wave + noise.sample(&mut *rng)).abs())
        })
        .collect();

    Ok(series)
}
