//! Synthetic hourly load generator.
//!
//! Produces a daily sine cycle, a weekly sine cycle and Gaussian noise on top
//! of a base load. The generator is seeded so the same configuration always
//! yields the same series; tests rely on this.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use super::series::{EnergyReading, EnergySeries};
use crate::error::{DatasetError, Result};

/// Parameters of the synthetic series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticConfig {
    #[serde(default = "default_days")]
    pub days: u32,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_start")]
    pub start: NaiveDateTime,
    #[serde(default = "default_base_load")]
    pub base_load: f64,
    #[serde(default = "default_daily_amplitude")]
    pub daily_amplitude: f64,
    #[serde(default = "default_weekly_amplitude")]
    pub weekly_amplitude: f64,
    #[serde(default = "default_noise_std")]
    pub noise_std: f64,
}

fn default_days() -> u32 {
    60
}
fn default_seed() -> u64 {
    42
}
fn default_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2023, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}
fn default_base_load() -> f64 {
    100.0
}
fn default_daily_amplitude() -> f64 {
    20.0
}
fn default_weekly_amplitude() -> f64 {
    10.0
}
fn default_noise_std() -> f64 {
    5.0
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            days: default_days(),
            seed: default_seed(),
            start: default_start(),
            base_load: default_base_load(),
            daily_amplitude: default_daily_amplitude(),
            weekly_amplitude: default_weekly_amplitude(),
            noise_std: default_noise_std(),
        }
    }
}

/// Generate `days * 24` hourly readings starting at `config.start`.
pub fn generate_synthetic(config: &SyntheticConfig) -> Result<EnergySeries> {
    if !(config.noise_std >= 0.0 && config.noise_std.is_finite()) {
        return Err(DatasetError::InvalidNoise {
            value: config.noise_std,
        }
        .into());
    }
    let noise = Normal::new(0.0, config.noise_std).map_err(|_| DatasetError::InvalidNoise {
        value: config.noise_std,
    })?;
    let mut rng = Mcg128Xsl64::seed_from_u64(config.seed);

    let periods = config.days as usize * 24;
    let readings = (0..periods)
        .map(|hour| {
            let h = hour as f64;
            let daily = config.daily_amplitude * (2.0 * PI * h / 24.0).sin();
            let weekly = config.weekly_amplitude * (2.0 * PI * h / (24.0 * 7.0)).sin();
            EnergyReading {
                timestamp: config.start + Duration::hours(hour as i64),
                total_energy: config.base_load + daily + weekly + noise.sample(&mut rng),
            }
        })
        .collect();

    Ok(EnergySeries::new(readings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ForecastError;

    #[test]
    fn produces_hourly_rows() {
        let config = SyntheticConfig {
            days: 3,
            ..Default::default()
        };
        let series = generate_synthetic(&config).unwrap();
        assert_eq!(series.len(), 72);

        let readings = series.readings();
        assert_eq!(readings[0].timestamp, default_start());
        assert_eq!(
            readings[1].timestamp - readings[0].timestamp,
            Duration::hours(1)
        );
    }

    #[test]
    fn same_seed_same_series() {
        let config = SyntheticConfig {
            days: 2,
            ..Default::default()
        };
        assert_eq!(
            generate_synthetic(&config).unwrap(),
            generate_synthetic(&config).unwrap()
        );

        let other = SyntheticConfig {
            seed: 7,
            ..config.clone()
        };
        assert_ne!(
            generate_synthetic(&config).unwrap().values(),
            generate_synthetic(&other).unwrap().values()
        );
    }

    #[test]
    fn noiseless_series_follows_cycles() {
        let config = SyntheticConfig {
            days: 7,
            noise_std: 0.0,
            ..Default::default()
        };
        let values = generate_synthetic(&config).unwrap().values();
        assert!((values[0] - 100.0).abs() < 1e-9);
        // Hour 6 is the daily peak.
        let expected = 100.0 + 20.0 + 10.0 * (2.0 * PI * 6.0 / 168.0).sin();
        assert!((values[6] - expected).abs() < 1e-9);
    }

    #[test]
    fn invalid_noise_is_rejected() {
        for noise_std in [-1.0, -1e-9, f64::NAN, f64::INFINITY] {
            let config = SyntheticConfig {
                noise_std,
                ..Default::default()
            };
            let err = generate_synthetic(&config).unwrap_err();
            assert!(
                matches!(err, ForecastError::Dataset(DatasetError::InvalidNoise { .. })),
                "{noise_std}: {err}"
            );
        }
    }
}
