//! Dataset preparation.
//!
//! The dataset is a CSV of hourly `timestamp,total_energy` rows. When the
//! file is missing a synthetic series is generated and written first.

mod series;
mod synthetic;

pub use series::{EnergyReading, EnergySeries, TIMESTAMP_FORMAT};
pub use synthetic::{generate_synthetic, SyntheticConfig};

use std::path::Path;

use tracing::info;

use crate::error::Result;

/// Load the dataset at `path`, generating it from `synthetic` if absent.
pub fn load_or_create(path: &Path, synthetic: &SyntheticConfig) -> Result<EnergySeries> {
    if !path.exists() {
        info!(path = %path.display(), "data file not found, creating synthetic dataset");
        let series = generate_synthetic(synthetic)?;
        series.write_csv(path)?;
        info!(rows = series.len(), path = %path.display(), "synthetic dataset created");
    }

    let series = EnergySeries::read_csv(path)?;
    info!(rows = series.len(), "loaded dataset");
    Ok(series)
}
