//! Hourly energy readings and their CSV representation.

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{DatasetError, Result};

/// Timestamp layout used in the dataset file.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One row of the dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyReading {
    pub timestamp: NaiveDateTime,
    pub total_energy: f64,
}

/// Raw CSV row, kept separate so timestamp parsing errors carry a row number.
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    timestamp: String,
    total_energy: f64,
}

/// Time-ordered series of readings. Read-only once loaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnergySeries {
    readings: Vec<EnergyReading>,
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

impl EnergySeries {
    /// Build from readings, sorting ascending by timestamp (stable).
    pub fn new(mut readings: Vec<EnergyReading>) -> Self {
        readings.sort_by_key(|r| r.timestamp);
        Self { readings }
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn readings(&self) -> &[EnergyReading] {
        &self.readings
    }

    /// The `total_energy` column.
    pub fn values(&self) -> Vec<f64> {
        self.readings.iter().map(|r| r.total_energy).collect()
    }

    /// The last `n` values (or all of them if the series is shorter).
    pub fn tail(&self, n: usize) -> Vec<f64> {
        let start = self.readings.len().saturating_sub(n);
        self.readings[start..].iter().map(|r| r.total_energy).collect()
    }

    /// Load from CSV with columns `timestamp,total_energy`.
    pub fn read_csv(path: &Path) -> Result<Self> {
        let read_err = |source| DatasetError::ReadFailed {
            path: path.to_path_buf(),
            source,
        };
        let mut reader = csv::Reader::from_path(path).map_err(read_err)?;

        let mut readings = Vec::new();
        for (idx, row) in reader.deserialize::<CsvRow>().enumerate() {
            let row = row.map_err(read_err)?;
            // Header is line 1.
            let line = idx + 2;
            let timestamp =
                parse_timestamp(row.timestamp.trim()).ok_or(DatasetError::InvalidTimestamp {
                    row: line,
                    value: row.timestamp.clone(),
                })?;
            if !row.total_energy.is_finite() {
                return Err(DatasetError::NonFinite { row: line }.into());
            }
            readings.push(EnergyReading {
                timestamp,
                total_energy: row.total_energy,
            });
        }

        Ok(Self::new(readings))
    }

    /// Write as CSV, creating parent directories as needed.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let write_err = |source| DatasetError::WriteFailed {
            path: path.to_path_buf(),
            source,
        };
        let mut writer = csv::Writer::from_path(path).map_err(write_err)?;
        for reading in &self.readings {
            writer
                .serialize(CsvRow {
                    timestamp: reading.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                    total_energy: reading.total_energy,
                })
                .map_err(write_err)?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn new_sorts_by_timestamp() {
        let series = EnergySeries::new(vec![
            EnergyReading { timestamp: at(2), total_energy: 3.0 },
            EnergyReading { timestamp: at(0), total_energy: 1.0 },
            EnergyReading { timestamp: at(1), total_energy: 2.0 },
        ]);
        assert_eq!(series.values(), vec![1.0, 2.0, 3.0]);
        assert_eq!(series.tail(2), vec![2.0, 3.0]);
        assert_eq!(series.tail(10).len(), 3);
    }

    #[test]
    fn csv_written_by_us_reads_back_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("energy_data.csv");
        let series = EnergySeries::new(vec![
            EnergyReading { timestamp: at(0), total_energy: 101.5 },
            EnergyReading { timestamp: at(1), total_energy: 99.25 },
        ]);
        series.write_csv(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("timestamp,total_energy"));
        assert_eq!(lines.next(), Some("2023-01-01 00:00:00,101.5"));
        assert_eq!(EnergySeries::read_csv(&path).unwrap(), series);
    }

    #[test]
    fn read_sorts_unordered_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(
            &path,
            "timestamp,total_energy\n2023-01-01 02:00:00,3\n2023-01-01T00:00:00,1\n2023-01-01 01:00:00,2\n",
        )
        .unwrap();
        let series = EnergySeries::read_csv(&path).unwrap();
        assert_eq!(series.values(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn bad_timestamp_reports_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "timestamp,total_energy\nyesterday,3\n").unwrap();
        let err = EnergySeries::read_csv(&path).unwrap_err();
        assert!(err.to_string().contains("row 2"), "{err}");
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(EnergySeries::read_csv(&dir.path().join("nope.csv")).is_err());
    }
}
