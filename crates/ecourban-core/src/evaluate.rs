//! Evaluation of the persisted model against the whole dataset.

use serde::Serialize;
use tracing::info;

use crate::dataset::EnergySeries;
use crate::error::{DatasetError, Result};
use crate::predict::Predictor;
use crate::storage::ArtifactPaths;
use crate::window::{create_sequences, WINDOW_SIZE};

const CHART_WIDTH: usize = 40;

/// Error metrics plus the aligned actual/predicted series (raw units).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub samples: usize,
    pub mae: f64,
    pub rmse: f64,
    pub r2: f64,
    pub actual: Vec<f64>,
    pub predicted: Vec<f64>,
}

pub fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let total: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum();
    total / actual.len() as f64
}

pub fn root_mean_squared_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let total: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    (total / actual.len() as f64).sqrt()
}

/// Coefficient of determination. A constant target scores 1 when matched
/// exactly and 0 otherwise.
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

/// Score `predictor` on every window of `series`.
pub fn evaluate_series(predictor: &Predictor, series: &EnergySeries) -> Result<EvaluationReport> {
    let values = series.values();
    if values.len() < WINDOW_SIZE + 1 {
        return Err(DatasetError::TooShort {
            len: values.len(),
            required: WINDOW_SIZE + 1,
        }
        .into());
    }

    let scaler = predictor.scaler();
    let windows = create_sequences(scaler.transform_all(&values).view(), WINDOW_SIZE);
    let scaled = predictor.model().predict_batch(&windows.inputs);
    let predicted: Vec<f64> = scaled.iter().map(|&y| scaler.inverse_transform(y)).collect();
    let actual = values[WINDOW_SIZE..].to_vec();

    Ok(EvaluationReport {
        samples: actual.len(),
        mae: mean_absolute_error(&actual, &predicted),
        rmse: root_mean_squared_error(&actual, &predicted),
        r2: r2_score(&actual, &predicted),
        actual,
        predicted,
    })
}

/// Load the artifacts and the dataset, then score every window.
pub fn evaluate(paths: &ArtifactPaths) -> Result<EvaluationReport> {
    let predictor = Predictor::load(paths)?;
    let series = EnergySeries::read_csv(&paths.dataset)?;
    let report = evaluate_series(&predictor, &series)?;
    info!(
        samples = report.samples,
        mae = report.mae,
        rmse = report.rmse,
        r2 = report.r2,
        "evaluation finished"
    );
    Ok(report)
}

/// Terminal chart of the last `limit` points: `█` bars for actual values,
/// `●` for the prediction.
pub fn render_ascii_chart(actual: &[f64], predicted: &[f64], limit: usize) -> String {
    let n = actual.len().min(predicted.len());
    let start = n.saturating_sub(limit);
    let actual = &actual[start..n];
    let predicted = &predicted[start..n];

    let mut output = String::from("\nActual vs Predicted:\n");
    output.push_str(&"─".repeat(CHART_WIDTH + 24));
    output.push('\n');
    if actual.is_empty() {
        output.push_str("(no data)\n");
        return output;
    }

    let (lo, hi) = actual
        .iter()
        .chain(predicted)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let range = if hi > lo { hi - lo } else { 1.0 };
    let column = |v: f64| (((v - lo) / range) * (CHART_WIDTH - 1) as f64).round() as usize;

    for (i, (&a, &p)) in actual.iter().zip(predicted).enumerate() {
        let mut row = vec![' '; CHART_WIDTH];
        let bar = column(a);
        row.iter_mut().take(bar + 1).for_each(|c| *c = '█');
        row[column(p)] = '●';
        let row: String = row.into_iter().collect();
        output.push_str(&format!("{:>5} {} {:>8.2} {:>8.2}\n", start + i, row, a, p));
    }

    output.push_str(&"─".repeat(CHART_WIDTH + 24));
    output.push_str("\n█ Actual  ● Predicted\n");
    output
}
