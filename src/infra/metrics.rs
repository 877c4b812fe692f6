// ============================================================
// Layer 6 — Metrics
// ============================================================
// Exact-match accuracy plus the epoch-level CSV record.
//
// Metrics recorded per evaluation point:
//   - epoch:      the epoch number (1, 2, 3, ...)
//   - total_cost: summed blended loss over the epoch's batches
//   - train_acc:  exact-match accuracy on the full training set
//   - val_acc:    exact-match accuracy on the validation set
//
// Output file: <model_dir>/metrics.csv — appended across runs,
// so a resumed experiment keeps one continuous record.

use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Fraction of positions where predicted equals expected.
/// Both slices are aligned by example; an empty set scores 0.
pub fn accuracy_score(predicted: &[usize], expected: &[usize]) -> f64 {
    debug_assert_eq!(predicted.len(), expected.len());
    if predicted.is_empty() {
        return 0.0;
    }
    let correct = predicted
        .iter()
        .zip(expected.iter())
        .filter(|(p, e)| p == e)
        .count();
    correct as f64 / predicted.len() as f64
}

/// One row of metrics for a single evaluation point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochSummary {
    pub epoch: usize,
    pub total_cost: f64,
    pub train_acc: f64,
    pub val_acc: f64,
}

/// Appends evaluation-point metrics to a CSV file.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Writes the CSV header if the file doesn't exist yet.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "epoch,total_cost,train_acc,val_acc")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one evaluation point as a new CSV row.
    pub fn log(&self, m: &EpochSummary) -> Result<()> {
        let mut f = OpenOptions::new().append(true).open(&self.csv_path)?;
        writeln!(
            f,
            "{},{:.6},{:.6},{:.6}",
            m.epoch, m.total_cost, m.train_acc, m.val_acc,
        )?;
        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy_two_of_three() {
        assert!((accuracy_score(&[2, 0, 1], &[2, 0, 0]) - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_accuracy_bounds() {
        assert_eq!(accuracy_score(&[1, 2], &[1, 2]), 1.0);
        assert_eq!(accuracy_score(&[0, 0], &[1, 2]), 0.0);
        assert_eq!(accuracy_score(&[], &[]), 0.0);
    }

    #[test]
    fn test_csv_rows_append() {
        let dir = tempfile::tempdir().unwrap();
        let logger = MetricsLogger::new(dir.path()).unwrap();

        logger
            .log(&EpochSummary { epoch: 1, total_cost: 12.5, train_acc: 0.25, val_acc: 0.2 })
            .unwrap();
        logger
            .log(&EpochSummary { epoch: 2, total_cost: 9.75, train_acc: 0.5, val_acc: 0.4 })
            .unwrap();

        let content = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "epoch,total_cost,train_acc,val_acc");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("1,12.5"));
    }
}
