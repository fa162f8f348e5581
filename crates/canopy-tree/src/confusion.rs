//! Confusion matrix and per-class classification metrics.

use std::collections::HashMap;
use std::fmt;

use crate::error::TreeError;
use crate::value::Value;

/// A confusion matrix over arbitrary target values.
///
/// Labels are ordered by first appearance in the truth, then in the
/// predictions. Entry `as_rows()[t][p]` counts rows whose true label is
/// `labels()[t]` and whose prediction is `labels()[p]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfusionMatrix {
    labels: Vec<Value>,
    matrix: Vec<Vec<usize>>,
}

/// Per-class precision, recall, and F1 score.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMetrics {
    /// The class label.
    pub label: Value,
    /// Precision: TP / (TP + FP). 0.0 if the class was never predicted.
    pub precision: f64,
    /// Recall: TP / (TP + FN). 0.0 if the class never occurs in the truth.
    pub recall: f64,
    /// F1: 2 * precision * recall / (precision + recall). 0.0 if both are zero.
    pub f1: f64,
    /// Number of true rows with this label.
    pub support: usize,
}

impl ConfusionMatrix {
    /// Build a confusion matrix from true and predicted labels.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`TreeError::EmptyDataset`] | Zero labels provided |
    /// | [`TreeError::LabelCountMismatch`] | `truth` and `predicted` differ in length |
    pub fn from_labels(truth: &[Value], predicted: &[Value]) -> Result<Self, TreeError> {
        if truth.is_empty() {
            return Err(TreeError::EmptyDataset);
        }
        if truth.len() != predicted.len() {
            return Err(TreeError::LabelCountMismatch {
                expected: truth.len(),
                got: predicted.len(),
            });
        }

        let mut index: HashMap<&Value, usize> = HashMap::new();
        let mut labels: Vec<Value> = Vec::new();
        for value in truth.iter().chain(predicted) {
            index.entry(value).or_insert_with(|| {
                labels.push(value.clone());
                labels.len() - 1
            });
        }

        let n = labels.len();
        let mut matrix = vec![vec![0usize; n]; n];
        for (t, p) in truth.iter().zip(predicted) {
            matrix[index[t]][index[p]] += 1;
        }
        Ok(Self { labels, matrix })
    }

    /// Overall accuracy: proportion of correct predictions.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        let correct: usize = (0..self.n_classes()).map(|i| self.matrix[i][i]).sum();
        let total: usize = self.matrix.iter().flat_map(|row| row.iter()).sum();
        if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64
        }
    }

    /// Per-class precision, recall, F1, and support, in label order.
    #[must_use]
    pub fn class_metrics(&self) -> Vec<ClassMetrics> {
        let n = self.n_classes();
        (0..n)
            .map(|c| {
                let tp = self.matrix[c][c];
                let fp: usize = (0..n).filter(|&i| i != c).map(|i| self.matrix[i][c]).sum();
                let fn_: usize = (0..n).filter(|&j| j != c).map(|j| self.matrix[c][j]).sum();
                let support = tp + fn_;
                let precision = if tp + fp == 0 {
                    0.0
                } else {
                    tp as f64 / (tp + fp) as f64
                };
                let recall = if support == 0 {
                    0.0
                } else {
                    tp as f64 / support as f64
                };
                let f1 = if precision + recall == 0.0 {
                    0.0
                } else {
                    2.0 * precision * recall / (precision + recall)
                };
                ClassMetrics {
                    label: self.labels[c].clone(),
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect()
    }

    /// Return the labels indexing rows and columns.
    #[must_use]
    pub fn labels(&self) -> &[Value] {
        &self.labels
    }

    /// Return the underlying matrix rows.
    #[must_use]
    pub fn as_rows(&self) -> &[Vec<usize>] {
        &self.matrix
    }

    /// Return the number of distinct labels.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.labels.len()
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .labels
            .iter()
            .map(|l| l.to_string().len())
            .max()
            .unwrap_or(0)
            .max(7);

        write!(f, "{:>width$}", "")?;
        for label in &self.labels {
            write!(f, " {:>width$}", label.to_string())?;
        }
        writeln!(f)?;

        for (label, row) in self.labels.iter().zip(&self.matrix) {
            write!(f, "{:>width$}", label.to_string())?;
            for val in row {
                write!(f, " {val:>width$}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
