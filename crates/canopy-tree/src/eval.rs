//! Scoring a fitted forest on held-out rows.

use tracing::{info, instrument};

use crate::confusion::ConfusionMatrix;
use crate::dataset::Dataset;
use crate::error::TreeError;
use crate::forest::Forest;
use crate::value::Value;

/// Quality of a forest's predictions on a labelled dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum HoldoutScore {
    /// Top-class predictions against categorical labels.
    Classification(ConfusionMatrix),
    /// Mean predictions against numeric targets.
    Regression {
        /// Root mean squared error.
        rmse: f64,
        /// Mean absolute error.
        mae: f64,
    },
}

impl HoldoutScore {
    /// Return the accuracy of a classification score.
    #[must_use]
    pub fn accuracy(&self) -> Option<f64> {
        match self {
            HoldoutScore::Classification(cm) => Some(cm.accuracy()),
            HoldoutScore::Regression { .. } => None,
        }
    }
}

impl Forest {
    /// Predict every row of `dataset` and compare against its target column.
    ///
    /// `dataset` must share the training header layout.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`TreeError::EmptyDataset`] | `dataset` has no rows |
    /// | [`TreeError::PredictionRowMismatch`] | rows are not as wide as the training header |
    /// | [`TreeError::NonNumericTarget`] | regression target cell is not a number |
    #[instrument(skip_all, fields(n_rows = dataset.n_rows(), n_trees = self.trees.len()))]
    pub fn evaluate_dataset(&self, dataset: &Dataset) -> Result<HoldoutScore, TreeError> {
        if dataset.is_empty() {
            return Err(TreeError::EmptyDataset);
        }
        let predictions = self.predict_batch(dataset)?;
        let target = self.target.index();

        if self.is_classification() {
            let truth: Vec<Value> = dataset.column_values(target).cloned().collect();
            let predicted: Vec<Value> = predictions
                .iter()
                .filter_map(|p| p.top_class().cloned())
                .collect();
            let cm = ConfusionMatrix::from_labels(&truth, &predicted)?;
            info!(accuracy = cm.accuracy(), "holdout evaluation complete");
            return Ok(HoldoutScore::Classification(cm));
        }

        let mut sq_sum = 0.0;
        let mut abs_sum = 0.0;
        for (row_index, (cell, prediction)) in
            dataset.column_values(target).zip(&predictions).enumerate()
        {
            let actual = cell.as_number().ok_or_else(|| TreeError::NonNumericTarget {
                target: self.target.name().to_string(),
                row_index,
            })?;
            let err = prediction.value().unwrap_or(f64::NAN) - actual;
            sq_sum += err * err;
            abs_sum += err.abs();
        }
        let n = dataset.n_rows() as f64;
        let rmse = (sq_sum / n).sqrt();
        let mae = abs_sum / n;
        info!(rmse, mae, "holdout evaluation complete");
        Ok(HoldoutScore::Regression { rmse, mae })
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::HoldoutScore;
    use crate::{Dataset, ForestConfig, TreeError, Value, holdout_split};

    fn banded() -> Dataset {
        let header = vec!["x".to_string(), "label".to_string()];
        let rows = (0..40)
            .map(|i| {
                let label = if i < 20 { "low" } else { "high" };
                vec![Value::from(f64::from(i)), Value::from(label)]
            })
            .collect();
        Dataset::new(header, rows).unwrap()
    }

    #[test]
    fn classification_holdout_accuracy() {
        let ds = banded();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let (train, test) = holdout_split(&mut rng, &ds, 75.0).unwrap();
        let forest = ForestConfig::new(20).unwrap().fit(&train, "label").unwrap();
        let score = forest.evaluate_dataset(&test).unwrap();
        let HoldoutScore::Classification(cm) = &score else {
            panic!("expected classification score");
        };
        assert_eq!(cm.as_rows().iter().flatten().sum::<usize>(), test.n_rows());
        let acc = score.accuracy().unwrap();
        assert!(acc >= 0.8, "accuracy = {acc}");
    }

    #[test]
    fn regression_errors_are_small_on_training_rows() {
        let header = vec!["x".to_string(), "y".to_string()];
        let rows = (0..30)
            .map(|i| vec![Value::from(f64::from(i)), Value::from(f64::from(3 * i))])
            .collect();
        let ds = Dataset::new(header, rows).unwrap();
        let forest = ForestConfig::new(10)
            .unwrap()
            .with_min_rows(Some(2))
            .fit(&ds, "y")
            .unwrap();
        let HoldoutScore::Regression { rmse, mae } = forest.evaluate_dataset(&ds).unwrap() else {
            panic!("expected regression score");
        };
        assert!(mae <= rmse + 1e-12);
        assert!(rmse < 15.0, "rmse = {rmse}");
        assert_eq!(forest.evaluate_dataset(&ds).unwrap().accuracy(), None);
    }

    #[test]
    fn empty_holdout_error() {
        let ds = banded();
        let forest = ForestConfig::new(3).unwrap().fit(&ds, "label").unwrap();
        let empty = Dataset::new(ds.header().to_vec(), vec![]).unwrap();
        assert_eq!(forest.evaluate_dataset(&empty).unwrap_err(), TreeError::EmptyDataset);
    }
}
