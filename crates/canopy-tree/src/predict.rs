//! Prediction values and forest aggregation.

use std::collections::HashMap;

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::column::Column;
use crate::dataset::Dataset;
use crate::error::TreeError;
use crate::forest::Forest;
use crate::node::{ClassProbability, Leaf};
use crate::tree::Tree;
use crate::value::Value;

/// Result of evaluating a tree or forest on one row.
#[derive(Debug, Clone, PartialEq)]
pub enum Prediction {
    /// Target values sorted by descending probability. For a single tree
    /// the probabilities sum to 1; for a forest they are summed over trees.
    Class(Vec<ClassProbability>),
    /// Predicted numeric target.
    Value(f64),
}

impl Prediction {
    /// Return the most probable class, if this is a classification.
    #[must_use]
    pub fn top_class(&self) -> Option<&Value> {
        match self {
            Prediction::Class(distribution) => distribution.first().map(|c| &c.value),
            Prediction::Value(_) => None,
        }
    }

    /// Return the full class distribution, if this is a classification.
    #[must_use]
    pub fn distribution(&self) -> Option<&[ClassProbability]> {
        match self {
            Prediction::Class(distribution) => Some(distribution),
            Prediction::Value(_) => None,
        }
    }

    /// Return the numeric prediction, if this is a regression.
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        match self {
            Prediction::Value(v) => Some(*v),
            Prediction::Class(_) => None,
        }
    }
}

impl From<&Leaf> for Prediction {
    fn from(leaf: &Leaf) -> Self {
        match leaf {
            Leaf::Class { distribution, .. } => Prediction::Class(distribution.clone()),
            Leaf::Value { mean, .. } => Prediction::Value(*mean),
        }
    }
}

impl Forest {
    /// Evaluate every tree on `row` and combine the results.
    ///
    /// Classification sums each value's probability across trees and sorts
    /// by descending total, ties keeping first-seen order. Regression
    /// averages the tree predictions.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::PredictionRowMismatch`] when `row` is not as wide
    /// as the training header.
    pub fn evaluate(&self, row: &[Value]) -> Result<Prediction, TreeError> {
        if row.len() != self.n_columns {
            return Err(TreeError::PredictionRowMismatch {
                expected: self.n_columns,
                got: row.len(),
            });
        }

        let mut totals: Vec<ClassProbability> = Vec::new();
        let mut slots: HashMap<Value, usize> = HashMap::new();
        let mut sum = 0.0;
        for tree in &self.trees {
            match tree.leaf(row)? {
                Leaf::Class { distribution, .. } => {
                    for entry in distribution {
                        match slots.get(&entry.value) {
                            Some(&slot) => totals[slot].probability += entry.probability,
                            None => {
                                slots.insert(entry.value.clone(), totals.len());
                                totals.push(entry.clone());
                            }
                        }
                    }
                }
                Leaf::Value { mean, .. } => sum += mean,
            }
        }

        if self.is_classification() {
            totals.sort_by(|a, b| b.probability.total_cmp(&a.probability));
            Ok(Prediction::Class(totals))
        } else {
            Ok(Prediction::Value(sum / self.trees.len() as f64))
        }
    }

    /// Evaluate every row of `dataset` in parallel, returning predictions in
    /// row order.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::PredictionRowMismatch`] when the dataset is not
    /// as wide as the training header.
    pub fn predict_batch(&self, dataset: &Dataset) -> Result<Vec<Prediction>, TreeError> {
        dataset
            .shared_rows()
            .par_iter()
            .map(|row| self.evaluate(row))
            .collect()
    }

    /// Return the target column.
    #[must_use]
    pub fn target(&self) -> &Column {
        &self.target
    }

    /// Return `true` when the target is categorical.
    #[must_use]
    pub fn is_classification(&self) -> bool {
        self.target.is_categorical()
    }

    /// Return the trees in training order.
    #[must_use]
    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    /// Return the number of trees in the ensemble.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}
