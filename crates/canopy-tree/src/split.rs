use std::fmt;
use std::sync::Arc;

use rand::Rng;

use crate::column::Column;
use crate::dataset::Dataset;
use crate::value::{Value, value_counts};

/// Strategy for proposing thresholds on numeric columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitMethod {
    /// One threshold at the column mean of the current subset.
    Mean,
    /// `split_count` thresholds drawn uniformly from `[min, max)` of the
    /// current subset.
    Random {
        /// Number of random thresholds per column per node.
        split_count: usize,
    },
}

/// Predicate applied to one column of a row.
#[derive(Debug, Clone, PartialEq)]
pub enum SplitRule {
    /// True when the cell equals the stored value.
    Equals(Value),
    /// True when the cell is a number strictly below the threshold.
    LessThan(f64),
}

impl SplitRule {
    /// Apply the rule to a cell. Non-numeric cells never satisfy `LessThan`.
    #[must_use]
    pub fn matches(&self, cell: &Value) -> bool {
        match self {
            SplitRule::Equals(value) => cell == value,
            SplitRule::LessThan(threshold) => cell.as_number().is_some_and(|n| n < *threshold),
        }
    }
}

impl fmt::Display for SplitRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplitRule::Equals(value) => write!(f, "== {value}"),
            SplitRule::LessThan(threshold) => write!(f, "< {threshold}"),
        }
    }
}

/// Criterion for measuring the quality of a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitCriterion {
    /// Gini impurity over target values: 1 - Σ(p_v²). Used for categorical targets.
    Gini,
    /// Population variance of a numeric target. Used for everything else.
    Variance,
}

impl SplitCriterion {
    /// Pick the criterion implied by the target column.
    #[must_use]
    pub fn for_target(target: &Column) -> Self {
        if target.is_categorical() {
            SplitCriterion::Gini
        } else {
            SplitCriterion::Variance
        }
    }

    /// Compute the impurity of `dataset` with respect to column `target`.
    ///
    /// Returns 0.0 for an empty dataset.
    #[must_use]
    pub fn impurity(self, dataset: &Dataset, target: usize) -> f64 {
        match self {
            SplitCriterion::Gini => gini(dataset, target),
            SplitCriterion::Variance => variance(&numeric_values(dataset, target)),
        }
    }

    /// Score a candidate against its parent impurity. Larger is better.
    ///
    /// `Gini` returns the size-weighted gain. `Variance` returns
    /// `Var(S) - (Var(L) + Var(R))`: child variances are NOT weighted by
    /// subset size, unlike the Gini path.
    #[must_use]
    pub fn score(self, parent_impurity: f64, candidate: &SplitCandidate, target: usize) -> f64 {
        match self {
            SplitCriterion::Gini => {
                let n = (candidate.left.n_rows() + candidate.right.n_rows()) as f64;
                let w_left = candidate.left.n_rows() as f64 / n;
                let w_right = candidate.right.n_rows() as f64 / n;
                parent_impurity
                    - w_left * gini(&candidate.left, target)
                    - w_right * gini(&candidate.right, target)
            }
            SplitCriterion::Variance => {
                parent_impurity
                    - (self.impurity(&candidate.left, target)
                        + self.impurity(&candidate.right, target))
            }
        }
    }
}

/// A proposed binary partition of a dataset on one column.
#[derive(Debug, Clone)]
pub struct SplitCandidate {
    pub(crate) column: usize,
    pub(crate) rule: SplitRule,
    pub(crate) left: Dataset,
    pub(crate) right: Dataset,
    pub(crate) score: f64,
}

impl SplitCandidate {
    /// Return the index of the column the rule is applied to.
    #[must_use]
    pub fn column(&self) -> usize {
        self.column
    }

    /// Return the split rule.
    #[must_use]
    pub fn rule(&self) -> &SplitRule {
        &self.rule
    }

    /// Return the rows for which the rule holds.
    #[must_use]
    pub fn left(&self) -> &Dataset {
        &self.left
    }

    /// Return the rows for which the rule does not hold.
    #[must_use]
    pub fn right(&self) -> &Dataset {
        &self.right
    }

    /// Return the score (gain or variance reduction); 0.0 until scored.
    #[must_use]
    pub fn score(&self) -> f64 {
        self.score
    }
}

/// Gini impurity of the target column: 1 - Σ(p_v²).
///
/// Returns 0.0 for an empty dataset.
#[must_use]
pub fn gini(dataset: &Dataset, target: usize) -> f64 {
    let n = dataset.n_rows();
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    let sum_sq: f64 = value_counts(dataset.column_values(target))
        .iter()
        .map(|&(_, count)| {
            let p = count as f64 / n;
            p * p
        })
        .sum();
    1.0 - sum_sq
}

/// Arithmetic mean, or `None` for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population variance: mean((x - x̄)²). Returns 0.0 for an empty slice.
#[must_use]
pub fn variance(values: &[f64]) -> f64 {
    let Some(m) = mean(values) else {
        return 0.0;
    };
    values.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / values.len() as f64
}

pub(crate) fn numeric_values(dataset: &Dataset, column: usize) -> Vec<f64> {
    dataset.column_values(column).filter_map(Value::as_number).collect()
}

/// Partition `dataset` on `rule`, or `None` if either side would be empty.
fn partition(dataset: &Dataset, column: usize, rule: SplitRule) -> Option<SplitCandidate> {
    let (left, right): (Vec<Arc<[Value]>>, Vec<Arc<[Value]>>) = dataset
        .shared_rows()
        .iter()
        .cloned()
        .partition(|row| rule.matches(&row[column]));
    if left.is_empty() || right.is_empty() {
        return None;
    }
    Some(SplitCandidate {
        column,
        rule,
        left: dataset.with_rows(left),
        right: dataset.with_rows(right),
        score: 0.0,
    })
}

fn numeric_thresholds(
    dataset: &Dataset,
    column: usize,
    method: SplitMethod,
    rng: &mut impl Rng,
) -> Vec<f64> {
    let values = numeric_values(dataset, column);
    let Some(m) = mean(&values) else {
        return Vec::new();
    };
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    // Constant column: nothing can separate it.
    if min == max {
        return Vec::new();
    }
    match method {
        SplitMethod::Mean => vec![m],
        SplitMethod::Random { split_count } => (0..split_count)
            .map(|_| min + rng.r#gen::<f64>() * (max - min))
            .collect(),
    }
}

/// Propose unscored split candidates for one column of `dataset`.
///
/// Categorical columns yield one `Equals` candidate per distinct value
/// present in `dataset` (none if fewer than two are present). Numeric
/// columns yield `LessThan` candidates per `method`. Other columns yield
/// nothing. Candidates leaving one side empty are dropped.
pub fn partitions_for(
    dataset: &Dataset,
    column: &Column,
    method: SplitMethod,
    rng: &mut impl Rng,
) -> Vec<SplitCandidate> {
    let index = column.index();
    let rules: Vec<SplitRule> = if column.is_categorical() {
        let present = value_counts(dataset.column_values(index));
        if present.len() < 2 {
            return Vec::new();
        }
        present.into_iter().map(|(v, _)| SplitRule::Equals(v)).collect()
    } else if column.is_numeric() {
        numeric_thresholds(dataset, index, method, rng)
            .into_iter()
            .map(SplitRule::LessThan)
            .collect()
    } else {
        return Vec::new();
    };
    rules
        .into_iter()
        .filter_map(|rule| partition(dataset, index, rule))
        .collect()
}

/// Fill in the score of every candidate.
pub fn score_candidates(
    candidates: &mut [SplitCandidate],
    criterion: SplitCriterion,
    target: usize,
    parent_impurity: f64,
) {
    for candidate in candidates.iter_mut() {
        candidate.score = criterion.score(parent_impurity, candidate, target);
    }
}

/// Select the highest-scoring candidate.
///
/// Candidates are compared pairwise in order; on an exact tie a fair coin
/// from `rng` decides whether the later candidate replaces the current best.
pub fn best_candidate(
    candidates: Vec<SplitCandidate>,
    rng: &mut impl Rng,
) -> Option<SplitCandidate> {
    let mut best: Option<SplitCandidate> = None;
    for candidate in candidates {
        let replace = match &best {
            None => true,
            Some(current) if candidate.score > current.score => true,
            Some(current) if candidate.score == current.score => rng.r#gen::<f64>() < 0.5,
            Some(_) => false,
        };
        if replace {
            best = Some(candidate);
        }
    }
    best
}

/// Find the best split of `dataset` over `columns`.
///
/// Generates candidates for every column in order, scores them against the
/// parent impurity, then picks the best. Returns `None` when no column can
/// be split.
pub(crate) fn find_best_split(
    dataset: &Dataset,
    columns: &[Column],
    target: usize,
    criterion: SplitCriterion,
    method: SplitMethod,
    rng: &mut impl Rng,
) -> Option<SplitCandidate> {
    let mut candidates: Vec<SplitCandidate> = Vec::new();
    for column in columns {
        candidates.extend(partitions_for(dataset, column, method, rng));
    }
    if candidates.is_empty() {
        return None;
    }
    let parent_impurity = criterion.impurity(dataset, target);
    score_candidates(&mut candidates, criterion, target, parent_impurity);
    best_candidate(candidates, rng)
}
