//! Configuration builder for forest training.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::dataset::Dataset;
use crate::error::TreeError;
use crate::forest::Forest;
use crate::split::SplitMethod;
use crate::tree::TreeConfig;

/// How the trees of a forest are trained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parallelism {
    /// One RNG stream: all bootstrap samples are drawn first, then trees
    /// are built in index order.
    Sequential,
    /// The master RNG draws one seed per tree; each tree samples and grows
    /// from its own stream on the rayon pool.
    Parallel,
}

/// Configuration for bagged forest training.
///
/// Construct via [`ForestConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter         | Default                 |
/// |-------------------|-------------------------|
/// | `attributes`      | `None` (all features)   |
/// | `max_depth`       | `None`                  |
/// | `min_rows`        | `None`                  |
/// | `split_method`    | `Mean`                  |
/// | `ignored_columns` | empty                   |
/// | `rows_per_sample` | `None` (dataset size)   |
/// | `seed`            | 42                      |
/// | `parallelism`     | `Sequential`            |
#[derive(Debug, Clone)]
pub struct ForestConfig {
    pub(crate) n_trees: usize,
    pub(crate) attributes: Option<usize>,
    pub(crate) max_depth: Option<usize>,
    pub(crate) min_rows: Option<usize>,
    pub(crate) split_method: SplitMethod,
    pub(crate) ignored_columns: Vec<String>,
    pub(crate) rows_per_sample: Option<usize>,
    pub(crate) seed: u64,
    pub(crate) parallelism: Parallelism,
}

impl ForestConfig {
    /// Create a new config with the given number of trees.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidTreeCount`] if `n_trees` is zero.
    pub fn new(n_trees: usize) -> Result<Self, TreeError> {
        if n_trees == 0 {
            return Err(TreeError::InvalidTreeCount { n_trees });
        }
        Ok(Self {
            n_trees,
            attributes: None,
            max_depth: None,
            min_rows: None,
            split_method: SplitMethod::Mean,
            ignored_columns: Vec::new(),
            rows_per_sample: None,
            seed: 42,
            parallelism: Parallelism::Sequential,
        })
    }

    // --- Setters ---

    /// Set how many feature columns each tree draws. `None` means all.
    #[must_use]
    pub fn with_attributes(mut self, attributes: Option<usize>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Set the maximum tree depth. `None` means unlimited.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the regression leaf size bound.
    #[must_use]
    pub fn with_min_rows(mut self, min_rows: Option<usize>) -> Self {
        self.min_rows = min_rows;
        self
    }

    /// Set the numeric threshold strategy.
    #[must_use]
    pub fn with_split_method(mut self, split_method: SplitMethod) -> Self {
        self.split_method = split_method;
        self
    }

    /// Set column names never used as features.
    #[must_use]
    pub fn with_ignored_columns(mut self, ignored_columns: Vec<String>) -> Self {
        self.ignored_columns = ignored_columns;
        self
    }

    /// Set the row count of each bootstrap sample. `None` uses the dataset size.
    #[must_use]
    pub fn with_rows_per_sample(mut self, rows_per_sample: Option<usize>) -> Self {
        self.rows_per_sample = rows_per_sample;
        self
    }

    /// Set the random seed used by [`ForestConfig::fit`].
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the training mode.
    #[must_use]
    pub fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }

    // --- Getters ---

    /// Return the number of trees.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.n_trees
    }

    /// Return the feature-bagging count, if set.
    #[must_use]
    pub fn attributes(&self) -> Option<usize> {
        self.attributes
    }

    /// Return the maximum depth limit, if any.
    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Return the regression leaf size bound, if set.
    #[must_use]
    pub fn min_rows(&self) -> Option<usize> {
        self.min_rows
    }

    /// Return the numeric threshold strategy.
    #[must_use]
    pub fn split_method(&self) -> SplitMethod {
        self.split_method
    }

    /// Return the ignored column names.
    #[must_use]
    pub fn ignored_columns(&self) -> &[String] {
        &self.ignored_columns
    }

    /// Return the bootstrap sample size, if set.
    #[must_use]
    pub fn rows_per_sample(&self) -> Option<usize> {
        self.rows_per_sample
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Return the training mode.
    #[must_use]
    pub fn parallelism(&self) -> Parallelism {
        self.parallelism
    }

    /// Per-tree options shared by every member of the forest.
    pub(crate) fn tree_config(&self) -> TreeConfig {
        TreeConfig::new()
            .with_split_method(self.split_method)
            .with_max_depth(self.max_depth)
            .with_min_rows(self.min_rows)
            .with_attributes(self.attributes)
            .with_ignored_columns(self.ignored_columns.clone())
    }

    /// Train a forest predicting `target`, seeding a `ChaCha8Rng` from the
    /// configured seed.
    ///
    /// # Errors
    ///
    /// See [`ForestConfig::fit_with_rng`].
    pub fn fit(&self, dataset: &Dataset, target: &str) -> Result<Forest, TreeError> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.fit_with_rng(dataset, target, &mut rng)
    }

    /// Train a forest predicting `target`, drawing all randomness from `rng`.
    ///
    /// # Errors
    ///
    /// | Variant                              | When                                            |
    /// |--------------------------------------|-------------------------------------------------|
    /// | [`TreeError::InvalidMaxDepth`]       | `max_depth` is `Some(0)`                        |
    /// | [`TreeError::InvalidSplitCount`]     | `split_method` is `Random { split_count: 0 }`   |
    /// | [`TreeError::UnknownColumn`]         | `target` is not a header name                   |
    /// | [`TreeError::EmptyDataset`]          | no data rows, or `rows_per_sample` is `Some(0)` |
    /// | [`TreeError::MissingMinRows`]        | numeric target and `min_rows` is `None`         |
    /// | [`TreeError::NonNumericTarget`]      | numeric target with a non-number cell           |
    /// | [`TreeError::InvalidAttributeCount`] | `attributes` is `Some(0)`                       |
    pub fn fit_with_rng(
        &self,
        dataset: &Dataset,
        target: &str,
        rng: &mut impl Rng,
    ) -> Result<Forest, TreeError> {
        crate::forest::train(self, dataset, target, rng)
    }
}
