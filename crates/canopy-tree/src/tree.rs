use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument};

use crate::{
    TreeError,
    column::{Column, profile, random_columns, remove_column, remove_columns},
    dataset::Dataset,
    node::{Leaf, Node},
    predict::Prediction,
    split::{SplitCriterion, SplitMethod, find_best_split, mean, numeric_values, variance},
    value::{Value, value_counts},
};

/// Configuration for a single CART decision tree.
///
/// Construct via [`TreeConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter         | Default               |
/// |-------------------|-----------------------|
/// | `split_method`    | `Mean`                |
/// | `max_depth`       | `None` (unlimited)    |
/// | `min_rows`        | `None`                |
/// | `attributes`      | `None` (all features) |
/// | `ignored_columns` | empty                 |
/// | `seed`            | 42                    |
#[derive(Debug, Clone)]
pub struct TreeConfig {
    pub(crate) split_method: SplitMethod,
    pub(crate) max_depth: Option<usize>,
    pub(crate) min_rows: Option<usize>,
    pub(crate) attributes: Option<usize>,
    pub(crate) ignored_columns: Vec<String>,
    pub(crate) seed: u64,
}

impl TreeConfig {
    /// Create a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            split_method: SplitMethod::Mean,
            max_depth: None,
            min_rows: None,
            attributes: None,
            ignored_columns: Vec::new(),
            seed: 42,
        }
    }

    /// Set the numeric threshold strategy.
    #[must_use]
    pub fn with_split_method(mut self, split_method: SplitMethod) -> Self {
        self.split_method = split_method;
        self
    }

    /// Set the maximum tree depth.
    ///
    /// `None` grows until leaves are pure or no split exists. `Some(d)`
    /// turns every node at depth `d` into a leaf (root is depth 0).
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the row count at or below which a regression node becomes a leaf.
    ///
    /// Required for numeric targets; ignored for categorical ones.
    #[must_use]
    pub fn with_min_rows(mut self, min_rows: Option<usize>) -> Self {
        self.min_rows = min_rows;
        self
    }

    /// Set how many feature columns the tree draws at random.
    ///
    /// The draw happens once per tree, not per split. `None` uses all.
    #[must_use]
    pub fn with_attributes(mut self, attributes: Option<usize>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Set column names never used as features.
    #[must_use]
    pub fn with_ignored_columns(mut self, ignored_columns: Vec<String>) -> Self {
        self.ignored_columns = ignored_columns;
        self
    }

    /// Set the random seed used by [`TreeConfig::fit`].
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    // --- Getters ---

    /// Return the numeric threshold strategy.
    #[must_use]
    pub fn split_method(&self) -> SplitMethod {
        self.split_method
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

    /// Return the feature-bagging count, if set.
    #[must_use]
    pub fn attributes(&self) -> Option<usize> {
        self.attributes
    }

    /// Return the ignored column names.
    #[must_use]
    pub fn ignored_columns(&self) -> &[String] {
        &self.ignored_columns
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Profile `dataset` and train a tree predicting `target`, seeding a
    /// [`ChaCha8Rng`] from the configured seed.
    ///
    /// # Errors
    ///
    /// See [`TreeConfig::fit_with_rng`].
    pub fn fit(&self, dataset: &Dataset, target: &str) -> Result<Tree, TreeError> {
        let columns = profile(dataset);
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.fit_with_rng(dataset, &columns, target, &mut rng)
    }

    /// Train a tree predicting `target` from pre-profiled `columns`, drawing
    /// all randomness from `rng`.
    ///
    /// # Errors
    ///
    /// | Variant                             | When                                                |
    /// |-------------------------------------|-----------------------------------------------------|
    /// | [`TreeError::InvalidMaxDepth`]      | `max_depth` is `Some(0)`                            |
    /// | [`TreeError::InvalidSplitCount`]    | `split_method` is `Random { split_count: 0 }`       |
    /// | [`TreeError::ColumnMismatch`]       | a column's index or name disagrees with `dataset`   |
    /// | [`TreeError::UnknownColumn`]        | `target` is not among `columns`                     |
    /// | [`TreeError::EmptyDataset`]         | `dataset` has no data rows                          |
    /// | [`TreeError::MissingMinRows`]       | numeric target and `min_rows` is `None`             |
    /// | [`TreeError::NonNumericTarget`]     | numeric target with a non-number cell               |
    /// | [`TreeError::InvalidAttributeCount`]| `attributes` is `Some(0)`                           |
    #[instrument(skip_all, fields(target_column = target, n_rows = dataset.n_rows()))]
    pub fn fit_with_rng(
        &self,
        dataset: &Dataset,
        columns: &[Column],
        target: &str,
        rng: &mut impl Rng,
    ) -> Result<Tree, TreeError> {
        self.validate()?;
        let (target, criterion) = self.resolve_target(dataset, columns, target)?;
        let candidates = self.feature_columns(columns, &target)?;
        let features = random_columns(rng, &candidates, self.attributes);

        let grower = Grower {
            features: &features,
            target: target.index(),
            criterion,
            split_method: self.split_method,
            max_depth: self.max_depth,
            min_rows: self.min_rows.unwrap_or(0),
        };
        let root = grower.grow(dataset, 0, rng);

        let tree = Tree {
            target,
            features,
            n_columns: dataset.n_columns(),
            root,
        };
        debug!(
            n_nodes = tree.n_nodes(),
            depth = tree.depth(),
            ?criterion,
            "decision tree built"
        );
        Ok(tree)
    }

    /// Check option values that do not depend on the data.
    pub(crate) fn validate(&self) -> Result<(), TreeError> {
        if self.max_depth == Some(0) {
            return Err(TreeError::InvalidMaxDepth { max_depth: 0 });
        }
        if let SplitMethod::Random { split_count: 0 } = self.split_method {
            return Err(TreeError::InvalidSplitCount { split_count: 0 });
        }
        Ok(())
    }

    /// Locate the target column and decide between classification and regression.
    pub(crate) fn resolve_target(
        &self,
        dataset: &Dataset,
        columns: &[Column],
        target: &str,
    ) -> Result<(Column, SplitCriterion), TreeError> {
        if let Some(stale) = columns
            .iter()
            .find(|c| dataset.header().get(c.index()).is_none_or(|name| name != c.name()))
        {
            return Err(TreeError::ColumnMismatch {
                name: stale.name().to_string(),
                index: stale.index(),
            });
        }

        let column = columns
            .iter()
            .find(|c| c.name() == target)
            .cloned()
            .ok_or_else(|| TreeError::UnknownColumn {
                name: target.to_string(),
            })?;

        if dataset.is_empty() {
            return Err(TreeError::EmptyDataset);
        }

        let criterion = SplitCriterion::for_target(&column);
        if criterion == SplitCriterion::Variance {
            if self.min_rows.is_none() {
                return Err(TreeError::MissingMinRows {
                    target: target.to_string(),
                });
            }
            if let Some(row_index) = dataset
                .column_values(column.index())
                .position(|v| !v.is_number())
            {
                return Err(TreeError::NonNumericTarget {
                    target: target.to_string(),
                    row_index,
                });
            }
        }
        Ok((column, criterion))
    }

    /// All columns minus the target and ignored ones.
    ///
    /// An `attributes` count above the number of remaining columns keeps them all.
    pub(crate) fn feature_columns(
        &self,
        columns: &[Column],
        target: &Column,
    ) -> Result<Vec<Column>, TreeError> {
        let features = remove_columns(&remove_column(columns, target.name()), &self.ignored_columns);
        if self.attributes == Some(0) {
            return Err(TreeError::InvalidAttributeCount { attributes: 0 });
        }
        Ok(features)
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Recursive node construction for one tree.
struct Grower<'a> {
    features: &'a [Column],
    target: usize,
    criterion: SplitCriterion,
    split_method: SplitMethod,
    max_depth: Option<usize>,
    min_rows: usize,
}

impl Grower<'_> {
    fn grow(&self, dataset: &Dataset, depth: usize, rng: &mut impl Rng) -> Node {
        let n_rows = dataset.n_rows();
        let depth_reached = self.max_depth.is_some_and(|max_d| depth >= max_d);

        match self.criterion {
            SplitCriterion::Gini => {
                let counts = value_counts(dataset.column_values(self.target));
                if depth_reached || counts.len() <= 1 {
                    return Node::class_leaf(counts, n_rows);
                }
                self.split(dataset, depth, rng)
                    .unwrap_or_else(|| Node::class_leaf(counts, n_rows))
            }
            SplitCriterion::Variance => {
                let values = numeric_values(dataset, self.target);
                if depth_reached || n_rows <= self.min_rows {
                    return value_leaf(&values, n_rows);
                }
                self.split(dataset, depth, rng)
                    .unwrap_or_else(|| value_leaf(&values, n_rows))
            }
        }
    }

    /// Find the best split and grow both children, or `None` if nothing splits.
    fn split(&self, dataset: &Dataset, depth: usize, rng: &mut impl Rng) -> Option<Node> {
        let split = find_best_split(
            dataset,
            self.features,
            self.target,
            self.criterion,
            self.split_method,
            rng,
        )?;
        let left = self.grow(&split.left, depth + 1, rng);
        let right = self.grow(&split.right, depth + 1, rng);
        Some(Node::Internal {
            column: split.column,
            column_name: dataset.header()[split.column].clone(),
            rule: split.rule,
            score: split.score,
            n_rows: dataset.n_rows(),
            left: Box::new(left),
            right: Box::new(right),
        })
    }
}

fn value_leaf(values: &[f64], n_rows: usize) -> Node {
    // Training rejects empty input and partitions never yield an empty side.
    debug_assert!(!values.is_empty(), "regression leaf over zero rows");
    Node::Leaf(Leaf::Value {
        mean: mean(values).unwrap_or(0.0),
        variance: variance(values),
        n_rows,
    })
}

/// A fitted decision tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    pub(crate) target: Column,
    pub(crate) features: Vec<Column>,
    pub(crate) n_columns: usize,
    pub(crate) root: Node,
}

impl Tree {
    /// Return the target column.
    #[must_use]
    pub fn target(&self) -> &Column {
        &self.target
    }

    /// Return the feature columns this tree was allowed to split on.
    #[must_use]
    pub fn features(&self) -> &[Column] {
        &self.features
    }

    /// Return the root node.
    #[must_use]
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Walk from the root to the leaf `row` falls into.
    ///
    /// At each internal node, goes left when the rule holds for
    /// `row[column]`, right otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::PredictionRowMismatch`] when `row` is not as wide
    /// as the training header.
    pub fn leaf(&self, row: &[Value]) -> Result<&Leaf, TreeError> {
        if row.len() != self.n_columns {
            return Err(TreeError::PredictionRowMismatch {
                expected: self.n_columns,
                got: row.len(),
            });
        }
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf(leaf) => return Ok(leaf),
                Node::Internal {
                    column,
                    rule,
                    left,
                    right,
                    ..
                } => {
                    node = if rule.matches(&row[*column]) { left } else { right };
                }
            }
        }
    }

    /// Predict `row`: the leaf distribution for classification trees, the
    /// leaf mean for regression trees.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::PredictionRowMismatch`] when `row` is not as wide
    /// as the training header.
    pub fn evaluate(&self, row: &[Value]) -> Result<Prediction, TreeError> {
        self.leaf(row).map(Prediction::from)
    }

    /// Return the total number of nodes (internal and leaves).
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.walk().count()
    }

    /// Return the number of leaves.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.walk().filter(|(n, _)| n.is_leaf()).count()
    }

    /// Return the maximum depth. A single-leaf tree has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.walk().map(|(_, d)| d).max().unwrap_or(0)
    }

    /// Depth-first iteration over `(node, depth)` pairs.
    fn walk(&self) -> impl Iterator<Item = (&Node, usize)> {
        let mut stack = vec![(&self.root, 0usize)];
        std::iter::from_fn(move || {
            let (node, d) = stack.pop()?;
            if let Node::Internal { left, right, .. } = node {
                stack.push((right, d + 1));
                stack.push((left, d + 1));
            }
            Some((node, d))
        })
    }
}
