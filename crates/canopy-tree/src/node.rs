use crate::split::SplitRule;
use crate::value::Value;

/// One target value with its probability (or, for forests, summed probability).
#[derive(Debug, Clone, PartialEq)]
pub struct ClassProbability {
    /// The target value.
    pub value: Value,
    /// Probability of `value`.
    pub probability: f64,
}

/// Prediction stored at a terminal node.
#[derive(Debug, Clone, PartialEq)]
pub enum Leaf {
    /// Classification leaf.
    Class {
        /// Normalized distribution, sorted by descending probability.
        distribution: Vec<ClassProbability>,
        /// Number of training rows that reached this leaf.
        n_rows: usize,
    },
    /// Regression leaf.
    Value {
        /// Mean target value of the training rows.
        mean: f64,
        /// Population variance of the training rows' target values.
        variance: f64,
        /// Number of training rows that reached this leaf.
        n_rows: usize,
    },
}

impl Leaf {
    /// Return the number of training rows that reached this leaf.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        match self {
            Leaf::Class { n_rows, .. } | Leaf::Value { n_rows, .. } => *n_rows,
        }
    }
}

/// A node of a decision tree.
///
/// Internal nodes own both children; there are no parent links.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A terminal node.
    Leaf(Leaf),
    /// A binary split.
    Internal {
        /// Index of the column the rule applies to.
        column: usize,
        /// Name of that column.
        column_name: String,
        /// The split rule; `left` receives rows where it holds.
        rule: SplitRule,
        /// Score (gain or variance reduction) of the chosen split.
        score: f64,
        /// Number of training rows that reached this node.
        n_rows: usize,
        /// Subtree for rows matching `rule`.
        left: Box<Node>,
        /// Subtree for rows not matching `rule`.
        right: Box<Node>,
    },
}

impl Node {
    /// Return `true` if this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    /// Return the number of training rows that reached this node.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        match self {
            Node::Leaf(leaf) => leaf.n_rows(),
            Node::Internal { n_rows, .. } => *n_rows,
        }
    }

    /// Build a classification leaf from per-value counts in first-seen order.
    ///
    /// Counts are stably sorted by descending count so the first entry is
    /// the modal value.
    pub(crate) fn class_leaf(mut counts: Vec<(Value, usize)>, n_rows: usize) -> Self {
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        let total = n_rows as f64;
        let distribution = counts
            .into_iter()
            .map(|(value, count)| ClassProbability {
                value,
                probability: count as f64 / total,
            })
            .collect();
        Node::Leaf(Leaf::Class {
            distribution,
            n_rows,
        })
    }
}
