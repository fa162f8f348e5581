//! CART decision trees and bagged forests over dynamically typed tables.
//!
//! Profiles columns (categorical, numeric, boolean), grows binary trees
//! with Gini gain for categorical targets and variance reduction for
//! numeric ones, and bags trees over bootstrap samples with optional
//! feature bagging. All randomness is injected through [`rand::Rng`], so a
//! fixed seed reproduces every tree.

mod bootstrap;
mod column;
mod config;
mod confusion;
mod dataset;
mod error;
mod eval;
mod forest;
mod node;
mod predict;
mod split;
mod tree;
mod value;

pub use bootstrap::{bootstrap, holdout_split};
pub use column::{CATEGORICAL_THRESHOLD, Column, profile, random_columns, remove_column, remove_columns};
pub use config::{ForestConfig, Parallelism};
pub use confusion::{ClassMetrics, ConfusionMatrix};
pub use dataset::Dataset;
pub use error::TreeError;
pub use eval::HoldoutScore;
pub use forest::Forest;
pub use node::{ClassProbability, Leaf, Node};
pub use predict::Prediction;
pub use split::{
    SplitCandidate, SplitCriterion, SplitMethod, SplitRule, best_candidate, gini, mean,
    partitions_for, score_candidates, variance,
};
pub use tree::{Tree, TreeConfig};
pub use value::Value;
