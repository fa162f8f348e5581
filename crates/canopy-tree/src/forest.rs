//! Bagged forest training, sequential or on the rayon pool.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, info, instrument};

use crate::bootstrap::{bootstrap, bootstrap_sample};
use crate::column::{Column, profile};
use crate::config::{ForestConfig, Parallelism};
use crate::dataset::Dataset;
use crate::error::TreeError;
use crate::tree::Tree;

/// A fitted ensemble of decision trees sharing one target column.
#[derive(Debug, Clone, PartialEq)]
pub struct Forest {
    pub(crate) target: Column,
    pub(crate) trees: Vec<Tree>,
    pub(crate) n_columns: usize,
}

/// Train the forest.
///
/// Options and inputs are fully validated before any tree is grown, so a
/// failing fit never draws from `rng`.
#[instrument(skip_all, fields(n_trees = config.n_trees, n_rows = dataset.n_rows()))]
pub(crate) fn train(
    config: &ForestConfig,
    dataset: &Dataset,
    target: &str,
    rng: &mut impl Rng,
) -> Result<Forest, TreeError> {
    // --- Validate config and inputs ---
    let tree_config = config.tree_config();
    tree_config.validate()?;
    let columns = profile(dataset);
    let (target_column, criterion) = tree_config.resolve_target(dataset, &columns, target)?;
    let n_features = tree_config.feature_columns(&columns, &target_column)?.len();

    let draw_count = config.rows_per_sample.unwrap_or(dataset.n_rows());
    if draw_count == 0 {
        return Err(TreeError::EmptyDataset);
    }

    info!(
        n_trees = config.n_trees,
        n_rows = dataset.n_rows(),
        n_features,
        draw_count,
        ?criterion,
        parallelism = ?config.parallelism,
        "training forest"
    );

    let trees: Vec<Tree> = match config.parallelism {
        Parallelism::Sequential => {
            let samples = bootstrap(rng, dataset, config.n_trees, Some(draw_count))?;
            samples
                .iter()
                .map(|sample| tree_config.fit_with_rng(sample, &columns, target, rng))
                .collect::<Result<_, _>>()?
        }
        Parallelism::Parallel => {
            let tree_seeds: Vec<u64> = (0..config.n_trees).map(|_| rng.r#gen()).collect();
            tree_seeds
                .into_par_iter()
                .map(|seed| {
                    let mut tree_rng = ChaCha8Rng::seed_from_u64(seed);
                    let sample = bootstrap_sample(&mut tree_rng, dataset, draw_count);
                    tree_config.fit_with_rng(&sample, &columns, target, &mut tree_rng)
                })
                .collect::<Result<_, _>>()?
        }
    };

    debug!(n_trees_trained = trees.len(), "tree training complete");

    let forest = Forest {
        target: target_column,
        trees,
        n_columns: dataset.n_columns(),
    };
    info!(
        total_nodes = forest.trees.iter().map(Tree::n_nodes).sum::<usize>(),
        "forest training complete"
    );
    Ok(forest)
}
