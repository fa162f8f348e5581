//! With-replacement resampling and train/test splitting.

use rand::Rng;
use tracing::{debug, instrument};

use crate::dataset::Dataset;
use crate::error::TreeError;

/// Draw `sample_count` bootstrap datasets from `dataset`.
///
/// Each sample keeps the header and holds `rows_per_sample` rows drawn
/// uniformly with replacement (`None` means the source row count). Rows are
/// shared with the source, not copied.
///
/// # Errors
///
/// Returns [`TreeError::EmptyDataset`] when `dataset` has no rows but a
/// positive row count is requested.
#[instrument(skip_all, fields(sample_count = sample_count, n_rows = dataset.n_rows()))]
pub fn bootstrap(
    rng: &mut impl Rng,
    dataset: &Dataset,
    sample_count: usize,
    rows_per_sample: Option<usize>,
) -> Result<Vec<Dataset>, TreeError> {
    let draw_count = rows_per_sample.unwrap_or(dataset.n_rows());
    if dataset.is_empty() && draw_count > 0 {
        return Err(TreeError::EmptyDataset);
    }
    let samples: Vec<Dataset> = (0..sample_count)
        .map(|_| bootstrap_sample(rng, dataset, draw_count))
        .collect();
    debug!(draw_count, "bootstrap samples drawn");
    Ok(samples)
}

/// One sample of `draw_count` rows. `dataset` must be non-empty unless
/// `draw_count` is zero.
pub(crate) fn bootstrap_sample(rng: &mut impl Rng, dataset: &Dataset, draw_count: usize) -> Dataset {
    let source = dataset.shared_rows();
    let rows = (0..draw_count)
        .map(|_| source[rng.gen_range(0..source.len())].clone())
        .collect();
    dataset.with_rows(rows)
}

/// Split `dataset` into `(train, test)`.
///
/// Every row gets a uniform random key; rows are stably sorted by key and
/// the first `floor(n_rows * percent / 100)` go to `train`, the rest to
/// `test`.
///
/// # Errors
///
/// Returns [`TreeError::InvalidHoldoutPercent`] when `percent` is not within
/// `[0, 100]`.
pub fn holdout_split(
    rng: &mut impl Rng,
    dataset: &Dataset,
    percent: f64,
) -> Result<(Dataset, Dataset), TreeError> {
    if !(0.0..=100.0).contains(&percent) {
        return Err(TreeError::InvalidHoldoutPercent { percent });
    }
    let mut keyed: Vec<(f64, _)> = dataset
        .shared_rows()
        .iter()
        .map(|row| (rng.r#gen::<f64>(), row.clone()))
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));

    let cut = (dataset.n_rows() as f64 * percent / 100.0).floor() as usize;
    let mut rows: Vec<_> = keyed.into_iter().map(|(_, row)| row).collect();
    let test = rows.split_off(cut);
    Ok((dataset.with_rows(rows), dataset.with_rows(test)))
}
