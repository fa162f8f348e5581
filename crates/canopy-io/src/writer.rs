//! CSV writer for datasets, bootstrap samples and holdout splits.

use std::fs;
use std::path::{Path, PathBuf};

use canopy_tree::Dataset;
use tracing::{debug, info, instrument};

use crate::IoError;

/// Writes datasets as headed CSV files into one output directory.
///
/// Creates the output directory on construction if it does not exist.
/// Numbers are written in shortest round-trip form, booleans as
/// `true`/`false`, text verbatim (quoted when needed). A dataset whose cells
/// came from a dynamically typed read reproduces the same values when read
/// back with [`crate::CsvReader`]. Text cells that look like numbers or
/// booleans (from an untyped read) come back typed unless the file is read
/// with `with_dynamic_typing(false)`.
pub struct DatasetWriter {
    output_dir: PathBuf,
}

impl DatasetWriter {
    /// Create a new writer targeting the given directory.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display()))]
    pub fn new(output_dir: &Path) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
        })
    }

    /// Return the output directory.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write `dataset` to `{output_dir}/{file_name}`, returning the path.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::WriteFile`] | File cannot be created or flushed |
    /// | [`IoError::CsvWrite`] | A record cannot be encoded |
    #[instrument(skip(self, dataset), fields(n_rows = dataset.n_rows()))]
    pub fn write(&self, file_name: &str, dataset: &Dataset) -> Result<PathBuf, IoError> {
        let path = self.output_dir.join(file_name);
        let csv_err = |e: csv::Error| IoError::CsvWrite {
            path: path.clone(),
            source: e,
        };

        let file = fs::File::create(&path).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;
        let mut wtr = csv::Writer::from_writer(file);
        wtr.write_record(dataset.header()).map_err(csv_err)?;
        for row in dataset.rows() {
            wtr.write_record(row.iter().map(ToString::to_string))
                .map_err(csv_err)?;
        }
        wtr.flush().map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        info!(path = %path.display(), "dataset written");
        Ok(path)
    }

    /// Write each dataset to `{stem}-{i}.csv`, numbering from 1.
    ///
    /// # Errors
    ///
    /// Same as [`DatasetWriter::write`]; stops at the first failure.
    #[instrument(skip(self, datasets), fields(n_files = datasets.len()))]
    pub fn write_samples(&self, stem: &str, datasets: &[Dataset]) -> Result<Vec<PathBuf>, IoError> {
        datasets
            .iter()
            .enumerate()
            .map(|(i, dataset)| self.write(&format!("{stem}-{}.csv", i + 1), dataset))
            .collect()
    }

    /// Write a train/test pair to `{stem}-train.csv` and `{stem}-test.csv`.
    ///
    /// # Errors
    ///
    /// Same as [`DatasetWriter::write`].
    pub fn write_holdout(
        &self,
        stem: &str,
        train: &Dataset,
        test: &Dataset,
    ) -> Result<(PathBuf, PathBuf), IoError> {
        let train_path = self.write(&format!("{stem}-train.csv"), train)?;
        let test_path = self.write(&format!("{stem}-test.csv"), test)?;
        Ok((train_path, test_path))
    }
}
