//! Immutable tabular datasets with shared rows.

use std::sync::Arc;

use crate::error::TreeError;
use crate::value::Value;

/// A header of column names plus an ordered sequence of data rows.
///
/// Rows are reference-counted, so every derived dataset (split side,
/// bootstrap sample, holdout part) shares row storage with its source.
/// Nothing is ever mutated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    header: Arc<[String]>,
    rows: Vec<Arc<[Value]>>,
}

impl Dataset {
    /// Build a dataset from a header and data rows.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::RowLengthMismatch`] when a row's width differs
    /// from the header's.
    pub fn new(header: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self, TreeError> {
        let expected = header.len();
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(row_index, row)| {
                if row.len() == expected {
                    Ok(Arc::from(row))
                } else {
                    Err(TreeError::RowLengthMismatch {
                        row_index,
                        expected,
                        got: row.len(),
                    })
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            header: Arc::from(header),
            rows,
        })
    }

    /// Derive a dataset over the same header from already-shared rows.
    pub(crate) fn with_rows(&self, rows: Vec<Arc<[Value]>>) -> Self {
        Self {
            header: Arc::clone(&self.header),
            rows,
        }
    }

    pub(crate) fn shared_rows(&self) -> &[Arc<[Value]>] {
        &self.rows
    }

    /// Return the column names.
    #[must_use]
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Return the number of data rows (the header is not counted).
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Return the number of columns.
    #[must_use]
    pub fn n_columns(&self) -> usize {
        self.header.len()
    }

    /// Return `true` when the dataset has no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Return the data row at `index`.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&[Value]> {
        self.rows.get(index).map(|r| &r[..])
    }

    /// Iterate over the data rows.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[Value]> + '_ {
        self.rows.iter().map(|r| &r[..])
    }

    /// Iterate over one column's values.
    ///
    /// # Panics
    ///
    /// Panics if `index >= n_columns()`.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows.iter().map(move |r| &r[index])
    }

    /// Find a column index by name.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }
}

#[cfg(test)]
mod tests {
    use super::Dataset;
    use crate::{TreeError, Value};

    fn header() -> Vec<String> {
        vec!["a".to_string(), "b".to_string()]
    }

    #[test]
    fn rejects_ragged_rows() {
        let rows = vec![
            vec![Value::from(1.0), Value::from("x")],
            vec![Value::from(2.0)],
        ];
        let err = Dataset::new(header(), rows).unwrap_err();
        assert_eq!(
            err,
            TreeError::RowLengthMismatch {
                row_index: 1,
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn column_lookup_and_values() {
        let rows = vec![
            vec![Value::from(1.0), Value::from("x")],
            vec![Value::from(2.0), Value::from("y")],
        ];
        let ds = Dataset::new(header(), rows).unwrap();
        assert_eq!(ds.n_rows(), 2);
        assert_eq!(ds.n_columns(), 2);
        assert_eq!(ds.column_index("b"), Some(1));
        assert_eq!(ds.column_index("z"), None);
        let b: Vec<&Value> = ds.column_values(1).collect();
        assert_eq!(b, vec![&Value::from("x"), &Value::from("y")]);
    }

    #[test]
    fn derived_dataset_shares_header() {
        let rows = vec![vec![Value::from(1.0), Value::from("x")]];
        let ds = Dataset::new(header(), rows).unwrap();
        let copy = ds.with_rows(vec![ds.shared_rows()[0].clone(); 3]);
        assert_eq!(copy.header(), ds.header());
        assert_eq!(copy.n_rows(), 3);
        assert_eq!(ds.n_rows(), 1);
    }
}
