//! Column profiling and column-set selection.

use rand::Rng;

use crate::dataset::Dataset;
use crate::value::{Value, value_counts};

/// Columns with fewer distinct values than this are categorical.
pub const CATEGORICAL_THRESHOLD: usize = 10;

/// Profile of one dataset column, derived once by [`profile`].
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub(crate) index: usize,
    pub(crate) name: String,
    pub(crate) is_categorical: bool,
    pub(crate) is_numeric: bool,
    pub(crate) is_boolean: bool,
    pub(crate) unique_values: usize,
    pub(crate) distinct_values: Option<Vec<Value>>,
}

impl Column {
    /// Return the zero-based column position in the dataset header.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Return the column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return `true` when the column has fewer than
    /// [`CATEGORICAL_THRESHOLD`] distinct values.
    #[must_use]
    pub fn is_categorical(&self) -> bool {
        self.is_categorical
    }

    /// Return `true` when every value is a finite number.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        self.is_numeric
    }

    /// Return `true` when every value is a boolean.
    #[must_use]
    pub fn is_boolean(&self) -> bool {
        self.is_boolean
    }

    /// Return the number of distinct values observed.
    #[must_use]
    pub fn unique_values(&self) -> usize {
        self.unique_values
    }

    /// Return the distinct values in first-seen order (categorical columns only).
    #[must_use]
    pub fn distinct_values(&self) -> Option<&[Value]> {
        self.distinct_values.as_deref()
    }
}

/// Classify every column of `dataset`.
///
/// A column with zero rows is categorical, numeric and boolean at once
/// (vacuous truth) with no distinct values; it can never be split on.
#[must_use]
pub fn profile(dataset: &Dataset) -> Vec<Column> {
    dataset
        .header()
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let counts = value_counts(dataset.column_values(index));
            let unique_values = counts.len();
            let is_categorical = unique_values < CATEGORICAL_THRESHOLD;
            let is_numeric = dataset.column_values(index).all(Value::is_number);
            let is_boolean = dataset.column_values(index).all(Value::is_bool);
            let distinct_values =
                is_categorical.then(|| counts.into_iter().map(|(v, _)| v).collect());
            Column {
                index,
                name: name.clone(),
                is_categorical,
                is_numeric,
                is_boolean,
                unique_values,
                distinct_values,
            }
        })
        .collect()
}

/// Return `columns` without any column named in `names`.
///
/// An empty `names` slice leaves the columns unchanged.
#[must_use]
pub fn remove_columns<S: AsRef<str>>(columns: &[Column], names: &[S]) -> Vec<Column> {
    columns
        .iter()
        .filter(|c| !names.iter().any(|n| n.as_ref() == c.name))
        .cloned()
        .collect()
}

/// Return `columns` without the column called `name`.
#[must_use]
pub fn remove_column(columns: &[Column], name: &str) -> Vec<Column> {
    remove_columns(columns, &[name])
}

/// Draw `count` columns without replacement.
///
/// Each column gets a uniform random key; columns are stably sorted by key
/// and the first `count` kept. `None` returns every column in order and
/// draws nothing from `rng`.
pub fn random_columns(rng: &mut impl Rng, columns: &[Column], count: Option<usize>) -> Vec<Column> {
    let Some(count) = count else {
        return columns.to_vec();
    };
    let mut keyed: Vec<(f64, &Column)> = columns.iter().map(|c| (rng.r#gen::<f64>(), c)).collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
    keyed.into_iter().take(count).map(|(_, c)| c.clone()).collect()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::{profile, random_columns, remove_column, remove_columns};
    use crate::{Dataset, Value};

    fn mixed() -> Dataset {
        let header = ["colour", "size", "flag", "id"].map(String::from).to_vec();
        let rows = (0..12)
            .map(|i| {
                vec![
                    Value::from(["red", "green", "blue"][i % 3]),
                    Value::from(i as f64 * 1.5),
                    Value::from(i % 2 == 0),
                    Value::from(format!("row-{i}")),
                ]
            })
            .collect();
        Dataset::new(header, rows).unwrap()
    }

    #[test]
    fn classifies_columns() {
        let cols = profile(&mixed());
        assert_eq!(cols.len(), 4);

        assert!(cols[0].is_categorical());
        assert!(!cols[0].is_numeric());
        assert_eq!(cols[0].unique_values(), 3);
        assert_eq!(
            cols[0].distinct_values().unwrap(),
            &[Value::from("red"), Value::from("green"), Value::from("blue")]
        );

        assert!(!cols[1].is_categorical());
        assert!(cols[1].is_numeric());
        assert_eq!(cols[1].unique_values(), 12);
        assert!(cols[1].distinct_values().is_none());

        assert!(cols[2].is_categorical());
        assert!(cols[2].is_boolean());
        assert!(!cols[2].is_numeric());

        assert!(!cols[3].is_categorical());
        assert!(!cols[3].is_numeric());
        assert!(!cols[3].is_boolean());
    }

    #[test]
    fn empty_column_is_vacuously_numeric_and_boolean() {
        let ds = Dataset::new(vec!["x".to_string()], vec![]).unwrap();
        let cols = profile(&ds);
        assert!(cols[0].is_categorical());
        assert!(cols[0].is_numeric());
        assert!(cols[0].is_boolean());
        assert_eq!(cols[0].unique_values(), 0);
        assert_eq!(cols[0].distinct_values().unwrap().len(), 0);
    }

    #[test]
    fn remove_by_name() {
        let cols = profile(&mixed());
        let kept = remove_columns(&cols, &["flag", "id"]);
        let names: Vec<&str> = kept.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["colour", "size"]);

        assert_eq!(remove_column(&cols, "size").len(), 3);
        assert_eq!(remove_columns::<&str>(&cols, &[]), cols);
    }

    #[test]
    fn random_columns_without_replacement() {
        let cols = profile(&mixed());
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let picked = random_columns(&mut rng, &cols, Some(3));
        assert_eq!(picked.len(), 3);
        let mut indices: Vec<usize> = picked.iter().map(|c| c.index()).collect();
        indices.sort_unstable();
        indices.dedup();
        assert_eq!(indices.len(), 3);
    }

    #[test]
    fn random_columns_none_returns_all() {
        let cols = profile(&mixed());
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert_eq!(random_columns(&mut rng, &cols, None), cols);
    }

    #[test]
    fn random_columns_is_seeded() {
        let cols = profile(&mixed());
        let a = random_columns(&mut ChaCha8Rng::seed_from_u64(3), &cols, Some(2));
        let b = random_columns(&mut ChaCha8Rng::seed_from_u64(3), &cols, Some(2));
        assert_eq!(a, b);
    }
}
