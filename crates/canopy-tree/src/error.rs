/// Errors from tree and forest operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TreeError {
    /// Returned when a named column does not exist in the dataset header.
    #[error("unknown column \"{name}\"")]
    UnknownColumn {
        /// The column name that was looked up.
        name: String,
    },

    /// Returned when n_trees is zero.
    #[error("n_trees must be at least 1, got {n_trees}")]
    InvalidTreeCount {
        /// The invalid n_trees value provided.
        n_trees: usize,
    },

    /// Returned when max_depth is zero.
    #[error("max_depth must be at least 1, got {max_depth}")]
    InvalidMaxDepth {
        /// The invalid max_depth value provided.
        max_depth: usize,
    },

    /// Returned when randomized splitting is requested with zero candidates.
    #[error("split_count must be at least 1 for randomized splits, got {split_count}")]
    InvalidSplitCount {
        /// The invalid split_count value provided.
        split_count: usize,
    },

    /// Returned when the feature-bagging count is zero.
    #[error("attributes must be at least 1, got {attributes}")]
    InvalidAttributeCount {
        /// The requested number of attributes per tree.
        attributes: usize,
    },

    /// Returned when a column descriptor does not describe the dataset it is
    /// used with.
    #[error("column \"{name}\" (index {index}) does not match the dataset header")]
    ColumnMismatch {
        /// Name stored in the descriptor.
        name: String,
        /// Index stored in the descriptor.
        index: usize,
    },

    /// Returned when a regression target is trained without a `min_rows` bound.
    #[error("regression target \"{target}\" requires min_rows to be set")]
    MissingMinRows {
        /// Name of the numeric target column.
        target: String,
    },

    /// Returned when a holdout percentage lies outside [0, 100].
    #[error("holdout percent must be in [0, 100], got {percent}")]
    InvalidHoldoutPercent {
        /// The invalid percentage provided.
        percent: f64,
    },

    /// Returned when an operation needs at least one data row and got none.
    #[error("dataset has zero data rows")]
    EmptyDataset,

    /// Returned when a regression target cell is not a number.
    #[error("regression target \"{target}\" has a non-numeric value at row {row_index}")]
    NonNumericTarget {
        /// Name of the target column.
        target: String,
        /// Zero-based data row index of the offending cell.
        row_index: usize,
    },

    /// Returned when a data row has a different width than the header.
    #[error("row {row_index} has {got} values, expected {expected}")]
    RowLengthMismatch {
        /// Zero-based data row index.
        row_index: usize,
        /// Number of header columns.
        expected: usize,
        /// Number of values in the row.
        got: usize,
    },

    /// Returned when a row passed for prediction has the wrong width.
    #[error("prediction row has {got} values, expected {expected}")]
    PredictionRowMismatch {
        /// Number of columns the model was trained on.
        expected: usize,
        /// Number of values in the row.
        got: usize,
    },

    /// Returned when true and predicted label slices differ in length.
    #[error("got {got} predicted labels for {expected} true labels")]
    LabelCountMismatch {
        /// Number of true labels.
        expected: usize,
        /// Number of predicted labels.
        got: usize,
    },
}
