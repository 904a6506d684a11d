//! Table configuration errors

/// Errors raised when a table is configured or driven with keys it does not
/// know.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    /// Two columns share a key.
    #[error("Duplicate column key '{key}'")]
    DuplicateColumn { key: String },

    /// No column has this key.
    #[error("Unknown column '{key}'")]
    UnknownColumn { key: String },

    /// The column exists but is not sortable.
    #[error("Column '{key}' is not sortable")]
    NotSortable { key: String },

    /// The column exists but cannot be hidden.
    #[error("Column '{key}' cannot be hidden")]
    NotHideable { key: String },

    /// Two filters share a key.
    #[error("Duplicate filter key '{key}'")]
    DuplicateFilter { key: String },

    /// No filter has this key.
    #[error("Unknown filter '{key}'")]
    UnknownFilter { key: String },

    /// The row action was not registered in the table options.
    #[error("Unknown row action '{kind}'")]
    UnknownAction { kind: String },
}
