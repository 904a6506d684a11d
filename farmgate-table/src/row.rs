//! TableRow trait

use farmgate_lib::model::Record;
use farmgate_lib::model::Value;

/// Trait for items that can be displayed as rows in a table.
///
/// `id` is the stable identity used for selection and row actions; it must
/// not change when the row is re-fetched or re-sorted. `value` exposes named
/// fields to columns and filters that are declared by key only. Types that
/// give every column an explicit cell function can leave it at the default.
///
/// # Example
///
/// ```
/// use farmgate_lib::model::Value;
/// use farmgate_table::TableRow;
///
/// #[derive(Clone)]
/// struct Farmer {
///     id: u32,
///     name: String,
/// }
///
/// impl TableRow for Farmer {
///     fn id(&self) -> String {
///         self.id.to_string()
///     }
///
///     fn value(&self, field: &str) -> Option<Value> {
///         match field {
///             "name" => Some(self.name.as_str().into()),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait TableRow: Send + Sync + Clone + 'static {
    /// Unique identifier for this row.
    fn id(&self) -> String;

    /// Value of a named field, if the row has it.
    fn value(&self, field: &str) -> Option<Value> {
        let _ = field;
        None
    }
}

impl TableRow for Record {
    fn id(&self) -> String {
        Record::id(self).unwrap_or_default().to_string()
    }

    /// Dotted paths reach into nested objects (`buyer.name`).
    fn value(&self, field: &str) -> Option<Value> {
        self.get_path(field).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_row() {
        let order = Record::with_id("orders", "o-1").set("status", "pending");
        assert_eq!(TableRow::id(&order), "o-1");
        assert_eq!(order.value("status"), Some(Value::from("pending")));
        assert_eq!(order.value("missing"), None);
    }
}
