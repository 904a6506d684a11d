//! Dynamic marketplace record

use std::collections::HashMap;

use chrono::DateTime;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

use super::Value;
use crate::error::FieldError;

/// Placeholder shown for fields that are missing or empty.
pub const PLACEHOLDER: &str = "-";

/// A record returned by a backend resource (an order, farmer, restaurant,
/// invitation, ...).
///
/// Records hold field values as a `HashMap<String, Value>`. Typed getters
/// return `Err` when the field is missing or has another type, and
/// `Ok(None)` only when the field is present and null.
///
/// # Example
///
/// ```
/// use farmgate_lib::model::Record;
///
/// let order = Record::new("orders")
///     .set("status", "pending")
///     .set("amount", 31.95);
///
/// assert_eq!(order.get_string("status").unwrap(), Some("pending"));
/// assert_eq!(order.display("notes"), "-");
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    /// The resource the record belongs to, e.g. `orders`.
    pub(crate) resource: String,

    /// The record identity (`id` or `_id` on the wire).
    pub(crate) id: Option<String>,

    /// The field values.
    pub(crate) fields: HashMap<String, Value>,
}

impl Record {
    /// Creates a new empty record for the given resource.
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            id: None,
            fields: HashMap::new(),
        }
    }

    /// Creates a new record with the given ID.
    pub fn with_id(resource: impl Into<String>, id: impl Into<String>) -> Self {
        let id = id.into();
        let mut record = Self::new(resource);
        record.fields.insert("id".to_string(), Value::String(id.clone()));
        record.id = Some(id);
        record
    }

    // =========================================================================
    // Metadata accessors
    // =========================================================================

    /// Returns the resource name.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Returns the record ID, if set.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Sets the resource name.
    pub fn set_resource(&mut self, resource: impl Into<String>) {
        self.resource = resource.into();
    }

    /// Sets the record ID.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    // =========================================================================
    // Raw field access
    // =========================================================================

    /// Returns a reference to the field value, if it exists.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Resolves a dotted path such as `buyer.name` through nested objects.
    ///
    /// A top-level field whose name contains a dot wins over the nested
    /// lookup.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        if let Some(value) = self.fields.get(path) {
            return Some(value);
        }
        let mut parts = path.split('.');
        let first = parts.next()?;
        let mut current = self.fields.get(first)?;
        for part in parts {
            current = current.get(part)?;
        }
        Some(current)
    }

    /// Returns `true` if the record contains the given field.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Returns a reference to all fields.
    pub fn fields(&self) -> &HashMap<String, Value> {
        &self.fields
    }

    /// Returns the field names in a stable order: `id` first, then sorted.
    pub fn field_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.fields.keys().map(String::as_str).collect();
        names.sort_by_key(|name| (!matches!(*name, "id" | "_id"), *name));
        names
    }

    /// Renders a field for display, falling back to [`PLACEHOLDER`].
    pub fn display(&self, path: &str) -> String {
        self.display_or(path, PLACEHOLDER)
    }

    /// Renders a field for display with a custom placeholder.
    pub fn display_or(&self, path: &str, placeholder: &str) -> String {
        self.get_path(path)
            .and_then(Value::to_display)
            .unwrap_or_else(|| placeholder.to_string())
    }

    // =========================================================================
    // Setters
    // =========================================================================

    /// Sets a field value (builder pattern).
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    /// Inserts a field value. Writing `id` or `_id` also updates the identity.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        let field = field.into();
        let value = value.into();
        if (field == "id" || field == "_id")
            && let Some(id) = identity_of(&value)
        {
            self.id = Some(id);
        }
        self.fields.insert(field, value);
    }

    /// Removes a field and returns its value.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    // =========================================================================
    // Typed getters
    //
    // Return Err if field is missing or wrong type.
    // Return Ok(None) only if the field exists and is Value::Null.
    // =========================================================================

    /// Gets a string field value.
    pub fn get_string(&self, field: &str) -> Result<Option<&str>, FieldError> {
        match self.fields.get(field) {
            None => Err(FieldError::missing(field)),
            Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(FieldError::type_mismatch(field, "string", other.type_name())),
        }
    }

    /// Gets a boolean field value.
    pub fn get_bool(&self, field: &str) -> Result<Option<bool>, FieldError> {
        match self.fields.get(field) {
            None => Err(FieldError::missing(field)),
            Some(Value::Null) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(FieldError::type_mismatch(field, "bool", other.type_name())),
        }
    }

    /// Gets an integer field value.
    pub fn get_int(&self, field: &str) -> Result<Option<i64>, FieldError> {
        match self.fields.get(field) {
            None => Err(FieldError::missing(field)),
            Some(Value::Null) => Ok(None),
            Some(Value::Int(n)) => Ok(Some(*n)),
            Some(other) => Err(FieldError::type_mismatch(field, "int", other.type_name())),
        }
    }

    /// Gets a float field value. Integers widen.
    pub fn get_float(&self, field: &str) -> Result<Option<f64>, FieldError> {
        match self.fields.get(field) {
            None => Err(FieldError::missing(field)),
            Some(Value::Null) => Ok(None),
            Some(Value::Float(n)) => Ok(Some(*n)),
            Some(Value::Int(n)) => Ok(Some(*n as f64)),
            Some(other) => Err(FieldError::type_mismatch(field, "float", other.type_name())),
        }
    }

    /// Gets a Decimal field value.
    ///
    /// Prices arrive as JSON numbers or numeric strings; both convert here.
    pub fn get_decimal(&self, field: &str) -> Result<Option<Decimal>, FieldError> {
        match self.fields.get(field) {
            None => Err(FieldError::missing(field)),
            Some(Value::Null) => Ok(None),
            Some(Value::Decimal(d)) => Ok(Some(*d)),
            Some(Value::String(s)) => s.trim().parse::<Decimal>().map(Some).map_err(|_| {
                FieldError::InvalidNumber {
                    field: field.to_string(),
                    text: s.clone(),
                }
            }),
            Some(Value::Int(n)) => Ok(Some(Decimal::from(*n))),
            Some(Value::Float(n)) => Decimal::from_f64(*n)
                .map(Some)
                .ok_or_else(|| FieldError::type_mismatch(field, "decimal", "float")),
            Some(other) => Err(FieldError::type_mismatch(field, "decimal", other.type_name())),
        }
    }

    /// Gets a DateTime field value.
    pub fn get_datetime(&self, field: &str) -> Result<Option<DateTime<Utc>>, FieldError> {
        match self.fields.get(field) {
            None => Err(FieldError::missing(field)),
            Some(Value::Null) => Ok(None),
            Some(Value::DateTime(dt)) => Ok(Some(*dt)),
            Some(other) => Err(FieldError::type_mismatch(field, "datetime", other.type_name())),
        }
    }

    /// Gets a list field value.
    pub fn get_list(&self, field: &str) -> Result<Option<&[Value]>, FieldError> {
        match self.fields.get(field) {
            None => Err(FieldError::missing(field)),
            Some(Value::Null) => Ok(None),
            Some(Value::List(items)) => Ok(Some(items.as_slice())),
            Some(other) => Err(FieldError::type_mismatch(field, "list", other.type_name())),
        }
    }
}

/// Extracts an identity string from an `id`/`_id` value.
pub(crate) fn identity_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Int(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_getters() {
        let record = Record::new("orders")
            .set("status", "pending")
            .set("items", 3i64)
            .set("paid", false)
            .set("notes", Value::Null);

        assert_eq!(record.get_string("status").unwrap(), Some("pending"));
        assert_eq!(record.get_int("items").unwrap(), Some(3));
        assert_eq!(record.get_float("items").unwrap(), Some(3.0));
        assert_eq!(record.get_bool("paid").unwrap(), Some(false));
        assert_eq!(record.get_string("notes").unwrap(), None);
        assert!(matches!(
            record.get_string("missing"),
            Err(FieldError::Missing { .. })
        ));
        assert!(matches!(
            record.get_int("status"),
            Err(FieldError::TypeMismatch { expected: "int", actual: "string", .. })
        ));
    }

    #[test]
    fn test_get_decimal_from_float() {
        let record = Record::new("orders").set("amount", 45.5);
        assert_eq!(record.get_decimal("amount").unwrap(), Some(Decimal::new(455, 1)));
    }

    #[test]
    fn test_get_decimal_from_string() {
        let record = Record::new("products").set("price", " 31.95").set("unit", "kg");
        assert_eq!(record.get_decimal("price").unwrap(), Some(Decimal::new(3195, 2)));

        let err = record.get_decimal("unit").unwrap_err();
        assert!(matches!(err, FieldError::InvalidNumber { .. }));
        assert_eq!(err.field(), "unit");
    }

    #[test]
    fn test_insert_id_sets_identity() {
        let record = Record::new("farmers").set("_id", "65ab");
        assert_eq!(record.id(), Some("65ab"));

        let record = Record::new("farmers").set("id", 7i64);
        assert_eq!(record.id(), Some("7"));
    }

    #[test]
    fn test_get_path_nested() {
        let buyer = Value::from_json(serde_json::json!({"name": "Bistro 21", "city": "Kigali"}));
        let record = Record::new("orders").set("buyer", buyer);
        assert_eq!(record.display("buyer.city"), "Kigali");
        assert_eq!(record.display("buyer.phone"), PLACEHOLDER);
    }

    #[test]
    fn test_display_or_custom_placeholder() {
        let record = Record::new("restaurants").set("phone", "");
        assert_eq!(record.display_or("phone", "Not provided"), "Not provided");
    }

    #[test]
    fn test_field_names_id_first() {
        let record = Record::with_id("orders", "1").set("status", "x").set("amount", 1i64);
        assert_eq!(record.field_names(), vec!["id", "amount", "status"]);
    }
}
