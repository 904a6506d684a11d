//! Field validation run before a record is submitted.
//!
//! A [`Validator`] is a reusable rule set. Rules attach to the field most
//! recently named with `field()`. Only `required` fails on a missing value;
//! the other rules pass when the field is absent or empty so optional inputs
//! can still carry format checks.

use regex::Regex;

use crate::error::ValidationErrors;
use crate::model::Record;
use crate::model::Value;

type Rule = Box<dyn Fn(Option<&Value>) -> bool + Send + Sync>;

struct FieldRules {
    name: String,
    rules: Vec<(Rule, String)>,
}

/// Rule set for one kind of record (a product form, an invitation, ...).
///
/// # Example
///
/// ```
/// use farmgate_lib::model::Record;
/// use farmgate_lib::validation::Validator;
///
/// let validator = Validator::new()
///     .field("email")
///         .required("Email is required")
///         .email("Invalid email format")
///     .field("price")
///         .positive("Price must be greater than zero")
///     .build();
///
/// let invite = Record::new("invitations")
///     .set("email", "not-an-email")
///     .set("price", 0i64);
/// let errors = validator.validate(&invite).unwrap_err();
/// assert_eq!(errors.len(), 2);
/// ```
#[derive(Default)]
pub struct Validator {
    fields: Vec<FieldRules>,
}

impl Validator {
    /// Creates an empty validator. An empty validator accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the rules for `name`.
    pub fn field(self, name: impl Into<String>) -> FieldBuilder {
        FieldBuilder {
            validator: self,
            current: FieldRules {
                name: name.into(),
                rules: Vec::new(),
            },
        }
    }

    /// Returns the names of the validated fields.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Checks `record` against every rule.
    ///
    /// Reports at most one message per field (the first failing rule).
    pub fn validate(&self, record: &Record) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        for field in &self.fields {
            let value = record.get(&field.name);
            if let Some((_, msg)) = field.rules.iter().find(|(rule, _)| !rule(value)) {
                errors.push(&field.name, msg);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            log::debug!("[validation] {} field(s) failed", errors.len());
            Err(errors)
        }
    }
}

/// Adds rules to one field. Returned by [`Validator::field`].
pub struct FieldBuilder {
    validator: Validator,
    current: FieldRules,
}

impl FieldBuilder {
    /// Adds a custom rule. `f` receives `None` when the field is absent.
    pub fn custom<F>(mut self, f: F, msg: impl Into<String>) -> Self
    where
        F: Fn(Option<&Value>) -> bool + Send + Sync + 'static,
    {
        self.current.rules.push((Box::new(f), msg.into()));
        self
    }

    /// Adds a rule that only runs on present, non-empty values.
    fn when_present<F>(self, f: F, msg: impl Into<String>) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.custom(
            move |value| match value {
                Some(v) if v.to_display().is_some() => f(v),
                _ => true,
            },
            msg,
        )
    }

    /// The field must be present and not blank.
    pub fn required(self, msg: impl Into<String>) -> Self {
        self.custom(|value| value.and_then(Value::to_display).is_some(), msg)
    }

    /// Text must have at least `min` characters.
    pub fn min_length(self, min: usize, msg: impl Into<String>) -> Self {
        self.when_present(move |v| char_len(v) >= min, msg)
    }

    /// Text must have at most `max` characters.
    pub fn max_length(self, max: usize, msg: impl Into<String>) -> Self {
        self.when_present(move |v| char_len(v) <= max, msg)
    }

    /// Text must match `pattern`.
    pub fn pattern(self, pattern: Regex, msg: impl Into<String>) -> Self {
        self.when_present(
            move |v| v.to_display().is_some_and(|s| pattern.is_match(&s)),
            msg,
        )
    }

    /// Text must be a valid email address.
    pub fn email(self, msg: impl Into<String>) -> Self {
        self.when_present(
            |v| {
                v.as_str()
                    .is_some_and(|s| email_address::EmailAddress::is_valid(s.trim()))
            },
            msg,
        )
    }

    /// Value must be a number greater than zero. Numeric strings count.
    pub fn positive(self, msg: impl Into<String>) -> Self {
        self.when_present(|v| numeric(v).is_some_and(|n| n > 0.0), msg)
    }

    /// Starts the rules for the next field.
    pub fn field(self, name: impl Into<String>) -> FieldBuilder {
        self.build().field(name)
    }

    /// Finishes the rule set.
    pub fn build(self) -> Validator {
        let mut validator = self.validator;
        validator.fields.push(self.current);
        validator
    }
}

impl From<FieldBuilder> for Validator {
    fn from(builder: FieldBuilder) -> Self {
        builder.build()
    }
}

fn char_len(value: &Value) -> usize {
    value.to_display().map(|s| s.chars().count()).unwrap_or(0)
}

fn numeric(value: &Value) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product_validator() -> Validator {
        Validator::new()
            .field("name")
            .required("Name is required")
            .min_length(3, "Name is too short")
            .field("price")
            .required("Price is required")
            .positive("Price must be positive")
            .build()
    }

    #[test]
    fn test_valid_record_passes() {
        let product = Record::new("products")
            .set("name", "Heirloom tomatoes")
            .set("price", 4.5);
        assert!(product_validator().validate(&product).is_ok());
    }

    #[test]
    fn test_one_message_per_field() {
        let product = Record::new("products").set("name", "ab").set("price", "-2");
        let errors = product_validator().validate(&product).unwrap_err();

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.for_field("name").collect::<Vec<_>>(), ["Name is too short"]);
        assert_eq!(errors.for_field("price").collect::<Vec<_>>(), ["Price must be positive"]);
    }

    #[test]
    fn test_required_rejects_blank() {
        let product = Record::new("products").set("name", "   ").set("price", 1);
        let errors = product_validator().validate(&product).unwrap_err();
        assert_eq!(errors.for_field("name").next(), Some("Name is required"));
    }

    #[test]
    fn test_optional_format_rules_skip_missing() {
        let validator = Validator::new()
            .field("email")
            .email("Invalid email")
            .field("phone")
            .pattern(Regex::new(r"^\+?\d{9,15}$").unwrap(), "Invalid phone")
            .build();

        assert!(validator.validate(&Record::new("farmers")).is_ok());

        let farmer = Record::new("farmers")
            .set("email", "grower@farm.example")
            .set("phone", "12ab");
        let errors = validator.validate(&farmer).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors()[0].field, "phone");
    }

    #[test]
    fn test_positive_skips_missing_but_rejects_zero() {
        let validator = Validator::new()
            .field("email")
            .required("Email is required")
            .email("Invalid email format")
            .field("price")
            .positive("Price must be greater than zero")
            .build();

        let missing_price = Record::new("invitations").set("email", "not-an-email");
        assert_eq!(validator.validate(&missing_price).unwrap_err().len(), 1);

        let zero_price = missing_price.set("price", 0i64);
        let errors = validator.validate(&zero_price).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.for_field("price").collect::<Vec<_>>(),
            ["Price must be greater than zero"]
        );
    }

    #[test]
    fn test_custom_rule() {
        let validator = Validator::new()
            .field("role")
            .custom(
                |v| matches!(v.and_then(Value::as_str), Some("farmer" | "restaurant")),
                "Unknown role",
            )
            .build();

        assert!(validator.validate(&Record::new("invitations").set("role", "farmer")).is_ok());
        assert!(validator.validate(&Record::new("invitations").set("role", "admin")).is_err());
    }
}
