//! Raw field-value collections.
//!
//! Facts collected from a device arrive as loosely typed `(field, value)`
//! pairs before they are validated into typed state.

/// Key-value tuple representing a field and its value.
pub type FieldValue = (String, String);

/// Collection of field-value pairs for one entry.
pub type FieldValues = Vec<FieldValue>;

/// Helper trait for working with field-value collections.
pub trait FieldValuesExt {
    /// Gets the value for a field, if present.
    fn get_field(&self, field: &str) -> Option<&str>;

    /// Sets a field, replacing an existing value.
    fn set_field(&mut self, field: &str, value: impl Into<String>);
}

impl FieldValuesExt for FieldValues {
    fn get_field(&self, field: &str) -> Option<&str> {
        self.iter()
            .find(|(f, _)| f == field)
            .map(|(_, v)| v.as_str())
    }

    fn set_field(&mut self, field: &str, value: impl Into<String>) {
        let value = value.into();
        match self.iter_mut().find(|(f, _)| f == field) {
            Some(entry) => entry.1 = value,
            None => self.push((field.to_string(), value)),
        }
    }
}

/// Builds a FieldValues collection from key-value pairs.
#[macro_export]
macro_rules! field_values {
    ($($field:expr => $value:expr),* $(,)?) => {
        vec![
            $(($field.to_string(), $value.to_string()),)*
        ]
    };
}
