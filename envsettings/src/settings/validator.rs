//! Validation of consolidated settings.
//!
//! This is the boundary after resolution: defaults are applied, required
//! fields checked, unknown keys handled per the extra-key policy, and raw
//! text coerced to each field's declared kind.

use serde_json::{Map, Number, Value};

use crate::error::{Error, Result};
use crate::settings::config::ExtraPolicy;
use crate::settings::field::{FieldDescriptor, FieldKind};
use crate::settings::schema::SettingsSchema;

/// Validates consolidated mappings against a schema.
///
/// # Examples
///
/// ```
/// use envsettings::settings::{FieldDefinition, FieldKind, SettingsConfig, SettingsSchema, SettingsValidator};
/// use serde_json::json;
///
/// let schema = SettingsSchema::prepare(
///     vec![FieldDefinition::new("port").with_kind(FieldKind::Integer)],
///     SettingsConfig::new(),
/// )
/// .unwrap();
///
/// let raw = json!({"port": "8080"}).as_object().unwrap().clone();
/// let validated = SettingsValidator::validate(&schema, raw).unwrap();
/// assert_eq!(validated["port"], 8080);
/// ```
pub struct SettingsValidator;

impl SettingsValidator {
    /// Validate a consolidated mapping.
    ///
    /// The result lists declared fields in declaration order, followed by
    /// any extra keys kept under [`ExtraPolicy::Allow`].
    ///
    /// # Errors
    ///
    /// - [`Error::ExtraField`] for an unknown key under [`ExtraPolicy::Forbid`]
    /// - [`Error::MissingField`] for a required field without value or default
    /// - [`Error::Validation`] for a value that cannot be coerced, or for
    ///   keys that match the same field only by case and carry different
    ///   values
    pub fn validate(
        schema: &SettingsSchema,
        consolidated: Map<String, Value>,
    ) -> Result<Map<String, Value>> {
        let case_sensitive = schema.config().case_sensitive();
        let mut supplied: Vec<Option<(String, Value)>> = vec![None; schema.fields().len()];
        let mut extras = Map::new();

        for (key, value) in consolidated {
            match Self::field_index(schema.fields(), &key, case_sensitive) {
                Some(index) => {
                    if let Some((previous, existing)) = &supplied[index] {
                        if *existing != value {
                            return Err(Error::Validation {
                                field: schema.fields()[index].alias().to_string(),
                                message: format!("keys '{previous}' and '{key}' differ only by case"),
                            });
                        }
                    }
                    supplied[index] = Some((key, value));
                }
                None => match schema.config().extra() {
                    ExtraPolicy::Forbid => return Err(Error::ExtraField { field: key }),
                    ExtraPolicy::Ignore => {}
                    ExtraPolicy::Allow => {
                        extras.insert(key, value);
                    }
                },
            }
        }

        let mut result = Map::new();
        for (field, value) in schema.fields().iter().zip(supplied) {
            let value = match value {
                Some((_, value)) => Self::coerce(schema, field, value)?,
                None => match field.default_value() {
                    Some(default) => default.clone(),
                    None if field.is_required() => {
                        return Err(Error::MissingField {
                            field: field.alias().to_string(),
                        })
                    }
                    None => continue,
                },
            };
            result.insert(field.alias().to_string(), value);
        }

        result.extend(extras);
        Ok(result)
    }

    /// Find the field a key belongs to.
    ///
    /// Case-insensitive schemas also match keys that differ from an alias
    /// only by case, since auxiliary sources are lower-cased.
    fn field_index(fields: &[FieldDescriptor], key: &str, case_sensitive: bool) -> Option<usize> {
        fields.iter().position(|f| f.alias() == key).or_else(|| {
            if case_sensitive {
                None
            } else {
                let key = key.to_lowercase();
                fields.iter().position(|f| f.alias().to_lowercase() == key)
            }
        })
    }

    /// Coerce a value to the field's declared kind.
    fn coerce(schema: &SettingsSchema, field: &FieldDescriptor, value: Value) -> Result<Value> {
        let invalid = |message: String| Error::Validation {
            field: field.alias().to_string(),
            message,
        };

        match (field.kind(), value) {
            (FieldKind::String, Value::String(s)) => Ok(Value::String(s)),
            (FieldKind::String, Value::Number(n)) => Ok(Value::String(n.to_string())),
            (FieldKind::String, Value::Bool(b)) => Ok(Value::String(b.to_string())),

            (FieldKind::Integer, Value::Number(n)) if n.is_i64() || n.is_u64() => {
                Ok(Value::Number(n))
            }
            (FieldKind::Integer, Value::String(s)) => s
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| invalid(format!("invalid integer: '{s}'"))),

            (FieldKind::Float, Value::Number(n)) => Ok(Value::Number(n)),
            (FieldKind::Float, Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| invalid(format!("invalid float: '{s}'"))),

            (FieldKind::Boolean, Value::Bool(b)) => Ok(Value::Bool(b)),
            (FieldKind::Boolean, Value::String(s)) => {
                Self::parse_bool(&s).map(Value::Bool).ok_or_else(|| {
                    invalid(format!(
                        "Invalid boolean value: '{s}' (expected true/false/1/0/yes/no/on/off)"
                    ))
                })
            }

            (FieldKind::Complex, Value::String(s)) => schema
                .decoder()
                .decode(&s)
                .map_err(|e| invalid(format!("invalid structured value: {e}"))),
            (FieldKind::Complex, value) => Ok(value),

            (kind, value) => Err(invalid(format!(
                "expected {}, got {value}",
                format!("{kind:?}").to_lowercase()
            ))),
        }
    }

    /// Parse a boolean value from a string.
    ///
    /// Accepts: true/1/yes/on for true, false/0/no/off for false (case-insensitive).
    fn parse_bool(s: &str) -> Option<bool> {
        match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => None,
        }
    }
}
