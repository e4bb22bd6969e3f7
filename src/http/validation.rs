//! Request body decoding pipeline.
//!
//! # Responsibilities
//! - Coerce primitive values toward the declared field kinds
//! - Strip fields the target type does not declare (whitelist semantics)
//! - Tolerate absent fields unless required checks are switched on
//! - Produce typed DTOs for handlers, or a structured client error
//!
//! # Design Decisions
//! - Ordinary functions run in a fixed order, driven by `ValidationOptions`;
//!   no reflection, no attribute magic
//! - Structural checks only: the gateway does not evaluate business rules.
//!   The `custom_rules` hook exists but stays disabled by default
//! - Rejection affects the single request; process state is untouched

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::ValidationOptions;
use crate::error::ApiError;

/// Declared kind of a body field, used for coercion and type checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Integer,
    Float,
    Boolean,
    Object,
    Array,
}

/// One declared field of a request body.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }
}

/// A request body type with a declared field list.
///
/// The field list is the whitelist: anything not named here is stripped
/// before deserialization.
pub trait Decode: DeserializeOwned {
    const FIELDS: &'static [FieldSpec];

    /// Business-rule hook. Only runs when
    /// [`ValidationOptions::run_custom_rules`] is set, which the gateway
    /// leaves off.
    fn custom_rules(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Error type for request decoding.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("request body must be a JSON object")]
    NotAnObject,

    #[error("invalid JSON: {0}")]
    Syntax(#[from] serde_json::Error),

    #[error("could not read request body: {0}")]
    Body(String),

    #[error("missing required field: {name}")]
    MissingField { name: &'static str },

    #[error("field '{name}' must be a {expected}")]
    TypeMismatch {
        name: &'static str,
        expected: &'static str,
    },

    #[error("rule violation: {0}")]
    Rule(String),
}

/// Decode a raw JSON value into `T`, applying the configured pipeline.
pub fn decode<T: Decode>(raw: Value, options: &ValidationOptions) -> Result<T, DecodeError> {
    let Value::Object(mut map) = raw else {
        return Err(DecodeError::NotAnObject);
    };

    if options.strip_unknown_fields {
        strip_unknown(&mut map, T::FIELDS);
    }
    if options.coerce_primitives {
        coerce(&mut map, T::FIELDS)?;
    }
    if !options.skip_missing_properties {
        check_required(&map, T::FIELDS)?;
    }

    let decoded: T = serde_json::from_value(Value::Object(map))?;

    if options.run_custom_rules {
        decoded.custom_rules().map_err(DecodeError::Rule)?;
    }
    Ok(decoded)
}

fn strip_unknown(map: &mut Map<String, Value>, fields: &[FieldSpec]) {
    map.retain(|key, _| fields.iter().any(|field| field.name == key));
}

fn coerce(map: &mut Map<String, Value>, fields: &[FieldSpec]) -> Result<(), DecodeError> {
    for field in fields {
        let Some(value) = map.get_mut(field.name) else {
            continue;
        };
        if value.is_null() {
            continue;
        }
        if let Some(coerced) = coerce_value(value, field)? {
            *value = coerced;
        }
    }
    Ok(())
}

/// Returns the replacement value, or `None` when the value already matches.
fn coerce_value(value: &Value, field: &FieldSpec) -> Result<Option<Value>, DecodeError> {
    match field.kind {
        FieldKind::String => match value {
            Value::String(_) => Ok(None),
            Value::Number(n) => Ok(Some(Value::String(n.to_string()))),
            Value::Bool(b) => Ok(Some(Value::String(b.to_string()))),
            _ => Err(mismatch(field, "string")),
        },
        FieldKind::Integer => match value {
            Value::Number(n) if n.is_i64() || n.is_u64() => Ok(None),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(|n| Some(Value::from(n)))
                .map_err(|_| mismatch(field, "integer")),
            _ => Err(mismatch(field, "integer")),
        },
        FieldKind::Float => match value {
            Value::Number(_) => Ok(None),
            Value::String(s) => {
                let parsed = s.trim().parse::<f64>().map_err(|_| mismatch(field, "number"))?;
                serde_json::Number::from_f64(parsed)
                    .map(|n| Some(Value::Number(n)))
                    .ok_or_else(|| mismatch(field, "number"))
            }
            _ => Err(mismatch(field, "number")),
        },
        FieldKind::Boolean => match value {
            Value::Bool(_) => Ok(None),
            Value::String(s) => match s.trim() {
                "true" | "1" => Ok(Some(Value::Bool(true))),
                "false" | "0" => Ok(Some(Value::Bool(false))),
                _ => Err(mismatch(field, "boolean")),
            },
            _ => Err(mismatch(field, "boolean")),
        },
        FieldKind::Object => {
            if value.is_object() {
                Ok(None)
            } else {
                Err(mismatch(field, "object"))
            }
        }
        FieldKind::Array => {
            if value.is_array() {
                Ok(None)
            } else {
                Err(mismatch(field, "array"))
            }
        }
    }
}

fn mismatch(field: &FieldSpec, expected: &'static str) -> DecodeError {
    DecodeError::TypeMismatch {
        name: field.name,
        expected,
    }
}

fn check_required(map: &Map<String, Value>, fields: &[FieldSpec]) -> Result<(), DecodeError> {
    for field in fields.iter().filter(|f| f.required) {
        match map.get(field.name) {
            None | Some(Value::Null) => {
                return Err(DecodeError::MissingField { name: field.name })
            }
            Some(_) => {}
        }
    }
    Ok(())
}

/// Extractor running the decoding pipeline on the request body.
///
/// Validation options come from the request extensions (installed as a
/// middleware at composition time); defaults apply when absent.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: Decode,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let options = req
            .extensions()
            .get::<ValidationOptions>()
            .cloned()
            .unwrap_or_default();

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| DecodeError::Body(e.to_string()))?;
        let raw: Value = serde_json::from_slice(&bytes).map_err(DecodeError::Syntax)?;

        Ok(ValidatedJson(decode(raw, &options)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct CreateOrder {
        sku: String,
        quantity: i64,
        note: Option<String>,
    }

    impl Decode for CreateOrder {
        const FIELDS: &'static [FieldSpec] = &[
            FieldSpec::required("sku", FieldKind::String),
            FieldSpec::required("quantity", FieldKind::Integer),
            FieldSpec::optional("note", FieldKind::String),
        ];

        fn custom_rules(&self) -> Result<(), String> {
            if self.quantity <= 0 {
                return Err("quantity must be positive".to_string());
            }
            Ok(())
        }
    }

    #[test]
    fn unknown_fields_are_stripped() {
        let raw = json!({"sku": "A-1", "quantity": 2, "admin": true});
        let order: CreateOrder = decode(raw, &ValidationOptions::default()).unwrap();
        assert_eq!(order.sku, "A-1");
    }

    #[test]
    fn primitives_are_coerced() {
        let raw = json!({"sku": 42, "quantity": "3"});
        let order: CreateOrder = decode(raw, &ValidationOptions::default()).unwrap();
        assert_eq!(order.sku, "42");
        assert_eq!(order.quantity, 3);
    }

    #[test]
    fn uncoercible_values_are_rejected() {
        let raw = json!({"sku": "A-1", "quantity": "lots"});
        let err = decode::<CreateOrder>(raw, &ValidationOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::TypeMismatch { name: "quantity", .. }
        ));
    }

    #[test]
    fn missing_optional_fields_pass() {
        let raw = json!({"sku": "A-1", "quantity": 2});
        let order: CreateOrder = decode(raw, &ValidationOptions::default()).unwrap();
        assert!(order.note.is_none());
    }

    #[test]
    fn required_checks_only_run_when_enabled() {
        let raw = json!({"quantity": 1});
        let strict = ValidationOptions {
            skip_missing_properties: false,
            ..ValidationOptions::default()
        };
        let err = decode::<CreateOrder>(raw, &strict).unwrap_err();
        assert!(matches!(err, DecodeError::MissingField { name: "sku" }));
    }

    #[test]
    fn custom_rules_stay_off_by_default() {
        let raw = json!({"sku": "A-1", "quantity": -5});
        assert!(decode::<CreateOrder>(raw.clone(), &ValidationOptions::default()).is_ok());

        let with_rules = ValidationOptions {
            run_custom_rules: true,
            ..ValidationOptions::default()
        };
        let err = decode::<CreateOrder>(raw, &with_rules).unwrap_err();
        assert!(matches!(err, DecodeError::Rule(_)));
    }

    #[test]
    fn non_object_bodies_are_rejected() {
        let err = decode::<CreateOrder>(json!([1, 2]), &ValidationOptions::default()).unwrap_err();
        assert!(matches!(err, DecodeError::NotAnObject));
    }
}
