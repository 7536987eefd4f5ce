//! Declarative response mapping.
//!
//! A [`Schema`] lists the fields to pick out of a raw provider mapping, where
//! to read them from and how to convert them. [`deserialize`] interprets a
//! schema against a JSON document and produces a normalized JSON record whose
//! keys are the target names. Undeclared input keys are dropped, and every
//! violation is collected before failing.

use serde_json::{Map, Number, Value};

use crate::error::ValidationError;
use crate::util::{datetime_from_iso8601, datetime_from_timestamp, format_instant};

/// Whether a service answers with one mapping or a list of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Single,
    List,
}

#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Integer,
    Float,
    String,
    /// UNIX seconds converted to a UTC instant.
    Timestamp,
    /// ISO-8601 text converted to a UTC instant.
    Iso8601,
    Nested(&'static Schema),
    List(&'static Schema),
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub target: &'static str,
    pub source: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl Field {
    pub const fn new(target: &'static str, kind: FieldKind) -> Self {
        Self {
            target,
            source: target,
            kind,
            required: false,
        }
    }

    pub const fn integer(target: &'static str) -> Self {
        Self::new(target, FieldKind::Integer)
    }

    pub const fn float(target: &'static str) -> Self {
        Self::new(target, FieldKind::Float)
    }

    pub const fn string(target: &'static str) -> Self {
        Self::new(target, FieldKind::String)
    }

    pub const fn timestamp(target: &'static str) -> Self {
        Self::new(target, FieldKind::Timestamp)
    }

    pub const fn iso8601(target: &'static str) -> Self {
        Self::new(target, FieldKind::Iso8601)
    }

    pub const fn nested(target: &'static str, schema: &'static Schema) -> Self {
        Self::new(target, FieldKind::Nested(schema))
    }

    pub const fn list(target: &'static str, schema: &'static Schema) -> Self {
        Self::new(target, FieldKind::List(schema))
    }

    /// Reads the value from a differently named input key.
    pub const fn from_key(mut self, source: &'static str) -> Self {
        self.source = source;
        self
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

#[derive(Debug)]
pub struct Schema {
    pub name: &'static str,
    pub fields: &'static [Field],
}

/// Maps `raw` through `schema`, as one record or as a list of records.
pub fn deserialize(schema: &Schema, shape: Shape, raw: &Value) -> Result<Value, ValidationError> {
    let mut errors = ValidationError::default();
    let out = match shape {
        Shape::Single => load_record(schema, raw, "", &mut errors).map(Value::Object),
        Shape::List => load_list(schema, raw, "", &mut errors),
    };
    match out {
        Some(value) if errors.is_empty() => Ok(value),
        _ => Err(errors),
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn load_list(
    schema: &Schema,
    raw: &Value,
    path: &str,
    errors: &mut ValidationError,
) -> Option<Value> {
    let Some(items) = raw.as_array() else {
        errors.push(path, format!("expected a list of `{}` records", schema.name));
        return None;
    };
    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        if let Some(record) = load_record(schema, item, &format!("{path}[{i}]"), errors) {
            out.push(Value::Object(record));
        }
    }
    Some(Value::Array(out))
}

fn load_record(
    schema: &Schema,
    raw: &Value,
    path: &str,
    errors: &mut ValidationError,
) -> Option<Map<String, Value>> {
    let Some(input) = raw.as_object() else {
        errors.push(path, format!("expected a `{}` mapping", schema.name));
        return None;
    };

    let mut record = Map::new();
    for field in schema.fields {
        let field_path = join(path, field.source);
        match input.get(field.source) {
            None | Some(Value::Null) => {
                if field.required {
                    errors.push(&field_path, "missing required field");
                }
            }
            Some(value) => {
                if let Some(converted) = convert(field.kind, value, &field_path, errors) {
                    record.insert(field.target.to_string(), converted);
                }
            }
        }
    }
    Some(record)
}

fn convert(
    kind: FieldKind,
    value: &Value,
    path: &str,
    errors: &mut ValidationError,
) -> Option<Value> {
    match kind {
        FieldKind::Integer => {
            let n = as_integer(value);
            if n.is_none() {
                errors.push(path, "not a valid integer");
            }
            n.map(Value::from)
        }
        FieldKind::Float => {
            let n = as_float(value).and_then(Number::from_f64);
            if n.is_none() {
                errors.push(path, "not a valid number");
            }
            n.map(Value::Number)
        }
        FieldKind::String => match value {
            Value::String(s) => Some(Value::String(s.clone())),
            _ => {
                errors.push(path, "not a valid string");
                None
            }
        },
        FieldKind::Timestamp => {
            let dt = as_float(value).and_then(datetime_from_timestamp);
            if dt.is_none() {
                errors.push(path, "not a valid UNIX timestamp");
            }
            dt.map(|dt| Value::String(format_instant(&dt)))
        }
        FieldKind::Iso8601 => {
            let dt = value.as_str().and_then(datetime_from_iso8601);
            if dt.is_none() {
                errors.push(path, "not a valid ISO-8601 date-time");
            }
            dt.map(|dt| Value::String(format_instant(&dt)))
        }
        FieldKind::Nested(schema) => load_record(schema, value, path, errors).map(Value::Object),
        FieldKind::List(schema) => load_list(schema, value, path, errors),
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok().filter(|f: &f64| f.is_finite()),
        _ => None,
    }
}
