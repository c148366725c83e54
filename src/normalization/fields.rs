//! Field-level coercion shared by card and face normalization.
//!
//! Source records are loosely typed JSON objects. [`RawFields`] is the parsing
//! step: every accessor reports `Ok(None)` for an absent (or `null`) key,
//! `Ok(Some(..))` for a usable value and `Err(FieldIssue)` for a value of the
//! wrong shape. The flatteners below then map those tagged values onto the
//! fixed column representation.
use itertools::Itertools;
use serde_json::{Map, Value};

/// Separator for multi-valued columns (`colors`, `keywords`, ...).
pub const LIST_SEPARATOR: &str = ",";

/// A key that was present but could not be coerced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: String,
    pub reason: String,
}

impl FieldIssue {
    fn new(field: &str, reason: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Typed view over one JSON object.
#[derive(Debug, Clone, Copy)]
pub struct RawFields<'a> {
    obj: &'a Map<String, Value>,
}

impl<'a> RawFields<'a> {
    pub fn new(obj: &'a Map<String, Value>) -> Self {
        Self { obj }
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        match self.obj.get(key) {
            None | Some(Value::Null) => None,
            Some(v) => Some(v),
        }
    }

    /// Text column. Numbers are rendered to their JSON text so a numeric
    /// `loyalty` and a string `"3"` land identically.
    pub fn text(&self, key: &str) -> Result<Option<String>, FieldIssue> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(other) => Err(FieldIssue::new(
                key,
                format!("expected string, found {}", type_name(other)),
            )),
        }
    }

    /// Required text: absent, `null` and whitespace-only all count as missing.
    pub fn required_text(&self, key: &str) -> Result<Option<String>, FieldIssue> {
        Ok(self.text(key)?.filter(|s| !s.trim().is_empty()))
    }

    /// Finite real. `"NaN"` and `"inf"` parse as `f64` but have no column value.
    pub fn number(&self, key: &str) -> Result<Option<f64>, FieldIssue> {
        let value = match self.get(key) {
            None => return Ok(None),
            Some(Value::Number(n)) => n
                .as_f64()
                .ok_or_else(|| FieldIssue::new(key, "number out of range"))?,
            Some(Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| FieldIssue::new(key, format!("non-numeric string {s:?}")))?,
            Some(other) => {
                return Err(FieldIssue::new(
                    key,
                    format!("expected number, found {}", type_name(other)),
                ))
            }
        };
        if !value.is_finite() {
            return Err(FieldIssue::new(key, "non-finite number"));
        }
        Ok(Some(value))
    }

    /// Integer column. Whole-valued floats (`1.0`) are accepted.
    pub fn integer(&self, key: &str) -> Result<Option<i64>, FieldIssue> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| {
                    n.as_f64()
                        .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                        .map(|f| f as i64)
                })
                .map(Some)
                .ok_or_else(|| FieldIssue::new(key, format!("expected integer, found {n}"))),
            Some(other) => Err(FieldIssue::new(
                key,
                format!("expected integer, found {}", type_name(other)),
            )),
        }
    }

    /// Boolean flag. Accepts JSON booleans and the integers 0/1.
    pub fn flag(&self, key: &str) -> Result<Option<bool>, FieldIssue> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(Value::Number(n)) => match n.as_i64() {
                Some(0) => Ok(Some(false)),
                Some(1) => Ok(Some(true)),
                _ => Err(FieldIssue::new(key, format!("expected boolean, found {n}"))),
            },
            Some(other) => Err(FieldIssue::new(
                key,
                format!("expected boolean, found {}", type_name(other)),
            )),
        }
    }

    /// List of strings. `Some(vec![])` (present but empty) is kept distinct
    /// from `None` (absent) here; the flattener collapses both.
    pub fn list(&self, key: &str) -> Result<Option<Vec<String>>, FieldIssue> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(FieldIssue::new(
                        key,
                        format!("list element must be string, found {}", type_name(other)),
                    )),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Some),
            Some(other) => Err(FieldIssue::new(
                key,
                format!("expected array, found {}", type_name(other)),
            )),
        }
    }

    /// Nested list of objects kept raw (`card_faces`).
    pub fn objects(&self, key: &str) -> Result<Option<Vec<Value>>, FieldIssue> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Array(items)) => Ok(Some(items.clone())),
            Some(other) => Err(FieldIssue::new(
                key,
                format!("expected array, found {}", type_name(other)),
            )),
        }
    }
}

/// Join a multi-valued field in source order. Absent and empty both give `""`.
pub fn flatten_list(values: Option<&[String]>) -> String {
    values
        .map(|v| v.iter().join(LIST_SEPARATOR))
        .unwrap_or_default()
}

/// Map a flag onto the 0/1 integer domain, absent = 0.
pub fn flag_to_int(value: Option<bool>) -> i64 {
    i64::from(value.unwrap_or(false))
}
