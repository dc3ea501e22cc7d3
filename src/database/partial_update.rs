use serde_json::{Map, Number, Value};
use thiserror::Error;

use super::columns::ColumnMapping;
use super::manager::quote_identifier;

#[derive(Debug, Error, PartialEq)]
pub enum UpdateError {
    #[error("No data")]
    NoData,

    #[error("Field '{0}' cannot be updated")]
    ImmutableField(String),

    #[error("Unknown field '{0}'")]
    UnknownField(String),

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// `SET` assignments plus the values bound to them, position for position.
#[derive(Debug, Clone, PartialEq)]
pub struct SetClause {
    pub clause: String,
    pub params: Vec<Value>,
}

impl SetClause {
    /// Placeholder index for the first parameter after the assignments.
    pub fn next_param(&self) -> usize {
        self.params.len() + 1
    }
}

/// Build `"col1"=$1, "col2"=$2, ...` from a partial update, in key order.
///
/// Only key names (through `mapping`) reach the SQL text; every value is
/// returned for binding.
pub fn build_partial_update(data: &Map<String, Value>, mapping: &ColumnMapping) -> Result<SetClause, UpdateError> {
    if data.is_empty() {
        return Err(UpdateError::NoData);
    }

    let mut fragments = Vec::with_capacity(data.len());
    let mut params = Vec::with_capacity(data.len());
    for (idx, (key, value)) in data.iter().enumerate() {
        fragments.push(format!("{}=${}", quote_identifier(mapping.resolve(key)), idx + 1));
        params.push(value.clone());
    }

    Ok(SetClause {
        clause: fragments.join(", "),
        params,
    })
}

/// Accepted shape of a single updatable field.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// String with length bounds (inclusive).
    Text { min: usize, max: usize },
    /// String or null.
    NullableText,
    /// Absolute URL or null.
    Url,
    Email,
    NonNegativeInt,
    /// Number in `[0, 1]`; numeric strings are accepted and normalized to an
    /// `f64`, so digits past double precision are dropped on write.
    Fraction,
}

/// Per-entity allow-list consulted before building an update.
#[derive(Debug, Clone, Copy)]
pub struct UpdatePolicy {
    pub mutable: &'static [(&'static str, FieldKind)],
    pub immutable: &'static [&'static str],
}

impl UpdatePolicy {
    /// Reject forbidden or unknown fields and malformed values, returning the
    /// data with values normalized and key order preserved.
    pub fn check(&self, data: Map<String, Value>) -> Result<Map<String, Value>, UpdateError> {
        if data.is_empty() {
            return Err(UpdateError::NoData);
        }

        let mut checked = Map::with_capacity(data.len());
        for (key, value) in data {
            if self.immutable.contains(&key.as_str()) {
                return Err(UpdateError::ImmutableField(key));
            }
            let kind = self
                .mutable
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, kind)| *kind)
                .ok_or_else(|| UpdateError::UnknownField(key.clone()))?;
            let value = kind.check(&key, value)?;
            checked.insert(key, value);
        }
        Ok(checked)
    }
}

impl FieldKind {
    pub fn check(self, field: &str, value: Value) -> Result<Value, UpdateError> {
        let invalid = |reason: &str| UpdateError::InvalidValue {
            field: field.to_string(),
            reason: reason.to_string(),
        };

        match self {
            FieldKind::Text { min, max } => match &value {
                Value::String(s) if (min..=max).contains(&s.chars().count()) => Ok(value),
                Value::String(_) => Err(invalid(&format!("length must be between {} and {}", min, max))),
                _ => Err(invalid("expected a string")),
            },
            FieldKind::NullableText => match value {
                Value::String(_) | Value::Null => Ok(value),
                _ => Err(invalid("expected a string or null")),
            },
            FieldKind::Url => match &value {
                Value::Null => Ok(value),
                Value::String(s) if url::Url::parse(s).is_ok() => Ok(value),
                _ => Err(invalid("expected a URL")),
            },
            FieldKind::Email => match &value {
                Value::String(s) if is_plausible_email(s) => Ok(value),
                _ => Err(invalid("expected an email address")),
            },
            FieldKind::NonNegativeInt => match &value {
                Value::Number(n) if n.as_u64().is_some_and(|v| v <= i32::MAX as u64) => Ok(value),
                _ => Err(invalid("expected a non-negative integer")),
            },
            FieldKind::Fraction => {
                let parsed = match &value {
                    Value::Number(n) => n.as_f64(),
                    Value::String(s) => s.trim().parse::<f64>().ok(),
                    _ => None,
                };
                match parsed {
                    Some(f) if (0.0..=1.0).contains(&f) => Number::from_f64(f)
                        .map(Value::Number)
                        .ok_or_else(|| invalid("expected a number between 0 and 1")),
                    _ => Err(invalid("expected a number between 0 and 1")),
                }
            }
        }
    }
}

fn is_plausible_email(s: &str) -> bool {
    let len = s.chars().count();
    if !(6..=60).contains(&len) {
        return false;
    }
    match s.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.'),
        None => false,
    }
}

/// `UPDATE <table> SET <assignments> WHERE <key> = $<next> RETURNING <columns>`
pub fn update_statement(table: &str, set: &SetClause, key_column: &str, returning: &str) -> String {
    format!(
        "UPDATE {} SET {} WHERE {} = ${} RETURNING {}",
        quote_identifier(table),
        set.clause,
        quote_identifier(key_column),
        set.next_param(),
        returning
    )
}
