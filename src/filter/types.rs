use serde_json::Value;

use super::error::FilterError;

/// Raw query-string pairs in the order the caller sent them.
pub type QueryPairs = Vec<(String, String)>;

/// A per-entity search filter: parsed from query pairs, then turned into a
/// WHERE predicate.
pub trait SearchFilter: Sized {
    /// Coerce recognized keys into typed criteria; unrecognized keys are skipped.
    fn from_pairs(pairs: &[(String, String)]) -> Result<Self, FilterError>;

    fn build(&self) -> Result<Predicate, FilterError>;
}

/// Conditions joined by `AND`, with values bound by position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    conditions: Vec<String>,
    params: Vec<Value>,
}

impl Predicate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a bound value and return its placeholder.
    pub fn param(&mut self, value: Value) -> String {
        self.params.push(value);
        format!("${}", self.params.len())
    }

    pub fn push(&mut self, condition: String) {
        self.conditions.push(condition);
    }

    /// Empty predicates must not be used as a WHERE clause.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn conditions(&self) -> &[String] {
        &self.conditions
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn clause(&self) -> String {
        self.conditions.join(" AND ")
    }

    pub fn into_params(self) -> Vec<Value> {
        self.params
    }
}

pub(crate) fn parse_count(key: &str, value: &str) -> Result<i64, FilterError> {
    match value.trim().parse::<i64>() {
        Ok(n) if n >= 0 => Ok(n),
        _ => Err(invalid(key, value)),
    }
}

pub(crate) fn parse_flag(key: &str, value: &str) -> Result<bool, FilterError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(invalid(key, value)),
    }
}

/// Wrap a caller value for a case-insensitive "contains" match.
pub(crate) fn contains_pattern(value: &str) -> Value {
    Value::String(format!("%{}%", value))
}

/// Fail when a recognized key appears twice.
pub(crate) fn ensure_unique(seen: &mut Vec<&'static str>, key: &'static str) -> Result<(), FilterError> {
    if seen.contains(&key) {
        return Err(FilterError::DuplicateKey(key.to_string()));
    }
    seen.push(key);
    Ok(())
}

fn invalid(key: &str, value: &str) -> FilterError {
    FilterError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn placeholders_follow_param_order() {
        let mut p = Predicate::new();
        let a = p.param(json!("x"));
        let b = p.param(json!(2));
        assert_eq!(a, "$1");
        assert_eq!(b, "$2");
        assert_eq!(p.params(), &[json!("x"), json!(2)]);
    }

    #[test]
    fn clause_joins_with_and() {
        let mut p = Predicate::new();
        assert!(p.is_empty());
        p.push("a = 1".into());
        p.push("b = 2".into());
        assert_eq!(p.clause(), "a = 1 AND b = 2");
    }

    #[test]
    fn counts_must_be_non_negative_integers() {
        assert_eq!(parse_count("minEmployees", "10"), Ok(10));
        assert!(parse_count("minEmployees", "-1").is_err());
        assert!(parse_count("minEmployees", "ten").is_err());
        assert!(parse_count("minEmployees", "1.5").is_err());
    }

    #[test]
    fn flags_accept_only_booleans() {
        assert_eq!(parse_flag("hasEquity", "TRUE"), Ok(true));
        assert_eq!(parse_flag("hasEquity", "false"), Ok(false));
        assert!(parse_flag("hasEquity", "yes").is_err());
    }
}
