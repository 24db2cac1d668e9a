//! Parse-tree values
//!
//! The structural parser lowers a lock file into a tree of [`Value`] nodes:
//! scalars at the leaves and ordered [`Map`]s at the branches. Key order
//! follows the source file, which is what makes package iteration order
//! reproducible further down the pipeline.
//!
//! Scalar coercion lives here as [`Value::from_scalar`]: the parser hands it
//! every raw value token and it decides between boolean, null, integer,
//! float, and string following the lock-file format rules.

use indexmap::IndexMap;
use serde::Serialize;

/// Ordered string-keyed mapping of nested values.
///
/// Iteration yields entries in insertion order, i.e. source-file order.
pub type Map = IndexMap<String, Value>;

/// A single node of the parsed lock-file tree
///
/// Serialization is transparent: scalars serialize as themselves and maps as
/// ordered JSON objects, so a parsed tree can be exported with
/// `serde_json::to_string` without any wrapper tags.
///
/// # Examples
///
/// ```rust
/// use yarn_lock::Value;
///
/// assert_eq!(Value::from_scalar("true"), Value::Bool(true));
/// assert_eq!(Value::from_scalar("\"true\""), Value::String("true".into()));
/// assert_eq!(Value::from_scalar("13.37"), Value::Float(13.37));
/// assert_eq!(Value::from_scalar("12.13.14"), Value::String("12.13.14".into()));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Literal `true` or `false`.
    Bool(bool),
    /// Literal `null`.
    Null,
    /// Whole number without leading zeros, optionally signed.
    Integer(i64),
    /// Decimal or exponent-form number that is not an integer token.
    Float(f64),
    /// Quoted span or any token no other rule claimed.
    String(String),
    /// Nested block opened by a colon-terminated line.
    Map(Map),
}

impl Value {
    /// Decodes a raw value token into a typed scalar.
    ///
    /// Rules, in order: the literals `true`/`false`/`null`; a fully
    /// double-quoted span (quotes stripped, no escape processing); an integer;
    /// a float; otherwise the raw string. Integer parsing rejects leading
    /// zeros, so `042` falls through to the float rule; float parsing is only
    /// attempted for tokens containing a digit, so `inf` and `nan` stay
    /// strings.
    #[must_use]
    pub fn from_scalar(raw: &str) -> Self {
        match raw {
            "true" => return Self::Bool(true),
            "false" => return Self::Bool(false),
            "null" => return Self::Null,
            _ => {}
        }
        if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
            return Self::String(raw[1..raw.len() - 1].to_string());
        }
        if let Some(n) = parse_integer(raw) {
            return Self::Integer(n);
        }
        if raw.bytes().any(|b| b.is_ascii_digit()) {
            if let Ok(f) = raw.parse::<f64>() {
                return Self::Float(f);
            }
        }
        Self::String(raw.to_string())
    }

    /// Returns the boolean if this is a [`Value::Bool`].
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer if this is a [`Value::Integer`].
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the float if this is a [`Value::Float`].
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the string slice if this is a [`Value::String`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the nested map if this is a [`Value::Map`].
    #[must_use]
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Whether this is the `null` literal.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Looks up `key` when this is a map; `None` for scalars.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Map(map) => map.get(key),
            _ => None,
        }
    }
}

fn parse_integer(raw: &str) -> Option<i64> {
    let digits = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    raw.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerces_literals() {
        assert_eq!(Value::from_scalar("true"), Value::Bool(true));
        assert_eq!(Value::from_scalar("false"), Value::Bool(false));
        assert_eq!(Value::from_scalar("null"), Value::Null);
        assert_eq!(Value::from_scalar("TRUE"), Value::String("TRUE".into()));
    }

    #[test]
    fn coerces_quoted_spans_without_escape_processing() {
        assert_eq!(Value::from_scalar("\"true\""), Value::String("true".into()));
        assert_eq!(
            Value::from_scalar("\"1.2.3 || >=2.0\""),
            Value::String("1.2.3 || >=2.0".into())
        );
        // A lone quote is not a quoted span.
        assert_eq!(Value::from_scalar("\""), Value::String("\"".into()));
    }

    #[test]
    fn coerces_numbers() {
        assert_eq!(Value::from_scalar("42"), Value::Integer(42));
        assert_eq!(Value::from_scalar("+5"), Value::Integer(5));
        assert_eq!(Value::from_scalar("-17"), Value::Integer(-17));
        assert_eq!(Value::from_scalar("13.37"), Value::Float(13.37));
        assert_eq!(Value::from_scalar("1e3"), Value::Float(1000.0));
    }

    #[test]
    fn leading_zero_is_not_an_integer() {
        assert_eq!(Value::from_scalar("0"), Value::Integer(0));
        assert_eq!(Value::from_scalar("042"), Value::Float(42.0));
    }

    #[test]
    fn digit_less_tokens_stay_strings() {
        assert_eq!(Value::from_scalar("inf"), Value::String("inf".into()));
        assert_eq!(Value::from_scalar("nan"), Value::String("nan".into()));
        assert_eq!(
            Value::from_scalar("string string"),
            Value::String("string string".into())
        );
    }

    #[test]
    fn version_like_tokens_stay_strings() {
        assert_eq!(Value::from_scalar("12.13.14"), Value::String("12.13.14".into()));
        assert_eq!(Value::from_scalar("^1.0.0"), Value::String("^1.0.0".into()));
    }

    #[test]
    fn accessors_match_variants() {
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Integer(7).as_i64(), Some(7));
        assert_eq!(Value::Float(0.5).as_f64(), Some(0.5));
        assert_eq!(Value::String("x".into()).as_str(), Some("x"));
        assert!(Value::Null.is_null());
        assert_eq!(Value::Null.as_str(), None);
        assert_eq!(Value::Integer(7).as_map(), None);
    }

    #[test]
    fn map_lookup_through_get() {
        let mut map = Map::new();
        map.insert("version".to_string(), Value::String("1.0.3".to_string()));
        let value = Value::Map(map);
        assert_eq!(value.get("version").and_then(Value::as_str), Some("1.0.3"));
        assert_eq!(value.get("missing"), None);
        assert_eq!(Value::Integer(1).get("version"), None);
    }

    #[test]
    fn serializes_transparently() {
        let mut inner = Map::new();
        inner.insert("js-tokens".to_string(), Value::String("^4.0.0".to_string()));
        let mut map = Map::new();
        map.insert("version".to_string(), Value::String("1.4.0".to_string()));
        map.insert("flagged".to_string(), Value::Bool(false));
        map.insert("extra".to_string(), Value::Null);
        map.insert("dependencies".to_string(), Value::Map(inner));
        let json = serde_json::to_value(Value::Map(map)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "version": "1.4.0",
                "flagged": false,
                "extra": null,
                "dependencies": { "js-tokens": "^4.0.0" }
            })
        );
    }
}
