//! Domain models for the record matching engine.
//!
//! This module contains the data structures shared by every stage:
//!
//! - [`FieldValue`] - Scalar cell value (null, bool, integer, float, string)
//! - [`Record`] - One row: field name to [`FieldValue`]
//! - [`Dataset`] - Ordered sequence of records
//! - [`JoinMode`] - Which unmatched rows survive a keyed merge

use indexmap::{map, IndexMap};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::error::MergeError;

// =============================================================================
// Field Value
// =============================================================================

/// A single scalar value inside a [`Record`].
///
/// Serializes as a bare JSON scalar (`null`, `true`, `42`, `4.2`, `"text"`).
///
/// Equality and hashing are structural so values can key a lookup table:
/// `Integer(1)` and `Float(1.0)` are different values, and floats compare by
/// bit pattern.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Absent value (empty CSV cell, JSON `null`).
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl FieldValue {
    /// Infer a typed value from a raw text cell.
    ///
    /// Empty (after trimming) becomes [`FieldValue::Null`], `true`/`false`
    /// (any case) become booleans, then integers and floats are tried.
    /// Anything else is kept as the untrimmed string.
    pub fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return FieldValue::Null;
        }
        if trimmed.eq_ignore_ascii_case("true") {
            return FieldValue::Bool(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return FieldValue::Bool(false);
        }
        if let Ok(n) = trimmed.parse::<i64>() {
            return FieldValue::Integer(n);
        }
        // Reject "nan"/"inf" spellings: they are identifiers far more often than numbers
        if trimmed.chars().any(|c| c.is_ascii_digit()) {
            if let Ok(f) = trimmed.parse::<f64>() {
                if f.is_finite() {
                    return FieldValue::Float(f);
                }
            }
        }
        FieldValue::String(raw.to_string())
    }

    /// Borrow the string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Textual form of a non-null value.
    ///
    /// Strings are borrowed, numbers and booleans are rendered.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            FieldValue::Null => None,
            FieldValue::String(s) => Some(Cow::Borrowed(s)),
            other => Some(Cow::Owned(other.to_string())),
        }
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldValue::Null, FieldValue::Null) => true,
            (FieldValue::Bool(a), FieldValue::Bool(b)) => a == b,
            (FieldValue::Integer(a), FieldValue::Integer(b)) => a == b,
            (FieldValue::Float(a), FieldValue::Float(b)) => a.to_bits() == b.to_bits(),
            (FieldValue::String(a), FieldValue::String(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for FieldValue {}

impl Hash for FieldValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            FieldValue::Null => {}
            FieldValue::Bool(b) => b.hash(state),
            FieldValue::Integer(n) => n.hash(state),
            FieldValue::Float(f) => f.to_bits().hash(state),
            FieldValue::String(s) => s.hash(state),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Integer(n) => write!(f, "{}", n),
            FieldValue::Float(x) => write!(f, "{}", x),
            FieldValue::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Integer(n)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        FieldValue::Integer(n.into())
    }
}

impl From<f64> for FieldValue {
    fn from(x: f64) -> Self {
        FieldValue::Float(x)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

impl TryFrom<&serde_json::Value> for FieldValue {
    type Error = String;

    fn try_from(value: &serde_json::Value) -> Result<Self, Self::Error> {
        use serde_json::Value;

        match value {
            Value::Null => Ok(FieldValue::Null),
            Value::Bool(b) => Ok(FieldValue::Bool(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(FieldValue::Integer(i)),
                None => n
                    .as_f64()
                    .map(FieldValue::Float)
                    .ok_or_else(|| format!("number {} is out of range", n)),
            },
            Value::String(s) => Ok(FieldValue::String(s.clone())),
            Value::Array(_) => Err("arrays are not scalar values".to_string()),
            Value::Object(_) => Err("nested objects are not scalar values".to_string()),
        }
    }
}

// =============================================================================
// Record
// =============================================================================

/// One row of a dataset: a mapping from field name to value.
///
/// Field sets may differ between rows of the same dataset. Fields keep
/// insertion order, so a loaded row keeps its source column order; equality
/// ignores order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(IndexMap<String, FieldValue>);

impl Record {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.0.get(field)
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Set a field, returning the value it replaced.
    ///
    /// A replaced field keeps its position; a new one is appended.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Option<FieldValue> {
        self.0.insert(field.into(), value.into())
    }

    /// Overlay every field of `other` onto this record; `other` wins on collision.
    pub fn extend_from(&mut self, other: &Record) {
        for (field, value) in other.iter() {
            self.0.insert(field.clone(), value.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> map::Iter<'_, String, FieldValue> {
        self.0.iter()
    }

    /// Field names, sorted.
    pub fn field_names(&self) -> BTreeSet<&str> {
        self.0.keys().map(String::as_str).collect()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl IntoIterator for Record {
    type Item = (String, FieldValue);
    type IntoIter = map::IntoIter<String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a String, &'a FieldValue);
    type IntoIter = map::Iter<'a, String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Build a [`Record`] from `field => value` pairs.
///
/// ```
/// use recmatch::record;
///
/// let row = record! { "id" => "P-001", "age" => 25 };
/// assert_eq!(row.len(), 2);
/// ```
#[macro_export]
macro_rules! record {
    () => {
        $crate::models::Record::new()
    };
    ($($field:expr => $value:expr),+ $(,)?) => {{
        let mut row = $crate::models::Record::new();
        $( row.insert($field, $value); )+
        row
    }};
}

/// An ordered sequence of records.
pub type Dataset = Vec<Record>;

// =============================================================================
// Join Mode
// =============================================================================

/// Which unmatched rows survive a keyed horizontal merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinMode {
    /// Only keys present on both sides.
    #[default]
    Inner,
    /// Every keyed row of the left dataset.
    Left,
    /// Every keyed row of the right dataset.
    Right,
    /// Every key seen on either side.
    Outer,
}

impl JoinMode {
    pub const ALL: [JoinMode; 4] = [JoinMode::Inner, JoinMode::Left, JoinMode::Right, JoinMode::Outer];

    pub fn as_str(&self) -> &'static str {
        match self {
            JoinMode::Inner => "inner",
            JoinMode::Left => "left",
            JoinMode::Right => "right",
            JoinMode::Outer => "outer",
        }
    }
}

impl fmt::Display for JoinMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JoinMode {
    type Err = MergeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "inner" => Ok(JoinMode::Inner),
            "left" => Ok(JoinMode::Left),
            "right" => Ok(JoinMode::Right),
            "outer" => Ok(JoinMode::Outer),
            _ => Err(MergeError::InvalidArgument(format!(
                "unknown join mode '{}', expected one of: inner, left, right, outer",
                s
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn test_infer_cell_types() {
        assert_eq!(FieldValue::infer(""), FieldValue::Null);
        assert_eq!(FieldValue::infer("   "), FieldValue::Null);
        assert_eq!(FieldValue::infer("TRUE"), FieldValue::Bool(true));
        assert_eq!(FieldValue::infer("25"), FieldValue::Integer(25));
        assert_eq!(FieldValue::infer("-3"), FieldValue::Integer(-3));
        assert_eq!(FieldValue::infer("2.5"), FieldValue::Float(2.5));
        assert_eq!(FieldValue::infer("P-001"), FieldValue::String("P-001".into()));
        assert_eq!(FieldValue::infer("nan"), FieldValue::String("nan".into()));
    }

    #[test]
    fn test_integer_and_float_are_distinct_keys() {
        let mut set = HashSet::new();
        set.insert(FieldValue::Integer(1));
        set.insert(FieldValue::Float(1.0));
        set.insert(FieldValue::Integer(1));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_serde_scalars() {
        let row = record! { "id" => "P-001", "age" => 25, "cost" => 2.5, "active" => true, "note" => FieldValue::Null };
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value, json!({"id": "P-001", "age": 25, "cost": 2.5, "active": true, "note": null}));

        let back: Record = serde_json::from_value(value).unwrap();
        assert_eq!(back, row);
    }

    #[test]
    fn test_try_from_json_rejects_nested() {
        assert!(FieldValue::try_from(&json!([1, 2])).is_err());
        assert!(FieldValue::try_from(&json!({"a": 1})).is_err());
        assert_eq!(FieldValue::try_from(&json!(7)).unwrap(), FieldValue::Integer(7));
    }

    #[test]
    fn test_as_text() {
        assert_eq!(FieldValue::from("x").as_text().as_deref(), Some("x"));
        assert_eq!(FieldValue::from(42).as_text().as_deref(), Some("42"));
        assert!(FieldValue::Null.as_text().is_none());
    }

    #[test]
    fn test_extend_from_overwrites() {
        let mut a = record! { "id" => "X", "v" => 1 };
        a.extend_from(&record! { "v" => 2, "w" => 3 });
        assert_eq!(a.get("v"), Some(&FieldValue::Integer(2)));
        assert_eq!(a.len(), 3);
    }

    #[test]
    fn test_fields_keep_insertion_order() {
        let mut row = record! { "id" => "P-001", "name" => "Alice", "age" => 25 };
        row.extend_from(&record! { "name" => "Alicia", "cost" => 10 });

        let names: Vec<&str> = row.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["id", "name", "age", "cost"]);
        assert_eq!(row, record! { "cost" => 10, "age" => 25, "name" => "Alicia", "id" => "P-001" });
    }

    #[test]
    fn test_join_mode_parse() {
        assert_eq!("inner".parse::<JoinMode>().unwrap(), JoinMode::Inner);
        assert_eq!(" Outer ".parse::<JoinMode>().unwrap(), JoinMode::Outer);
        let err = "bogus".parse::<JoinMode>().unwrap_err();
        assert!(matches!(err, MergeError::InvalidArgument(ref msg) if msg.contains("bogus")));
    }

    #[test]
    fn test_join_mode_display_roundtrip() {
        for mode in JoinMode::ALL {
            assert_eq!(mode.to_string().parse::<JoinMode>().unwrap(), mode);
        }
    }
}
