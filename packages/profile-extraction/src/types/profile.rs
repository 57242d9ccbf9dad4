//! The structured person profile produced by a successful run.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ParseError;

/// Field names the prompt asks the model to fill.
pub const PROFILE_FIELDS: [&str; 6] = ["name", "age", "job", "location", "education", "interests"];

/// A parsed profile object.
///
/// This is exactly the JSON object the model returned: field order is kept,
/// unknown fields are preserved, and no field is required. Validity means
/// "is a JSON object", not "is complete".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileRecord(IndexMap<String, Value>);

impl ProfileRecord {
    /// Parse a JSON object from text.
    ///
    /// Any valid JSON that is not an object is rejected.
    pub fn parse(json: &str) -> Result<Self, ParseError> {
        match serde_json::from_str::<Value>(json)? {
            Value::Object(map) => Ok(Self(map.into_iter().collect())),
            other => Err(ParseError::NotAnObject {
                kind: json_kind(&other),
            }),
        }
    }

    /// Get any field by name.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn name(&self) -> Option<&str> {
        self.str_field("name")
    }

    /// Age as text. Models return both `"30"` and `30`.
    pub fn age(&self) -> Option<String> {
        match self.0.get("age")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn job(&self) -> Option<&str> {
        self.str_field("job")
    }

    pub fn location(&self) -> Option<&str> {
        self.str_field("location")
    }

    pub fn education(&self) -> Option<&str> {
        self.str_field("education")
    }

    /// Interests list; non-string entries are skipped.
    pub fn interests(&self) -> Vec<&str> {
        match self.0.get("interests") {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            Some(Value::String(single)) => vec![single.as_str()],
            _ => Vec::new(),
        }
    }

    /// Fields present that the prompt did not ask for.
    pub fn extra_fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0
            .iter()
            .filter(|(key, _)| !PROFILE_FIELDS.contains(&key.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate fields in the order the model emitted them.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Convert into a plain JSON value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0.into_iter().collect())
    }

    fn str_field(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recognized_fields() {
        let record = ProfileRecord::parse(
            r#"{"name": "Ada", "age": 36, "job": "Analyst", "interests": ["math", "poetry"]}"#,
        )
        .unwrap();

        assert_eq!(record.name(), Some("Ada"));
        assert_eq!(record.age(), Some("36".to_string()));
        assert_eq!(record.job(), Some("Analyst"));
        assert_eq!(record.location(), None);
        assert_eq!(record.interests(), vec!["math", "poetry"]);
    }

    #[test]
    fn test_extra_fields_preserved_in_order() {
        let record = ProfileRecord::parse(r#"{"zeta": 1, "name": "Ada", "alpha": true}"#).unwrap();

        let keys: Vec<_> = record.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "name", "alpha"]);

        let extras: Vec<_> = record.extra_fields().map(|(k, _)| k.as_str()).collect();
        assert_eq!(extras, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_empty_object_is_valid() {
        let record = ProfileRecord::parse("{}").unwrap();
        assert!(record.is_empty());
    }

    #[test]
    fn test_non_object_rejected() {
        let err = ProfileRecord::parse("[1, 2]").unwrap_err();
        assert!(matches!(err, ParseError::NotAnObject { kind: "array" }));

        let err = ProfileRecord::parse("{not json}").unwrap_err();
        assert!(matches!(err, ParseError::Json(_)));
    }

    #[test]
    fn test_serializes_transparently() {
        let json = r#"{"name":"Ada","interests":["math"]}"#;
        let record = ProfileRecord::parse(json).unwrap();
        assert_eq!(serde_json::to_string(&record).unwrap(), json);
    }
}
