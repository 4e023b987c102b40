//! Structured payloads attached to reported events.
//!
//! A [`Subject`] describes what an event is about: a bundle identifier,
//! a file path, a configuration. Subjects compose: appending two
//! subjects yields a compound subject, which is how multiple successes
//! are summarized into a single final report.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// A structured, human/machine-readable payload attached to an event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Subject {
    /// A plain string payload.
    String(String),
    /// An arbitrary JSON payload.
    Json(Value),
    /// Multiple payloads merged into one.
    Compound(Vec<Subject>),
}

impl Subject {
    /// Create a JSON subject from any serializable value.
    ///
    /// A value that fails to serialize becomes `Value::Null`; callers
    /// pass plain data types so this does not happen in practice.
    pub fn json<T: Serialize>(value: &T) -> Self {
        Subject::Json(serde_json::to_value(value).unwrap_or(Value::Null))
    }

    /// Merge two subjects into one combined subject.
    ///
    /// Compound subjects are flattened so that the operation stays
    /// associative: `(a + b) + c` and `a + (b + c)` produce the same
    /// flat compound.
    pub fn append(self, second: Subject) -> Subject {
        match (self, second) {
            (Subject::Compound(mut left), Subject::Compound(right)) => {
                left.extend(right);
                Subject::Compound(left)
            }
            (Subject::Compound(mut left), right) => {
                left.push(right);
                Subject::Compound(left)
            }
            (left, Subject::Compound(mut right)) => {
                right.insert(0, left);
                Subject::Compound(right)
            }
            (left, right) => Subject::Compound(vec![left, right]),
        }
    }
}

impl From<&str> for Subject {
    fn from(s: &str) -> Self {
        Subject::String(s.to_string())
    }
}

impl From<String> for Subject {
    fn from(s: String) -> Self {
        Subject::String(s)
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::String(s) => write!(f, "{}", s),
            Subject::Json(value) => write!(f, "{}", value),
            Subject::Compound(items) => {
                let parts: Vec<String> = items.iter().map(|s| s.to_string()).collect();
                write!(f, "{}", parts.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_two_plain_subjects() {
        let merged = Subject::from("a").append(Subject::from("b"));
        assert_eq!(
            merged,
            Subject::Compound(vec![Subject::from("a"), Subject::from("b")])
        );
    }

    #[test]
    fn test_append_is_associative() {
        let (a, b, c) = (Subject::from("a"), Subject::from("b"), Subject::from("c"));
        let left = a.clone().append(b.clone()).append(c.clone());
        let right = a.append(b.append(c));
        assert_eq!(left, right);
    }

    #[test]
    fn test_append_flattens_nested_compounds() {
        let compound = Subject::from("a").append(Subject::from("b"));
        let merged = compound.append(Subject::from("c"));
        assert_eq!(
            merged,
            Subject::Compound(vec![
                Subject::from("a"),
                Subject::from("b"),
                Subject::from("c"),
            ])
        );
    }

    #[test]
    fn test_display_compound() {
        let merged = Subject::from("com.example.a").append(Subject::from("com.example.b"));
        assert_eq!(merged.to_string(), "com.example.a, com.example.b");
    }

    #[test]
    fn test_json_subject_display() {
        let subject = Subject::json(&serde_json::json!({"fps": 30}));
        assert_eq!(subject.to_string(), r#"{"fps":30}"#);
    }
}
