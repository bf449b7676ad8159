//! Match rules gating conditional vertices.

use serde::{Deserialize, Serialize};

/// Operator of a match rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchOperator {
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = "==")]
    DoubleEqual,
    In,
    #[serde(rename = "!=")]
    NotEqual,
    NotIn,
    Exists,
    DoesNotExist,
    #[serde(rename = "Gt")]
    GreaterThan,
    #[serde(rename = "Lt")]
    LessThan,
    /// Operator this evaluator does not know. Never satisfied.
    #[serde(other)]
    Unsupported,
}

impl std::fmt::Display for MatchOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Equal => "=",
            Self::DoubleEqual => "==",
            Self::In => "In",
            Self::NotEqual => "!=",
            Self::NotIn => "NotIn",
            Self::Exists => "Exists",
            Self::DoesNotExist => "DoesNotExist",
            Self::GreaterThan => "Gt",
            Self::LessThan => "Lt",
            Self::Unsupported => "<unsupported>",
        };
        write!(f, "{}", s)
    }
}

/// A single conditional predicate: `key <operator> values`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRule {
    pub key: String,
    pub operator: MatchOperator,
    #[serde(default)]
    pub values: Vec<String>,
}

impl MatchRule {
    pub fn new(key: &str, operator: MatchOperator, values: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            operator,
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_spelling() {
        let rule: MatchRule = serde_json::from_value(serde_json::json!({
            "key": "n",
            "operator": "Gt",
            "values": ["10"]
        }))
        .unwrap();
        assert_eq!(rule.operator, MatchOperator::GreaterThan);

        let op: MatchOperator = serde_json::from_str("\"==\"").unwrap();
        assert_eq!(op, MatchOperator::DoubleEqual);
    }

    #[test]
    fn test_unknown_operator_decodes() {
        let op: MatchOperator = serde_json::from_str("\"Matches\"").unwrap();
        assert_eq!(op, MatchOperator::Unsupported);
    }

    #[test]
    fn test_values_default_empty() {
        let rule: MatchRule =
            serde_json::from_value(serde_json::json!({"key": "region", "operator": "Exists"}))
                .unwrap();
        assert!(rule.values.is_empty());
    }
}
