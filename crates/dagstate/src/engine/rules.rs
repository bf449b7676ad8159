//! Match rule evaluation for conditional vertices.
//!
//! Evaluation is total: a rule whose operands cannot be interpreted is
//! simply not satisfied. Nothing here returns an error.

use std::collections::HashMap;

use tracing::debug;

use crate::model::{MatchOperator, MatchRule};

/// Check whether `rule` matches the key/value context.
///
/// - `=`, `==`, `In`: the key is present and its value is one of `values`.
/// - `!=`, `NotIn`: the key is absent, or its value is not one of `values`.
/// - `Exists` / `DoesNotExist`: presence of the key, value ignored.
/// - `Gt`, `Lt`: the value and the single entry of `values` both parse as
///   `i64` and the comparison holds.
pub fn rule_satisfied(rule: &MatchRule, kv: &HashMap<String, String>) -> bool {
    match rule.operator {
        MatchOperator::In | MatchOperator::Equal | MatchOperator::DoubleEqual => kv
            .get(&rule.key)
            .is_some_and(|val| has_value(rule, val)),
        MatchOperator::NotIn | MatchOperator::NotEqual => kv
            .get(&rule.key)
            .map_or(true, |val| !has_value(rule, val)),
        MatchOperator::Exists => kv.contains_key(&rule.key),
        MatchOperator::DoesNotExist => !kv.contains_key(&rule.key),
        MatchOperator::GreaterThan | MatchOperator::LessThan => {
            let Some(val) = kv.get(&rule.key) else {
                return false;
            };
            compare(rule, val).unwrap_or(false)
        }
        MatchOperator::Unsupported => {
            debug!(target: "dagstate", key = %rule.key, "Unsupported match operator");
            false
        }
    }
}

/// Check whether every rule matches. An empty rule list always matches.
pub fn rules_satisfied(rules: &[MatchRule], kv: &HashMap<String, String>) -> bool {
    rules.iter().all(|rule| rule_satisfied(rule, kv))
}

fn has_value(rule: &MatchRule, value: &str) -> bool {
    rule.values.iter().any(|v| v == value)
}

// None means the operands could not be compared.
fn compare(rule: &MatchRule, val: &str) -> Option<bool> {
    let lhs = match val.parse::<i64>() {
        Ok(n) => n,
        Err(e) => {
            debug!(
                target: "dagstate",
                key = %rule.key,
                value = %val,
                error = %e,
                "Context value is not an integer"
            );
            return None;
        }
    };

    // Gt and Lt take exactly one integer operand.
    let [operand] = rule.values.as_slice() else {
        debug!(
            target: "dagstate",
            key = %rule.key,
            operator = %rule.operator,
            count = rule.values.len(),
            "Exactly one value is required"
        );
        return None;
    };

    let rhs = match operand.parse::<i64>() {
        Ok(n) => n,
        Err(e) => {
            debug!(
                target: "dagstate",
                key = %rule.key,
                operator = %rule.operator,
                value = %operand,
                error = %e,
                "Rule value is not an integer"
            );
            return None;
        }
    };

    Some(match rule.operator {
        MatchOperator::GreaterThan => lhs > rhs,
        MatchOperator::LessThan => lhs < rhs,
        _ => false,
    })
}
