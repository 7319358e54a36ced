use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::answers::AnswerSet;

/// Predicate applied to the current value of one question.
///
/// OR between conditions has no native form here; hosts that need it
/// reach for [`Predicate::Custom`] (or an activation-rule tree, which
/// does carry AND/OR nodes).
#[derive(Debug, Clone)]
pub enum Predicate {
    Equals(Value),
    NotEquals(Value),
    GreaterThan(f64),
    LessThan(f64),
    /// Substring match against a string-valued answer.
    Contains(String),
    /// Membership of the answer in a fixed set.
    In(Vec<Value>),
    /// Membership of a fixed value in a collection-valued answer.
    Includes(Value),
    Custom(CustomPredicate),
}

impl Predicate {
    /// Evaluates the predicate against the dependent value. A missing
    /// value only satisfies `NotEquals` and custom predicates that
    /// accept it.
    pub fn matches(&self, value: Option<&Value>, answers: &AnswerSet) -> bool {
        match self {
            Predicate::Equals(expected) => value == Some(expected),
            Predicate::NotEquals(expected) => value != Some(expected),
            Predicate::GreaterThan(bound) => {
                value.and_then(as_number).is_some_and(|num| num > *bound)
            }
            Predicate::LessThan(bound) => {
                value.and_then(as_number).is_some_and(|num| num < *bound)
            }
            Predicate::Contains(needle) => value
                .and_then(Value::as_str)
                .is_some_and(|text| text.contains(needle.as_str())),
            Predicate::In(allowed) => value.is_some_and(|val| allowed.contains(val)),
            Predicate::Includes(member) => value
                .and_then(Value::as_array)
                .is_some_and(|items| items.contains(member)),
            Predicate::Custom(custom) => custom.call(value, answers),
        }
    }
}

/// Numeric view of an answer; numeric strings count so that a pending
/// text entry for a number question can still drive comparisons.
pub(crate) fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(num) => num.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Host-supplied predicate over `(dependent value, full answer set)`.
///
/// Must be pure; the host owns the correctness of whatever it places
/// here.
#[derive(Clone)]
pub struct CustomPredicate(Arc<dyn Fn(Option<&Value>, &AnswerSet) -> bool + Send + Sync>);

impl CustomPredicate {
    pub fn new(check: impl Fn(Option<&Value>, &AnswerSet) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(check))
    }

    pub fn call(&self, value: Option<&Value>, answers: &AnswerSet) -> bool {
        (self.0)(value, answers)
    }
}

impl fmt::Debug for CustomPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomPredicate(..)")
    }
}

/// Visibility condition tied to the answer of an earlier question.
#[derive(Debug, Clone)]
pub struct ConditionalRule {
    pub depends_on: String,
    pub predicate: Predicate,
}

impl ConditionalRule {
    pub fn new(depends_on: impl Into<String>, predicate: Predicate) -> Self {
        Self {
            depends_on: depends_on.into(),
            predicate,
        }
    }

    pub fn holds(&self, answers: &AnswerSet) -> bool {
        self.predicate.matches(answers.get(&self.depends_on), answers)
    }
}

/// Declarative constraint on a single answer.
#[derive(Debug, Clone)]
pub enum ValidationRule {
    Required,
    MinLength(usize),
    MaxLength(usize),
    Min(f64),
    Max(f64),
    MinItems(usize),
    MaxItems(usize),
    Pattern(String),
    Email,
    Url,
    Custom(CustomCheck),
}

/// Host-supplied validation; `Err` carries the failure message shown to
/// the user verbatim.
#[derive(Clone)]
pub struct CustomCheck(Arc<dyn Fn(Option<&Value>, &AnswerSet) -> Result<(), String> + Send + Sync>);

impl CustomCheck {
    pub fn new(
        check: impl Fn(Option<&Value>, &AnswerSet) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        Self(Arc::new(check))
    }

    pub fn call(&self, value: Option<&Value>, answers: &AnswerSet) -> Result<(), String> {
        (self.0)(value, answers)
    }
}

impl fmt::Debug for CustomCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomCheck(..)")
    }
}
