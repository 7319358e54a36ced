use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Flat mapping of question id to answered value.
///
/// This is the sole artifact handed to the feature resolver and to any
/// downstream generation pipeline. List-question answers are always JSON
/// arrays; [`coerce_list`] upholds that shape on write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct AnswerSet(BTreeMap<String, Value>);

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, question_id: &str) -> Option<&Value> {
        self.0.get(question_id)
    }

    pub fn insert(&mut self, question_id: impl Into<String>, value: Value) {
        self.0.insert(question_id.into(), value);
    }

    pub fn remove(&mut self, question_id: &str) -> Option<Value> {
        self.0.remove(question_id)
    }

    pub fn contains(&self, question_id: &str) -> bool {
        self.0.contains_key(question_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl FromIterator<(String, Value)> for AnswerSet {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Coerces a raw value into the list-answer shape: `null` becomes an
/// empty sequence, a scalar becomes a one-element sequence.
pub fn coerce_list(value: Value) -> Value {
    match value {
        Value::Null => Value::Array(Vec::new()),
        Value::Array(items) => Value::Array(items),
        other => Value::Array(vec![other]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerce_list_wraps_scalars() {
        assert_eq!(coerce_list(json!("x")), json!(["x"]));
        assert_eq!(coerce_list(json!(null)), json!([]));
        assert_eq!(coerce_list(json!(["a", "b"])), json!(["a", "b"]));
    }

    #[test]
    fn answer_set_round_trips_through_json() {
        let answers: AnswerSet = [
            ("name".to_string(), json!("demo")),
            ("count".to_string(), json!(3)),
        ]
        .into_iter()
        .collect();
        let text = serde_json::to_string(&answers).expect("serialize");
        let back: AnswerSet = serde_json::from_str(&text).expect("deserialize");
        assert_eq!(back, answers);
    }
}
