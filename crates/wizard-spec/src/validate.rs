use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;

use crate::answers::AnswerSet;
use crate::rules::{ValidationRule, as_number};
use crate::spec::question::{QuestionKind, QuestionSpec};
use crate::spec::questionnaire::Group;
use crate::visibility::visible_questions;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static pattern"));
static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://\S+$").expect("static pattern"));

/// Validates one question against its (possibly absent) answer.
///
/// Kind-implied checks run first (a number question with a non-numeric
/// answer is a validation failure, never a panic), then every declared
/// rule in declaration order. Nothing short-circuits: the returned
/// messages cover every failing rule.
pub fn validate_question(
    question: &QuestionSpec,
    value: Option<&Value>,
    answers: &AnswerSet,
) -> Vec<String> {
    let mut messages = Vec::new();

    if question.kind == QuestionKind::List {
        validate_list(question, value, answers, &mut messages);
        return messages;
    }

    let candidate = value.filter(|val| !val.is_null());
    let blank = match candidate {
        None => true,
        Some(val) => val.as_str().is_some_and(|text| text.trim().is_empty()),
    };
    if blank {
        if requires_answer(question) {
            messages.push(format!("{} is required", question.title));
        }
        // Custom checks see absent and blank answers: they take the
        // value as an Option precisely so hosts can encode their own
        // presence logic.
        for rule in &question.rules {
            if let ValidationRule::Custom(check) = rule
                && let Err(message) = check.call(candidate, answers)
            {
                messages.push(message);
            }
        }
        return messages;
    }
    let Some(value) = candidate else {
        return messages;
    };

    check_kind(question.kind, question.choices.as_deref(), value, &question.title, &mut messages);
    for rule in &question.rules {
        apply_rule(rule, value, answers, &question.title, &mut messages);
    }

    messages
}

/// Validates every currently visible question of a group, keyed by
/// question id. Questions hidden by their rules are never validated.
pub fn validate_group(group: &Group, answers: &AnswerSet) -> BTreeMap<String, Vec<String>> {
    let mut errors = BTreeMap::new();
    for question in visible_questions(group, answers) {
        let messages = validate_question(question, answers.get(&question.id), answers);
        if !messages.is_empty() {
            errors.insert(question.id.clone(), messages);
        }
    }
    errors
}

fn requires_answer(question: &QuestionSpec) -> bool {
    question.required
        || question
            .rules
            .iter()
            .any(|rule| matches!(rule, ValidationRule::Required))
}

fn check_kind(
    kind: QuestionKind,
    choices: Option<&[String]>,
    value: &Value,
    label: &str,
    messages: &mut Vec<String>,
) {
    match kind {
        QuestionKind::Text | QuestionKind::Password => {}
        QuestionKind::Number => {
            if as_number(value).is_none() {
                messages.push(format!("{label} must be a number"));
            }
        }
        QuestionKind::Boolean => {
            if !value.is_boolean() {
                messages.push(format!("{label} must be a boolean"));
            }
        }
        QuestionKind::Date => {
            let parsed = value
                .as_str()
                .and_then(|text| NaiveDate::parse_from_str(text, "%Y-%m-%d").ok());
            if parsed.is_none() {
                messages.push(format!("{label} must be a date (YYYY-MM-DD)"));
            }
        }
        QuestionKind::Email => {
            if !value.as_str().is_some_and(|text| EMAIL.is_match(text)) {
                messages.push(format!("{label} must be a valid email address"));
            }
        }
        QuestionKind::Url => {
            if !value.as_str().is_some_and(|text| URL.is_match(text)) {
                messages.push(format!("{label} must be a valid URL"));
            }
        }
        QuestionKind::SingleChoice => {
            if let Some(choices) = choices
                && !value
                    .as_str()
                    .is_some_and(|text| choices.iter().any(|choice| choice == text))
            {
                messages.push(format!("{label} must be one of the available options"));
            }
        }
        QuestionKind::MultiChoice => {
            if let Some(items) = value.as_array() {
                if let Some(choices) = choices
                    && items.iter().any(|item| {
                        !item
                            .as_str()
                            .is_some_and(|text| choices.iter().any(|choice| choice == text))
                    })
                {
                    messages.push(format!("{label} must only contain the available options"));
                }
            } else {
                messages.push(format!("{label} must be a selection of options"));
            }
        }
        // Handled by validate_list before kind checks run.
        QuestionKind::List => {}
    }
}

fn apply_rule(
    rule: &ValidationRule,
    value: &Value,
    answers: &AnswerSet,
    label: &str,
    messages: &mut Vec<String>,
) {
    match rule {
        // Presence is settled before declared rules run.
        ValidationRule::Required => {}
        ValidationRule::MinLength(min) => {
            if let Some(text) = value.as_str()
                && text.chars().count() < *min
            {
                messages.push(format!("{label} must be at least {min} characters"));
            }
        }
        ValidationRule::MaxLength(max) => {
            if let Some(text) = value.as_str()
                && text.chars().count() > *max
            {
                messages.push(format!("{label} must be at most {max} characters"));
            }
        }
        ValidationRule::Min(min) => {
            if let Some(num) = as_number(value)
                && num < *min
            {
                messages.push(format!("{label} must be at least {min}"));
            }
        }
        ValidationRule::Max(max) => {
            if let Some(num) = as_number(value)
                && num > *max
            {
                messages.push(format!("{label} must be at most {max}"));
            }
        }
        ValidationRule::MinItems(min) => {
            if let Some(items) = value.as_array()
                && items.len() < *min
            {
                messages.push(format!("{label} must have at least {min} items"));
            }
        }
        ValidationRule::MaxItems(max) => {
            if let Some(items) = value.as_array()
                && items.len() > *max
            {
                messages.push(format!("{label} must have at most {max} items"));
            }
        }
        ValidationRule::Pattern(pattern) => {
            // Pattern compilation is vetted by Questionnaire::check.
            if let Some(text) = value.as_str()
                && let Ok(regex) = Regex::new(pattern)
                && !regex.is_match(text)
            {
                messages.push(format!("{label} does not match the expected format"));
            }
        }
        ValidationRule::Email => {
            if !value.as_str().is_some_and(|text| EMAIL.is_match(text)) {
                messages.push(format!("{label} must be a valid email address"));
            }
        }
        ValidationRule::Url => {
            if !value.as_str().is_some_and(|text| URL.is_match(text)) {
                messages.push(format!("{label} must be a valid URL"));
            }
        }
        ValidationRule::Custom(check) => {
            if let Err(message) = check.call(Some(value), answers) {
                messages.push(message);
            }
        }
    }
}

/// Validates the list as a whole (presence, item counts), then each
/// element independently against the element kind and per-element
/// rules, prefixing failures with the element's 1-based position.
fn validate_list(
    question: &QuestionSpec,
    value: Option<&Value>,
    answers: &AnswerSet,
    messages: &mut Vec<String>,
) {
    let empty = Vec::new();
    let items = value.and_then(Value::as_array).unwrap_or(&empty);

    if requires_answer(question) && items.is_empty() {
        messages.push(format!("{} is required", question.title));
    }

    let whole = Value::Array(items.clone());
    for rule in &question.rules {
        apply_rule(rule, &whole, answers, &question.title, messages);
    }

    let Some(list) = &question.list else {
        // Unreachable for checked questionnaires.
        return;
    };

    if let Some(min) = list.min_items
        && items.len() < min
    {
        messages.push(format!("{} must have at least {min} items", question.title));
    }
    if let Some(max) = list.max_items
        && items.len() > max
    {
        messages.push(format!("{} must have at most {max} items", question.title));
    }

    for (index, item) in items.iter().enumerate() {
        let mut element_messages = Vec::new();
        check_kind(list.element_kind, None, item, &question.title, &mut element_messages);
        for rule in &list.element_rules {
            apply_rule(rule, item, answers, &question.title, &mut element_messages);
        }
        messages.extend(
            element_messages
                .into_iter()
                .map(|message| format!("Item {}: {message}", index + 1)),
        );
    }
}
