use serde_json::Value;

use crate::rules::{ConditionalRule, ValidationRule};

/// Supported question kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    Text,
    Number,
    Boolean,
    SingleChoice,
    MultiChoice,
    Date,
    Email,
    Url,
    Password,
    List,
}

impl QuestionKind {
    pub fn is_choice(&self) -> bool {
        matches!(self, QuestionKind::SingleChoice | QuestionKind::MultiChoice)
    }

    pub fn label(&self) -> &'static str {
        match self {
            QuestionKind::Text => "text",
            QuestionKind::Number => "number",
            QuestionKind::Boolean => "boolean",
            QuestionKind::SingleChoice => "single-choice",
            QuestionKind::MultiChoice => "multi-choice",
            QuestionKind::Date => "date",
            QuestionKind::Email => "email",
            QuestionKind::Url => "url",
            QuestionKind::Password => "password",
            QuestionKind::List => "list",
        }
    }
}

/// Element shape and bounds for list questions.
///
/// `element_rules` apply to every element independently; failures are
/// reported with the element's 1-based position.
#[derive(Debug, Clone)]
pub struct ListSpec {
    pub element_kind: QuestionKind,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
    pub element_rules: Vec<ValidationRule>,
}

impl ListSpec {
    pub fn new(element_kind: QuestionKind) -> Self {
        Self {
            element_kind,
            min_items: None,
            max_items: None,
            element_rules: Vec::new(),
        }
    }

    pub fn min_items(mut self, min: usize) -> Self {
        self.min_items = Some(min);
        self
    }

    pub fn max_items(mut self, max: usize) -> Self {
        self.max_items = Some(max);
        self
    }

    pub fn element_rule(mut self, rule: ValidationRule) -> Self {
        self.element_rules.push(rule);
        self
    }
}

/// A single prompt in a questionnaire.
#[derive(Debug, Clone)]
pub struct QuestionSpec {
    pub id: String,
    pub kind: QuestionKind,
    pub title: String,
    pub description: Option<String>,
    pub required: bool,
    pub default_value: Option<Value>,
    pub choices: Option<Vec<String>>,
    pub visible_when: Vec<ConditionalRule>,
    pub rules: Vec<ValidationRule>,
    pub list: Option<ListSpec>,
}

impl QuestionSpec {
    pub fn new(id: impl Into<String>, kind: QuestionKind, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            title: title.into(),
            description: None,
            required: false,
            default_value: None,
            choices: None,
            visible_when: Vec::new(),
            rules: Vec::new(),
            list: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn choices(mut self, choices: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.choices = Some(choices.into_iter().map(Into::into).collect());
        self
    }

    pub fn visible_when(mut self, rule: ConditionalRule) -> Self {
        self.visible_when.push(rule);
        self
    }

    pub fn rule(mut self, rule: ValidationRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn list(mut self, spec: ListSpec) -> Self {
        self.list = Some(spec);
        self
    }
}
