use std::collections::BTreeSet;

use regex::Regex;

use crate::error::DefinitionError;
use crate::rules::{ConditionalRule, ValidationRule};
use crate::spec::question::{QuestionKind, QuestionSpec};

/// Execution policies shared by group navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionnaireSettings {
    /// Whether `previous()` is allowed at all.
    pub allow_backward: bool,
}

impl Default for QuestionnaireSettings {
    fn default() -> Self {
        Self {
            allow_backward: true,
        }
    }
}

/// Ordered subset of questions with shared visibility.
#[derive(Debug, Clone)]
pub struct Group {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub visible_when: Vec<ConditionalRule>,
    pub questions: Vec<QuestionSpec>,
}

impl Group {
    pub fn new(id: impl Into<String>, questions: Vec<QuestionSpec>) -> Self {
        Self {
            id: id.into(),
            title: None,
            description: None,
            visible_when: Vec::new(),
            questions,
        }
    }

    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn visible_when(mut self, rule: ConditionalRule) -> Self {
        self.visible_when.push(rule);
        self
    }
}

/// Top-level questionnaire definition. Immutable once constructed;
/// loaded once per session.
#[derive(Debug, Clone)]
pub struct Questionnaire {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub settings: QuestionnaireSettings,
    pub groups: Vec<Group>,
}

impl Questionnaire {
    pub fn new(id: impl Into<String>, title: impl Into<String>, groups: Vec<Group>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            settings: QuestionnaireSettings::default(),
            groups,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn settings(mut self, settings: QuestionnaireSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn questions(&self) -> impl Iterator<Item = &QuestionSpec> {
        self.groups.iter().flat_map(|group| group.questions.iter())
    }

    pub fn question(&self, question_id: &str) -> Option<&QuestionSpec> {
        self.questions().find(|question| question.id == question_id)
    }

    /// Rejects malformed definitions before any answer is taken.
    ///
    /// Checks question-id uniqueness, list specifications, choice
    /// options, rule references, and that every declared pattern
    /// compiles.
    pub fn check(&self) -> Result<(), DefinitionError> {
        let mut ids = BTreeSet::new();
        for question in self.questions() {
            if !ids.insert(question.id.as_str()) {
                return Err(DefinitionError::DuplicateQuestion(question.id.clone()));
            }
        }

        for question in self.questions() {
            match (question.kind, &question.list) {
                (QuestionKind::List, None) => {
                    return Err(DefinitionError::MissingListSpec(question.id.clone()));
                }
                (QuestionKind::List, Some(list)) => {
                    if list.element_kind == QuestionKind::List {
                        return Err(DefinitionError::NestedList(question.id.clone()));
                    }
                    check_patterns(&question.id, &list.element_rules)?;
                }
                (_, Some(_)) => {
                    return Err(DefinitionError::UnexpectedListSpec(question.id.clone()));
                }
                (_, None) => {}
            }

            if question.kind.is_choice()
                && question
                    .choices
                    .as_ref()
                    .is_none_or(|choices| choices.is_empty())
            {
                return Err(DefinitionError::MissingChoices(question.id.clone()));
            }

            check_rule_targets(&question.id, &question.visible_when, &ids)?;
            check_patterns(&question.id, &question.rules)?;
        }

        for group in &self.groups {
            check_rule_targets(&group.id, &group.visible_when, &ids)?;
        }

        Ok(())
    }
}

fn check_rule_targets(
    owner: &str,
    rules: &[ConditionalRule],
    ids: &BTreeSet<&str>,
) -> Result<(), DefinitionError> {
    for rule in rules {
        if !ids.contains(rule.depends_on.as_str()) {
            return Err(DefinitionError::UnknownQuestion {
                owner: owner.to_string(),
                depends_on: rule.depends_on.clone(),
            });
        }
    }
    Ok(())
}

fn check_patterns(owner: &str, rules: &[ValidationRule]) -> Result<(), DefinitionError> {
    for rule in rules {
        if let ValidationRule::Pattern(pattern) = rule
            && Regex::new(pattern).is_err()
        {
            return Err(DefinitionError::InvalidPattern {
                owner: owner.to_string(),
                pattern: pattern.clone(),
            });
        }
    }
    Ok(())
}
