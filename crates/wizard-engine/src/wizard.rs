use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use serde_json::Value;

use wizard_spec::{
    AnswerSet, DefinitionError, Group, QuestionKind, Questionnaire, coerce_list, group_visible,
    validate_group, validate_question, visible_questions,
};

use crate::error::WizardError;
use crate::preset::Preset;

/// Result of a `next()` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Validation failed in the current group; position unchanged and
    /// the error map holds the accumulated messages.
    Blocked,
    /// Moved to the next visible group.
    Advanced,
    /// The last visible group validated; the wizard is finished.
    Completed,
}

/// Notification emitted to subscribed observers. Each carries the
/// relevant id(s) plus a snapshot of the answer set; the presentation
/// layer is the sole intended consumer.
#[derive(Debug, Clone)]
pub enum WizardEvent {
    AnswerChanged {
        question_id: String,
        value: Value,
        answers: AnswerSet,
    },
    QuestionValidated {
        question_id: String,
        errors: Vec<String>,
    },
    GroupCompleted {
        group_id: String,
        answers: AnswerSet,
    },
    FormCompleted {
        answers: AnswerSet,
    },
    FormCancelled {
        answers: AnswerSet,
    },
}

pub type WizardObserver = Box<dyn FnMut(&WizardEvent) + Send>;

/// Drives one questionnaire session: holds the in-progress answer set,
/// recomputes visibility from it on every navigation call, and gates
/// forward movement behind full-group validation.
pub struct Wizard {
    questionnaire: Questionnaire,
    answers: AnswerSet,
    errors: BTreeMap<String, Vec<String>>,
    touched: BTreeSet<String>,
    position: usize,
    complete: bool,
    observers: Vec<WizardObserver>,
}

impl Wizard {
    /// Runs the questionnaire's definition check before accepting it, so
    /// a malformed definition fails here rather than mid-session.
    pub fn new(questionnaire: Questionnaire) -> Result<Self, DefinitionError> {
        questionnaire.check()?;
        let mut wizard = Self {
            questionnaire,
            answers: AnswerSet::new(),
            errors: BTreeMap::new(),
            touched: BTreeSet::new(),
            position: 0,
            complete: false,
            observers: Vec::new(),
        };
        wizard.position = wizard.first_visible().unwrap_or(0);
        Ok(wizard)
    }

    pub fn subscribe(&mut self, observer: WizardObserver) {
        self.observers.push(observer);
    }

    pub fn questionnaire(&self) -> &Questionnaire {
        &self.questionnaire
    }

    /// Snapshot view of the in-progress answer set.
    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    pub fn errors(&self) -> &BTreeMap<String, Vec<String>> {
        &self.errors
    }

    pub fn errors_for(&self, question_id: &str) -> &[String] {
        self.errors
            .get(question_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn touched(&self) -> &BTreeSet<String> {
        &self.touched
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn current_group_index(&self) -> usize {
        self.position
    }

    pub fn current_group(&self) -> Option<&Group> {
        self.questionnaire.groups.get(self.position)
    }

    /// Groups visible under the current answers, recomputed on demand.
    pub fn visible_groups(&self) -> Vec<&Group> {
        self.questionnaire
            .groups
            .iter()
            .filter(|group| group_visible(group, &self.answers))
            .collect()
    }

    /// Currently visible questions of the current group.
    pub fn visible_questions(&self) -> Vec<&wizard_spec::QuestionSpec> {
        self.current_group()
            .map(|group| visible_questions(group, &self.answers))
            .unwrap_or_default()
    }

    /// Records an answer, re-validating the touched question and
    /// notifying observers. Values for list questions are coerced into
    /// sequences (`null` to `[]`, a scalar to a one-element list).
    pub fn set_answer(&mut self, question_id: &str, value: Value) -> Result<(), WizardError> {
        let kind = self
            .questionnaire
            .question(question_id)
            .ok_or_else(|| WizardError::UnknownQuestion(question_id.to_string()))?
            .kind;
        let stored = if kind == QuestionKind::List {
            coerce_list(value)
        } else {
            value
        };
        self.store_answer(question_id, stored);
        Ok(())
    }

    pub fn answer(&self, question_id: &str) -> Option<&Value> {
        self.answers.get(question_id)
    }

    /// Appends one element to a list answer, enforcing the list's
    /// max-item bound.
    pub fn add_item(&mut self, question_id: &str, item: Value) -> Result<(), WizardError> {
        let (mut items, max_items) = self.list_items(question_id)?;
        if let Some(max) = max_items
            && items.len() >= max
        {
            return Err(WizardError::ListFull {
                question_id: question_id.to_string(),
                max,
            });
        }
        items.push(item);
        self.store_answer(question_id, Value::Array(items));
        Ok(())
    }

    pub fn remove_item(&mut self, question_id: &str, index: usize) -> Result<(), WizardError> {
        let (mut items, _) = self.list_items(question_id)?;
        if index >= items.len() {
            return Err(WizardError::IndexOutOfRange {
                question_id: question_id.to_string(),
                index,
                len: items.len(),
            });
        }
        items.remove(index);
        self.store_answer(question_id, Value::Array(items));
        Ok(())
    }

    pub fn update_item(
        &mut self,
        question_id: &str,
        index: usize,
        item: Value,
    ) -> Result<(), WizardError> {
        let (mut items, _) = self.list_items(question_id)?;
        if index >= items.len() {
            return Err(WizardError::IndexOutOfRange {
                question_id: question_id.to_string(),
                index,
                len: items.len(),
            });
        }
        items[index] = item;
        self.store_answer(question_id, Value::Array(items));
        Ok(())
    }

    /// Validates every visible question of the current group, then
    /// either advances to the next visible group or completes the form.
    /// A failing group leaves the position untouched and reports
    /// `Blocked`.
    pub fn next(&mut self) -> Result<StepOutcome, WizardError> {
        if self.complete {
            return Err(WizardError::AlreadyComplete);
        }

        let current = self.questionnaire.groups.get(self.position).map(|group| {
            let question_ids: Vec<String> = group
                .questions
                .iter()
                .map(|question| question.id.clone())
                .collect();
            // An earlier answer may have flipped this group's own rule
            // while the cursor sat on it; a now-invisible group is
            // skipped, never validated.
            let visible = group_visible(group, &self.answers);
            let group_errors = if visible {
                validate_group(group, &self.answers)
            } else {
                BTreeMap::new()
            };
            (group.id.clone(), question_ids, visible, group_errors)
        });

        if let Some((group_id, question_ids, visible, group_errors)) = current {
            // Re-validation supersedes whatever the error map held for
            // this group, including entries for now-hidden questions.
            for question_id in &question_ids {
                self.errors.remove(question_id);
            }
            if visible {
                if !group_errors.is_empty() {
                    debug!(
                        "next() blocked at group '{group_id}' ({} invalid questions)",
                        group_errors.len()
                    );
                    for (question_id, messages) in group_errors {
                        self.errors.insert(question_id, messages);
                    }
                    return Ok(StepOutcome::Blocked);
                }
                let snapshot = self.answers.clone();
                self.emit(WizardEvent::GroupCompleted {
                    group_id,
                    answers: snapshot,
                });
            } else {
                debug!("skipping hidden group '{group_id}'");
            }
        }

        match self.next_visible_after(self.position) {
            Some(index) => {
                debug!("advanced to group index {index}");
                self.position = index;
                Ok(StepOutcome::Advanced)
            }
            None => {
                self.complete = true;
                debug!("questionnaire '{}' completed", self.questionnaire.id);
                let snapshot = self.answers.clone();
                self.emit(WizardEvent::FormCompleted { answers: snapshot });
                Ok(StepOutcome::Completed)
            }
        }
    }

    /// Steps back to the previous visible group. Never re-validates.
    pub fn previous(&mut self) -> Result<(), WizardError> {
        if self.complete {
            return Err(WizardError::AlreadyComplete);
        }
        if !self.questionnaire.settings.allow_backward {
            return Err(WizardError::BackwardDisabled);
        }
        match self.previous_visible_before(self.position) {
            Some(index) => {
                debug!("stepped back to group index {index}");
                self.position = index;
                Ok(())
            }
            None => Err(WizardError::AtFirstGroup),
        }
    }

    /// Clears answers, errors, and touched state, returning to the
    /// first visible group. The questionnaire definition is untouched.
    pub fn reset(&mut self) {
        self.answers.clear();
        self.errors.clear();
        self.touched.clear();
        self.complete = false;
        self.position = self.first_visible().unwrap_or(0);
    }

    /// Notifies observers that the session was abandoned. Performs no
    /// internal teardown; the host simply stops calling afterwards.
    pub fn cancel(&mut self) {
        let snapshot = self.answers.clone();
        self.emit(WizardEvent::FormCancelled { answers: snapshot });
    }

    /// Replaces the whole answer set from a stored preset and rewinds
    /// to the first group. No field-level merging is attempted.
    pub fn load_preset(&mut self, preset: &Preset) -> Result<(), WizardError> {
        if preset.questionnaire_id != self.questionnaire.id {
            return Err(WizardError::PresetMismatch {
                expected: self.questionnaire.id.clone(),
                found: preset.questionnaire_id.clone(),
            });
        }
        self.answers = preset.answers.clone();
        self.errors.clear();
        self.touched.clear();
        self.complete = false;
        self.position = self.first_visible().unwrap_or(0);
        debug!("loaded preset '{}' ({})", preset.name, preset.id);
        Ok(())
    }

    fn store_answer(&mut self, question_id: &str, value: Value) {
        self.answers.insert(question_id, value.clone());
        self.touched.insert(question_id.to_string());

        let messages = match self.questionnaire.question(question_id) {
            Some(question) => {
                validate_question(question, self.answers.get(question_id), &self.answers)
            }
            None => Vec::new(),
        };
        if messages.is_empty() {
            self.errors.remove(question_id);
        } else {
            self.errors.insert(question_id.to_string(), messages.clone());
        }

        let snapshot = self.answers.clone();
        self.emit(WizardEvent::AnswerChanged {
            question_id: question_id.to_string(),
            value,
            answers: snapshot,
        });
        self.emit(WizardEvent::QuestionValidated {
            question_id: question_id.to_string(),
            errors: messages,
        });
    }

    fn list_items(&self, question_id: &str) -> Result<(Vec<Value>, Option<usize>), WizardError> {
        let question = self
            .questionnaire
            .question(question_id)
            .ok_or_else(|| WizardError::UnknownQuestion(question_id.to_string()))?;
        if question.kind != QuestionKind::List {
            return Err(WizardError::NotAList(question_id.to_string()));
        }
        let max_items = question.list.as_ref().and_then(|list| list.max_items);
        let items = self
            .answers
            .get(question_id)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        Ok((items, max_items))
    }

    fn visible_indices(&self) -> Vec<usize> {
        self.questionnaire
            .groups
            .iter()
            .enumerate()
            .filter(|(_, group)| group_visible(group, &self.answers))
            .map(|(index, _)| index)
            .collect()
    }

    fn first_visible(&self) -> Option<usize> {
        self.visible_indices().into_iter().next()
    }

    fn next_visible_after(&self, position: usize) -> Option<usize> {
        self.visible_indices()
            .into_iter()
            .find(|&index| index > position)
    }

    fn previous_visible_before(&self, position: usize) -> Option<usize> {
        self.visible_indices()
            .into_iter()
            .filter(|&index| index < position)
            .next_back()
    }

    fn emit(&mut self, event: WizardEvent) {
        for observer in &mut self.observers {
            observer(&event);
        }
    }
}
