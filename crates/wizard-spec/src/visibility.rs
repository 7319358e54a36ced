use crate::answers::AnswerSet;
use crate::rules::ConditionalRule;
use crate::spec::question::QuestionSpec;
use crate::spec::questionnaire::Group;

/// True when every rule holds; an empty rule set is vacuously visible.
pub fn rules_hold(rules: &[ConditionalRule], answers: &AnswerSet) -> bool {
    rules.iter().all(|rule| rule.holds(answers))
}

pub fn question_visible(question: &QuestionSpec, answers: &AnswerSet) -> bool {
    rules_hold(&question.visible_when, answers)
}

/// A group is visible when its own rules hold and at least one of its
/// questions is currently visible; empty groups are skipped entirely
/// during navigation.
pub fn group_visible(group: &Group, answers: &AnswerSet) -> bool {
    rules_hold(&group.visible_when, answers)
        && group
            .questions
            .iter()
            .any(|question| question_visible(question, answers))
}

pub fn visible_questions<'a>(group: &'a Group, answers: &AnswerSet) -> Vec<&'a QuestionSpec> {
    group
        .questions
        .iter()
        .filter(|question| question_visible(question, answers))
        .collect()
}
