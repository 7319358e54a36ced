use crate::answers::AnswerSet;
use crate::rules::Predicate;

/// An optional capability implied by the user's answers.
///
/// A feature with no activation rule is only ever included through
/// another feature's dependency edge (or by being the implicit root).
#[derive(Debug, Clone)]
pub struct FeatureSpec {
    pub id: String,
    /// Features that must always be included when this one is.
    pub depends_on: Vec<String>,
    pub activation: Option<ActivationRule>,
    /// Question ids projected into this feature's configuration.
    pub config_questions: Vec<String>,
}

impl FeatureSpec {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            depends_on: Vec::new(),
            activation: None,
            config_questions: Vec::new(),
        }
    }

    pub fn depends_on(mut self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.depends_on.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn activated_by(mut self, rule: ActivationRule) -> Self {
        self.activation = Some(rule);
        self
    }

    pub fn config_questions(mut self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.config_questions.extend(ids.into_iter().map(Into::into));
        self
    }
}

/// AND/OR expression tree deciding whether a feature activates.
#[derive(Debug, Clone)]
pub enum ActivationRule {
    Condition(ActivationCondition),
    /// True when every child is true; an empty conjunction is true.
    All(Vec<ActivationRule>),
    /// True when any child is true; an empty disjunction is false.
    Any(Vec<ActivationRule>),
}

impl ActivationRule {
    /// Leaf condition on a single question.
    pub fn when(question_id: impl Into<String>, predicate: Predicate) -> Self {
        ActivationRule::Condition(ActivationCondition {
            question_id: question_id.into(),
            predicate,
        })
    }

    pub fn evaluate(&self, answers: &AnswerSet) -> bool {
        match self {
            ActivationRule::Condition(condition) => condition
                .predicate
                .matches(answers.get(&condition.question_id), answers),
            ActivationRule::All(children) => {
                children.iter().all(|child| child.evaluate(answers))
            }
            ActivationRule::Any(children) => {
                children.iter().any(|child| child.evaluate(answers))
            }
        }
    }
}

/// Leaf of an activation tree; mirrors conditional-rule predicates.
#[derive(Debug, Clone)]
pub struct ActivationCondition {
    pub question_id: String,
    pub predicate: Predicate,
}
