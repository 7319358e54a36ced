#![allow(missing_docs)]

pub mod answers;
pub mod error;
pub mod rules;
pub mod spec;
pub mod validate;
pub mod visibility;

pub use answers::{AnswerSet, coerce_list};
pub use error::DefinitionError;
pub use rules::{ConditionalRule, CustomCheck, CustomPredicate, Predicate, ValidationRule};
pub use spec::{
    ActivationCondition, ActivationRule, FeatureSpec, Group, ListSpec, QuestionKind, QuestionSpec,
    Questionnaire, QuestionnaireSettings,
};
pub use validate::{validate_group, validate_question};
pub use visibility::{group_visible, question_visible, rules_hold, visible_questions};
