pub mod feature;
pub mod question;
pub mod questionnaire;

pub use feature::{ActivationCondition, ActivationRule, FeatureSpec};
pub use question::{ListSpec, QuestionKind, QuestionSpec};
pub use questionnaire::{Group, Questionnaire, QuestionnaireSettings};
