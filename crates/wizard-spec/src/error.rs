use thiserror::Error;

/// Malformed questionnaire or feature-catalog definitions.
///
/// These are host programming errors, raised eagerly at construction
/// rather than surfaced as user-facing validation messages.
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("duplicate question id '{0}'")]
    DuplicateQuestion(String),
    #[error("list question '{0}' has no list specification")]
    MissingListSpec(String),
    #[error("question '{0}' has a list specification but is not a list")]
    UnexpectedListSpec(String),
    #[error("list question '{0}' declares 'list' as its element kind")]
    NestedList(String),
    #[error("choice question '{0}' has no options")]
    MissingChoices(String),
    #[error("rule on '{owner}' depends on unknown question '{depends_on}'")]
    UnknownQuestion { owner: String, depends_on: String },
    #[error("invalid pattern on '{owner}': {pattern}")]
    InvalidPattern { owner: String, pattern: String },
    #[error("feature '{feature}' depends on undeclared feature '{dependency}'")]
    UnknownDependency { feature: String, dependency: String },
    #[error("feature '{0}' is not declared in the catalog")]
    UnknownFeature(String),
    #[error("feature '{feature}' references unknown config question '{question}'")]
    UnknownConfigQuestion { feature: String, question: String },
}
