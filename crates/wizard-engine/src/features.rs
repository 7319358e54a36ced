use std::collections::BTreeSet;

use log::debug;

use wizard_spec::{AnswerSet, DefinitionError, FeatureSpec, Questionnaire};

/// Declared optional features plus the implicit root capability.
///
/// The root represents the minimal "project exists" capability and is
/// part of every resolution, whether or not it is declared as a feature
/// of its own.
pub struct FeatureCatalog {
    root: String,
    features: Vec<FeatureSpec>,
}

impl FeatureCatalog {
    /// Rejects dependency edges naming undeclared features. Cycles are
    /// deliberately not rejected; the set-based closure converges over
    /// them.
    pub fn new(
        root: impl Into<String>,
        features: Vec<FeatureSpec>,
    ) -> Result<Self, DefinitionError> {
        let root = root.into();
        let declared: BTreeSet<&str> = features
            .iter()
            .map(|feature| feature.id.as_str())
            .chain([root.as_str()])
            .collect();
        for feature in &features {
            for dependency in &feature.depends_on {
                if !declared.contains(dependency.as_str()) {
                    return Err(DefinitionError::UnknownDependency {
                        feature: feature.id.clone(),
                        dependency: dependency.clone(),
                    });
                }
            }
        }
        Ok(Self { root, features })
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn feature(&self, feature_id: &str) -> Option<&FeatureSpec> {
        self.features
            .iter()
            .find(|feature| feature.id == feature_id)
    }

    /// Resolves the final feature set for an answer set: the root, every
    /// feature whose activation rule holds, and the transitive closure
    /// of declared dependencies. A feature pulled in as a dependency is
    /// included even when its own rule is false or absent.
    pub fn resolve(&self, answers: &AnswerSet) -> Vec<String> {
        let mut resolved = vec![self.root.clone()];
        let mut seen: BTreeSet<String> = resolved.iter().cloned().collect();

        for feature in &self.features {
            if let Some(rule) = &feature.activation
                && rule.evaluate(answers)
                && seen.insert(feature.id.clone())
            {
                resolved.push(feature.id.clone());
            }
        }

        // Fixed-point expansion over dependency edges; re-adding an
        // already-present id is a no-op, so cycles converge.
        let mut cursor = 0;
        while cursor < resolved.len() {
            let current = resolved[cursor].clone();
            cursor += 1;
            if let Some(feature) = self.feature(&current) {
                for dependency in &feature.depends_on {
                    if seen.insert(dependency.clone()) {
                        resolved.push(dependency.clone());
                    }
                }
            }
        }

        debug!(
            "resolved {} of {} declared features",
            resolved.len(),
            self.features.len() + 1
        );
        resolved
    }

    /// Projects the answer set through one feature's configuration
    /// questions, substituting each question's default where the answer
    /// is absent.
    pub fn feature_config(
        &self,
        feature_id: &str,
        questionnaire: &Questionnaire,
        answers: &AnswerSet,
    ) -> Result<AnswerSet, DefinitionError> {
        let feature = self
            .feature(feature_id)
            .ok_or_else(|| DefinitionError::UnknownFeature(feature_id.to_string()))?;

        let mut config = AnswerSet::new();
        for question_id in &feature.config_questions {
            let question = questionnaire.question(question_id).ok_or_else(|| {
                DefinitionError::UnknownConfigQuestion {
                    feature: feature_id.to_string(),
                    question: question_id.clone(),
                }
            })?;
            let value = answers
                .get(question_id)
                .cloned()
                .or_else(|| question.default_value.clone());
            if let Some(value) = value {
                config.insert(question_id.clone(), value);
            }
        }
        Ok(config)
    }
}
