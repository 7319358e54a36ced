use serde_json::json;

use wizard_spec::{
    AnswerSet, ConditionalRule, CustomPredicate, Group, Predicate, QuestionKind, QuestionSpec,
    group_visible, question_visible, rules_hold, visible_questions,
};

fn detail_question() -> QuestionSpec {
    QuestionSpec::new("extraDetail", QuestionKind::Text, "Extra detail")
        .visible_when(ConditionalRule::new(
            "includeExtra",
            Predicate::Equals(json!(true)),
        ))
}

#[test]
fn empty_rule_set_is_always_visible() {
    let question = QuestionSpec::new("name", QuestionKind::Text, "Name");
    let mut answers = AnswerSet::new();
    assert!(question_visible(&question, &answers));
    answers.insert("anything", json!("at all"));
    assert!(question_visible(&question, &answers));
}

#[test]
fn rules_are_a_conjunction() {
    let rules = vec![
        ConditionalRule::new("kind", Predicate::Equals(json!("app"))),
        ConditionalRule::new("count", Predicate::GreaterThan(2.0)),
    ];
    let mut answers = AnswerSet::new();
    answers.insert("kind", json!("app"));
    answers.insert("count", json!(1));
    assert!(!rules_hold(&rules, &answers));
    answers.insert("count", json!(3));
    assert!(rules_hold(&rules, &answers));
}

#[test]
fn question_hides_until_its_dependency_matches() {
    let question = detail_question();
    let mut answers = AnswerSet::new();
    assert!(!question_visible(&question, &answers));
    answers.insert("includeExtra", json!(false));
    assert!(!question_visible(&question, &answers));
    answers.insert("includeExtra", json!(true));
    assert!(question_visible(&question, &answers));
}

#[test]
fn group_with_no_visible_questions_is_hidden() {
    let group = Group::new("details", vec![detail_question()]);
    let mut answers = AnswerSet::new();
    answers.insert("includeExtra", json!(false));
    assert!(!group_visible(&group, &answers));
    answers.insert("includeExtra", json!(true));
    assert!(group_visible(&group, &answers));
}

#[test]
fn group_rules_gate_otherwise_visible_questions() {
    let group = Group::new(
        "advanced",
        vec![QuestionSpec::new("tuning", QuestionKind::Text, "Tuning")],
    )
    .visible_when(ConditionalRule::new(
        "mode",
        Predicate::NotEquals(json!("basic")),
    ));
    let mut answers = AnswerSet::new();
    answers.insert("mode", json!("basic"));
    assert!(!group_visible(&group, &answers));
    answers.insert("mode", json!("expert"));
    assert!(group_visible(&group, &answers));
}

#[test]
fn visible_questions_filters_in_order() {
    let group = Group::new(
        "mixed",
        vec![
            QuestionSpec::new("always", QuestionKind::Text, "Always"),
            detail_question(),
            QuestionSpec::new("also", QuestionKind::Boolean, "Also"),
        ],
    );
    let answers = AnswerSet::new();
    let visible = visible_questions(&group, &answers);
    let ids: Vec<&str> = visible.iter().map(|question| question.id.as_str()).collect();
    assert_eq!(ids, vec!["always", "also"]);
}

#[test]
fn custom_predicate_can_express_disjunction() {
    let rule = ConditionalRule::new(
        "framework",
        Predicate::Custom(CustomPredicate::new(|value, _| {
            matches!(
                value.and_then(|val| val.as_str()),
                Some("react") | Some("vue")
            )
        })),
    );
    let mut answers = AnswerSet::new();
    answers.insert("framework", json!("vue"));
    assert!(rule.holds(&answers));
    answers.insert("framework", json!("svelte"));
    assert!(!rule.holds(&answers));
}
