use serde_json::json;

use wizard_engine::{
    JsonFileBackend, MemoryBackend, PresetPatch, PresetStore, StoreError, Wizard, WizardError,
};
use wizard_spec::{AnswerSet, Group, QuestionKind, QuestionSpec, Questionnaire};

fn store() -> PresetStore {
    PresetStore::new(Box::new(MemoryBackend::new()))
}

fn answers(name: &str) -> AnswerSet {
    [
        ("projectName".to_string(), json!(name)),
        ("features".to_string(), json!(["css", "router"])),
    ]
    .into_iter()
    .collect()
}

#[tokio::test]
async fn save_then_get_round_trips() {
    let store = store();
    let saved = store
        .save(
            "web defaults",
            answers("web"),
            "new-project",
            Some("team defaults".into()),
            vec!["web".into()],
        )
        .await
        .expect("save");

    let loaded = store.get(&saved.id).await.expect("get").expect("found");
    assert_eq!(loaded.answers, answers("web"));
    assert_eq!(loaded.questionnaire_id, "new-project");
    assert_eq!(loaded.created_at, loaded.updated_at);
}

#[tokio::test]
async fn capacity_evicts_the_oldest_preset_first() {
    let store = PresetStore::with_capacity(Box::new(MemoryBackend::new()), 2);
    let first = store
        .save("one", answers("a"), "q", None, vec![])
        .await
        .expect("save");
    store
        .save("two", answers("b"), "q", None, vec![])
        .await
        .expect("save");
    store
        .save("three", answers("c"), "q", None, vec![])
        .await
        .expect("save");

    let remaining = store.list_for_questionnaire("q").await.expect("list");
    assert_eq!(remaining.len(), 2);
    assert!(remaining.iter().all(|preset| preset.id != first.id));
}

#[tokio::test]
async fn listing_is_scoped_and_newest_first() {
    let store = store();
    let old = store
        .save("old", answers("a"), "q1", None, vec![])
        .await
        .expect("save");
    store
        .save("other", answers("b"), "q2", None, vec![])
        .await
        .expect("save");
    let new = store
        .save("new", answers("c"), "q1", None, vec![])
        .await
        .expect("save");

    let listed = store.list_for_questionnaire("q1").await.expect("list");
    let ids: Vec<&str> = listed.iter().map(|preset| preset.id.as_str()).collect();
    assert_eq!(ids.len(), 2);
    assert_eq!(ids.last(), Some(&old.id.as_str()));
    assert!(ids.contains(&new.id.as_str()));
}

#[tokio::test]
async fn update_patches_fields_and_bumps_updated_at() {
    let store = store();
    let saved = store
        .save("draft", answers("a"), "q", None, vec![])
        .await
        .expect("save");

    let updated = store
        .update(
            &saved.id,
            PresetPatch {
                name: Some("final".into()),
                tags: Some(vec!["approved".into()]),
                ..PresetPatch::default()
            },
        )
        .await
        .expect("update")
        .expect("found");
    assert_eq!(updated.name, "final");
    assert_eq!(updated.tags, vec!["approved"]);
    assert_eq!(updated.answers, answers("a"));
    assert!(updated.updated_at >= updated.created_at);

    let missing = store
        .update("no-such-id", PresetPatch::default())
        .await
        .expect("update");
    assert!(missing.is_none());
}

#[tokio::test]
async fn delete_reports_whether_anything_was_removed() {
    let store = store();
    let saved = store
        .save("gone soon", answers("a"), "q", None, vec![])
        .await
        .expect("save");
    assert!(store.delete(&saved.id).await.expect("delete"));
    assert!(!store.delete(&saved.id).await.expect("delete"));
    assert!(store.get(&saved.id).await.expect("get").is_none());
}

#[tokio::test]
async fn search_matches_name_description_and_tags() {
    let store = store();
    store
        .save(
            "API service",
            answers("a"),
            "q",
            Some("backend defaults".into()),
            vec!["rust".into()],
        )
        .await
        .expect("save");
    store
        .save("frontend", answers("b"), "q", None, vec!["spa".into()])
        .await
        .expect("save");

    assert_eq!(store.search("api").await.expect("search").len(), 1);
    assert_eq!(store.search("BACKEND").await.expect("search").len(), 1);
    assert_eq!(store.search("spa").await.expect("search").len(), 1);
    assert!(store.search("nothing").await.expect("search").is_empty());
}

#[tokio::test]
async fn import_merge_skips_existing_ids() {
    let source = store();
    source
        .save("shared", answers("a"), "q", None, vec![])
        .await
        .expect("save");
    let exported = source.export().await.expect("export");

    let target = store();
    target
        .save("local", answers("b"), "q", None, vec![])
        .await
        .expect("save");

    let added = target.import(&exported, true).await.expect("import");
    assert_eq!(added, 1);
    // A second merge finds every id already present.
    let added = target.import(&exported, true).await.expect("import");
    assert_eq!(added, 0);
    assert_eq!(target.list_for_questionnaire("q").await.unwrap().len(), 2);
}

#[tokio::test]
async fn import_replace_discards_local_contents() {
    let source = store();
    source
        .save("shared", answers("a"), "q", None, vec![])
        .await
        .expect("save");
    let exported = source.export().await.expect("export");

    let target = store();
    target
        .save("local", answers("b"), "q", None, vec![])
        .await
        .expect("save");

    let added = target.import(&exported, false).await.expect("import");
    assert_eq!(added, 1);
    let remaining = target.list_for_questionnaire("q").await.expect("list");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].name, "shared");
}

#[tokio::test]
async fn import_rejects_unknown_envelope_versions() {
    let store = store();
    let payload = json!({
        "version": 99,
        "updated_at": "2026-01-01T00:00:00Z",
        "presets": []
    })
    .to_string();
    assert!(matches!(
        store.import(&payload, true).await,
        Err(StoreError::UnsupportedVersion(99))
    ));
}

#[tokio::test]
async fn json_file_backend_round_trips_and_degrades() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("presets.json");

    let store = PresetStore::new(Box::new(JsonFileBackend::new(&path)));
    // Missing file reads as an empty store.
    assert!(store.list_for_questionnaire("q").await.unwrap().is_empty());

    let saved = store
        .save("persisted", answers("a"), "q", None, vec![])
        .await
        .expect("save");

    // A second store over the same path sees the saved preset.
    let reopened = PresetStore::new(Box::new(JsonFileBackend::new(&path)));
    let loaded = reopened.get(&saved.id).await.expect("get").expect("found");
    assert_eq!(loaded.answers, answers("a"));

    // A corrupt envelope degrades to empty instead of failing reads.
    std::fs::write(&path, b"{ not json").expect("write");
    assert!(reopened.list_for_questionnaire("q").await.unwrap().is_empty());
}

#[tokio::test]
async fn loading_a_preset_rewinds_a_matching_wizard() {
    let questionnaire = Questionnaire::new(
        "new-project",
        "New project",
        vec![Group::new(
            "basics",
            vec![QuestionSpec::new("projectName", QuestionKind::Text, "Name").required()],
        )],
    );
    let mut wizard = Wizard::new(questionnaire).expect("definition");

    let store = store();
    let preset = store
        .save("defaults", answers("web"), "new-project", None, vec![])
        .await
        .expect("save");

    wizard.load_preset(&preset).expect("load");
    assert_eq!(wizard.answer("projectName"), Some(&json!("web")));
    assert!(wizard.errors().is_empty());
    assert!(!wizard.is_complete());

    let foreign = store
        .save("foreign", answers("x"), "other-questionnaire", None, vec![])
        .await
        .expect("save");
    assert!(matches!(
        wizard.load_preset(&foreign),
        Err(WizardError::PresetMismatch { .. })
    ));
}
