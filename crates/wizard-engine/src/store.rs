use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, warn};

use wizard_spec::AnswerSet;

use crate::error::StoreError;
use crate::preset::{ENVELOPE_VERSION, Preset, PresetFile, PresetPatch};

/// Default capacity bound enforced at save time.
pub const DEFAULT_CAPACITY: usize = 50;

/// Storage medium for the preset envelope. Constructor-injected so
/// tests can substitute an in-memory adapter with no global state.
#[async_trait]
pub trait PresetBackend: Send + Sync {
    /// Loads the current envelope; `None` when nothing was stored yet.
    async fn load(&self) -> Result<Option<PresetFile>, StoreError>;
    /// Replaces the stored envelope.
    async fn persist(&self, file: &PresetFile) -> Result<(), StoreError>;
}

/// In-memory backend for tests and short-lived embedders.
#[derive(Default)]
pub struct MemoryBackend {
    inner: Mutex<Option<PresetFile>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PresetBackend for MemoryBackend {
    async fn load(&self) -> Result<Option<PresetFile>, StoreError> {
        Ok(self.inner.lock().expect("preset lock poisoned").clone())
    }

    async fn persist(&self, file: &PresetFile) -> Result<(), StoreError> {
        *self.inner.lock().expect("preset lock poisoned") = Some(file.clone());
        Ok(())
    }
}

/// Pretty-printed JSON file backend; the embedding application chooses
/// the path.
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PresetBackend for JsonFileBackend {
    /// A missing file loads as empty; a corrupt envelope degrades to
    /// empty with a warning rather than failing the read.
    async fn load(&self) -> Result<Option<PresetFile>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StoreError::Io(err)),
        };
        match serde_json::from_slice(&bytes) {
            Ok(file) => Ok(Some(file)),
            Err(err) => {
                warn!(
                    "preset file {} is corrupt, starting empty: {err}",
                    self.path.display()
                );
                Ok(None)
            }
        }
    }

    async fn persist(&self, file: &PresetFile) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(file)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

/// Named configuration store: persists, retrieves, and enumerates
/// answer-set presets behind an injected backend, enforcing a FIFO
/// capacity bound by creation time.
pub struct PresetStore {
    backend: Box<dyn PresetBackend>,
    capacity: usize,
}

impl PresetStore {
    pub fn new(backend: Box<dyn PresetBackend>) -> Self {
        Self::with_capacity(backend, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(backend: Box<dyn PresetBackend>, capacity: usize) -> Self {
        Self { backend, capacity }
    }

    /// Mints a fresh preset; never mutates an existing one. When the
    /// store is at capacity the oldest presets by `created_at` are
    /// evicted first.
    pub async fn save(
        &self,
        name: &str,
        answers: AnswerSet,
        questionnaire_id: &str,
        description: Option<String>,
        tags: Vec<String>,
    ) -> Result<Preset, StoreError> {
        let mut file = self.load_or_default().await?;
        while file.presets.len() >= self.capacity {
            let Some(oldest) = file
                .presets
                .iter()
                .enumerate()
                .min_by_key(|(_, preset)| preset.created_at)
                .map(|(index, _)| index)
            else {
                break;
            };
            let evicted = file.presets.remove(oldest);
            debug!(
                "evicted preset '{}' to stay within capacity {}",
                evicted.name, self.capacity
            );
        }
        let preset = Preset::mint(name, answers, questionnaire_id, description, tags);
        file.presets.push(preset.clone());
        self.write(&mut file).await?;
        Ok(preset)
    }

    /// Applies a partial update and bumps `updated_at`; `Ok(None)` when
    /// the id is unknown.
    pub async fn update(
        &self,
        id: &str,
        patch: PresetPatch,
    ) -> Result<Option<Preset>, StoreError> {
        let mut file = self.load_or_default().await?;
        let Some(preset) = file.presets.iter_mut().find(|preset| preset.id == id) else {
            return Ok(None);
        };
        if let Some(name) = patch.name {
            preset.name = name;
        }
        if let Some(answers) = patch.answers {
            preset.answers = answers;
        }
        if let Some(description) = patch.description {
            preset.description = Some(description);
        }
        if let Some(tags) = patch.tags {
            preset.tags = tags;
        }
        preset.updated_at = Utc::now();
        let updated = preset.clone();
        self.write(&mut file).await?;
        Ok(Some(updated))
    }

    pub async fn get(&self, id: &str) -> Result<Option<Preset>, StoreError> {
        let file = self.load_or_default().await?;
        Ok(file.presets.into_iter().find(|preset| preset.id == id))
    }

    /// Presets saved for one questionnaire, newest first.
    pub async fn list_for_questionnaire(
        &self,
        questionnaire_id: &str,
    ) -> Result<Vec<Preset>, StoreError> {
        let file = self.load_or_default().await?;
        let mut presets: Vec<Preset> = file
            .presets
            .into_iter()
            .filter(|preset| preset.questionnaire_id == questionnaire_id)
            .collect();
        presets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(presets)
    }

    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut file = self.load_or_default().await?;
        let before = file.presets.len();
        file.presets.retain(|preset| preset.id != id);
        if file.presets.len() == before {
            return Ok(false);
        }
        self.write(&mut file).await?;
        Ok(true)
    }

    /// Case-insensitive match against name, description, and tags.
    pub async fn search(&self, query: &str) -> Result<Vec<Preset>, StoreError> {
        let needle = query.to_lowercase();
        let file = self.load_or_default().await?;
        Ok(file
            .presets
            .into_iter()
            .filter(|preset| preset.matches(&needle))
            .collect())
    }

    /// Serializes the whole envelope for backup or transfer.
    pub async fn export(&self) -> Result<String, StoreError> {
        let file = self.load_or_default().await?;
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Imports a serialized envelope. With `merge` the incoming presets
    /// whose ids already exist are skipped; without it the store's
    /// contents are replaced wholesale. Returns the number of presets
    /// newly added.
    pub async fn import(&self, serialized: &str, merge: bool) -> Result<usize, StoreError> {
        let incoming: PresetFile = serde_json::from_str(serialized)?;
        if incoming.version > ENVELOPE_VERSION {
            return Err(StoreError::UnsupportedVersion(incoming.version));
        }

        if merge {
            let mut file = self.load_or_default().await?;
            let existing: BTreeSet<String> = file
                .presets
                .iter()
                .map(|preset| preset.id.clone())
                .collect();
            let mut added = 0;
            for preset in incoming.presets {
                if !existing.contains(&preset.id) {
                    file.presets.push(preset);
                    added += 1;
                }
            }
            self.write(&mut file).await?;
            Ok(added)
        } else {
            let added = incoming.presets.len();
            let mut file = PresetFile {
                version: ENVELOPE_VERSION,
                updated_at: Utc::now(),
                presets: incoming.presets,
            };
            self.write(&mut file).await?;
            Ok(added)
        }
    }

    async fn load_or_default(&self) -> Result<PresetFile, StoreError> {
        Ok(self.backend.load().await?.unwrap_or_default())
    }

    async fn write(&self, file: &mut PresetFile) -> Result<(), StoreError> {
        file.updated_at = Utc::now();
        self.backend.persist(file).await
    }
}
