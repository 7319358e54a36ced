#![allow(missing_docs)]

pub mod error;
pub mod features;
pub mod preset;
pub mod store;
pub mod wizard;

pub use error::{StoreError, WizardError};
pub use features::FeatureCatalog;
pub use preset::{ENVELOPE_VERSION, Preset, PresetFile, PresetPatch};
pub use store::{JsonFileBackend, MemoryBackend, PresetBackend, PresetStore};
pub use wizard::{StepOutcome, Wizard, WizardEvent, WizardObserver};
