//! Evalsheet engine: generation client, file IO and credential storage.
mod credential;
mod decode;
mod engine;
mod files;
mod generate;
mod persist;
mod prompt;
mod types;

pub use credential::{obfuscate, reveal, CredentialError, CredentialStore};
pub use decode::{decode_text, DecodeError, DecodedText};
pub use engine::EngineHandle;
pub use files::{
    read_csv_file, write_export, write_template, ExportError, ExportOptions, ImportError,
    LoadedCsv,
};
pub use generate::{GeminiGenerator, GenerationSettings, Generator};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use prompt::build_prompt;
pub use types::{EngineEvent, FailureKind, GenerationError, GenerationRequest, RecordId, Tone};
