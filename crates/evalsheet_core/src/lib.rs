//! Evalsheet core: record table, CSV conversion and the generation state machine.
mod csv;
mod effect;
mod generation;
mod instructions;
mod msg;
mod record;
mod state;
mod store;
mod update;
mod view_model;

pub use csv::{export_csv, parse_csv, template_csv, EXPORT_HEADERS, TEMPLATE_HEADERS};
pub use effect::Effect;
pub use generation::{
    GenerateRefusal, GenerationFailure, GenerationOutcome, GenerationRequest, FALLBACK_CATEGORY,
    FALLBACK_NAME,
};
pub use instructions::{DEFAULT_INSTRUCTION, DEFAULT_REFERENCE_EXAMPLE};
pub use msg::Msg;
pub use record::{
    FieldEdit, Record, RecordId, RecordStatus, RowDefaults, Tone, DEFAULT_TARGET_LENGTH,
};
pub use state::{AppState, SessionSnapshot};
pub use store::{parse_target_length, ImportSummary, RecordStore};
pub use update::update;
pub use view_model::{AppViewModel, RecordRowView};
