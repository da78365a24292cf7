use crate::{GenerateRefusal, ImportSummary, Record, RecordId, RecordStatus, RowDefaults, Tone};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub rows: Vec<RecordRowView>,
    pub row_count: usize,
    pub completed_count: usize,
    pub defaults: RowDefaults,
    pub tone: Tone,
    pub custom_instruction: String,
    pub reference_example: Option<String>,
    pub last_import: Option<ImportSummary>,
    pub last_refusal: Option<(RecordId, GenerateRefusal)>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRowView {
    /// One-based display position.
    pub position: usize,
    pub record_id: RecordId,
    pub name: String,
    pub category: String,
    pub target_length: u32,
    pub keywords: String,
    pub generated_content: String,
    pub generated_chars: usize,
    pub status: RecordStatus,
    pub can_generate: bool,
}

impl RecordRowView {
    pub(crate) fn from_record(position: usize, record: &Record) -> Self {
        Self {
            position,
            record_id: record.id,
            name: record.name.clone(),
            category: record.category.clone(),
            target_length: record.target_length,
            keywords: record.keywords.clone(),
            generated_content: record.generated_content.clone(),
            generated_chars: record.generated_chars(),
            status: record.status,
            can_generate: record.can_generate(),
        }
    }
}
