use crate::{FieldEdit, GenerationOutcome, RecordId, RowDefaults, SessionSnapshot, Tone};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User asked for `count` new blank rows.
    AddRowsClicked { count: usize },
    /// User edited one cell of a row.
    FieldEdited { record_id: RecordId, edit: FieldEdit },
    /// User deleted a row.
    DeleteRowClicked { record_id: RecordId },
    /// Default category/target length for new and imported rows changed.
    DefaultsChanged(RowDefaults),
    ToneSelected(Tone),
    CustomInstructionChanged(String),
    /// Style reference text; blank disables it.
    ReferenceExampleChanged(String),
    /// Contents of a CSV file finished loading.
    CsvLoaded(String),
    /// User clicked generate (or regenerate) on a row.
    GenerateClicked { record_id: RecordId },
    /// Generate every row that currently accepts it.
    GenerateAllClicked,
    /// Generator result for a row.
    GenerationFinished {
        record_id: RecordId,
        outcome: GenerationOutcome,
    },
    /// Restore a previously saved working session.
    RestoreSession(SessionSnapshot),
}
