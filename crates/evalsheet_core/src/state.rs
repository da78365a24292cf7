use crate::generation::PromptSettings;
use crate::view_model::{AppViewModel, RecordRowView};
use crate::{
    FieldEdit, GenerateRefusal, GenerationOutcome, GenerationRequest, ImportSummary, Record,
    RecordId, RecordStore, RowDefaults, Tone, DEFAULT_INSTRUCTION,
};

/// Everything needed to resume a working session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub records: Vec<Record>,
    pub defaults: RowDefaults,
    pub tone: Tone,
    pub custom_instruction: String,
    pub reference_example: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    store: RecordStore,
    defaults: RowDefaults,
    tone: Tone,
    custom_instruction: String,
    reference_example: String,
    last_import: Option<ImportSummary>,
    last_refusal: Option<(RecordId, GenerateRefusal)>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        let mut state = Self {
            store: RecordStore::new(),
            defaults: RowDefaults::default(),
            tone: Tone::default(),
            custom_instruction: DEFAULT_INSTRUCTION.to_string(),
            reference_example: String::new(),
            last_import: None,
            last_refusal: None,
            dirty: false,
        };
        state.ensure_row();
        state
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn defaults(&self) -> &RowDefaults {
        &self.defaults
    }

    pub fn tone(&self) -> Tone {
        self.tone
    }

    /// Why the latest generate action on a row was refused, if it was.
    pub fn last_refusal(&self) -> Option<(RecordId, GenerateRefusal)> {
        self.last_refusal
    }

    pub fn last_import(&self) -> Option<ImportSummary> {
        self.last_import
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            rows: self
                .store
                .iter()
                .enumerate()
                .map(|(index, record)| RecordRowView::from_record(index + 1, record))
                .collect(),
            row_count: self.store.len(),
            completed_count: self.store.completed_count(),
            defaults: self.defaults.clone(),
            tone: self.tone,
            custom_instruction: self.custom_instruction.clone(),
            reference_example: Some(self.reference_example.clone())
                .filter(|text| !text.trim().is_empty()),
            last_import: self.last_import,
            last_refusal: self.last_refusal,
            dirty: self.dirty,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            records: self.store.records().to_vec(),
            defaults: self.defaults.clone(),
            tone: self.tone,
            custom_instruction: self.custom_instruction.clone(),
            reference_example: self.reference_example.clone(),
        }
    }

    /// Returns the dirty flag and clears it.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn add_rows(&mut self, count: usize) {
        if count == 0 {
            return;
        }
        self.store.add_rows(count, &self.defaults);
        self.mark_dirty();
    }

    pub(crate) fn edit_field(&mut self, record_id: RecordId, edit: FieldEdit) {
        if self.store.update_field(record_id, edit) {
            self.mark_dirty();
        }
    }

    pub(crate) fn delete_row(&mut self, record_id: RecordId) {
        if self.store.delete_row(record_id) {
            self.ensure_row();
            self.mark_dirty();
        }
    }

    pub(crate) fn set_defaults(&mut self, defaults: RowDefaults) {
        if self.defaults != defaults {
            self.defaults = defaults;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_tone(&mut self, tone: Tone) {
        if self.tone != tone {
            self.tone = tone;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_custom_instruction(&mut self, text: String) {
        if self.custom_instruction != text {
            self.custom_instruction = text;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_reference_example(&mut self, text: String) {
        if self.reference_example != text {
            self.reference_example = text;
            self.mark_dirty();
        }
    }

    pub(crate) fn import_csv(&mut self, text: &str) {
        let rows = crate::parse_csv(text);
        let summary = self.store.import_rows(rows, &self.defaults);
        self.last_import = Some(summary);
        self.mark_dirty();
    }

    pub(crate) fn begin_generation(
        &mut self,
        record_id: RecordId,
    ) -> Result<GenerationRequest, GenerateRefusal> {
        let settings = PromptSettings {
            tone: self.tone,
            custom_instruction: &self.custom_instruction,
            reference_example: &self.reference_example,
        };
        match self.store.begin_generation(record_id, settings) {
            Ok(request) => {
                self.last_refusal = None;
                self.mark_dirty();
                Ok(request)
            }
            Err(refusal) => {
                self.last_refusal = Some((record_id, refusal));
                Err(refusal)
            }
        }
    }

    /// Ids of rows that would accept a generate action right now.
    pub(crate) fn generatable_ids(&self) -> Vec<RecordId> {
        self.store
            .iter()
            .filter(|record| record.can_generate())
            .map(|record| record.id)
            .collect()
    }

    pub(crate) fn finish_generation(&mut self, record_id: RecordId, outcome: &GenerationOutcome) {
        if self.store.finish_generation(record_id, outcome) {
            self.mark_dirty();
        }
    }

    pub(crate) fn restore(&mut self, snapshot: SessionSnapshot) {
        self.store = RecordStore::restore(snapshot.records);
        self.defaults = snapshot.defaults;
        self.tone = snapshot.tone;
        self.custom_instruction = snapshot.custom_instruction;
        self.reference_example = snapshot.reference_example;
        self.last_import = None;
        self.last_refusal = None;
        self.ensure_row();
        self.mark_dirty();
    }

    /// Keeps at least one row on screen.
    fn ensure_row(&mut self) {
        if self.store.is_empty() {
            self.store.add_rows(1, &self.defaults);
        }
    }
}
