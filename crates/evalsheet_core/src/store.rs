use crate::generation::PromptSettings;
use crate::{
    FieldEdit, GenerateRefusal, GenerationOutcome, GenerationRequest, Record, RecordId,
    RecordStatus, RowDefaults,
};

const HEADER_MARKERS: [&str; 2] = ["이름", "name"];

/// Result of a bulk import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    pub imported: usize,
    pub header_skipped: bool,
    pub replaced_placeholder: bool,
}

/// Ordered record table. Ids are handed out from a counter and never reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordStore {
    records: Vec<Record>,
    next_id: RecordId,
}

impl Default for RecordStore {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            next_id: 1,
        }
    }
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from previously saved records.
    ///
    /// Ids are reassigned in table order, so duplicated or out-of-range ids
    /// in a hand-edited session cannot collide or overflow. Rows saved while
    /// a request was in flight come back as `Error`, since their result can
    /// no longer arrive.
    pub fn restore(records: Vec<Record>) -> Self {
        let mut store = Self::new();
        for mut record in records {
            if record.status == RecordStatus::Generating {
                record.status = RecordStatus::Error;
            }
            record.id = store.allocate_id();
            store.records.push(record);
        }
        store
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records.iter().find(|record| record.id == id)
    }

    fn get_mut(&mut self, id: RecordId) -> Option<&mut Record> {
        self.records.iter_mut().find(|record| record.id == id)
    }

    /// Zero-based position of a record in display order.
    pub fn position(&self, id: RecordId) -> Option<usize> {
        self.records.iter().position(|record| record.id == id)
    }

    pub fn completed_count(&self) -> usize {
        self.records
            .iter()
            .filter(|record| record.status == RecordStatus::Completed)
            .count()
    }

    /// True when the store holds only the blank row created at startup.
    pub fn is_single_placeholder(&self) -> bool {
        matches!(self.records.as_slice(), [only] if only.is_untouched())
    }

    pub fn add_rows(&mut self, count: usize, defaults: &RowDefaults) -> Vec<RecordId> {
        let mut ids = Vec::with_capacity(count);
        for _ in 0..count {
            let id = self.allocate_id();
            self.records.push(Record::new(id, defaults));
            ids.push(id);
        }
        ids
    }

    /// Returns false when no record has this id.
    pub fn update_field(&mut self, id: RecordId, edit: FieldEdit) -> bool {
        match self.get_mut(id) {
            Some(record) => {
                record.apply_edit(edit);
                true
            }
            None => false,
        }
    }

    pub fn delete_row(&mut self, id: RecordId) -> bool {
        let before = self.records.len();
        self.records.retain(|record| record.id != id);
        self.records.len() != before
    }

    /// Turn parsed CSV rows into records.
    ///
    /// Columns: name, category, target length, keywords. A leading header row
    /// is skipped and blank rows are dropped. A lone untouched placeholder is
    /// replaced by the imported rows; otherwise they are appended.
    pub fn import_rows(&mut self, mut rows: Vec<Vec<String>>, defaults: &RowDefaults) -> ImportSummary {
        let header_skipped = rows.first().is_some_and(|row| is_header_row(row));
        if header_skipped {
            rows.remove(0);
        }

        let mut imported = Vec::new();
        for row in rows
            .into_iter()
            .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
        {
            let id = self.allocate_id();
            let mut record = Record::new(id, defaults);
            record.name = cell(&row, 0).to_string();
            let category = cell(&row, 1);
            if !category.is_empty() {
                record.category = category.to_string();
            }
            record.target_length = parse_target_length(cell(&row, 2), defaults.target_length);
            record.keywords = cell(&row, 3).to_string();
            imported.push(record);
        }

        let replaced_placeholder = !imported.is_empty() && self.is_single_placeholder();
        if replaced_placeholder {
            self.records.clear();
        }
        let summary = ImportSummary {
            imported: imported.len(),
            header_skipped,
            replaced_placeholder,
        };
        self.records.extend(imported);
        summary
    }

    pub(crate) fn begin_generation(
        &mut self,
        id: RecordId,
        settings: PromptSettings<'_>,
    ) -> Result<GenerationRequest, GenerateRefusal> {
        self.get_mut(id)
            .ok_or(GenerateRefusal::UnknownRecord)?
            .begin_generation(settings)
    }

    /// Returns false if the record is gone or was not generating.
    pub(crate) fn finish_generation(&mut self, id: RecordId, outcome: &GenerationOutcome) -> bool {
        self.get_mut(id)
            .is_some_and(|record| record.finish_generation(outcome))
    }

    fn allocate_id(&mut self) -> RecordId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(|value| value.trim()).unwrap_or("")
}

fn is_header_row(row: &[String]) -> bool {
    let first = cell(row, 0).to_lowercase();
    HEADER_MARKERS.iter().any(|marker| first.contains(marker))
}

/// Leading-digit integer parse; anything unusable or non-positive falls back.
pub fn parse_target_length(value: &str, fallback: u32) -> u32 {
    let value = value.trim();
    let digits = value.strip_prefix('+').unwrap_or(value);
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    match digits[..end].parse::<u32>() {
        Ok(parsed) if parsed > 0 => parsed,
        _ => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_length_takes_leading_digits() {
        assert_eq!(parse_target_length("700자", 500), 700);
        assert_eq!(parse_target_length("+300", 500), 300);
        assert_eq!(parse_target_length("abc", 500), 500);
        assert_eq!(parse_target_length("0", 500), 500);
        assert_eq!(parse_target_length("-20", 500), 500);
        assert_eq!(parse_target_length("", 450), 450);
        assert_eq!(parse_target_length("99999999999", 500), 500);
    }

    #[test]
    fn restore_continues_ids_after_highest() {
        let defaults = RowDefaults::default();
        let mut store = RecordStore::new();
        store.add_rows(3, &defaults);
        let saved = store.records().to_vec();

        let mut restored = RecordStore::restore(saved);
        let ids = restored.add_rows(1, &defaults);
        assert_eq!(ids, vec![4]);
    }

    #[test]
    fn restore_renumbers_duplicate_and_maximal_ids() {
        let defaults = RowDefaults::default();
        let mut saved = vec![
            Record::new(RecordId::MAX, &defaults),
            Record::new(7, &defaults),
            Record::new(7, &defaults),
        ];
        saved[2].name = "둘째".to_string();

        let mut restored = RecordStore::restore(saved);
        let ids: Vec<RecordId> = restored.iter().map(|record| record.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(restored.records()[2].name, "둘째");
        assert_eq!(restored.add_rows(1, &defaults), vec![4]);
    }
}
