use std::fmt;

pub type RecordId = u64;

/// Target length used when neither the row nor the defaults provide one.
pub const DEFAULT_TARGET_LENGTH: u32 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordStatus {
    #[default]
    Idle,
    Generating,
    Completed,
    Error,
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordStatus::Idle => write!(f, "idle"),
            RecordStatus::Generating => write!(f, "generating"),
            RecordStatus::Completed => write!(f, "completed"),
            RecordStatus::Error => write!(f, "error"),
        }
    }
}

/// Sentence-ending register requested from the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    /// Noun endings (~함, ~임) used in official school records.
    #[default]
    Descriptive,
    /// Polite formal endings (~합니다, ~습니다).
    Formal,
}

/// Values applied to rows created by `add_rows` and to missing import columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowDefaults {
    pub category: String,
    pub target_length: u32,
}

impl Default for RowDefaults {
    fn default() -> Self {
        Self {
            category: String::new(),
            target_length: DEFAULT_TARGET_LENGTH,
        }
    }
}

/// A single user edit of one record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    Name(String),
    Category(String),
    TargetLength(u32),
    Keywords(String),
    GeneratedContent(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: RecordId,
    pub name: String,
    pub category: String,
    pub keywords: String,
    pub target_length: u32,
    pub generated_content: String,
    pub status: RecordStatus,
    /// Unix milliseconds of the last mutation.
    pub last_updated: i64,
}

impl Record {
    pub(crate) fn new(id: RecordId, defaults: &RowDefaults) -> Self {
        Self {
            id,
            name: String::new(),
            category: defaults.category.clone(),
            keywords: String::new(),
            target_length: defaults.target_length,
            generated_content: String::new(),
            status: RecordStatus::Idle,
            last_updated: now_millis(),
        }
    }

    pub(crate) fn apply_edit(&mut self, edit: FieldEdit) {
        match edit {
            FieldEdit::Name(value) => self.name = value,
            FieldEdit::Category(value) => self.category = value,
            FieldEdit::TargetLength(value) => self.target_length = value,
            FieldEdit::Keywords(value) => self.keywords = value,
            FieldEdit::GeneratedContent(value) => self.generated_content = value,
        }
        self.touch();
    }

    pub(crate) fn touch(&mut self) {
        self.last_updated = now_millis();
    }

    /// True for a row nobody has typed into yet.
    pub fn is_untouched(&self) -> bool {
        self.name.trim().is_empty()
            && self.keywords.trim().is_empty()
            && self.generated_content.trim().is_empty()
    }

    /// Character count of the generated text, as shown next to the content.
    pub fn generated_chars(&self) -> usize {
        self.generated_content.chars().count()
    }
}

pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
