//! Per-record generation lifecycle.
//!
//! ```text
//! Idle | Completed | Error --(GenerateClicked, keywords present)--> Generating
//! Generating --(non-empty text)--> Completed
//! Generating --(failure or empty text)--> Error
//! ```
use std::fmt;

use crate::{Record, RecordStatus, Tone};

pub const FALLBACK_NAME: &str = "학생";
pub const FALLBACK_CATEGORY: &str = "종합의견";

/// Everything the generator needs for one record, with blank fields already
/// replaced by their fallbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub name: String,
    pub category: String,
    pub keywords: String,
    pub tone: Tone,
    pub target_length: u32,
    pub custom_instruction: String,
    pub reference_example: Option<String>,
}

/// Shared prompt settings that are not stored per record.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PromptSettings<'a> {
    pub tone: Tone,
    pub custom_instruction: &'a str,
    pub reference_example: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationFailure {
    /// The API key is missing or was rejected.
    Credential(String),
    Other(String),
}

impl GenerationFailure {
    pub fn is_credential(&self) -> bool {
        matches!(self, GenerationFailure::Credential(_))
    }
}

impl fmt::Display for GenerationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationFailure::Credential(message) => write!(f, "credential error: {message}"),
            GenerationFailure::Other(message) => write!(f, "{message}"),
        }
    }
}

pub type GenerationOutcome = Result<String, GenerationFailure>;

/// Why a generate action left the record untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateRefusal {
    UnknownRecord,
    BlankKeywords,
    AlreadyGenerating,
}

impl fmt::Display for GenerateRefusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateRefusal::UnknownRecord => write!(f, "no such record"),
            GenerateRefusal::BlankKeywords => write!(f, "keywords are empty"),
            GenerateRefusal::AlreadyGenerating => write!(f, "generation already in progress"),
        }
    }
}

impl Record {
    pub fn can_generate(&self) -> bool {
        self.check_generate().is_ok()
    }

    fn check_generate(&self) -> Result<(), GenerateRefusal> {
        if self.status == RecordStatus::Generating {
            return Err(GenerateRefusal::AlreadyGenerating);
        }
        if self.keywords.trim().is_empty() {
            return Err(GenerateRefusal::BlankKeywords);
        }
        Ok(())
    }

    /// Moves the record to `Generating` and returns the request to send.
    pub(crate) fn begin_generation(
        &mut self,
        settings: PromptSettings<'_>,
    ) -> Result<GenerationRequest, GenerateRefusal> {
        self.check_generate()?;
        self.status = RecordStatus::Generating;
        self.touch();
        Ok(self.request(settings))
    }

    /// Applies a collaborator result. Returns false if the record was not
    /// waiting for one.
    pub(crate) fn finish_generation(&mut self, outcome: &GenerationOutcome) -> bool {
        if self.status != RecordStatus::Generating {
            return false;
        }
        match outcome {
            Ok(text) if !text.trim().is_empty() => {
                self.generated_content = text.trim().to_string();
                self.status = RecordStatus::Completed;
            }
            Ok(_) | Err(_) => self.status = RecordStatus::Error,
        }
        self.touch();
        true
    }

    fn request(&self, settings: PromptSettings<'_>) -> GenerationRequest {
        GenerationRequest {
            name: non_blank_or(&self.name, FALLBACK_NAME),
            category: non_blank_or(&self.category, FALLBACK_CATEGORY),
            keywords: self.keywords.clone(),
            tone: settings.tone,
            target_length: if self.target_length == 0 {
                crate::DEFAULT_TARGET_LENGTH
            } else {
                self.target_length
            },
            custom_instruction: settings.custom_instruction.to_string(),
            reference_example: Some(settings.reference_example)
                .filter(|text| !text.trim().is_empty())
                .map(ToOwned::to_owned),
        }
    }
}

fn non_blank_or(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}
