use crate::{GenerationRequest, RecordId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send one record to the generator; the result comes back as
    /// `Msg::GenerationFinished`.
    Generate {
        record_id: RecordId,
        request: GenerationRequest,
    },
    /// The API key is missing or rejected; ask the user for a new one.
    PromptForCredential,
}
