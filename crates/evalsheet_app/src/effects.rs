use std::sync::Arc;

use engine_logging::{engine_info, engine_warn};
use evalsheet_core::{Effect, GenerationFailure, GenerationRequest, Msg, Tone};
use evalsheet_engine::{EngineEvent, EngineHandle, GenerationError, Generator};

/// Executes core effects against the engine and turns engine events back
/// into messages.
pub struct EffectRunner {
    engine: EngineHandle,
    pending: usize,
    credential_prompted: bool,
}

impl EffectRunner {
    pub fn new(generator: Arc<dyn Generator>) -> std::io::Result<Self> {
        Ok(Self {
            engine: EngineHandle::new(generator)?,
            pending: 0,
            credential_prompted: false,
        })
    }

    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn enqueue(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Generate { record_id, request } => {
                    engine_info!(
                        "Generate record_id={} keywords_len={}",
                        record_id,
                        request.keywords.chars().count()
                    );
                    self.engine.generate(record_id, map_request(request));
                    self.pending += 1;
                }
                Effect::PromptForCredential => {
                    if !self.credential_prompted {
                        self.credential_prompted = true;
                        eprintln!(
                            "API key is missing or was rejected. Save one with `evalsheet key set <KEY>`."
                        );
                    }
                }
            }
        }
    }

    /// Wait for the next finished request. `None` once nothing is pending.
    pub fn next_msg(&mut self) -> Option<Msg> {
        if self.pending == 0 {
            return None;
        }
        let Some(event) = self.engine.recv() else {
            engine_warn!("Engine stopped with {} requests pending", self.pending);
            self.pending = 0;
            return None;
        };
        self.pending -= 1;
        match event {
            EngineEvent::GenerationCompleted { record_id, result } => Some(Msg::GenerationFinished {
                record_id,
                outcome: result.map_err(map_failure),
            }),
        }
    }
}

fn map_request(request: GenerationRequest) -> evalsheet_engine::GenerationRequest {
    evalsheet_engine::GenerationRequest {
        name: request.name,
        category: request.category,
        keywords: request.keywords,
        tone: map_tone(request.tone),
        target_length: request.target_length,
        custom_instruction: request.custom_instruction,
        reference_example: request.reference_example,
    }
}

fn map_tone(tone: Tone) -> evalsheet_engine::Tone {
    match tone {
        Tone::Descriptive => evalsheet_engine::Tone::Descriptive,
        Tone::Formal => evalsheet_engine::Tone::Formal,
    }
}

fn map_failure(err: GenerationError) -> GenerationFailure {
    if err.kind.is_credential() {
        GenerationFailure::Credential(err.message)
    } else {
        GenerationFailure::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evalsheet_engine::FailureKind;

    struct FixedGenerator(Result<String, GenerationError>);

    #[async_trait::async_trait]
    impl Generator for FixedGenerator {
        async fn generate(
            &self,
            _request: &evalsheet_engine::GenerationRequest,
        ) -> Result<String, GenerationError> {
            self.0.clone()
        }
    }

    fn request() -> GenerationRequest {
        GenerationRequest {
            name: "학생".to_string(),
            category: "종합의견".to_string(),
            keywords: "k".to_string(),
            tone: Tone::Formal,
            target_length: 500,
            custom_instruction: String::new(),
            reference_example: None,
        }
    }

    #[test]
    fn generate_effect_comes_back_as_finished_msg() {
        let generator = Arc::new(FixedGenerator(Ok("본문".to_string())));
        let mut runner = EffectRunner::new(generator).unwrap();
        runner.enqueue(vec![Effect::Generate {
            record_id: 7,
            request: request(),
        }]);
        assert_eq!(runner.pending(), 1);

        let msg = runner.next_msg().unwrap();
        assert_eq!(
            msg,
            Msg::GenerationFinished {
                record_id: 7,
                outcome: Ok("본문".to_string()),
            }
        );
        assert!(runner.next_msg().is_none());
    }

    #[test]
    fn credential_errors_stay_distinguishable() {
        let missing = GenerationError {
            kind: FailureKind::MissingCredential,
            message: "API key is missing".to_string(),
        };
        assert!(map_failure(missing).is_credential());

        let quota = GenerationError {
            kind: FailureKind::HttpStatus(429),
            message: "quota".to_string(),
        };
        assert_eq!(
            map_failure(quota),
            GenerationFailure::Other("http status 429: quota".to_string())
        );
    }
}
