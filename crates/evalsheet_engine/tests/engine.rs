use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use evalsheet_engine::{
    EngineEvent, EngineHandle, FailureKind, GenerationError, GenerationRequest, Generator, Tone,
};

/// Echoes the keywords back after a delay encoded in the category.
struct EchoGenerator;

#[async_trait::async_trait]
impl Generator for EchoGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let delay: u64 = request.category.parse().unwrap_or(0);
        tokio::time::sleep(Duration::from_millis(delay)).await;
        if request.keywords == "fail" {
            return Err(GenerationError {
                kind: FailureKind::HttpStatus(500),
                message: "boom".to_string(),
            });
        }
        Ok(format!("echo {}", request.keywords))
    }
}

fn request(keywords: &str, delay_ms: u64) -> GenerationRequest {
    GenerationRequest {
        name: "학생".to_string(),
        category: delay_ms.to_string(),
        keywords: keywords.to_string(),
        tone: Tone::Descriptive,
        target_length: 500,
        custom_instruction: String::new(),
        reference_example: None,
    }
}

#[test]
fn requests_run_concurrently_and_report_per_record() {
    let engine = EngineHandle::new(Arc::new(EchoGenerator)).expect("engine");
    engine.generate(1, request("slow", 300));
    engine.generate(2, request("fast", 0));
    engine.generate(3, request("fail", 0));

    let mut order = Vec::new();
    let mut results = HashMap::new();
    for _ in 0..3 {
        let Some(EngineEvent::GenerationCompleted { record_id, result }) = engine.recv() else {
            panic!("engine stopped early");
        };
        order.push(record_id);
        results.insert(record_id, result);
    }

    // The slow request must not hold back the others.
    assert_eq!(order.last(), Some(&1));
    assert_eq!(results[&1], Ok("echo slow".to_string()));
    assert_eq!(results[&2], Ok("echo fast".to_string()));
    assert_eq!(results[&3].as_ref().unwrap_err().kind, FailureKind::HttpStatus(500));
    assert!(engine.try_recv().is_none());
}
