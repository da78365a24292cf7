use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_info, engine_warn};

use crate::generate::Generator;
use crate::{EngineEvent, GenerationRequest, RecordId};

enum EngineCommand {
    Generate {
        record_id: RecordId,
        request: GenerationRequest,
    },
}

/// Runs generation requests on a background tokio runtime.
///
/// Every request becomes its own task, so requests for different records run
/// concurrently and finish in any order. Results arrive as [`EngineEvent`]s.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(generator: Arc<dyn Generator>) -> io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("evalsheet-engine")
            .build()?;

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let generator = generator.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(generator.as_ref(), command, event_tx).await;
                });
            }
            // Let in-flight requests report before the runtime goes away.
            runtime.shutdown_timeout(Duration::from_secs(1));
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn generate(&self, record_id: RecordId, request: GenerationRequest) {
        if self
            .cmd_tx
            .send(EngineCommand::Generate { record_id, request })
            .is_err()
        {
            engine_warn!("Engine stopped; dropping generation for record {}", record_id);
        }
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Block until the next event arrives.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }
}

async fn handle_command(
    generator: &dyn Generator,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Generate { record_id, request } => {
            engine_info!("Generation started for record {}", record_id);
            let result = generator.generate(&request).await;
            match &result {
                Ok(text) => engine_info!(
                    "Generation finished for record {} ({} chars)",
                    record_id,
                    text.chars().count()
                ),
                Err(err) => engine_warn!("Generation failed for record {}: {}", record_id, err),
            }
            let _ = event_tx.send(EngineEvent::GenerationCompleted { record_id, result });
        }
    }
}
