use crate::{AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::AddRowsClicked { count } => {
            state.add_rows(count);
            Vec::new()
        }
        Msg::FieldEdited { record_id, edit } => {
            state.edit_field(record_id, edit);
            Vec::new()
        }
        Msg::DeleteRowClicked { record_id } => {
            state.delete_row(record_id);
            Vec::new()
        }
        Msg::DefaultsChanged(defaults) => {
            state.set_defaults(defaults);
            Vec::new()
        }
        Msg::ToneSelected(tone) => {
            state.set_tone(tone);
            Vec::new()
        }
        Msg::CustomInstructionChanged(text) => {
            state.set_custom_instruction(text);
            Vec::new()
        }
        Msg::ReferenceExampleChanged(text) => {
            state.set_reference_example(text);
            Vec::new()
        }
        Msg::CsvLoaded(text) => {
            state.import_csv(&text);
            Vec::new()
        }
        Msg::GenerateClicked { record_id } => match state.begin_generation(record_id) {
            Ok(request) => vec![Effect::Generate { record_id, request }],
            Err(_) => Vec::new(),
        },
        Msg::GenerateAllClicked => {
            let ids = state.generatable_ids();
            let mut effects = Vec::with_capacity(ids.len());
            for record_id in ids {
                if let Ok(request) = state.begin_generation(record_id) {
                    effects.push(Effect::Generate { record_id, request });
                }
            }
            effects
        }
        Msg::GenerationFinished { record_id, outcome } => {
            state.finish_generation(record_id, &outcome);
            match outcome {
                Err(failure) if failure.is_credential() => vec![Effect::PromptForCredential],
                _ => Vec::new(),
            }
        }
        Msg::RestoreSession(snapshot) => {
            state.restore(snapshot);
            Vec::new()
        }
    };

    (state, effects)
}
