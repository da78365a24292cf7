use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use engine_logging::{engine_info, engine_warn};
use evalsheet_core::{
    export_csv, template_csv, update, AppState, Effect, FieldEdit, GenerationOutcome, Msg,
    RecordId, RecordStatus, RowDefaults, Tone, DEFAULT_INSTRUCTION, DEFAULT_REFERENCE_EXAMPLE,
};
use evalsheet_engine::{
    ensure_output_dir, read_csv_file, write_export, write_template, CredentialStore,
    ExportOptions, GeminiGenerator, GenerationSettings,
};

use crate::cli::{Cli, Command, GeneratorArgs, KeyAction, SetArgs, SettingsArgs, ToneArg};
use crate::effects::EffectRunner;
use crate::render::{render_table, status_label, tone_label};
use crate::session::{load_session, save_session, SessionLock};

pub(crate) const CREDENTIAL_FILENAME: &str = ".evalsheet_key";

/// Run one command. Commands that change the session hold the working
/// directory lock from load until their last save.
pub fn execute(cli: Cli) -> Result<()> {
    if !cli.command.mutates_session() {
        return App::load(cli.workdir.clone())?.run(cli);
    }
    ensure_output_dir(&cli.workdir)?;
    let mut lock = SessionLock::open(&cli.workdir)?;
    let _guard = lock.try_acquire()?;
    App::load(cli.workdir.clone())?.run(cli)
}

/// Working session bound to a directory.
pub struct App {
    state: AppState,
    workdir: PathBuf,
}

impl App {
    pub fn load(workdir: PathBuf) -> Result<Self> {
        let mut app = Self {
            state: AppState::new(),
            workdir,
        };
        if let Some(snapshot) = load_session(&app.workdir).context("failed to load session")? {
            app.dispatch(Msg::RestoreSession(snapshot));
            // Restoring alone is not a change worth writing back.
            app.state.consume_dirty();
        }
        Ok(app)
    }

    pub fn run(&mut self, cli: Cli) -> Result<()> {
        match cli.command {
            Command::List { full } => print!("{}", render_table(&self.state.view(), full)),
            Command::Add { count } => self.add_rows(count)?,
            Command::Set(args) => self.set_fields(args)?,
            Command::Delete { row } => self.delete_row(row)?,
            Command::Defaults {
                category,
                target_length,
            } => self.defaults(category, target_length)?,
            Command::Settings(args) => self.settings(args)?,
            Command::Import { file } => self.import(&file)?,
            Command::Export { out } => self.export(out)?,
            Command::Template { out } => self.template(out)?,
            Command::Generate { row, all } => self.generate(row, all, &cli.generator)?,
            Command::Key { action } => self.key(action, &cli.generator)?,
        }
        Ok(())
    }

    fn dispatch(&mut self, msg: Msg) -> Vec<Effect> {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        effects
    }

    fn save_if_dirty(&mut self) -> Result<()> {
        if self.state.consume_dirty() {
            save_session(&self.workdir, &self.state.snapshot())
                .context("failed to save session")?;
        }
        Ok(())
    }

    fn record_id(&self, row: usize) -> Result<RecordId> {
        let records = self.state.store().records();
        row.checked_sub(1)
            .and_then(|index| records.get(index))
            .map(|record| record.id)
            .ok_or_else(|| anyhow!("row {row} does not exist (table has {} rows)", records.len()))
    }

    fn credentials(&self) -> CredentialStore {
        CredentialStore::new(self.workdir.join(CREDENTIAL_FILENAME))
    }

    fn add_rows(&mut self, count: usize) -> Result<()> {
        self.dispatch(Msg::AddRowsClicked { count });
        self.save_if_dirty()?;
        println!("Added {count} row(s); table has {}.", self.state.store().len());
        Ok(())
    }

    fn set_fields(&mut self, args: SetArgs) -> Result<()> {
        let record_id = self.record_id(args.row)?;
        let edits = [
            args.name.map(FieldEdit::Name),
            args.category.map(FieldEdit::Category),
            args.target_length.map(FieldEdit::TargetLength),
            args.keywords.map(FieldEdit::Keywords),
            args.content.map(FieldEdit::GeneratedContent),
        ];
        let mut applied = 0;
        for edit in edits.into_iter().flatten() {
            self.dispatch(Msg::FieldEdited { record_id, edit });
            applied += 1;
        }
        if applied == 0 {
            bail!("nothing to change; pass at least one of --name, --category, --target-length, --keywords, --content");
        }
        self.save_if_dirty()?;
        println!("Updated row {}.", args.row);
        Ok(())
    }

    fn delete_row(&mut self, row: usize) -> Result<()> {
        let record_id = self.record_id(row)?;
        self.dispatch(Msg::DeleteRowClicked { record_id });
        self.save_if_dirty()?;
        println!("Deleted row {row}; table has {}.", self.state.store().len());
        Ok(())
    }

    fn defaults(&mut self, category: Option<String>, target_length: Option<u32>) -> Result<()> {
        if category.is_some() || target_length.is_some() {
            let current = self.state.defaults().clone();
            self.dispatch(Msg::DefaultsChanged(RowDefaults {
                category: category.unwrap_or(current.category),
                target_length: target_length.unwrap_or(current.target_length),
            }));
            self.save_if_dirty()?;
        }
        let defaults = self.state.defaults();
        println!("Default category: {}", display_or_none(&defaults.category));
        println!("Default target length: {}", defaults.target_length);
        Ok(())
    }

    fn settings(&mut self, args: SettingsArgs) -> Result<()> {
        if let Some(tone) = args.tone {
            self.dispatch(Msg::ToneSelected(match tone {
                ToneArg::Descriptive => Tone::Descriptive,
                ToneArg::Formal => Tone::Formal,
            }));
        }

        let instruction = if args.reset_instruction {
            Some(DEFAULT_INSTRUCTION.to_string())
        } else if let Some(path) = &args.instruction_file {
            Some(read_text(path)?)
        } else {
            args.instruction
        };
        if let Some(text) = instruction {
            self.dispatch(Msg::CustomInstructionChanged(text));
        }

        let reference = if args.clear_reference {
            Some(String::new())
        } else if args.reference_example {
            Some(DEFAULT_REFERENCE_EXAMPLE.to_string())
        } else if let Some(path) = &args.reference_file {
            Some(read_text(path)?)
        } else {
            args.reference
        };
        if let Some(text) = reference {
            self.dispatch(Msg::ReferenceExampleChanged(text));
        }

        self.save_if_dirty()?;

        let view = self.state.view();
        println!("Tone: {}", tone_label(view.tone));
        println!(
            "Custom instruction: {} chars{}",
            view.custom_instruction.chars().count(),
            if view.custom_instruction == DEFAULT_INSTRUCTION {
                " (built-in)"
            } else {
                ""
            }
        );
        match &view.reference_example {
            Some(text) => println!("Style reference: {} chars", text.chars().count()),
            None => println!("Style reference: off"),
        }
        Ok(())
    }

    fn import(&mut self, file: &Path) -> Result<()> {
        let loaded = read_csv_file(file).with_context(|| format!("failed to import {file:?}"))?;
        self.dispatch(Msg::CsvLoaded(loaded.text));
        self.save_if_dirty()?;

        match self.state.last_import() {
            Some(summary) if summary.imported > 0 => {
                println!(
                    "Imported {} row(s) from {:?} ({}){}.",
                    summary.imported,
                    file,
                    loaded.encoding_label,
                    if summary.replaced_placeholder {
                        ", replacing the empty row"
                    } else {
                        ""
                    }
                );
            }
            _ => println!("No rows found in {file:?}."),
        }
        Ok(())
    }

    fn export(&self, out: Option<PathBuf>) -> Result<()> {
        let dir = out.unwrap_or_else(|| self.workdir.clone());
        ensure_output_dir(&dir)?;
        let csv = export_csv(self.state.store().iter());
        let today = chrono::Local::now().date_naive();
        let path = write_export(&dir, &csv, today, &ExportOptions::default())
            .context("failed to export table")?;
        println!(
            "Exported {} row(s) to {}",
            self.state.store().len(),
            path.display()
        );
        Ok(())
    }

    fn template(&self, out: Option<PathBuf>) -> Result<()> {
        let dir = out.unwrap_or_else(|| self.workdir.clone());
        ensure_output_dir(&dir)?;
        let path = write_template(&dir, &template_csv(), &ExportOptions::default())
            .context("failed to write template")?;
        println!("Wrote import template to {}", path.display());
        Ok(())
    }

    fn generate(&mut self, row: Option<usize>, all: bool, args: &GeneratorArgs) -> Result<()> {
        let msg = match row {
            Some(row) if !all => Msg::GenerateClicked {
                record_id: self.record_id(row)?,
            },
            _ => Msg::GenerateAllClicked,
        };

        let generator = Arc::new(build_generator(args)?);
        match self.credentials().load() {
            Ok(Some(key)) => generator.set_api_key(&key),
            Ok(None) => engine_info!("No stored API key"),
            Err(err) => engine_warn!("Ignoring unreadable API key file: {}", err),
        }

        let effects = self.dispatch(msg);
        if let (Some(row), Some((_, refusal))) = (row, self.state.last_refusal()) {
            bail!("row {row} cannot be generated: {refusal}");
        }
        if effects.is_empty() {
            println!("No rows with keywords to generate.");
            return Ok(());
        }
        self.save_if_dirty()?;

        let mut runner = EffectRunner::new(generator).context("failed to start generation engine")?;
        runner.enqueue(effects);
        println!("Generating {} row(s)...", runner.pending());

        let mut failed = 0;
        while let Some(msg) = runner.next_msg() {
            if let Msg::GenerationFinished { record_id, outcome } = &msg {
                if !self.report_finished(*record_id, outcome) {
                    failed += 1;
                }
            }
            let effects = self.dispatch(msg);
            runner.enqueue(effects);
            self.save_if_dirty()?;
        }

        if failed > 0 {
            bail!("{failed} row(s) failed to generate");
        }
        Ok(())
    }

    /// Print one finished row. Returns false for failures.
    fn report_finished(&self, record_id: RecordId, outcome: &GenerationOutcome) -> bool {
        let store = self.state.store();
        let Some(position) = store.position(record_id) else {
            engine_info!("Dropping result for deleted record {}", record_id);
            return true;
        };
        let name = store
            .get(record_id)
            .map(|record| record.name.as_str())
            .unwrap_or_default();
        match outcome {
            Ok(text) if !text.trim().is_empty() => {
                println!(
                    "row {} {}: {} ({} chars)",
                    position + 1,
                    display_or_none(name),
                    status_label(RecordStatus::Completed),
                    text.trim().chars().count()
                );
                true
            }
            Ok(_) => {
                eprintln!("row {} {}: no content generated", position + 1, display_or_none(name));
                false
            }
            Err(failure) => {
                eprintln!("row {} {}: {}", position + 1, display_or_none(name), failure);
                false
            }
        }
    }

    fn key(&self, action: KeyAction, args: &GeneratorArgs) -> Result<()> {
        let store = self.credentials();
        match action {
            KeyAction::Set { key, test } => {
                let key = key.trim().to_string();
                if key.is_empty() {
                    bail!("API key is empty");
                }
                if test {
                    test_key(args, &key)?;
                    println!("Connection OK.");
                }
                store.save(&key).context("failed to save API key")?;
                println!(
                    "Saved API key to {} (obfuscated, not encrypted).",
                    store.path().display()
                );
            }
            KeyAction::Show => match store.load().context("failed to read API key")? {
                Some(key) => println!("{}", mask_key(&key)),
                None => println!("No API key stored."),
            },
            KeyAction::Clear => {
                if store.clear().context("failed to remove API key")? {
                    println!("Removed stored API key.");
                } else {
                    println!("No API key stored.");
                }
            }
            KeyAction::Test => {
                let key = store
                    .load()
                    .context("failed to read API key")?
                    .ok_or_else(|| anyhow!("no API key stored; run `evalsheet key set <KEY>`"))?;
                test_key(args, &key)?;
                println!("Connection OK.");
            }
        }
        Ok(())
    }
}

fn build_generator(args: &GeneratorArgs) -> Result<GeminiGenerator> {
    let mut settings = GenerationSettings::default();
    if let Some(base_url) = &args.base_url {
        settings.base_url = base_url.clone();
    }
    if let Some(model) = &args.model {
        settings.model = model.clone();
    }
    if let Some(secs) = args.timeout_secs {
        settings.request_timeout = Some(std::time::Duration::from_secs(secs));
    }
    GeminiGenerator::new(settings).context("failed to build generation client")
}

fn test_key(args: &GeneratorArgs, key: &str) -> Result<()> {
    let generator = build_generator(args)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;
    runtime
        .block_on(generator.test_connection(key))
        .context("API key test failed")
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {path:?}"))
}

fn display_or_none(value: &str) -> &str {
    if value.trim().is_empty() {
        "(none)"
    } else {
        value
    }
}

/// Keep only the ends of a key visible.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}{}{tail}", "*".repeat(chars.len() - 8))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn cli(temp: &TempDir, args: &[&str]) -> Cli {
        let mut argv = vec!["evalsheet", "--workdir", temp.path().to_str().unwrap()];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    fn run(temp: &TempDir, args: &[&str]) -> Result<App> {
        let cli = cli(temp, args);
        let mut app = App::load(cli.workdir.clone())?;
        app.run(cli)?;
        Ok(app)
    }

    fn session_files(temp: &TempDir) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(temp.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with(crate::session::SESSION_FILENAME))
            .collect();
        names.sort();
        names
    }

    #[test]
    fn edits_persist_between_invocations() {
        let temp = TempDir::new().unwrap();
        run(&temp, &["add", "-n", "2"]).unwrap();
        run(&temp, &["set", "2", "--name", "김철수", "--keywords", "토론"]).unwrap();

        let app = run(&temp, &["list"]).unwrap();
        let view = app.state.view();
        assert_eq!(view.row_count, 3);
        assert_eq!(view.rows[1].name, "김철수");
        assert_eq!(view.rows[1].keywords, "토론");
    }

    #[test]
    fn missing_row_is_an_error() {
        let temp = TempDir::new().unwrap();
        assert!(run(&temp, &["delete", "5"]).is_err());
        assert!(run(&temp, &["set", "0", "--name", "x"]).is_err());
    }

    #[test]
    fn generate_refuses_row_without_keywords() {
        let temp = TempDir::new().unwrap();
        let err = run(&temp, &["generate", "1"]).err().unwrap();
        assert!(err.to_string().contains("keywords are empty"));
    }

    #[test]
    fn import_then_export_writes_dated_file() {
        let temp = TempDir::new().unwrap();
        let csv = temp.path().join("in.csv");
        fs::write(&csv, "이름,영역,목표 글자수,키워드\n홍길동,진로활동,300,탐구\n").unwrap();

        let app = run(&temp, &["import", csv.to_str().unwrap()]).unwrap();
        assert_eq!(app.state.store().len(), 1);

        let out = temp.path().join("out");
        run(&temp, &["export", "--out", out.to_str().unwrap()]).unwrap();
        let exported: Vec<_> = fs::read_dir(&out).unwrap().collect();
        assert_eq!(exported.len(), 1);
    }

    #[test]
    fn unreadable_session_survives_a_mutating_command() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(crate::session::SESSION_FILENAME),
            "(records: [(id: 1, generated_content: \"긴 초안\", target_length: -5)])",
        )
        .unwrap();

        execute(cli(&temp, &["add"])).unwrap();

        let files = session_files(&temp);
        assert_eq!(files.len(), 2);
        let backup = files.iter().find(|name| name.ends_with(".bak")).unwrap();
        let kept = fs::read_to_string(temp.path().join(backup)).unwrap();
        assert!(kept.contains("긴 초안"));

        let app = run(&temp, &["list"]).unwrap();
        assert_eq!(app.state.store().len(), 2);
    }

    #[test]
    fn mutating_commands_wait_their_turn() {
        let temp = TempDir::new().unwrap();
        let mut held = SessionLock::open(temp.path()).unwrap();
        let guard = held.try_acquire().unwrap();

        let err = execute(cli(&temp, &["set", "1", "--name", "다른 창"])).unwrap_err();
        assert!(err.to_string().contains("another evalsheet command"));
        // Reading does not need the lock.
        execute(cli(&temp, &["list"])).unwrap();

        drop(guard);
        execute(cli(&temp, &["set", "1", "--name", "다른 창"])).unwrap();
        let app = run(&temp, &["list"]).unwrap();
        assert_eq!(app.state.view().rows[0].name, "다른 창");
    }

    #[test]
    fn keys_are_masked() {
        assert_eq!(mask_key("short"), "*****");
        assert_eq!(mask_key("AIzaSyABCDEFGH1234"), "AIza**********1234");
    }
}
