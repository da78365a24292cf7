use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use engine_logging::{engine_info, engine_warn};
use evalsheet_core::{Record, RecordStatus, RowDefaults, SessionSnapshot, Tone};
use evalsheet_engine::{AtomicFileWriter, PersistError};
use serde::{Deserialize, Serialize};

pub(crate) const SESSION_FILENAME: &str = ".evalsheet_session.ron";
pub(crate) const LOCK_FILENAME: &str = ".evalsheet.lock";

#[derive(Debug, thiserror::Error)]
pub(crate) enum SessionError {
    #[error("failed to serialize session: {0}")]
    Serialize(#[from] ron::Error),
    #[error("failed to write session: {0}")]
    Persist(#[from] PersistError),
    #[error("failed to read session {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to move unreadable session {path} aside: {source}")]
    Backup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to open lock file {path}: {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("another evalsheet command is using {path}; try again when it finishes ({source})")]
    Busy {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Advisory lock serializing commands that change a working directory's
/// session. Held from load until the last save.
pub(crate) struct SessionLock {
    path: PathBuf,
    lock: fd_lock::RwLock<File>,
}

impl SessionLock {
    pub(crate) fn open(workdir: &Path) -> Result<Self, SessionError> {
        let path = workdir.join(LOCK_FILENAME);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|source| SessionError::Lock {
                path: path.clone(),
                source,
            })?;
        Ok(Self {
            path,
            lock: fd_lock::RwLock::new(file),
        })
    }

    /// Fails at once instead of waiting when another process holds the lock.
    pub(crate) fn try_acquire(
        &mut self,
    ) -> Result<fd_lock::RwLockWriteGuard<'_, File>, SessionError> {
        let path = &self.path;
        self.lock.try_write().map_err(|source| SessionError::Busy {
            path: path.clone(),
            source,
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
enum PersistedStatus {
    Idle,
    Generating,
    Completed,
    Error,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
enum PersistedTone {
    Descriptive,
    Formal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedRecord {
    id: u64,
    name: String,
    category: String,
    keywords: String,
    target_length: u32,
    #[serde(default)]
    generated_content: String,
    status: PersistedStatus,
    #[serde(default)]
    last_updated: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedSession {
    records: Vec<PersistedRecord>,
    default_category: String,
    default_target_length: u32,
    tone: PersistedTone,
    custom_instruction: String,
    #[serde(default)]
    reference_example: String,
}

pub(crate) fn session_path(workdir: &Path) -> PathBuf {
    workdir.join(SESSION_FILENAME)
}

/// Load the saved session, or `None` when there is none.
///
/// A session that cannot be parsed is renamed to a timestamped `.bak` file
/// so the next save does not overwrite it.
pub(crate) fn load_session(workdir: &Path) -> Result<Option<SessionSnapshot>, SessionError> {
    let path = session_path(workdir);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) if err.kind() == ErrorKind::InvalidData => {
            engine_warn!("Session {:?} is not valid UTF-8: {}", path, err);
            move_aside(&path)?;
            return Ok(None);
        }
        Err(source) => return Err(SessionError::Read { path, source }),
    };

    let session: PersistedSession = match ron::from_str(&content) {
        Ok(session) => session,
        Err(err) => {
            engine_warn!("Failed to parse session from {:?}: {}", path, err);
            move_aside(&path)?;
            return Ok(None);
        }
    };

    engine_info!(
        "Loaded session with {} rows from {:?}",
        session.records.len(),
        path
    );
    Ok(Some(from_persisted(session)))
}

fn move_aside(path: &Path) -> Result<PathBuf, SessionError> {
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S%.3f");
    let backup = path.with_file_name(format!("{}.{}.bak", SESSION_FILENAME, stamp));
    fs::rename(path, &backup).map_err(|source| SessionError::Backup {
        path: path.to_path_buf(),
        source,
    })?;
    engine_warn!("Moved unreadable session to {:?}", backup);
    eprintln!(
        "Session file could not be read; kept it as {} and started a new session.",
        backup.display()
    );
    Ok(backup)
}

pub(crate) fn save_session(workdir: &Path, snapshot: &SessionSnapshot) -> Result<PathBuf, SessionError> {
    let session = to_persisted(snapshot);
    let pretty = ron::ser::PrettyConfig::new();
    let content = ron::ser::to_string_pretty(&session, pretty)?;

    let writer = AtomicFileWriter::new(workdir.to_path_buf());
    let path = writer.write(SESSION_FILENAME, &content)?;
    engine_info!("Saved session with {} rows to {:?}", snapshot.records.len(), path);
    Ok(path)
}

fn to_persisted(snapshot: &SessionSnapshot) -> PersistedSession {
    PersistedSession {
        records: snapshot
            .records
            .iter()
            .map(|record| PersistedRecord {
                id: record.id,
                name: record.name.clone(),
                category: record.category.clone(),
                keywords: record.keywords.clone(),
                target_length: record.target_length,
                generated_content: record.generated_content.clone(),
                status: match record.status {
                    RecordStatus::Idle => PersistedStatus::Idle,
                    RecordStatus::Generating => PersistedStatus::Generating,
                    RecordStatus::Completed => PersistedStatus::Completed,
                    RecordStatus::Error => PersistedStatus::Error,
                },
                last_updated: record.last_updated,
            })
            .collect(),
        default_category: snapshot.defaults.category.clone(),
        default_target_length: snapshot.defaults.target_length,
        tone: match snapshot.tone {
            Tone::Descriptive => PersistedTone::Descriptive,
            Tone::Formal => PersistedTone::Formal,
        },
        custom_instruction: snapshot.custom_instruction.clone(),
        reference_example: snapshot.reference_example.clone(),
    }
}

fn from_persisted(session: PersistedSession) -> SessionSnapshot {
    SessionSnapshot {
        records: session
            .records
            .into_iter()
            .map(|record| Record {
                id: record.id,
                name: record.name,
                category: record.category,
                keywords: record.keywords,
                target_length: record.target_length,
                generated_content: record.generated_content,
                status: match record.status {
                    PersistedStatus::Idle => RecordStatus::Idle,
                    PersistedStatus::Generating => RecordStatus::Generating,
                    PersistedStatus::Completed => RecordStatus::Completed,
                    PersistedStatus::Error => RecordStatus::Error,
                },
                last_updated: record.last_updated,
            })
            .collect(),
        defaults: RowDefaults {
            category: session.default_category,
            target_length: session.default_target_length,
        },
        tone: match session.tone {
            PersistedTone::Descriptive => Tone::Descriptive,
            PersistedTone::Formal => Tone::Formal,
        },
        custom_instruction: session.custom_instruction,
        reference_example: session.reference_example,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evalsheet_core::{update, AppState, FieldEdit, Msg};
    use tempfile::TempDir;

    #[test]
    fn session_round_trips_through_disk() {
        let temp = TempDir::new().unwrap();
        let state = AppState::new();
        let id = state.view().rows[0].record_id;
        let (state, _) = update(
            state,
            Msg::FieldEdited {
                record_id: id,
                edit: FieldEdit::Keywords("토론, \"인용\"\n줄바꿈".to_string()),
            },
        );
        let (state, _) = update(state, Msg::ToneSelected(Tone::Formal));
        let snapshot = state.snapshot();

        save_session(temp.path(), &snapshot).unwrap();
        let loaded = load_session(temp.path()).unwrap().unwrap();

        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn missing_session_loads_as_none() {
        let temp = TempDir::new().unwrap();
        assert!(load_session(temp.path()).unwrap().is_none());
    }

    #[test]
    fn corrupt_session_is_moved_aside() {
        let temp = TempDir::new().unwrap();
        let path = session_path(temp.path());
        fs::write(&path, "(records: [(generated_content: \"긴 초안\", target_length: -5)]").unwrap();

        assert!(load_session(temp.path()).unwrap().is_none());

        assert!(!path.exists());
        let backups: Vec<PathBuf> = fs::read_dir(temp.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|entry| entry.to_string_lossy().ends_with(".bak"))
            .collect();
        assert_eq!(backups.len(), 1);
        assert!(fs::read_to_string(&backups[0]).unwrap().contains("긴 초안"));
    }

    #[test]
    fn second_lock_holder_is_turned_away() {
        let temp = TempDir::new().unwrap();
        let mut first = SessionLock::open(temp.path()).unwrap();
        let guard = first.try_acquire().unwrap();

        let mut second = SessionLock::open(temp.path()).unwrap();
        assert!(matches!(
            second.try_acquire(),
            Err(SessionError::Busy { .. })
        ));

        drop(guard);
        assert!(second.try_acquire().is_ok());
    }
}
