//! Local storage for the generation API key.
//!
//! The key is stored obfuscated, NOT encrypted: it is XORed with a fixed salt
//! and base64 encoded so it does not sit in plain text on disk. Anyone with
//! the file and this source can recover it.
use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use engine_logging::{engine_info, engine_warn};

use crate::persist::{AtomicFileWriter, PersistError};

const SALT: &[u8] = b"GH_SMART_SECRET_SALT_2025";

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("credential file is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("credential file does not contain valid UTF-8")]
    Utf8,
    #[error("failed to read credential file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write credential file: {0}")]
    Write(#[from] PersistError),
    #[error("failed to remove credential file {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// At-rest obfuscation of a key. Not a security boundary.
pub fn obfuscate(key: &str) -> String {
    STANDARD.encode(xor_with_salt(key.as_bytes()))
}

/// Reverse of [`obfuscate`].
pub fn reveal(stored: &str) -> Result<String, CredentialError> {
    let bytes = STANDARD.decode(stored.trim())?;
    String::from_utf8(xor_with_salt(&bytes)).map_err(|_| CredentialError::Utf8)
}

fn xor_with_salt(bytes: &[u8]) -> Vec<u8> {
    bytes
        .iter()
        .zip(SALT.iter().cycle())
        .map(|(byte, salt)| byte ^ salt)
        .collect()
}

/// File holding one obfuscated key.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `Ok(None)` when no key has been saved.
    pub fn load(&self) -> Result<Option<String>, CredentialError> {
        let stored = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(CredentialError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        let key = reveal(&stored)?;
        if key.trim().is_empty() {
            engine_warn!("Credential file {:?} is empty", self.path);
            return Ok(None);
        }
        engine_info!("Loaded API key from {:?}", self.path);
        Ok(Some(key))
    }

    pub fn save(&self, key: &str) -> Result<(), CredentialError> {
        let dir = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let filename = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| ".evalsheet_key".to_string());
        AtomicFileWriter::new(dir)
            .owner_only()
            .write(&filename, &obfuscate(key.trim()))?;
        engine_info!("Saved API key to {:?}", self.path);
        Ok(())
    }

    /// Returns true if a file was removed.
    pub fn clear(&self) -> Result<bool, CredentialError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(CredentialError::Remove {
                path: self.path.clone(),
                source,
            }),
        }
    }
}
