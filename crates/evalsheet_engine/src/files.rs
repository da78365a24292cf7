use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use engine_logging::engine_info;

use crate::decode::{decode_text, DecodeError};
use crate::persist::{AtomicFileWriter, PersistError};

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub export_prefix: String,
    pub template_filename: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            export_prefix: "saenggibu_export".to_string(),
            template_filename: "saenggibu_template.csv".to_string(),
        }
    }
}

impl ExportOptions {
    /// `{prefix}_{YYYY-MM-DD}.csv`
    pub fn export_filename(&self, date: NaiveDate) -> String {
        format!("{}_{}.csv", self.export_prefix, date.format("%Y-%m-%d"))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },
}

/// Text of an uploaded CSV file plus the encoding it was read with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedCsv {
    pub text: String,
    pub encoding_label: String,
}

pub fn read_csv_file(path: &Path) -> Result<LoadedCsv, ImportError> {
    let bytes = fs::read(path).map_err(|source| ImportError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = decode_text(&bytes).map_err(|source| ImportError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    engine_info!(
        "Read {} bytes from {:?} as {}",
        bytes.len(),
        path,
        decoded.encoding_label
    );
    Ok(LoadedCsv {
        text: decoded.text,
        encoding_label: decoded.encoding_label,
    })
}

/// Write an already rendered export into `dir` under the dated file name.
pub fn write_export(
    dir: &Path,
    csv: &str,
    date: NaiveDate,
    options: &ExportOptions,
) -> Result<PathBuf, ExportError> {
    let writer = AtomicFileWriter::new(dir.to_path_buf());
    let path = writer.write(&options.export_filename(date), csv)?;
    engine_info!("Exported {} bytes to {:?}", csv.len(), path);
    Ok(path)
}

pub fn write_template(
    dir: &Path,
    csv: &str,
    options: &ExportOptions,
) -> Result<PathBuf, ExportError> {
    let writer = AtomicFileWriter::new(dir.to_path_buf());
    let path = writer.write(&options.template_filename, csv)?;
    engine_info!("Wrote import template to {:?}", path);
    Ok(path)
}
