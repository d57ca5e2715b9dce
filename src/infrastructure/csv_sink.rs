//! CSV persistence
//!
//! One file per city and calendar month:
//! `<root>/<slug>/aqi_<slug>_<year>_<mon>.csv`, `mon` being the lowercase
//! English month abbreviation. The header is written only when the file is new.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::measurement::{MeasurementRecord, RECORD_HEADER};

/// Appends measurement records to the per-city monthly files
#[derive(Debug)]
pub struct CsvSink {
    root: PathBuf,
    /// Serializes appends so concurrent crawls never interleave rows or headers.
    write_lock: Mutex<()>,
}

impl CsvSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// File the record belongs to; the month comes from the record timestamp.
    pub fn output_path(&self, record: &MeasurementRecord, slug: &str) -> PathBuf {
        let year = record.timestamp.format("%Y");
        let month = record.timestamp.format("%b").to_string().to_lowercase();
        self.root
            .join(slug)
            .join(format!("aqi_{slug}_{year}_{month}.csv"))
    }

    /// Append one row, creating directories and the header as needed.
    pub async fn append(&self, record: &MeasurementRecord, slug: &str) -> Result<PathBuf> {
        let path = self.output_path(record, slug);
        let _guard = self.write_lock.lock().await;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("Failed to create directory {}", dir.display()))?;
        }

        let is_new = is_new_file(&path).await?;
        let bytes = encode_rows(record, is_new)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .with_context(|| format!("Failed to open {}", path.display()))?;
        file.write_all(&bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        file.flush().await?;

        debug!("Appended {} bytes to {} (new file: {})", bytes.len(), path.display(), is_new);
        Ok(path)
    }
}

/// `true` when nothing exists at `path` yet. A failing stat is an error, not a new file.
async fn is_new_file(path: &Path) -> Result<bool> {
    let exists = fs::try_exists(path)
        .await
        .with_context(|| format!("Failed to check {}", path.display()))?;
    Ok(!exists)
}

fn encode_rows(record: &MeasurementRecord, with_header: bool) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    if with_header {
        writer.write_record(RECORD_HEADER)?;
    }
    writer.write_record(record.csv_row())?;
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV buffer: {}", e.error()))
}
