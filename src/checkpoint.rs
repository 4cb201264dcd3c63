use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::features::FeatureRecord;

/// One line of the append-only progress log. Batches run for hours; the
/// log is what lets an interrupted run resume without re-auditing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointEntry {
    pub url: String,
    pub status: CheckpointStatus,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub label_score: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub features: Option<FeatureRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointStatus {
    Done,
    Discarded,
}

/// Append-only JSONL checkpoint writer. Safe to share across workers; a
/// poisoned lock only costs the entry, never the batch.
pub struct CheckpointLog {
    inner: Mutex<BufWriter<File>>,
}

impl CheckpointLog {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            inner: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn append(&self, entry: &CheckpointEntry) {
        let Ok(json) = serde_json::to_string(entry) else {
            return;
        };
        if let Ok(mut writer) = self.inner.lock() {
            let _ = writeln!(writer, "{json}");
            let _ = writer.flush();
        }
    }

    /// Entries from a previous run. A missing file is an empty history;
    /// unreadable lines are skipped so a torn final write cannot block a
    /// resume.
    pub fn load(path: impl AsRef<Path>) -> io::Result<Vec<CheckpointEntry>> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err),
        };
        let mut entries = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<CheckpointEntry>(&line) {
                Ok(entry) => entries.push(entry),
                Err(err) => log::warn!("skipping unreadable checkpoint line: {err}"),
            }
        }
        Ok(entries)
    }
}

/// URLs that need no re-processing: every checkpointed URL, including
/// discarded ones (a discard is a decision, not an omission).
pub fn completed_urls(entries: &[CheckpointEntry]) -> HashSet<String> {
    entries.iter().map(|entry| entry.url.clone()).collect()
}
