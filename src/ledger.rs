//! Append-only JSONL ledger of decode results.
//!
//! One record per decoded wordform, one JSON object per line. The ledger is
//! the replayable account of what was decoded and with what confidence; it
//! is never rewritten in place.

use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::compose::Program;
use crate::error::{LedgerError, UskResult};

/// One persisted decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodeRecord {
    /// Normalized surface form.
    pub surface: String,
    /// Matched operator surfaces, in step order.
    pub operators: Vec<String>,
    /// Matched payload surfaces, in step order.
    pub payloads: Vec<String>,
    pub gloss: String,
    pub confidence: f64,
    /// Free text naming the decoder that produced the record.
    pub provenance: String,
}

impl DecodeRecord {
    /// Build a record from a decoded program.
    pub fn from_program(program: &Program, provenance: impl Into<String>) -> Self {
        Self {
            surface: program.surface.clone(),
            operators: program.operators(),
            payloads: program.payloads(),
            gloss: program.gloss.clone(),
            confidence: program.confidence,
            provenance: provenance.into(),
        }
    }
}

/// Handle on a JSONL ledger file.
#[derive(Debug, Clone)]
pub struct DecodeLedger {
    path: PathBuf,
}

impl DecodeLedger {
    /// Open a ledger at `path`, creating the file (and parent directory) if
    /// absent.
    pub fn open(path: impl Into<PathBuf>) -> UskResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| LedgerError::Io { source: e })?;
        }
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| LedgerError::Io { source: e })?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record as a single JSON line.
    pub fn append(&self, record: &DecodeRecord) -> UskResult<()> {
        let line = serde_json::to_string(record).map_err(|e| LedgerError::Serialization {
            message: e.to_string(),
        })?;
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| LedgerError::Io { source: e })?;
        writeln!(file, "{line}").map_err(|e| LedgerError::Io { source: e })?;
        Ok(())
    }

    /// Read every record, in append order.
    pub fn read_all(&self) -> UskResult<Vec<DecodeRecord>> {
        let file = std::fs::File::open(&self.path).map_err(|e| LedgerError::Io { source: e })?;
        let reader = BufReader::new(file);
        let mut records = Vec::new();
        for (number, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| LedgerError::Io { source: e })?;
            if line.trim().is_empty() {
                continue;
            }
            let record: DecodeRecord =
                serde_json::from_str(&line).map_err(|e| LedgerError::Serialization {
                    message: format!("line {}: {e}", number + 1),
                })?;
            records.push(record);
        }
        Ok(records)
    }
}
