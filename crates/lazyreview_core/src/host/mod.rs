//! Host environment contracts.
//!
//! # Responsibility
//! - Define how core reads note snapshots and writes metadata lines back.
//! - Ship in-memory and filesystem adapters over the same contract.
//!
//! # Invariants
//! - Notes are addressed by host-relative ids using `/` separators.
//! - `read_note` always returns a fresh snapshot; hosts never cache derived
//!   project state.
//! - A write replaces or inserts exactly one line and nothing else.
//! - Hosts do not retry failed writes.

use crate::metadata::MetadataSlot;
use crate::model::note::NoteSnapshot;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod fs;
pub mod memory;

pub use fs::FsNoteHost;
pub use memory::MemoryNoteHost;

pub type HostResult<T> = Result<T, HostError>;

/// Host read/write failure.
#[derive(Debug)]
pub enum HostError {
    NoteNotFound(String),
    /// Id is empty, absolute or escapes the note root.
    InvalidId(String),
    /// Host refused the write (read-only store, locked note, ...).
    WriteRejected(String),
    Io { id: String, source: std::io::Error },
}

impl Display for HostError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::InvalidId(id) => write!(f, "invalid note id: `{id}`"),
            Self::WriteRejected(id) => write!(f, "host rejected write to note: {id}"),
            Self::Io { id, source } => write!(f, "i/o error on note {id}: {source}"),
        }
    }
}

impl Error for HostError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Full note text plus the snapshot derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDocument {
    pub id: String,
    pub text: String,
    pub snapshot: NoteSnapshot,
}

impl NoteDocument {
    /// Builds a document from markdown using the reference reader.
    pub fn from_markdown(id: impl Into<String>, text: impl Into<String>) -> Self {
        let id = id.into();
        let text = text.into();
        let snapshot = NoteSnapshot::from_markdown(id.as_str(), &text);
        Self { id, text, snapshot }
    }
}

/// Storage/editor collaborator owned by the embedding application.
pub trait NoteHost {
    /// Ids of every note the host exposes, sorted.
    fn list_notes(&self) -> HostResult<Vec<String>>;
    /// Reads one note.
    fn read_note(&self, id: &str) -> HostResult<NoteDocument>;
    /// Replaces or inserts the metadata line of one note and persists it.
    fn write_metadata_line(&mut self, id: &str, slot: MetadataSlot, line: &str)
        -> HostResult<()>;
}

pub(crate) fn validate_id(id: &str) -> HostResult<()> {
    let invalid = id.trim().is_empty()
        || id.starts_with('/')
        || id.contains('\\')
        || id.split('/').any(|part| part.is_empty() || part == "." || part == "..");
    if invalid {
        return Err(HostError::InvalidId(id.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::validate_id;

    #[test]
    fn validate_id_rejects_escaping_paths() {
        assert!(validate_id("Projects/Garden.md").is_ok());
        for id in ["", "/etc/passwd", "../x.md", "a//b.md", "a/./b.md", "a\\b.md"] {
            assert!(validate_id(id).is_err(), "{id} should be rejected");
        }
    }
}
