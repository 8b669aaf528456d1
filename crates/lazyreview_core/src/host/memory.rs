//! In-memory note host for embedding and tests.

use super::{validate_id, HostError, HostResult, NoteDocument, NoteHost};
use crate::metadata::{splice_metadata_line, MetadataSlot};
use std::collections::BTreeMap;

/// Map of note id to markdown text.
#[derive(Debug, Clone, Default)]
pub struct MemoryNoteHost {
    notes: BTreeMap<String, String>,
    read_only: bool,
}

impl MemoryNoteHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces one note.
    pub fn insert(&mut self, id: impl Into<String>, text: impl Into<String>) {
        self.notes.insert(id.into(), text.into());
    }

    /// Current raw text of one note.
    pub fn text(&self, id: &str) -> Option<&str> {
        self.notes.get(id).map(String::as_str)
    }

    /// When set, every write fails with `HostError::WriteRejected`.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }
}

impl NoteHost for MemoryNoteHost {
    fn list_notes(&self) -> HostResult<Vec<String>> {
        Ok(self.notes.keys().cloned().collect())
    }

    fn read_note(&self, id: &str) -> HostResult<NoteDocument> {
        validate_id(id)?;
        let text = self
            .notes
            .get(id)
            .ok_or_else(|| HostError::NoteNotFound(id.to_string()))?;
        Ok(NoteDocument::from_markdown(id, text.as_str()))
    }

    fn write_metadata_line(
        &mut self,
        id: &str,
        slot: MetadataSlot,
        line: &str,
    ) -> HostResult<()> {
        validate_id(id)?;
        if self.read_only {
            return Err(HostError::WriteRejected(id.to_string()));
        }
        let text = self
            .notes
            .get_mut(id)
            .ok_or_else(|| HostError::NoteNotFound(id.to_string()))?;
        *text = splice_metadata_line(text.as_str(), slot, line);
        Ok(())
    }
}
