//! Filesystem note host over a directory of markdown files.
//!
//! # Invariants
//! - Only `.md` and `.txt` files are notes; hidden entries are skipped.
//! - Ids are paths relative to the root, joined with `/`.
//! - Writes go to a sibling temp file first and are renamed into place.

use super::{validate_id, HostError, HostResult, NoteDocument, NoteHost};
use crate::metadata::{splice_metadata_line, MetadataSlot};
use log::{debug, error};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const NOTE_EXTENSIONS: &[&str] = &["md", "txt"];

/// Note host rooted at one directory.
#[derive(Debug, Clone)]
pub struct FsNoteHost {
    root: PathBuf,
}

impl FsNoteHost {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &str) -> HostResult<PathBuf> {
        validate_id(id)?;
        Ok(id.split('/').fold(self.root.clone(), |path, part| path.join(part)))
    }

    fn collect(&self, dir: &Path, prefix: &str, ids: &mut Vec<String>) -> HostResult<()> {
        let io_err = |source: std::io::Error| HostError::Io {
            id: prefix.to_string(),
            source,
        };
        for entry in std::fs::read_dir(dir).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            let id = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}/{name}")
            };
            let file_type = entry.file_type().map_err(io_err)?;
            if file_type.is_dir() {
                self.collect(&entry.path(), &id, ids)?;
            } else if file_type.is_file() && has_note_extension(&name) {
                ids.push(id);
            }
        }
        Ok(())
    }
}

fn has_note_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| NOTE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

fn read_error(id: &str, source: std::io::Error) -> HostError {
    if source.kind() == ErrorKind::NotFound {
        HostError::NoteNotFound(id.to_string())
    } else {
        HostError::Io {
            id: id.to_string(),
            source,
        }
    }
}

impl NoteHost for FsNoteHost {
    fn list_notes(&self) -> HostResult<Vec<String>> {
        let mut ids = Vec::new();
        self.collect(&self.root, "", &mut ids)?;
        ids.sort();
        debug!("event=notes_list module=host status=ok count={}", ids.len());
        Ok(ids)
    }

    fn read_note(&self, id: &str) -> HostResult<NoteDocument> {
        let path = self.path_for(id)?;
        let text = std::fs::read_to_string(&path).map_err(|source| read_error(id, source))?;
        Ok(NoteDocument::from_markdown(id, text))
    }

    fn write_metadata_line(
        &mut self,
        id: &str,
        slot: MetadataSlot,
        line: &str,
    ) -> HostResult<()> {
        let path = self.path_for(id)?;
        let text = std::fs::read_to_string(&path).map_err(|source| read_error(id, source))?;
        let updated = splice_metadata_line(&text, slot, line);

        let mut tmp_name = path.as_os_str().to_owned();
        tmp_name.push(".lazyreview-tmp");
        let tmp_path = PathBuf::from(tmp_name);
        let result =
            std::fs::write(&tmp_path, updated).and_then(|()| std::fs::rename(&tmp_path, &path));
        if let Err(source) = result {
            let _ = std::fs::remove_file(&tmp_path);
            error!("event=note_write module=host status=error error={source}");
            return Err(HostError::Io {
                id: id.to_string(),
                source,
            });
        }
        Ok(())
    }
}
