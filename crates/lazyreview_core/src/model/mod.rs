//! Domain model for reviewable notes.
//!
//! # Responsibility
//! - `note`: the host-supplied, read-only snapshot of one note.
//! - `project`: the derived project/area state built from a snapshot.
//!
//! # Invariants
//! - Project state is always derived from a snapshot, never stored on its own.

pub mod note;
pub mod project;
