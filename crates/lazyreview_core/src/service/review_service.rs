//! Review use-case service.
//!
//! # Responsibility
//! - Discover reviewable notes through a `NoteHost`.
//! - Derive project state per note and list what is due for review.
//! - Apply lifecycle transitions and hand the new metadata line to the host.
//!
//! # Invariants
//! - Project state is rebuilt from a fresh host read for every call.
//! - A transition writes exactly one metadata line; failures are returned
//!   together with the transition and never retried.
//! - Tags on the replaced line that the renderer does not own are kept.
//! - Ready-for-review lists are sorted by `next_review_days ASC, title ASC`.

use crate::config::ReviewConfig;
use crate::host::{HostError, NoteDocument, NoteHost};
use crate::metadata::{locate_metadata_line, MetadataSlot};
use crate::model::project::ProjectState;
use crate::summary::compare_by_next_review;
use crate::tags::contains_token;
use crate::transition::{Transition, TransitionKind};
use chrono::NaiveDate;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for review use-cases.
#[derive(Debug)]
pub enum ReviewServiceError {
    /// Host read/list failure.
    Host(HostError),
    /// Note carries none of the configured project/area hashtags.
    NotAProject(String),
    /// Transition was computed but the host failed to persist it.
    WriteFailed {
        transition: Box<Transition>,
        source: HostError,
    },
}

impl Display for ReviewServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Host(err) => write!(f, "{err}"),
            Self::NotAProject(id) => write!(f, "note is not a project or area: {id}"),
            Self::WriteFailed { transition, source } => write!(
                f,
                "failed to write {} metadata: {source}",
                transition.kind.as_str()
            ),
        }
    }
}

impl Error for ReviewServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Host(err) => Some(err),
            Self::WriteFailed { source, .. } => Some(source),
            Self::NotAProject(_) => None,
        }
    }
}

impl From<HostError> for ReviewServiceError {
    fn from(value: HostError) -> Self {
        Self::Host(value)
    }
}

/// Project state paired with the id of the note it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectEntry {
    pub id: String,
    pub state: ProjectState,
}

/// Review service facade over a note host.
pub struct ReviewService<H: NoteHost> {
    host: H,
    config: ReviewConfig,
}

impl<H: NoteHost> ReviewService<H> {
    pub fn new(host: H, config: ReviewConfig) -> Self {
        Self { host, config }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn config(&self) -> &ReviewConfig {
        &self.config
    }

    /// Whether a note carries one of the configured note-type hashtags.
    pub fn is_review_candidate(&self, document: &NoteDocument) -> bool {
        !self.config.is_ignored(&document.id)
            && self
                .config
                .note_type_tags
                .iter()
                .any(|tag| contains_token(&document.snapshot.hashtags, tag).is_some())
    }

    /// Builds the project state of one note, whatever its hashtags.
    pub fn load_project(
        &self,
        id: &str,
        today: NaiveDate,
    ) -> Result<ProjectState, ReviewServiceError> {
        let document = self.host.read_note(id)?;
        Ok(ProjectState::build(&document.snapshot, today))
    }

    /// Builds every reviewable note, in host id order.
    ///
    /// Notes that cannot be decoded are skipped with a warning.
    pub fn list_projects(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<ProjectEntry>, ReviewServiceError> {
        let mut entries = Vec::new();
        for id in self.host.list_notes()? {
            if self.config.is_ignored(&id) {
                continue;
            }
            let document = match self.host.read_note(&id) {
                Ok(document) => document,
                Err(err @ HostError::Io { .. }) => {
                    warn!("event=note_read module=service status=skip error={err}");
                    continue;
                }
                Err(err) => return Err(err.into()),
            };
            if !self.is_review_candidate(&document) {
                continue;
            }
            let state = ProjectState::build(&document.snapshot, today);
            entries.push(ProjectEntry { id, state });
        }
        info!(
            "event=projects_list module=service status=ok count={}",
            entries.len()
        );
        Ok(entries)
    }

    /// Active projects whose review is due, most overdue first.
    pub fn ready_for_review(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<ProjectEntry>, ReviewServiceError> {
        let mut ready: Vec<ProjectEntry> = self
            .list_projects(today)?
            .into_iter()
            .filter(|entry| entry.state.is_ready_for_review())
            .collect();
        ready.sort_by(|a, b| compare_by_next_review(&a.state, &b.state));
        Ok(ready)
    }

    /// Completes a project and writes its metadata line.
    pub fn complete(
        &mut self,
        id: &str,
        today: NaiveDate,
    ) -> Result<Transition, ReviewServiceError> {
        self.transition(id, TransitionKind::Complete, today)
    }

    /// Cancels a project and writes its metadata line.
    pub fn cancel(
        &mut self,
        id: &str,
        today: NaiveDate,
    ) -> Result<Transition, ReviewServiceError> {
        self.transition(id, TransitionKind::Cancel, today)
    }

    /// Stamps `@reviewed(today)` on a project.
    pub fn finish_review(
        &mut self,
        id: &str,
        today: NaiveDate,
    ) -> Result<Transition, ReviewServiceError> {
        self.transition(id, TransitionKind::FinishReview, today)
    }

    fn transition(
        &mut self,
        id: &str,
        kind: TransitionKind,
        today: NaiveDate,
    ) -> Result<Transition, ReviewServiceError> {
        let document = self.host.read_note(id)?;
        if !self.is_review_candidate(&document) {
            return Err(ReviewServiceError::NotAProject(id.to_string()));
        }

        let state = ProjectState::build(&document.snapshot, today);
        let slot = locate_metadata_line(&document.snapshot);
        let mut transition = kind.apply(state, today);
        if let MetadataSlot::Existing(idx) = slot {
            if let Some(existing) = document.text.lines().nth(idx) {
                transition = transition.merged_with(existing);
            }
        }

        match self
            .host
            .write_metadata_line(id, slot, &transition.metadata_line)
        {
            Ok(()) => {
                info!(
                    "event=metadata_write module=service status=ok action={} slot={:?}",
                    kind.as_str(),
                    slot
                );
                Ok(transition)
            }
            Err(source) => {
                error!(
                    "event=metadata_write module=service status=error action={} error={}",
                    kind.as_str(),
                    source
                );
                Err(ReviewServiceError::WriteFailed {
                    transition: Box::new(transition),
                    source,
                })
            }
        }
    }
}
