//! Core domain logic for LazyReview.
//! This crate is the single source of truth for project review invariants:
//! inline-tag extraction, scheduling math, lifecycle transitions and the
//! metadata line round-trip.

pub mod config;
pub mod host;
pub mod interval;
pub mod logging;
pub mod metadata;
pub mod model;
pub mod service;
pub mod summary;
pub mod tags;
pub mod transition;

pub use config::{ConfigError, ReviewConfig};
pub use host::{FsNoteHost, HostError, HostResult, MemoryNoteHost, NoteDocument, NoteHost};
pub use interval::{
    calc_next_review_date, days_between, offset_date, Interval, IntervalError, IntervalUnit,
};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status, LoggingError};
pub use metadata::{
    locate_metadata_line, merge_metadata_line, render_metadata_line, splice_metadata_line,
    MetadataSlot,
};
pub use model::note::{NoteSnapshot, Paragraph, ParagraphType};
pub use model::project::{NoteType, ProjectState};
pub use service::review_service::{ProjectEntry, ReviewService, ReviewServiceError};
pub use summary::{
    decorated_project_title, detailed_summary_line, machine_summary_line,
    relative_date_from_number, render_review_summary,
};
pub use tags::{contains_token, content_within_brackets, first_matching_tag, TagSet, Token};
pub use transition::{cancel_project, complete_project, finish_review, Transition, TransitionKind};

/// Current calendar day on the local clock.
///
/// The only clock read in the crate; everything else takes `today` explicitly.
pub fn local_today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
