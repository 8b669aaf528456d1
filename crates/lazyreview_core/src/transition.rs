//! Project lifecycle transitions.
//!
//! # Responsibility
//! - Apply complete/cancel/finish-review actions to a `ProjectState`.
//! - Produce the metadata line the host must write back.
//!
//! # Invariants
//! - Transitions consume a state and return a new one; they never perform I/O.
//! - Durations are recomputed against the same `today` used for the new dates.
//! - Completing also sets `is_cancelled`, matching how derivation reads a
//!   `@completed` date back.
//! - Merging with the note's current line keeps flags the renderer never
//!   emits (`#someday`, `#cancelled`, custom note-type tags); only complete and
//!   cancel retire `#active`.

use crate::metadata::{merge_metadata_line, render_metadata_line};
use crate::model::project::{ProjectState, ACTIVE_HASHTAG};
use chrono::NaiveDate;
use log::info;
use serde::{Deserialize, Serialize};

/// Lifecycle action applied to a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    Complete,
    Cancel,
    FinishReview,
}

impl TransitionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::Cancel => "cancel",
            Self::FinishReview => "finish_review",
        }
    }

    /// Hashtags the action removes from an existing metadata line.
    pub fn retired_hashtags(self) -> &'static [&'static str] {
        match self {
            Self::Complete | Self::Cancel => &[ACTIVE_HASHTAG],
            Self::FinishReview => &[],
        }
    }

    /// Applies this action to `state`.
    pub fn apply(self, state: ProjectState, today: NaiveDate) -> Transition {
        match self {
            Self::Complete => complete_project(state, today),
            Self::Cancel => cancel_project(state, today),
            Self::FinishReview => finish_review(state, today),
        }
    }
}

/// New state plus its rendered metadata line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub kind: TransitionKind,
    pub state: ProjectState,
    pub metadata_line: String,
}

impl Transition {
    fn new(kind: TransitionKind, state: ProjectState) -> Self {
        let metadata_line = render_metadata_line(&state);
        info!(
            "event=project_transition module=transition status=ok action={} archived={} completed={} cancelled={}",
            kind.as_str(),
            state.is_archived,
            state.is_completed,
            state.is_cancelled
        );
        Self {
            kind,
            state,
            metadata_line,
        }
    }

    /// Folds the unrendered tags of the note's current metadata line into
    /// `metadata_line`.
    pub fn merged_with(mut self, existing_line: &str) -> Self {
        self.metadata_line = merge_metadata_line(
            existing_line,
            &self.metadata_line,
            self.kind.retired_hashtags(),
        );
        self
    }
}

/// Marks a project completed today and archives it.
pub fn complete_project(mut state: ProjectState, today: NaiveDate) -> Transition {
    state.is_archived = true;
    state.is_completed = true;
    state.is_cancelled = true;
    state.is_active = false;
    state.completed_date = Some(today);
    Transition::new(TransitionKind::Complete, state.recompute_durations(today))
}

/// Marks a project cancelled today and archives it.
pub fn cancel_project(mut state: ProjectState, today: NaiveDate) -> Transition {
    state.is_archived = true;
    state.is_completed = false;
    state.is_cancelled = true;
    state.is_active = false;
    state.cancelled_date = Some(today);
    Transition::new(TransitionKind::Cancel, state.recompute_durations(today))
}

/// Records a review done today, pushing the next review one interval out.
pub fn finish_review(mut state: ProjectState, today: NaiveDate) -> Transition {
    state.reviewed_date = Some(today);
    Transition::new(TransitionKind::FinishReview, state.recompute_durations(today))
}

#[cfg(test)]
mod tests {
    use super::{cancel_project, complete_project, finish_review, TransitionKind};
    use crate::model::note::NoteSnapshot;
    use crate::model::project::ProjectState;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn active_project(today: NaiveDate) -> ProjectState {
        let text = "# Garden\n#project @start(2024-01-01) @review(2w) @reviewed(2024-01-10)";
        ProjectState::build(&NoteSnapshot::from_markdown("Projects/Garden.md", text), today)
    }

    #[test]
    fn complete_sets_coupled_flags_and_finished_days() {
        let today = date(2024, 1, 20);
        let transition = complete_project(active_project(today), today);
        let state = &transition.state;
        assert!(state.is_completed);
        assert!(state.is_cancelled);
        assert!(state.is_archived);
        assert!(!state.is_active);
        assert_eq!(state.completed_date, Some(today));
        assert_eq!(state.finished_days, Some(19));
        assert_eq!(
            transition.metadata_line,
            "#archive #project @start(2024-01-01) @review(2w) @reviewed(2024-01-10) @completed(2024-01-20)"
        );
    }

    #[test]
    fn cancel_sets_cancelled_date_only() {
        let today = date(2024, 1, 20);
        let transition = cancel_project(active_project(today), today);
        let state = &transition.state;
        assert!(!state.is_completed);
        assert!(state.is_cancelled);
        assert!(state.is_archived);
        assert_eq!(state.cancelled_date, Some(today));
        assert_eq!(state.completed_date, None);
        assert_eq!(state.finished_days, Some(19));
        assert!(transition.metadata_line.ends_with("@cancelled(2024-01-20)"));
    }

    #[test]
    fn finish_review_moves_next_review_forward() {
        let today = date(2024, 1, 26);
        let before = active_project(today);
        assert!(before.is_ready_for_review());

        let transition = finish_review(before, today);
        assert_eq!(transition.state.reviewed_date, Some(today));
        assert_eq!(transition.state.next_review_date, Some(date(2024, 2, 9)));
        assert_eq!(transition.state.next_review_days, Some(14));
        assert!(!transition.state.is_ready_for_review());
        assert!(transition.metadata_line.contains("@reviewed(2024-01-26)"));
    }

    #[test]
    fn finish_review_keeps_someday_flag_of_existing_line() {
        let today = date(2024, 1, 20);
        let existing = "#area #someday @review(1w)";
        let text = format!("# Someday\n{existing}");
        let note = NoteSnapshot::from_markdown("Areas/Someday.md", &text);
        let before = ProjectState::build(&note, today);
        assert!(before.is_cancelled);

        let transition = finish_review(before, today).merged_with(existing);
        assert_eq!(
            transition.metadata_line,
            "#area @review(1w) @reviewed(2024-01-20) #someday"
        );
        let reread = ProjectState::build(
            &NoteSnapshot::from_markdown(
                "Areas/Someday.md",
                &format!("# Someday\n{}", transition.metadata_line),
            ),
            today,
        );
        assert!(reread.is_cancelled);
        assert!(!reread.is_active);
    }

    #[test]
    fn complete_retires_active_but_keeps_custom_type_tag() {
        let today = date(2024, 1, 20);
        let existing = "#goal #active @review(1w)";
        let note = NoteSnapshot::from_markdown("Goals/Run.md", &format!("# Run\n{existing}"));
        let transition =
            complete_project(ProjectState::build(&note, today), today).merged_with(existing);
        assert_eq!(
            transition.metadata_line,
            "#archive @review(1w) @completed(2024-01-20) #goal"
        );
    }

    #[test]
    fn kind_dispatches_to_matching_operation() {
        let today = date(2024, 1, 20);
        let transition = TransitionKind::Cancel.apply(active_project(today), today);
        assert_eq!(transition.kind, TransitionKind::Cancel);
        assert_eq!(transition.state.cancelled_date, Some(today));
    }
}
