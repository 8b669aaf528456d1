//! Reviewable project/area read model.
//!
//! # Responsibility
//! - Derive a `ProjectState` from one `NoteSnapshot`.
//! - Recompute scheduling durations against an explicit reference day.
//!
//! # Invariants
//! - Derivation is a pure function of `(snapshot, today)`.
//! - Malformed date payloads resolve to `None`; derivation never fails.
//! - A missing review interval leaves `next_review_*` as `None`, never zero.
//! - Flag order: completed -> archived -> cancelled -> active.
//! - Task counts are a snapshot taken at build time.

use crate::interval::{calc_next_review_date, days_between, IntervalError};
use crate::model::note::{NoteSnapshot, ParagraphType};
use crate::tags::{contains_token, content_within_brackets, first_matching_tag};
use chrono::NaiveDate;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const START_MENTION: &str = "@start";
pub const DUE_MENTION: &str = "@due";
pub const REVIEW_MENTION: &str = "@review";
pub const REVIEWED_MENTION: &str = "@reviewed";
pub const COMPLETED_MENTION: &str = "@completed";
pub const CANCELLED_MENTION: &str = "@cancelled";

pub const PROJECT_HASHTAG: &str = "#project";
pub const AREA_HASHTAG: &str = "#area";
pub const ACTIVE_HASHTAG: &str = "#active";
pub const ARCHIVE_HASHTAG: &str = "#archive";
pub const CANCELLED_HASHTAG: &str = "#cancelled";
pub const SOMEDAY_HASHTAG: &str = "#someday";
pub const WAITING_MARKER: &str = "#waiting";

/// Title used when the note has none.
pub const UNTITLED_PLACEHOLDER: &str = "(error)";

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{4})-(\d{2})-(\d{2})").expect("valid date regex"));

/// Classification hashtag of a note.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteType {
    Project,
    Area,
    #[default]
    None,
}

impl NoteType {
    /// `#project` takes precedence when both hashtags are present.
    pub fn classify<S: AsRef<str>>(hashtags: &[S]) -> Self {
        if contains_token(hashtags, PROJECT_HASHTAG).is_some() {
            Self::Project
        } else if contains_token(hashtags, AREA_HASHTAG).is_some() {
            Self::Area
        } else {
            Self::None
        }
    }

    /// Hashtag rendered in the metadata line, if any.
    pub fn hashtag(self) -> Option<&'static str> {
        match self {
            Self::Project => Some(PROJECT_HASHTAG),
            Self::Area => Some(AREA_HASHTAG),
            Self::None => None,
        }
    }
}

/// Structured state of one project/area note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectState {
    pub note_type: NoteType,
    pub title: String,
    pub folder: String,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub reviewed_date: Option<NaiveDate>,
    pub completed_date: Option<NaiveDate>,
    pub cancelled_date: Option<NaiveDate>,
    /// Raw `@review(...)` payload; validated only when applied.
    pub review_interval: Option<String>,
    pub next_review_date: Option<NaiveDate>,
    /// Negative when the review is overdue.
    pub next_review_days: Option<i64>,
    /// Negative when overdue, positive when days remain.
    pub due_days: Option<i64>,
    /// Days from start to completion (or cancellation).
    pub finished_days: Option<i64>,
    pub open_tasks: usize,
    pub completed_tasks: usize,
    pub waiting_tasks: usize,
    pub is_completed: bool,
    pub is_cancelled: bool,
    pub is_archived: bool,
    pub is_active: bool,
}

impl ProjectState {
    /// Empty state with only identity fields set.
    pub fn new(title: impl Into<String>, folder: impl Into<String>) -> Self {
        Self {
            note_type: NoteType::None,
            title: title.into(),
            folder: folder.into(),
            start_date: None,
            due_date: None,
            reviewed_date: None,
            completed_date: None,
            cancelled_date: None,
            review_interval: None,
            next_review_date: None,
            next_review_days: None,
            due_days: None,
            finished_days: None,
            open_tasks: 0,
            completed_tasks: 0,
            waiting_tasks: 0,
            is_completed: false,
            is_cancelled: false,
            is_archived: false,
            is_active: false,
        }
    }

    /// Derives the full state of one note as seen on `today`.
    pub fn build(note: &NoteSnapshot, today: NaiveDate) -> Self {
        let hashtags = note.hashtags.as_slice();
        let mentions = note.mentions.as_slice();

        let title = note
            .title
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(UNTITLED_PLACEHOLDER)
            .to_string();
        let mut state = Self::new(title, note.folder());
        state.note_type = NoteType::classify(hashtags);

        state.start_date = mention_date(mentions, START_MENTION);
        state.due_date = mention_date(mentions, DUE_MENTION);
        state.reviewed_date = mention_date(mentions, REVIEWED_MENTION);
        state.completed_date = mention_date(mentions, COMPLETED_MENTION);
        state.cancelled_date = mention_date(mentions, CANCELLED_MENTION);
        state.review_interval = first_matching_tag(mentions, REVIEW_MENTION)
            .and_then(content_within_brackets)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);

        for para in &note.paragraphs {
            match para.kind {
                ParagraphType::Open => {
                    state.open_tasks += 1;
                    if para.content.contains(WAITING_MARKER) {
                        state.waiting_tasks += 1;
                    }
                }
                ParagraphType::Done => state.completed_tasks += 1,
                _ => {}
            }
        }

        state.is_completed = state.completed_date.is_some();
        state.is_archived = contains_token(hashtags, ARCHIVE_HASHTAG).is_some();
        state.is_cancelled = contains_token(hashtags, CANCELLED_HASHTAG).is_some()
            || contains_token(hashtags, SOMEDAY_HASHTAG).is_some()
            || state.cancelled_date.is_some()
            || state.is_completed;
        state.is_active = (contains_token(hashtags, ACTIVE_HASHTAG).is_some()
            || state.review_interval.is_some())
            && !state.is_completed
            && !state.is_cancelled
            && !state.is_archived;

        let state = state.recompute_durations(today);
        debug!(
            "event=project_build module=project status=ok note_type={:?} active={} open={} done={} waiting={}",
            state.note_type,
            state.is_active,
            state.open_tasks,
            state.completed_tasks,
            state.waiting_tasks
        );
        state
    }

    /// Returns a copy with due/finished/next-review durations derived for `today`.
    ///
    /// An interval that cannot be applied leaves the next review unresolved
    /// and logs a warning; use [`ProjectState::interval_error`] to surface it.
    pub fn recompute_durations(mut self, today: NaiveDate) -> Self {
        self.due_days = self.due_date.map(|due| days_between(today, due));

        self.finished_days = match (self.start_date, self.completed_date, self.cancelled_date) {
            (Some(start), Some(completed), _) => Some(days_between(start, completed)),
            (Some(start), None, Some(cancelled)) => Some(days_between(start, cancelled)),
            _ => None,
        };

        self.next_review_date = None;
        self.next_review_days = None;
        if let Some(interval) = self.review_interval.as_deref() {
            match calc_next_review_date(self.reviewed_date, interval, today) {
                Ok(next) => {
                    self.next_review_date = Some(next);
                    self.next_review_days = Some(days_between(today, next));
                }
                Err(err) => {
                    let error_code = match err {
                        IntervalError::InvalidFormat(_) => "invalid_interval_format",
                        IntervalError::OutOfRange { .. } => "interval_out_of_range",
                    };
                    warn!(
                        "event=interval_invalid module=project status=warn error_code={error_code}"
                    );
                }
            }
        }

        self
    }

    /// Active and the next review day has arrived or passed.
    pub fn is_ready_for_review(&self) -> bool {
        self.is_active && self.next_review_days.is_some_and(|days| days <= 0)
    }

    /// Re-validates the stored review interval.
    ///
    /// Returns `None` when there is no interval or it applies cleanly.
    pub fn interval_error(&self) -> Option<IntervalError> {
        let interval = self.review_interval.as_deref()?;
        calc_next_review_date(self.reviewed_date, interval, NaiveDate::MIN).err()
    }
}

fn mention_date(mentions: &[String], mention: &str) -> Option<NaiveDate> {
    let payload = first_matching_tag(mentions, mention).and_then(content_within_brackets)?;
    let parsed = DATE_RE.captures(payload).and_then(|caps| {
        let year = caps[1].parse::<i32>().ok()?;
        let month = caps[2].parse::<u32>().ok()?;
        let day = caps[3].parse::<u32>().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    });
    if parsed.is_none() {
        debug!("event=date_invalid module=project status=skip tag={mention}");
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::{NoteType, ProjectState, UNTITLED_PLACEHOLDER};
    use crate::model::note::NoteSnapshot;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn build(text: &str, today: NaiveDate) -> ProjectState {
        ProjectState::build(&NoteSnapshot::from_markdown("Projects/Test.md", text), today)
    }

    #[test]
    fn project_takes_precedence_over_area() {
        assert_eq!(NoteType::classify(&["#area", "#project"]), NoteType::Project);
        assert_eq!(NoteType::classify(&["#area"]), NoteType::Area);
        assert_eq!(NoteType::classify::<&str>(&[]), NoteType::None);
    }

    #[test]
    fn malformed_dates_resolve_to_absent() {
        let state = build(
            "# T\n#project @start(soon) @due(2024-02-30) @reviewed(2024-01-10)",
            date(2024, 1, 20),
        );
        assert_eq!(state.start_date, None);
        assert_eq!(state.due_date, None);
        assert_eq!(state.reviewed_date, Some(date(2024, 1, 10)));
    }

    #[test]
    fn missing_title_uses_placeholder() {
        let state = build("#project", date(2024, 1, 20));
        assert_eq!(state.title, UNTITLED_PLACEHOLDER);
    }

    #[test]
    fn counts_open_done_and_waiting_tasks() {
        let text = "# T\n#project\n* [ ] a\n* [ ] b #waiting\n- [x] c\n- [-] d\n- note #waiting";
        let state = build(text, date(2024, 1, 20));
        assert_eq!(state.open_tasks, 2);
        assert_eq!(state.completed_tasks, 1);
        assert_eq!(state.waiting_tasks, 1);
    }

    #[test]
    fn someday_and_cancelled_hashtags_cancel_without_dates() {
        let state = build("# T\n#project #someday @review(1w)", date(2024, 1, 20));
        assert!(state.is_cancelled);
        assert!(!state.is_completed);
        assert!(!state.is_active);
    }

    #[test]
    fn completed_date_implies_cancelled_flag() {
        let state = build("# T\n#project @completed(2024-01-05)", date(2024, 1, 20));
        assert!(state.is_completed);
        assert!(state.is_cancelled);
        assert!(!state.is_active);
    }

    #[test]
    fn active_requires_flag_or_interval_and_no_closure() {
        assert!(build("# T\n#project #active", date(2024, 1, 20)).is_active);
        assert!(build("# T\n#project @review(1w)", date(2024, 1, 20)).is_active);
        assert!(!build("# T\n#project", date(2024, 1, 20)).is_active);
        assert!(!build("# T\n#archive #project #active", date(2024, 1, 20)).is_active);
    }

    #[test]
    fn empty_review_payload_counts_as_absent() {
        let state = build("# T\n#project @review()", date(2024, 1, 20));
        assert_eq!(state.review_interval, None);
        assert!(!state.is_active);
    }

    #[test]
    fn invalid_interval_leaves_next_review_unresolved() {
        let state = build(
            "# T\n#project @review(weekly) @reviewed(2024-01-10)",
            date(2024, 1, 20),
        );
        assert_eq!(state.review_interval.as_deref(), Some("weekly"));
        assert!(state.is_active);
        assert_eq!(state.next_review_date, None);
        assert_eq!(state.next_review_days, None);
        assert!(!state.is_ready_for_review());
        assert!(state.interval_error().is_some());
    }

    #[test]
    fn durations_follow_sign_conventions() {
        let state = build(
            "# T\n#project @start(2024-01-01) @due(2024-01-15) @cancelled(2024-01-11)",
            date(2024, 1, 20),
        );
        assert_eq!(state.due_days, Some(-5));
        assert_eq!(state.finished_days, Some(10));
    }

    #[test]
    fn finished_days_needs_start_date() {
        let state = build("# T\n#project @completed(2024-01-11)", date(2024, 1, 20));
        assert_eq!(state.finished_days, None);
    }

    #[test]
    fn completed_date_wins_over_cancelled_for_finished_days() {
        let state = build(
            "# T\n#project @start(2024-01-01) @completed(2024-01-03) @cancelled(2024-01-11)",
            date(2024, 1, 20),
        );
        assert_eq!(state.finished_days, Some(2));
    }
}
