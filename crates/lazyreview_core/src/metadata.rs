//! Metadata line rendering and placement.
//!
//! # Responsibility
//! - Render a `ProjectState` into the canonical inline-tag metadata line.
//! - Locate the paragraph holding the metadata line (or where to insert it).
//! - Splice a rendered line into full note text for text-backed hosts.
//!
//! # Invariants
//! - Field order is fixed: archive, type, start, due, review, reviewed,
//!   completed, cancelled.
//! - Dates are rendered as `YYYY-MM-DD`, the only form derivation reads back.
//! - Absent fields are omitted; there is no trailing whitespace.
//! - Splicing touches exactly one line; all other lines are preserved.
//! - Tags on an existing metadata line that the renderer does not own survive
//!   a rewrite.

use crate::model::note::{NoteSnapshot, ParagraphType};
use crate::model::project::{
    ProjectState, ARCHIVE_HASHTAG, AREA_HASHTAG, CANCELLED_MENTION, COMPLETED_MENTION,
    DUE_MENTION, PROJECT_HASHTAG, REVIEWED_MENTION, REVIEW_MENTION, START_MENTION,
};
use crate::tags::{scan_line, Token};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static METADATA_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(#[\w/-]|@[\w/-]+\(|(project|metadata|review|reviewed):)")
        .expect("valid metadata line regex")
});

const RENDERED_HASHTAGS: &[&str] = &[ARCHIVE_HASHTAG, PROJECT_HASHTAG, AREA_HASHTAG];
const RENDERED_MENTIONS: &[&str] = &[
    START_MENTION,
    DUE_MENTION,
    REVIEW_MENTION,
    REVIEWED_MENTION,
    COMPLETED_MENTION,
    CANCELLED_MENTION,
];

/// ISO calendar date as used inside mention payloads.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Renders the canonical metadata line for `state`.
pub fn render_metadata_line(state: &ProjectState) -> String {
    let mut fields: Vec<String> = Vec::new();
    if state.is_archived {
        fields.push(ARCHIVE_HASHTAG.to_string());
    }
    if let Some(hashtag) = state.note_type.hashtag() {
        fields.push(hashtag.to_string());
    }
    push_date(&mut fields, START_MENTION, state.start_date);
    push_date(&mut fields, DUE_MENTION, state.due_date);
    if let Some(interval) = state.review_interval.as_deref() {
        fields.push(format!("{REVIEW_MENTION}({interval})"));
    }
    push_date(&mut fields, REVIEWED_MENTION, state.reviewed_date);
    push_date(&mut fields, COMPLETED_MENTION, state.completed_date);
    push_date(&mut fields, CANCELLED_MENTION, state.cancelled_date);
    fields.join(" ")
}

fn push_date(fields: &mut Vec<String>, mention: &str, date: Option<NaiveDate>) {
    if let Some(date) = date {
        fields.push(format!("{mention}({})", format_date(date)));
    }
}

/// Appends the tags of `existing` that `rendered` does not own.
///
/// Hashtags such as `#someday` or a custom note-type tag are carried over in
/// their original order; hashtags listed in `retired` are dropped. Free text on
/// the old line is not kept.
pub fn merge_metadata_line(existing: &str, rendered: &str, retired: &[&str]) -> String {
    let mut kept: Vec<String> = Vec::new();
    for token in scan_line(existing) {
        let owned = match &token {
            Token::Hashtag(name) => RENDERED_HASHTAGS
                .iter()
                .chain(retired)
                .any(|tag| tag.trim_start_matches('#').eq_ignore_ascii_case(name)),
            Token::Mention { name, .. } => RENDERED_MENTIONS
                .iter()
                .any(|mention| mention.trim_start_matches('@').eq_ignore_ascii_case(name)),
        };
        let text = token.to_string();
        if !owned && !kept.contains(&text) {
            kept.push(text);
        }
    }

    if kept.is_empty() {
        return rendered.to_string();
    }
    let tail = kept.join(" ");
    if rendered.is_empty() {
        tail
    } else {
        format!("{rendered} {tail}")
    }
}

/// Position of the metadata line within a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "line", rename_all = "snake_case")]
pub enum MetadataSlot {
    /// Replace the paragraph at this line index.
    Existing(usize),
    /// Insert a new paragraph at this line index.
    InsertAt(usize),
}

/// Finds the metadata paragraph of a note.
///
/// The first plain text line after line 0 that starts with a hashtag, a
/// parametric mention or a `project:`-style label wins. Tasks, list items and
/// quotes never qualify. Without a match, the line goes directly below the
/// title.
pub fn locate_metadata_line(note: &NoteSnapshot) -> MetadataSlot {
    note.paragraphs
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, para)| {
            para.kind == ParagraphType::Text && METADATA_LINE_RE.is_match(para.content.trim())
        })
        .map(|(idx, _)| MetadataSlot::Existing(idx))
        .unwrap_or(MetadataSlot::InsertAt(1.min(note.paragraphs.len())))
}

/// Replaces or inserts the metadata line inside full note text.
///
/// Line endings of untouched lines are preserved, as is a trailing newline.
pub fn splice_metadata_line(text: &str, slot: MetadataSlot, line: &str) -> String {
    let newline = if text.contains("\r\n") { "\r\n" } else { "\n" };
    let had_trailing_newline = text.ends_with('\n');
    let mut lines: Vec<&str> = text.lines().collect();

    match slot {
        MetadataSlot::Existing(idx) if idx < lines.len() => lines[idx] = line,
        MetadataSlot::Existing(_) => lines.push(line),
        MetadataSlot::InsertAt(idx) => lines.insert(idx.min(lines.len()), line),
    }

    let mut output = lines.join(newline);
    if had_trailing_newline || text.is_empty() {
        output.push_str(newline);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::{
        locate_metadata_line, merge_metadata_line, render_metadata_line, splice_metadata_line,
        MetadataSlot,
    };
    use crate::model::note::NoteSnapshot;
    use crate::model::project::{NoteType, ProjectState};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn renders_fields_in_fixed_order() {
        let mut state = ProjectState::new("Garden", "Projects");
        state.is_archived = true;
        state.note_type = NoteType::Area;
        state.cancelled_date = Some(date(2024, 3, 1));
        state.reviewed_date = Some(date(2024, 2, 1));
        state.review_interval = Some("1m".to_string());
        state.start_date = Some(date(2024, 1, 1));
        state.due_date = Some(date(2024, 6, 30));
        state.completed_date = Some(date(2024, 2, 15));

        assert_eq!(
            render_metadata_line(&state),
            "#archive #area @start(2024-01-01) @due(2024-06-30) @review(1m) \
             @reviewed(2024-02-01) @completed(2024-02-15) @cancelled(2024-03-01)"
        );
    }

    #[test]
    fn renders_empty_line_for_bare_state() {
        assert_eq!(render_metadata_line(&ProjectState::new("x", "")), "");
    }

    #[test]
    fn derived_flags_are_not_emitted() {
        let mut state = ProjectState::new("x", "");
        state.note_type = NoteType::Project;
        state.is_active = true;
        state.is_cancelled = true;
        state.is_completed = true;
        assert_eq!(render_metadata_line(&state), "#project");
    }

    #[test]
    fn locates_existing_metadata_line() {
        let note = NoteSnapshot::from_markdown("a.md", "# T\nintro\n@start(2024-01-01) #project\n");
        assert_eq!(locate_metadata_line(&note), MetadataSlot::Existing(2));

        let labelled = NoteSnapshot::from_markdown("a.md", "# T\nProject: garden\n");
        assert_eq!(locate_metadata_line(&labelled), MetadataSlot::Existing(1));
    }

    #[test]
    fn tasks_and_list_items_are_never_the_metadata_line() {
        let text = "# Garden\n* [ ] @due(2024-02-01) order seeds\n- #waiting on quote\n#project @review(1w)\n";
        let note = NoteSnapshot::from_markdown("Projects/Garden.md", text);
        assert_eq!(locate_metadata_line(&note), MetadataSlot::Existing(3));

        let only_tasks = NoteSnapshot::from_markdown("a.md", "# T\n* [ ] @due(2024-02-01) x\n");
        assert_eq!(locate_metadata_line(&only_tasks), MetadataSlot::InsertAt(1));
    }

    #[test]
    fn merge_keeps_unrendered_tags_in_order() {
        let merged = merge_metadata_line(
            "#area #someday #active @review(1w) @reviewed(2024-01-01) @owner(sam)",
            "#area @review(1w) @reviewed(2024-01-20)",
            &[],
        );
        assert_eq!(
            merged,
            "#area @review(1w) @reviewed(2024-01-20) #someday #active @owner(sam)"
        );
    }

    #[test]
    fn merge_drops_retired_tags_and_free_text() {
        let merged = merge_metadata_line(
            "Project: #goal #active @review(1w)",
            "#archive @review(1w) @completed(2024-01-20)",
            &["#active"],
        );
        assert_eq!(merged, "#archive @review(1w) @completed(2024-01-20) #goal");
        assert_eq!(merge_metadata_line("", "#project", &[]), "#project");
        assert_eq!(merge_metadata_line("#goal", "", &[]), "#goal");
    }

    #[test]
    fn inserts_below_title_when_missing() {
        let note = NoteSnapshot::from_markdown("a.md", "# T\nintro\n## Section\n");
        assert_eq!(locate_metadata_line(&note), MetadataSlot::InsertAt(1));

        let empty = NoteSnapshot::from_markdown("a.md", "");
        assert_eq!(locate_metadata_line(&empty), MetadataSlot::InsertAt(0));
    }

    #[test]
    fn splice_replaces_only_the_target_line() {
        let text = "# T\n#project @review(1w)\n* [ ] task\n";
        let spliced = splice_metadata_line(text, MetadataSlot::Existing(1), "#archive #project");
        assert_eq!(spliced, "# T\n#archive #project\n* [ ] task\n");
    }

    #[test]
    fn splice_inserts_and_keeps_crlf() {
        let text = "# T\r\nbody";
        let spliced = splice_metadata_line(text, MetadataSlot::InsertAt(1), "#project");
        assert_eq!(spliced, "# T\r\n#project\r\nbody");
    }
}
