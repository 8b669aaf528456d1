//! Host-supplied note snapshot.
//!
//! # Responsibility
//! - Carry the read-only view of one note that project derivation consumes:
//!   ordered hashtags, ordered mentions, classified paragraphs and title.
//! - Provide a reference markdown reader for hosts that store plain files.
//!
//! # Invariants
//! - One paragraph per source line; `paragraphs[i]` is line `i`.
//! - Tag lists keep document order and duplicates.
//! - A snapshot is never refreshed in place; hosts build a new one per read.

use crate::tags::TagSet;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(#{1,6})\s+(.*)$").expect("valid heading regex"));
static TASK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[*+-]\s+\[([ xX>-])\]\s?(.*)$").expect("valid task regex"));
static BULLET_TASK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\*\s+(.*)$").expect("valid bullet task regex"));
static LIST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]\s+(.*)$").expect("valid list regex"));
static QUOTE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^>\s?(.*)$").expect("valid quote regex"));

/// Paragraph classification, mirroring the host editor's line types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParagraphType {
    Title,
    Open,
    Done,
    Cancelled,
    Scheduled,
    List,
    Quote,
    Text,
    Empty,
}

/// One classified line of a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub kind: ParagraphType,
    /// Line text without its type marker (`* [ ] `, `# `, ...).
    pub content: String,
}

impl Paragraph {
    pub fn new(kind: ParagraphType, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }

    /// Classifies one raw markdown line.
    ///
    /// `*` bullets count as open tasks; `-`/`+` bullets are plain list items
    /// unless they carry a checkbox.
    pub fn from_markdown_line(line: &str) -> Self {
        let trimmed = line.trim_start();
        if trimmed.trim().is_empty() {
            return Self::new(ParagraphType::Empty, "");
        }
        if let Some(caps) = HEADING_RE.captures(trimmed) {
            return Self::new(ParagraphType::Title, caps[2].trim_end());
        }
        if let Some(caps) = TASK_RE.captures(trimmed) {
            let kind = match &caps[1] {
                "x" | "X" => ParagraphType::Done,
                "-" => ParagraphType::Cancelled,
                ">" => ParagraphType::Scheduled,
                _ => ParagraphType::Open,
            };
            return Self::new(kind, &caps[2]);
        }
        if let Some(caps) = BULLET_TASK_RE.captures(trimmed) {
            return Self::new(ParagraphType::Open, &caps[1]);
        }
        if let Some(caps) = LIST_RE.captures(trimmed) {
            return Self::new(ParagraphType::List, &caps[1]);
        }
        if let Some(caps) = QUOTE_RE.captures(trimmed) {
            return Self::new(ParagraphType::Quote, &caps[1]);
        }
        Self::new(ParagraphType::Text, trimmed)
    }
}

/// Read-only snapshot of one note.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteSnapshot {
    /// Host-relative path, e.g. `Projects/Garden.md`.
    pub filename: String,
    pub title: Option<String>,
    pub hashtags: Vec<String>,
    pub mentions: Vec<String>,
    pub paragraphs: Vec<Paragraph>,
}

impl NoteSnapshot {
    /// Builds a snapshot from raw markdown text.
    ///
    /// The title is the first line when it is a heading.
    pub fn from_markdown(filename: impl Into<String>, text: &str) -> Self {
        let paragraphs: Vec<Paragraph> = text.lines().map(Paragraph::from_markdown_line).collect();
        let title = paragraphs
            .first()
            .filter(|para| para.kind == ParagraphType::Title && !para.content.is_empty())
            .map(|para| para.content.clone());
        let tags = TagSet::from_lines(text.lines());

        Self {
            filename: filename.into(),
            title,
            hashtags: tags.hashtags,
            mentions: tags.mentions,
            paragraphs,
        }
    }

    /// Folder part of `filename`; empty for notes at the root.
    pub fn folder(&self) -> &str {
        self.filename
            .rsplit_once('/')
            .map_or("", |(folder, _)| folder)
    }
}

#[cfg(test)]
mod tests {
    use super::{NoteSnapshot, Paragraph, ParagraphType};

    #[test]
    fn classifies_markdown_lines() {
        let cases = [
            ("# Garden", ParagraphType::Title, "Garden"),
            ("* [ ] dig", ParagraphType::Open, "dig"),
            ("- [x] plant", ParagraphType::Done, "plant"),
            ("- [-] fence", ParagraphType::Cancelled, "fence"),
            ("* [>] water", ParagraphType::Scheduled, "water"),
            ("* weed", ParagraphType::Open, "weed"),
            ("- seeds", ParagraphType::List, "seeds"),
            ("> quote", ParagraphType::Quote, "quote"),
            ("   ", ParagraphType::Empty, ""),
            ("#project @review(1w)", ParagraphType::Text, "#project @review(1w)"),
        ];
        for (line, kind, content) in cases {
            let para = Paragraph::from_markdown_line(line);
            assert_eq!(para.kind, kind, "line `{line}`");
            assert_eq!(para.content, content, "line `{line}`");
        }
    }

    #[test]
    fn snapshot_collects_title_tags_and_folder() {
        let text = "# Garden\n#project @review(2w)\n* [ ] dig #waiting\n";
        let note = NoteSnapshot::from_markdown("Projects/Home/Garden.md", text);
        assert_eq!(note.title.as_deref(), Some("Garden"));
        assert_eq!(note.hashtags, vec!["#project", "#waiting"]);
        assert_eq!(note.mentions, vec!["@review(2w)"]);
        assert_eq!(note.paragraphs.len(), 3);
        assert_eq!(note.folder(), "Projects/Home");
    }

    #[test]
    fn snapshot_without_heading_has_no_title() {
        let note = NoteSnapshot::from_markdown("loose.md", "just text\n");
        assert_eq!(note.title, None);
        assert_eq!(note.folder(), "");
    }
}
