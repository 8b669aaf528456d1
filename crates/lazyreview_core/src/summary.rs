//! Plain-text projections of project state for listings and reports.

use crate::config::ReviewConfig;
use crate::model::project::ProjectState;
use std::cmp::Ordering;

/// Human-friendly relative day count: `today`, `in 3 days`, `2 wks ago`.
pub fn relative_date_from_number(days: i64) -> String {
    if days == 0 {
        return "today".to_string();
    }

    let abs = days.unsigned_abs();
    let scaled = |divisor: f64| (abs as f64 / divisor).round() as u64;
    let amount = match abs {
        1 => "1 day".to_string(),
        2..=8 => format!("{abs} days"),
        9..=11 => format!("{} wk", scaled(7.0)),
        12..=28 => format!("{} wks", scaled(7.0)),
        29..=549 => format!("{} mon", scaled(30.4)),
        _ => format!("{} yrs", scaled(365.0)),
    };

    if days < 0 {
        format!("{amount} ago")
    } else {
        format!("in {amount}")
    }
}

/// `<next_review_days>\t<title>`; the number is empty when unscheduled.
pub fn machine_summary_line(state: &ProjectState) -> String {
    let days = state
        .next_review_days
        .map(|days| days.to_string())
        .unwrap_or_default();
    format!("{days}\t{}", state.title)
}

/// Wiki-link title, prefixed with `[x]`/`[-]` for completed/cancelled notes.
pub fn decorated_project_title(state: &ProjectState, include_folder: bool) -> String {
    let folder = if include_folder && !state.folder.is_empty() {
        format!("{}/", state.folder)
    } else {
        String::new()
    };
    let marker = if state.is_completed {
        "[x] "
    } else if state.is_cancelled {
        "[-] "
    } else {
        ""
    };
    format!("{marker}{folder}[[{}]]", state.title)
}

/// One markdown list item with task counts, review and due information.
pub fn detailed_summary_line(state: &ProjectState, include_folder: bool) -> String {
    let mut output = format!("- {}", decorated_project_title(state, include_folder));

    let finished = state
        .finished_days
        .map(|days| format!(" {}", relative_date_from_number(days)))
        .unwrap_or_default();
    if state.completed_date.is_some() {
        output.push_str(&format!("\t(Completed{finished})"));
    } else if state.cancelled_date.is_some() {
        output.push_str(&format!("\t(Cancelled{finished})"));
    }

    output.push_str(&format!(
        "\to{} / c{} / w{}",
        state.open_tasks, state.completed_tasks, state.waiting_tasks
    ));

    if !state.is_completed && !state.is_cancelled {
        match state.next_review_days {
            Some(days) if days > 0 => {
                output.push_str(&format!(" / {}", relative_date_from_number(days)))
            }
            Some(days) => output.push_str(&format!(" / **{}**", relative_date_from_number(days))),
            None => output.push_str(" / -"),
        }
        match state.due_days {
            Some(days) => output.push_str(&format!(" / {}", relative_date_from_number(days))),
            None => output.push_str(" / -"),
        }
    }

    output
}

/// Orders by next review (unscheduled last), then title.
pub fn compare_by_next_review(a: &ProjectState, b: &ProjectState) -> Ordering {
    match (a.next_review_days, b.next_review_days) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.title.cmp(&b.title))
}

/// Markdown review report: active, paused, then finished projects.
pub fn render_review_summary(projects: &[ProjectState], config: &ReviewConfig) -> String {
    let mut active: Vec<&ProjectState> = projects.iter().filter(|p| p.is_active).collect();
    let mut finished: Vec<&ProjectState> = projects
        .iter()
        .filter(|p| p.is_completed || p.is_cancelled)
        .collect();
    let mut paused: Vec<&ProjectState> = projects
        .iter()
        .filter(|p| !p.is_active && !p.is_completed && !p.is_cancelled)
        .collect();
    active.sort_by(|a, b| compare_by_next_review(a, b));
    paused.sort_by(|a, b| a.title.cmp(&b.title));
    finished.sort_by(|a, b| a.title.cmp(&b.title));

    let mut lines = vec![format!("# {}", config.summary_heading)];
    for (heading, group) in [
        ("Active", active),
        ("Paused", paused),
        (config.completed_heading.as_str(), finished),
    ] {
        if group.is_empty() {
            continue;
        }
        lines.push(String::new());
        lines.push(format!("## {heading}"));
        lines.extend(group.iter().map(|p| detailed_summary_line(p, true)));
    }
    lines.push(String::new());
    lines.join("\n")
}
