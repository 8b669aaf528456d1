use chrono::NaiveDate;
use lazyreview_core::{offset_date, render_metadata_line, NoteSnapshot, NoteType, ProjectState};
use proptest::prelude::*;

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (1990i32..2100, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn arb_note_type() -> impl Strategy<Value = NoteType> {
    prop_oneof![
        Just(NoteType::Project),
        Just(NoteType::Area),
        Just(NoteType::None),
    ]
}

fn arb_interval() -> impl Strategy<Value = String> {
    (1u32..500, prop::sample::select(vec!['b', 'd', 'w', 'm', 'q', 'y']))
        .prop_map(|(n, unit)| format!("{n}{unit}"))
}

prop_compose! {
    fn arb_emitted_state()(
        is_archived in any::<bool>(),
        note_type in arb_note_type(),
        start_date in proptest::option::of(arb_date()),
        due_date in proptest::option::of(arb_date()),
        review_interval in proptest::option::of(arb_interval()),
        reviewed_date in proptest::option::of(arb_date()),
        completed_date in proptest::option::of(arb_date()),
        cancelled_date in proptest::option::of(arb_date()),
    ) -> ProjectState {
        let mut state = ProjectState::new("Round Trip", "Projects");
        state.is_archived = is_archived;
        state.note_type = note_type;
        state.start_date = start_date;
        state.due_date = due_date;
        state.review_interval = review_interval;
        state.reviewed_date = reviewed_date;
        state.completed_date = completed_date;
        state.cancelled_date = cancelled_date;
        state
    }
}

proptest! {
    #[test]
    fn rendered_line_reads_back_every_emitted_field(
        state in arb_emitted_state(),
        today in arb_date(),
    ) {
        let line = render_metadata_line(&state);
        let text = format!("# Round Trip\n{line}\n* [ ] task\n");
        let rebuilt = ProjectState::build(
            &NoteSnapshot::from_markdown("Projects/Round Trip.md", &text),
            today,
        );

        prop_assert_eq!(rebuilt.is_archived, state.is_archived);
        prop_assert_eq!(rebuilt.note_type, state.note_type);
        prop_assert_eq!(rebuilt.start_date, state.start_date);
        prop_assert_eq!(rebuilt.due_date, state.due_date);
        prop_assert_eq!(&rebuilt.review_interval, &state.review_interval);
        prop_assert_eq!(rebuilt.reviewed_date, state.reviewed_date);
        prop_assert_eq!(rebuilt.completed_date, state.completed_date);
        prop_assert_eq!(rebuilt.cancelled_date, state.cancelled_date);
        prop_assert_eq!(render_metadata_line(&rebuilt), line);
    }

    #[test]
    fn positive_intervals_always_move_forward(
        base in arb_date(),
        interval in arb_interval(),
    ) {
        let shifted = offset_date(base, &interval).unwrap();
        prop_assert!(shifted > base, "{} + {} gave {}", base, interval, shifted);
    }

    #[test]
    fn derivation_is_deterministic(state in arb_emitted_state(), today in arb_date()) {
        let text = format!("# Round Trip\n{}\n", render_metadata_line(&state));
        let note = NoteSnapshot::from_markdown("Projects/Round Trip.md", &text);
        prop_assert_eq!(ProjectState::build(&note, today), ProjectState::build(&note, today));
    }
}
