use proptest::prelude::*;
use vaultlens_core::{reconstruct, DiffRow, DiffRowKind};

fn text() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-c ]{0,3}", 0..8).prop_map(|lines| lines.join("\n"))
}

fn side(rows: &[DiffRow], keep: fn(&DiffRow) -> bool) -> String {
    rows.iter()
        .filter(|row| keep(row))
        .map(|row| row.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

proptest! {
    #[test]
    fn positions_run_without_gaps(removed in text(), added in text()) {
        let rows = reconstruct("f", "A", removed.as_bytes(), added.as_bytes()).expect("text input");
        for (index, row) in rows.iter().enumerate() {
            prop_assert_eq!(row.position, index);
        }
    }

    #[test]
    fn each_side_round_trips(removed in text(), added in text()) {
        let rows = reconstruct("f", "A", removed.as_bytes(), added.as_bytes()).expect("text input");
        prop_assert_eq!(side(&rows, |row| row.kind.on_removed_side()), removed.trim());
        prop_assert_eq!(side(&rows, |row| row.kind.on_added_side()), added.trim());
    }

    #[test]
    fn reconstruction_is_deterministic(removed in text(), added in text()) {
        let first = reconstruct("f", "A", removed.as_bytes(), added.as_bytes()).expect("text input");
        let second = reconstruct("f", "A", removed.as_bytes(), added.as_bytes()).expect("text input");
        prop_assert_eq!(first, second);
    }

    #[test]
    fn identical_sides_are_all_context(input in text()) {
        let rows = reconstruct("f", "A", input.as_bytes(), input.as_bytes()).expect("text input");
        let trimmed = input.trim();
        let expected = if trimmed.is_empty() { 0 } else { trimmed.split('\n').count() };
        prop_assert_eq!(rows.len(), expected);
        prop_assert!(rows.iter().all(|row| row.kind == DiffRowKind::Context));
    }
}
