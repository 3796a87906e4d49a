use proptest::prelude::*;
use vaultlens_api::{unescape_text, NON_BREAKING_SPACE};
use vaultlens_core::line::{lines_from_text, make_line};

proptest! {
    #[test]
    fn made_lines_never_hold_an_ascii_space(index in any::<usize>(), raw in any::<String>()) {
        let line = make_line(index, &raw);
        prop_assert_eq!(line.index(), index);
        prop_assert!(!line.text().contains(' '));
    }

    #[test]
    fn escaping_is_reversible_without_nbsp(raw in any::<String>()) {
        prop_assume!(!raw.contains(NON_BREAKING_SPACE));
        let line = make_line(0, &raw);
        prop_assert_eq!(unescape_text(line.text()), raw);
    }

    #[test]
    fn split_lines_are_display_safe(text in "[a-z \n]{0,40}") {
        for line in lines_from_text(&text) {
            prop_assert!(!line.text().contains(' '));
        }
    }
}
