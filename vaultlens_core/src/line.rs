use vaultlens_api::Line;

/// Build a display-safe line keyed by `index`.
///
/// Spaces in `raw` are replaced with non-breaking spaces so runs of spaces
/// survive rendering. No other transformation is applied.
#[must_use]
pub fn make_line(index: usize, raw: &str) -> Line {
    Line::new(index, raw)
}

/// Split decrypted text into numbered lines.
///
/// Leading and trailing whitespace of the whole text is dropped first, then
/// the text is split on `\n`. Empty text yields a single empty line.
#[must_use]
pub fn lines_from_text(text: &str) -> Vec<Line> {
    text.trim()
        .split('\n')
        .enumerate()
        .map(|(index, raw)| make_line(index, raw))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn make_line_escapes_every_space() {
        let line = make_line(7, "  two  spaces ");
        assert_eq!(line.index(), 7);
        assert_eq!(line.text(), "\u{a0}\u{a0}two\u{a0}\u{a0}spaces\u{a0}");
        assert!(!line.text().contains(' '));
    }

    #[test]
    fn make_line_keeps_other_characters() {
        let line = make_line(0, "a\tb<c>&\"");
        assert_eq!(line.text(), "a\tb<c>&\"");
    }

    #[test]
    fn lines_from_text_trims_and_numbers() {
        let lines = lines_from_text("\n\nfirst: 1\n  second: 2\n\n");
        let texts: Vec<&str> = lines.iter().map(Line::text).collect();
        assert_eq!(texts, vec!["first:\u{a0}1", "\u{a0}\u{a0}second:\u{a0}2"]);
        assert_eq!(lines[1].index(), 1);
    }

    #[test]
    fn lines_from_empty_text_is_one_empty_line() {
        let lines = lines_from_text("   ");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text(), "");
    }
}
