use vaultlens_api::{escape_text, DiffRow, DiffRowKind, LineClass, RenderedLine, NON_BREAKING_SPACE};

use crate::line::lines_from_text;

/// Full-file rendering of decrypted text, one code line per text line.
#[must_use]
pub fn blob_lines(plaintext: &str) -> Vec<RenderedLine> {
    lines_from_text(plaintext)
        .into_iter()
        .map(RenderedLine::from)
        .collect()
}

const fn row_class(kind: DiffRowKind) -> LineClass {
    match kind {
        DiffRowKind::Added => LineClass::Addition,
        DiffRowKind::Removed => LineClass::Deletion,
        DiffRowKind::Context => LineClass::Context,
    }
}

/// Diff rendering of reconstructed rows, numbered by row position.
///
/// A section needs at least one line to stay addressable, so an empty row
/// list renders as a single empty context line.
#[must_use]
pub fn diff_lines(rows: &[DiffRow]) -> Vec<RenderedLine> {
    if rows.is_empty() {
        return vec![RenderedLine::new(0, LineClass::Context, " ")];
    }
    rows.iter()
        .map(|row| RenderedLine::new(row.position, row_class(row.kind), row.display_text()))
        .collect()
}

/// Marker line of a YAML value with the decrypted value appended inline.
///
/// The marker text is re-escaped, so the line holds no ASCII space whether or
/// not the host stored the marker escaped.
#[must_use]
pub fn yaml_marker_line(marker: &RenderedLine, plaintext: &str) -> RenderedLine {
    let mut text = escape_text(&marker.plain_text());
    text.push(NON_BREAKING_SPACE);
    text.push_str(&escape_text(plaintext.trim()));
    RenderedLine::new(marker.number, marker.class, text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vaultlens_api::DiffRow;

    #[test]
    fn blob_lines_are_trimmed_and_escaped() {
        let lines = blob_lines("\nuser: admin\n  pass: x y\n\n");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], RenderedLine::new(0, LineClass::Code, "user:\u{a0}admin"));
        assert_eq!(lines[1].plain_text(), "  pass: x y");
    }

    #[test]
    fn diff_lines_carry_markers() {
        let rows = vec![
            DiffRow {
                file_id: "f".into(),
                anchor: "a".into(),
                position: 0,
                kind: DiffRowKind::Removed,
                text: "old value".into(),
            },
            DiffRow {
                file_id: "f".into(),
                anchor: "a".into(),
                position: 1,
                kind: DiffRowKind::Added,
                text: "new".into(),
            },
        ];
        let lines = diff_lines(&rows);
        assert_eq!(lines[0].class, LineClass::Deletion);
        assert_eq!(lines[0].plain_text(), "-old value");
        assert_eq!(lines[1], RenderedLine::new(1, LineClass::Addition, "+new"));
    }

    #[test]
    fn empty_diff_keeps_one_line() {
        let lines = diff_lines(&[]);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].class, LineClass::Context);
    }

    #[test]
    fn yaml_value_is_appended_to_marker() {
        let marker = RenderedLine::new(4, LineClass::Code, "password: !vault |");
        let line = yaml_marker_line(&marker, "s3cret value\n");
        assert_eq!(line.number, 4);
        assert_eq!(line.plain_text(), "password: !vault | s3cret value");
        assert!(!line.text.contains(' '));
    }

    #[test]
    fn yaml_marker_accepts_escaped_marker() {
        let marker = RenderedLine::new(0, LineClass::Code, "key:\u{a0}!vault");
        let line = yaml_marker_line(&marker, "v");
        assert_eq!(line.text, "key:\u{a0}!vault\u{a0}v");
    }
}
