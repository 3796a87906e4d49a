use similar::{ChangeTag, TextDiff};
use vaultlens_api::{DiffRow, DiffRowKind};

/// Errors raised when decrypted content cannot be read as text.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    /// One side of the input is not valid UTF-8.
    #[error("{side} text is not valid UTF-8: {source}")]
    NotText {
        /// Which input was rejected.
        side: &'static str,
        /// Decoder error.
        #[source]
        source: std::str::Utf8Error,
    },
}

fn decode<'a>(side: &'static str, bytes: &'a [u8]) -> Result<&'a str, InputError> {
    std::str::from_utf8(bytes).map_err(|source| InputError::NotText { side, source })
}

fn split_lines(text: &str) -> Vec<&str> {
    if text.is_empty() {
        Vec::new()
    } else {
        text.split('\n').collect()
    }
}

/// Consecutive lines sharing one classification.
struct Chunk {
    kind: DiffRowKind,
    lines: Vec<String>,
}

fn row_kind(tag: ChangeTag) -> DiffRowKind {
    match tag {
        ChangeTag::Equal => DiffRowKind::Context,
        ChangeTag::Delete => DiffRowKind::Removed,
        ChangeTag::Insert => DiffRowKind::Added,
    }
}

fn chunks(removed: &[&str], added: &[&str]) -> Vec<Chunk> {
    let diff = TextDiff::from_slices(removed, added);
    let mut chunks: Vec<Chunk> = Vec::new();
    for change in diff.iter_all_changes() {
        let kind = row_kind(change.tag());
        let line = change.value().to_owned();
        match chunks.last_mut() {
            Some(chunk) if chunk.kind == kind => chunk.lines.push(line),
            _ => chunks.push(Chunk {
                kind,
                lines: vec![line],
            }),
        }
    }
    chunks
}

/// Rebuild diff rows from decrypted before/after text.
///
/// Both inputs are trimmed and diffed line by line. Each run of equal,
/// removed or added lines becomes a chunk, and every line of every chunk
/// becomes one row. Positions come from a single counter shared by all row
/// kinds, so they run `0..rows.len()` without gaps. Within a modification the
/// removed lines precede the added ones.
///
/// # Errors
///
/// Returns [`InputError::NotText`] when either input is not UTF-8.
pub fn reconstruct(
    file_id: &str,
    anchor: &str,
    removed: &[u8],
    added: &[u8],
) -> Result<Vec<DiffRow>, InputError> {
    let removed = split_lines(decode("removed", removed)?.trim());
    let added = split_lines(decode("added", added)?.trim());

    let mut rows = Vec::with_capacity(removed.len().max(added.len()));
    let mut position = 0;
    for chunk in chunks(&removed, &added) {
        for text in chunk.lines {
            rows.push(DiffRow {
                file_id: file_id.to_owned(),
                anchor: anchor.to_owned(),
                position,
                kind: chunk.kind,
                text,
            });
            position += 1;
        }
    }
    tracing::debug!(file_id, rows = rows.len(), "reconstructed diff");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(rows: &[DiffRow]) -> Vec<(usize, char, &str)> {
        rows.iter()
            .map(|row| (row.position, row.kind.marker(), row.text.as_str()))
            .collect()
    }

    #[test]
    fn single_modification_orders_removed_before_added() {
        let rows = reconstruct("f", "A", b"a\nb\nc", b"a\nB\nc").expect("text input");
        assert_eq!(
            summary(&rows),
            vec![(0, ' ', "a"), (1, '-', "b"), (2, '+', "B"), (3, ' ', "c")]
        );
        assert!(rows.iter().all(|row| row.file_id == "f" && row.anchor == "A"));
    }

    #[test]
    fn identical_input_is_all_context() {
        let rows = reconstruct("f", "A", b"x\ny", b"x\ny").expect("text input");
        assert_eq!(summary(&rows), vec![(0, ' ', "x"), (1, ' ', "y")]);
    }

    #[test]
    fn inputs_are_trimmed_before_diffing() {
        let rows = reconstruct("f", "A", b"\n\nkeep\n", b"  keep\nnew \n\n").expect("text input");
        assert_eq!(summary(&rows), vec![(0, ' ', "keep"), (1, '+', "new")]);
    }

    #[test]
    fn empty_side_produces_only_the_other_side() {
        let rows = reconstruct("f", "A", b"", b"one\ntwo").expect("text input");
        assert_eq!(summary(&rows), vec![(0, '+', "one"), (1, '+', "two")]);

        let rows = reconstruct("f", "A", b"gone", b"   ").expect("text input");
        assert_eq!(summary(&rows), vec![(0, '-', "gone")]);
    }

    #[test]
    fn both_sides_empty_yield_no_rows() {
        let rows = reconstruct("f", "A", b"", b"\n").expect("text input");
        assert!(rows.is_empty());
    }

    #[test]
    fn rows_keep_raw_text() {
        let rows = reconstruct("f", "A", b"", b"a  b").expect("text input");
        assert_eq!(rows[0].text, "a  b");
        assert_eq!(rows[0].display_text(), "+a\u{a0}\u{a0}b");
    }

    #[test]
    fn non_utf8_input_is_rejected() {
        let err = reconstruct("f", "A", b"ok", &[0xff, 0xfe]).expect_err("invalid utf-8");
        assert!(matches!(err, InputError::NotText { side: "added", .. }));
    }
}
