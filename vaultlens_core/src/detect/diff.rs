use vaultlens_api::{Container, EncryptedPayload, LineClass, RenderedLine};

use super::header::{compact, is_diff_vault_header, is_vault_header};
use crate::document::{Document, FileSection};
use crate::region::{extent_of, Region, Snapshot};

pub(super) fn detect(document: &Document) -> Vec<Region> {
    document
        .files()
        .iter()
        .filter_map(|file| detect_file(document, file))
        .collect()
}

fn detect_file(document: &Document, file: &FileSection) -> Option<Region> {
    let first = file.lines.iter().find(|line| line.class.is_code())?;
    if !is_diff_vault_header(&first.plain_text()) {
        return None;
    }
    if document.has_controls(&file.anchor) {
        tracing::debug!(anchor = %file.anchor, "diff region already decorated");
        return None;
    }

    let removed = half(&file.lines, LineClass::Deletion, '-');
    let added = half(&file.lines, LineClass::Addition, '+');
    let span = extent_of(&file.lines);
    Some(Region::new(
        file.anchor.clone(),
        Some(file.path.clone()),
        Container::File {
            anchor: file.anchor.clone(),
        },
        span,
        EncryptedPayload::Diff { removed, added },
        Snapshot::new(span, file.lines.clone()),
    ))
}

/// Ciphertext of one side of the diff: lines of `class` with their marker
/// and whitespace stripped and header lines dropped.
fn half(lines: &[RenderedLine], class: LineClass, marker: char) -> String {
    lines
        .iter()
        .filter(|line| line.class == class)
        .map(|line| {
            let text = line.plain_text();
            let text = text.trim_start();
            compact(text.strip_prefix(marker).unwrap_or(text))
        })
        .filter(|text| !is_vault_header(text))
        .collect()
}
