use std::ops::Range;

use camino::Utf8Path;
use vaultlens_api::{Boundary, Container, EncryptedPayload};

use super::header::is_vault_header;
use crate::document::Document;
use crate::region::{extent_of, Region, Snapshot};

/// Tag introducing an inline vault value.
pub const VAULT_TAG: &str = "!vault";

/// Whether `path` names a YAML file.
#[must_use]
pub fn is_yaml_path(path: &Utf8Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml"))
}

fn indent(text: &str) -> Option<usize> {
    text.chars().position(|ch| !ch.is_whitespace())
}

/// Positions of the value lines belonging to the marker at `marker`.
///
/// The value starts on the next line and runs while lines are indented at
/// least as deeply as that first value line. A blank line ends the value. A
/// marker on the last line or followed by a blank line has no value.
#[must_use]
pub fn value_span<S: AsRef<str>>(lines: &[S], marker: usize) -> Option<Range<usize>> {
    let start = marker.checked_add(1)?;
    let depth = indent(lines.get(start)?.as_ref())?;
    let len = lines[start..]
        .iter()
        .take_while(|line| indent(line.as_ref()).is_some_and(|width| width >= depth))
        .count();
    Some(start..start + len)
}

pub(super) fn detect(document: &Document) -> Vec<Region> {
    let Some(path) = document.path() else {
        return Vec::new();
    };
    if !is_yaml_path(path) {
        return Vec::new();
    }

    let body = document.body();
    let texts: Vec<String> = body.iter().map(|line| line.plain_text()).collect();
    let mut regions = Vec::new();
    for (marker, text) in texts.iter().enumerate() {
        if !text.contains(VAULT_TAG) {
            continue;
        }
        let id = format!("yaml-{}", body[marker].number);
        if document.has_controls(&id) {
            tracing::debug!(%id, "yaml region already decorated");
            continue;
        }
        let Some(values) = value_span(&texts, marker) else {
            tracing::debug!(%id, "vault tag without value lines");
            continue;
        };

        let ciphertext: String = texts[values.clone()]
            .iter()
            .map(|line| line.trim())
            .filter(|line| !is_vault_header(line))
            .collect();
        let boundary = extent_of(&body[values.clone()]);
        let captured = &body[marker..values.end];
        regions.push(Region::new(
            id,
            Some(path.as_str().to_owned()),
            Container::Body,
            boundary,
            EncryptedPayload::Yaml { ciphertext },
            Snapshot::new(
                Boundary::new(body[marker].number, boundary.end),
                captured.to_vec(),
            ),
        ));
    }
    regions
}
