use vaultlens_api::{Container, EncryptedPayload};

use super::header::{compact, is_vault_header};
use crate::document::Document;
use crate::region::{extent_of, Region, Snapshot};

/// Id of the single whole-file region of a document.
pub const BLOB_REGION_ID: &str = "blob";

pub(super) fn detect(document: &Document) -> Option<Region> {
    let body = document.body();
    let (first, rest) = body.split_first()?;
    if !is_vault_header(&first.plain_text()) {
        return None;
    }
    if document.has_controls(BLOB_REGION_ID) {
        tracing::debug!("blob region already decorated");
        return None;
    }

    let ciphertext: String = rest.iter().map(|line| compact(&line.plain_text())).collect();
    let span = extent_of(body);
    Some(Region::new(
        BLOB_REGION_ID,
        document.path().map(|path| path.as_str().to_owned()),
        Container::Body,
        span,
        EncryptedPayload::Blob { ciphertext },
        Snapshot::new(span, body.to_vec()),
    ))
}
