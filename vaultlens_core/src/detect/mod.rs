//! Region detection.
//!
//! Detection is read-only: it inspects the document and returns the regions
//! that are not already decorated with controls. Attaching controls is left
//! to the orchestrator.

mod blob;
mod diff;
mod header;
mod yaml;

use crate::document::Document;
use crate::region::Region;

pub use blob::BLOB_REGION_ID;
pub use header::{compact, is_diff_vault_header, is_vault_header};
pub use yaml::{is_yaml_path, value_span, VAULT_TAG};

/// Every undecorated region of `document`, blob first, then diff sections in
/// document order, then YAML values in line order.
#[must_use]
pub fn detect(document: &Document) -> Vec<Region> {
    let mut regions: Vec<Region> = blob::detect(document).into_iter().collect();
    regions.extend(diff::detect(document));
    regions.extend(yaml::detect(document));
    tracing::debug!(found = regions.len(), "region detection finished");
    regions
}

/// Whole-file regions of `document`.
#[must_use]
pub fn detect_blob(document: &Document) -> Option<Region> {
    blob::detect(document)
}

/// Diff file-section regions of `document`.
#[must_use]
pub fn detect_diff(document: &Document) -> Vec<Region> {
    diff::detect(document)
}

/// YAML `!vault` value regions of `document`.
#[must_use]
pub fn detect_yaml(document: &Document) -> Vec<Region> {
    yaml::detect(document)
}
