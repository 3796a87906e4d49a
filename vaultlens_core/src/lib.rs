//! Core library for revealing Ansible Vault content in rendered source views.
//!
//! The crate is layered around three primary responsibilities:
//! - modelling the rendered host document (full file view and unified diff view)
//! - detecting encrypted regions and reconstructing decrypted diffs
//! - driving the decryption service and toggling regions between renderings

#![warn(
    clippy::all,
    clippy::cargo,
    clippy::nursery,
    clippy::pedantic,
    missing_docs
)]
#![cfg_attr(
    not(test),
    deny(
        clippy::dbg_macro,
        clippy::expect_used,
        clippy::panic,
        clippy::print_stderr,
        clippy::print_stdout,
        clippy::todo,
        clippy::unwrap_used
    )
)]

/// Region detection for blob, diff and YAML views.
pub mod detect;
/// Diff reconstruction from decrypted before/after text.
pub mod diff;
/// In-process model of the rendered host document.
pub mod document;
/// Display-safe line construction.
pub mod line;
/// Decrypt-and-render orchestration.
pub mod orchestrator;
/// Detected regions and their toggle state.
pub mod region;
/// Conversion of decrypted content into document lines.
pub mod render;
/// Façade over the decryption service.
pub mod service;

pub use diff::{reconstruct, InputError};
pub use document::{looks_like_unified_diff, Controls, Document, DocumentError, FileSection};
pub use orchestrator::{
    BatchReport, ChainPolicy, DecryptMode, DecryptOutcome, Orchestrator, RegionResult, ScanReport,
};
pub use region::{Region, Snapshot};
pub use service::DecryptClient;
pub use vaultlens_api::{
    Boundary, Container, DiffRow, DiffRowKind, EncryptedPayload, Line, LineClass, RegionKind,
    RegionState, RenderedLine,
};
pub use vaultlens_service_api::{
    Credential, DecryptRequest, DecryptService, Decrypted, Plaintext, ServiceCapabilities,
    ServiceError, ServiceResult,
};

/// Common result type for the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the core library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Decrypted content could not be turned into lines.
    #[error("invalid input: {source}")]
    Input {
        /// Underlying input error.
        #[from]
        source: InputError,
    },
    /// The host document no longer matches a region's recorded boundary.
    #[error("document error: {source}")]
    Document {
        /// Underlying document error.
        #[from]
        source: DocumentError,
    },
    /// No region with the given id has been detected.
    #[error("no region with id {id}")]
    UnknownRegion {
        /// Requested region id.
        id: String,
    },
    /// The decryption service rejected a request.
    #[error("decryption service {service} failed: {source}")]
    Service {
        /// Identifier of the service.
        service: String,
        /// Error returned by the service.
        #[source]
        source: ServiceError,
    },
}
