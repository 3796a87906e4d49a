use serde::Serialize;
use vaultlens_api::{Boundary, Container, EncryptedPayload, RegionKind, RegionState, RenderedLine};

/// Lines of a region as they were rendered when it was detected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    span: Boundary,
    lines: Vec<RenderedLine>,
}

impl Snapshot {
    /// Capture `lines`, which occupy `span`.
    #[must_use]
    pub const fn new(span: Boundary, lines: Vec<RenderedLine>) -> Self {
        Self { span, lines }
    }

    /// Line numbers covered by the snapshot.
    #[must_use]
    pub const fn span(&self) -> Boundary {
        self.span
    }

    /// Captured lines.
    #[must_use]
    pub fn lines(&self) -> &[RenderedLine] {
        &self.lines
    }
}

/// A detected encrypted region and its toggle state.
///
/// `boundary` names the lines holding ciphertext. The snapshot may reach
/// further (a YAML region also captures its marker line) and `extent`
/// tracks the lines the region currently occupies in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Region {
    id: String,
    file_id: Option<String>,
    container: Container,
    boundary: Boundary,
    payload: EncryptedPayload,
    original: Snapshot,
    extent: Boundary,
    state: RegionState,
}

impl Region {
    /// New region in the encrypted state.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        file_id: Option<String>,
        container: Container,
        boundary: Boundary,
        payload: EncryptedPayload,
        original: Snapshot,
    ) -> Self {
        let extent = original.span();
        Self {
            id: id.into(),
            file_id,
            container,
            boundary,
            payload,
            original,
            extent,
            state: RegionState::Encrypted,
        }
    }

    /// Region id, unique within a document.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Kind of view the region was found in.
    #[must_use]
    pub const fn kind(&self) -> RegionKind {
        self.payload.kind()
    }

    /// Path of the file the region belongs to, when known.
    #[must_use]
    pub fn file_id(&self) -> Option<&str> {
        self.file_id.as_deref()
    }

    /// Container holding the region's lines.
    #[must_use]
    pub const fn container(&self) -> &Container {
        &self.container
    }

    /// Lines holding ciphertext at detection time.
    #[must_use]
    pub const fn boundary(&self) -> Boundary {
        self.boundary
    }

    /// Extracted ciphertext.
    #[must_use]
    pub const fn payload(&self) -> &EncryptedPayload {
        &self.payload
    }

    /// Original rendering.
    #[must_use]
    pub const fn original(&self) -> &Snapshot {
        &self.original
    }

    /// Lines the region occupies in the document right now.
    #[must_use]
    pub const fn extent(&self) -> Boundary {
        self.extent
    }

    /// Current toggle state.
    #[must_use]
    pub const fn state(&self) -> RegionState {
        self.state
    }

    pub(crate) fn mark_decrypted(&mut self, extent: Boundary) {
        self.extent = extent;
        self.state = RegionState::Decrypted;
    }

    pub(crate) fn mark_encrypted(&mut self) {
        self.extent = self.original.span();
        self.state = RegionState::Encrypted;
    }
}

/// Boundary spanning the numbers of `lines`.
pub(crate) fn extent_of(lines: &[RenderedLine]) -> Boundary {
    let start = lines.iter().map(|line| line.number).min().unwrap_or(0);
    let end = lines.iter().map(|line| line.number + 1).max().unwrap_or(start);
    Boundary::new(start, end)
}
