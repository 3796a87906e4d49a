use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Document mode a region was detected in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    /// Whole-file view of a vault-encrypted file.
    Blob,
    /// One file section of a unified diff.
    Diff,
    /// One `!vault` mapping value inside a YAML file.
    Yaml,
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Blob => "blob",
            Self::Diff => "diff",
            Self::Yaml => "yaml",
        };
        f.write_str(label)
    }
}

/// Toggle state of a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RegionState {
    /// The original encrypted rendering is visible.
    #[default]
    Encrypted,
    /// The decrypted rendering is visible.
    Decrypted,
}

/// Part of the document that holds a region's lines.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Container {
    /// The full-file view.
    Body,
    /// A diff file section, addressed by its anchor.
    File {
        /// Anchor of the file section.
        anchor: String,
    },
}

/// Half-open range of stable line numbers, `start..end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Boundary {
    /// First line number inside the boundary.
    pub start: usize,
    /// First line number past the boundary.
    pub end: usize,
}

impl Boundary {
    /// Construct a boundary from explicit bounds.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Whether a line number falls inside the boundary.
    #[must_use]
    pub const fn contains(&self, number: usize) -> bool {
        number >= self.start && number < self.end
    }

    /// Number of line numbers covered.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the boundary covers no line numbers.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The boundary as a standard range.
    #[must_use]
    pub const fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for Boundary {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

/// Ciphertext extracted from a region, stripped of header and whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum EncryptedPayload {
    /// Single block for a whole-file view.
    Blob {
        /// Hex ciphertext.
        ciphertext: String,
    },
    /// Separate removed and added blocks for a diff file section.
    Diff {
        /// Hex ciphertext collected from deletion lines.
        removed: String,
        /// Hex ciphertext collected from addition lines.
        added: String,
    },
    /// One block per YAML mapping value.
    Yaml {
        /// Hex ciphertext of the mapping value.
        ciphertext: String,
    },
}

impl EncryptedPayload {
    /// Region kind this payload belongs to.
    #[must_use]
    pub const fn kind(&self) -> RegionKind {
        match self {
            Self::Blob { .. } => RegionKind::Blob,
            Self::Diff { .. } => RegionKind::Diff,
            Self::Yaml { .. } => RegionKind::Yaml,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_is_half_open() {
        let boundary = Boundary::new(2, 5);
        assert!(!boundary.contains(1));
        assert!(boundary.contains(2));
        assert!(boundary.contains(4));
        assert!(!boundary.contains(5));
        assert_eq!(boundary.len(), 3);
        assert!(Boundary::new(4, 4).is_empty());
        assert_eq!(Boundary::from(1..3).as_range(), 1..3);
    }

    #[test]
    fn payload_reports_kind() {
        let payload = EncryptedPayload::Diff {
            removed: "aa".into(),
            added: "bb".into(),
        };
        assert_eq!(payload.kind(), RegionKind::Diff);
        assert_eq!(payload.kind().to_string(), "diff");
    }

    #[test]
    fn payload_round_trips_through_json() {
        let payload = EncryptedPayload::Yaml {
            ciphertext: "3033".into(),
        };
        let json = serde_json::to_string(&payload).expect("serialize payload");
        assert!(json.contains("\"type\":\"yaml\""));
        let decoded: EncryptedPayload = serde_json::from_str(&json).expect("deserialize payload");
        assert_eq!(decoded, payload);
    }

    #[test]
    fn default_state_is_encrypted() {
        assert_eq!(RegionState::default(), RegionState::Encrypted);
    }
}
