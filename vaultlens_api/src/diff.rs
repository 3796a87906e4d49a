use serde::{Deserialize, Serialize};

use crate::line::escape_text;

/// Type of a reconstructed diff row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffRowKind {
    /// A line only present in the added text.
    Added,
    /// A line only present in the removed text.
    Removed,
    /// A line present on both sides.
    Context,
}

impl DiffRowKind {
    /// Marker rendered in front of the row text.
    #[must_use]
    pub const fn marker(self) -> char {
        match self {
            Self::Added => '+',
            Self::Removed => '-',
            Self::Context => ' ',
        }
    }

    /// Whether rows of this kind belong to the removed ("left") side.
    #[must_use]
    pub const fn on_removed_side(self) -> bool {
        matches!(self, Self::Removed | Self::Context)
    }

    /// Whether rows of this kind belong to the added ("right") side.
    #[must_use]
    pub const fn on_added_side(self) -> bool {
        matches!(self, Self::Added | Self::Context)
    }
}

/// A typed, numbered row of a reconstructed diff.
///
/// `position` comes from one counter shared by every row of the diff,
/// regardless of kind. It is not a left or right line number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiffRow {
    /// Path of the file the diff belongs to.
    pub file_id: String,
    /// Anchor of the owning file within a multi-file diff.
    pub anchor: String,
    /// Shared running row counter, starting at 0.
    pub position: usize,
    /// Row type.
    pub kind: DiffRowKind,
    /// Raw row text, without marker and unescaped.
    pub text: String,
}

impl DiffRow {
    /// Rendered text: the kind marker followed by the escaped row text.
    #[must_use]
    pub fn display_text(&self) -> String {
        let mut rendered = String::with_capacity(self.text.len() + 1);
        rendered.push(self.kind.marker());
        rendered.push_str(&escape_text(&self.text));
        rendered
    }

    /// Link ids the host assigns to this row (`{anchor}L{n}` / `{anchor}R{n}`).
    #[must_use]
    pub fn anchor_ids(&self) -> Vec<String> {
        let mut ids = Vec::with_capacity(2);
        if self.kind.on_removed_side() {
            ids.push(format!("{}L{}", self.anchor, self.position));
        }
        if self.kind.on_added_side() {
            ids.push(format!("{}R{}", self.anchor, self.position));
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(kind: DiffRowKind) -> DiffRow {
        DiffRow {
            file_id: "group_vars/all.yml".into(),
            anchor: "diff-abc".into(),
            position: 4,
            kind,
            text: "db password".into(),
        }
    }

    #[test]
    fn display_text_prefixes_marker() {
        assert_eq!(row(DiffRowKind::Added).display_text(), "+db\u{00A0}password");
        assert_eq!(row(DiffRowKind::Removed).display_text(), "-db\u{00A0}password");
        assert_eq!(row(DiffRowKind::Context).display_text(), " db\u{00A0}password");
    }

    #[test]
    fn anchor_ids_follow_side() {
        assert_eq!(row(DiffRowKind::Added).anchor_ids(), vec!["diff-abcR4"]);
        assert_eq!(row(DiffRowKind::Removed).anchor_ids(), vec!["diff-abcL4"]);
        assert_eq!(
            row(DiffRowKind::Context).anchor_ids(),
            vec!["diff-abcL4", "diff-abcR4"]
        );
    }

    #[test]
    fn diff_row_serializes_kind_in_snake_case() {
        let json = serde_json::to_value(row(DiffRowKind::Context)).expect("serialize row");
        assert_eq!(json["kind"], "context");
        assert_eq!(json["position"], 4);
    }
}
