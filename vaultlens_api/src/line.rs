use serde::{Deserialize, Serialize};

/// Character substituted for every ASCII space in display text.
pub const NON_BREAKING_SPACE: char = '\u{00A0}';

/// Replace every space with a non-breaking space so the text survives
/// whitespace-collapsing hosts unchanged.
#[must_use]
pub fn escape_text(raw: &str) -> String {
    raw.replace(' ', "\u{00A0}")
}

/// Reverse of [`escape_text`], used when a rendered line is read back as plain text.
#[must_use]
pub fn unescape_text(display: &str) -> String {
    display.replace(NON_BREAKING_SPACE, " ")
}

/// An addressable, display-safe line of text.
///
/// `index` is the stable key used to re-locate the line later; `text` never
/// contains an ASCII space.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Line {
    index: usize,
    text: String,
}

impl Line {
    /// Wrap a raw line, escaping it for display.
    #[must_use]
    pub fn new(index: usize, raw: &str) -> Self {
        Self {
            index,
            text: escape_text(raw),
        }
    }

    /// Stable index of the line within its owning region or document.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Escaped display text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Visual role of a line in the host document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineClass {
    /// A line of a full-file view.
    Code,
    /// An added line of a diff view.
    Addition,
    /// A removed line of a diff view.
    Deletion,
    /// An unchanged line of a diff view.
    Context,
    /// A hunk header of a diff view (`@@ -a,b +c,d @@`).
    Hunk,
}

impl LineClass {
    /// Whether the line carries file content (as opposed to a hunk header).
    #[must_use]
    pub const fn is_code(self) -> bool {
        !matches!(self, Self::Hunk)
    }
}

/// A line as it appears in the host document.
///
/// `number` is a stable identifier assigned when the line is first rendered.
/// Removing or replacing neighbouring lines never renumbers it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RenderedLine {
    /// Stable line identifier.
    pub number: usize,
    /// Visual role of the line.
    pub class: LineClass,
    /// Rendered text, including any diff marker.
    pub text: String,
}

impl RenderedLine {
    /// Convenience constructor.
    #[must_use]
    pub fn new(number: usize, class: LineClass, text: impl Into<String>) -> Self {
        Self {
            number,
            class,
            text: text.into(),
        }
    }

    /// Rendered text with non-breaking spaces turned back into spaces.
    #[must_use]
    pub fn plain_text(&self) -> String {
        unescape_text(&self.text)
    }
}

impl From<Line> for RenderedLine {
    fn from(line: Line) -> Self {
        Self {
            number: line.index,
            class: LineClass::Code,
            text: line.text,
        }
    }
}
