use std::collections::BTreeMap;
use std::fmt::Write as _;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use vaultlens_api::{Boundary, Container, LineClass, RenderedLine};

/// Errors raised while editing a [`Document`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DocumentError {
    /// No file section carries the requested anchor.
    #[error("no file section with anchor {anchor}")]
    UnknownFile {
        /// Requested anchor.
        anchor: String,
    },
    /// None of the lines of the span are present in the container.
    #[error("lines {start}..{end} not found in {container}")]
    SpanNotFound {
        /// Container description.
        container: String,
        /// First line number of the span.
        start: usize,
        /// End of the span.
        end: usize,
    },
    /// The lines of the span are interleaved with foreign lines.
    #[error("lines {start}..{end} in {container} are not contiguous")]
    Discontiguous {
        /// Container description.
        container: String,
        /// First line number of the span.
        start: usize,
        /// End of the span.
        end: usize,
    },
}

/// Visibility of the decrypt/revert controls attached to a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Controls {
    /// Whether the decrypt control is shown.
    pub decrypt_visible: bool,
    /// Whether the revert control is shown.
    pub revert_visible: bool,
}

impl Controls {
    const ENCRYPTED: Self = Self {
        decrypt_visible: true,
        revert_visible: false,
    };
    const DECRYPTED: Self = Self {
        decrypt_visible: false,
        revert_visible: true,
    };
}

/// One file of a unified diff view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSection {
    /// Path of the file after the change.
    pub path: String,
    /// Stable anchor of the section.
    pub anchor: String,
    /// Rendered rows, hunk headers included.
    pub lines: Vec<RenderedLine>,
}

impl FileSection {
    /// Empty section for `path`.
    #[must_use]
    pub fn new(path: impl Into<String>, anchor: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            anchor: anchor.into(),
            lines: Vec::new(),
        }
    }

    fn push(&mut self, class: LineClass, text: &str) {
        let number = self.lines.len();
        self.lines.push(RenderedLine::new(number, class, text));
    }
}

/// In-process stand-in for the rendered host page.
///
/// A document holds either a full-file body, a list of diff file sections,
/// or both, together with the controls and badges attached to detected
/// regions. Lines are addressed by their stable number, never by position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    path: Option<Utf8PathBuf>,
    body: Vec<RenderedLine>,
    files: Vec<FileSection>,
    controls: BTreeMap<String, Controls>,
    badges: Vec<String>,
}

impl Document {
    /// Empty document without a path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Full-file view of `text` rendered at `path`.
    #[must_use]
    pub fn from_blob(path: impl Into<Utf8PathBuf>, text: &str) -> Self {
        let body = text
            .lines()
            .enumerate()
            .map(|(number, raw)| RenderedLine::new(number, LineClass::Code, raw))
            .collect();
        Self {
            path: Some(path.into()),
            body,
            ..Self::default()
        }
    }

    /// Diff view of a unified diff as produced by `git diff`.
    ///
    /// Every `diff --git` header, or a bare `---`/`+++` pair, opens a file
    /// section anchored by its post-change path. Hunk headers and hunk
    /// content are kept; everything else is dropped.
    #[must_use]
    pub fn from_unified_diff(text: &str) -> Self {
        let mut parser = DiffParser::default();
        for raw in text.lines() {
            parser.feed(raw);
        }
        Self {
            files: parser.finish(),
            ..Self::default()
        }
    }

    /// Path shown by a full-file view.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8Path> {
        self.path.as_deref()
    }

    /// Lines of the full-file view.
    #[must_use]
    pub fn body(&self) -> &[RenderedLine] {
        &self.body
    }

    /// File sections of the diff view.
    #[must_use]
    pub fn files(&self) -> &[FileSection] {
        &self.files
    }

    /// File section by anchor.
    #[must_use]
    pub fn file(&self, anchor: &str) -> Option<&FileSection> {
        self.files.iter().find(|file| file.anchor == anchor)
    }

    /// Append a file section.
    pub fn push_file(&mut self, file: FileSection) {
        self.files.push(file);
    }

    /// Lines held by `container`.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::UnknownFile`] for an unknown anchor.
    pub fn lines(&self, container: &Container) -> Result<&[RenderedLine], DocumentError> {
        match container {
            Container::Body => Ok(&self.body),
            Container::File { anchor } => self
                .file(anchor)
                .map(|file| file.lines.as_slice())
                .ok_or_else(|| DocumentError::UnknownFile {
                    anchor: anchor.clone(),
                }),
        }
    }

    fn lines_mut(&mut self, container: &Container) -> Result<&mut Vec<RenderedLine>, DocumentError> {
        match container {
            Container::Body => Ok(&mut self.body),
            Container::File { anchor } => self
                .files
                .iter_mut()
                .find(|file| file.anchor == *anchor)
                .map(|file| &mut file.lines)
                .ok_or_else(|| DocumentError::UnknownFile {
                    anchor: anchor.clone(),
                }),
        }
    }

    /// Replace the lines numbered within `span` by `replacement`.
    ///
    /// The span is located before anything is changed, so on error the
    /// document is untouched. Returns the removed lines.
    ///
    /// # Errors
    ///
    /// Returns an error when the container is unknown, when no line of the
    /// span is present, or when the span's lines are not contiguous.
    pub fn splice(
        &mut self,
        container: &Container,
        span: Boundary,
        replacement: Vec<RenderedLine>,
    ) -> Result<Vec<RenderedLine>, DocumentError> {
        let lines = self.lines_mut(container)?;
        let describe = || match container {
            Container::Body => "body".to_owned(),
            Container::File { anchor } => format!("file {anchor}"),
        };

        let Some(start) = lines.iter().position(|line| span.contains(line.number)) else {
            return Err(DocumentError::SpanNotFound {
                container: describe(),
                start: span.start,
                end: span.end,
            });
        };
        let run = lines[start..]
            .iter()
            .take_while(|line| span.contains(line.number))
            .count();
        let end = start + run;
        if lines[end..].iter().any(|line| span.contains(line.number)) {
            return Err(DocumentError::Discontiguous {
                container: describe(),
                start: span.start,
                end: span.end,
            });
        }

        Ok(lines.splice(start..end, replacement).collect())
    }

    /// Whether controls are attached to region `id`.
    #[must_use]
    pub fn has_controls(&self, id: &str) -> bool {
        self.controls.contains_key(id)
    }

    /// Controls attached to region `id`.
    #[must_use]
    pub fn controls(&self, id: &str) -> Option<Controls> {
        self.controls.get(id).copied()
    }

    /// Attach controls to region `id`, showing the decrypt control.
    pub fn install_controls(&mut self, id: &str) {
        self.controls.insert(id.to_owned(), Controls::ENCRYPTED);
    }

    /// Drop the controls of region `id`, as the host does when it re-renders.
    pub fn remove_controls(&mut self, id: &str) -> Option<Controls> {
        self.controls.remove(id)
    }

    /// Show the revert control of region `id` and hide its decrypt control.
    pub fn show_decrypted(&mut self, id: &str) {
        self.controls.insert(id.to_owned(), Controls::DECRYPTED);
    }

    /// Show the decrypt control of region `id` and hide its revert control.
    pub fn show_encrypted(&mut self, id: &str) {
        self.controls.insert(id.to_owned(), Controls::ENCRYPTED);
    }

    /// Add a badge to the page header once.
    pub fn add_badge(&mut self, label: &str) {
        if !self.badges.iter().any(|badge| badge == label) {
            self.badges.push(label.to_owned());
        }
    }

    /// Badges in insertion order.
    #[must_use]
    pub fn badges(&self) -> &[String] {
        &self.badges
    }

    /// Plain-text rendering of the document.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for line in &self.body {
            out.push_str(&line.plain_text());
            out.push('\n');
        }
        for file in &self.files {
            let _ = writeln!(out, "=== {} ===", file.path);
            for line in &file.lines {
                out.push_str(&line.plain_text());
                out.push('\n');
            }
        }
        out
    }
}

/// Whether `text` reads as a unified diff.
///
/// Before the first hunk header there must be a `diff --git` line or a
/// `--- ` line directly followed by a `+++ ` line. A lone `---` (a YAML
/// document start, for instance) is not enough.
#[must_use]
pub fn looks_like_unified_diff(text: &str) -> bool {
    let header: Vec<&str> = text.lines().take_while(|line| !line.starts_with("@@")).collect();
    header.iter().any(|line| line.starts_with("diff --git "))
        || header
            .windows(2)
            .any(|pair| pair[0].starts_with("--- ") && pair[1].starts_with("+++ "))
}

/// Anchor for a diff file section: `diff-` followed by the path with every
/// character outside `[A-Za-z0-9]` replaced by `-`.
#[must_use]
pub fn anchor_for(path: &str) -> String {
    let slug: String = path
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '-' })
        .collect();
    format!("diff-{slug}")
}

fn hunk_counts(header: &str) -> Option<(usize, usize)> {
    let mut parts = header.strip_prefix("@@ ")?.split_whitespace();
    let old = parts.next()?.strip_prefix('-')?;
    let new = parts.next()?.strip_prefix('+')?;
    let count = |range: &str| match range.split_once(',') {
        Some((_, count)) => count.parse().ok(),
        None => Some(1),
    };
    Some((count(old)?, count(new)?))
}

fn strip_side(path: &str, prefix: &str) -> String {
    path.strip_prefix(prefix).unwrap_or(path).to_owned()
}

#[derive(Default)]
struct DiffParser {
    files: Vec<FileSection>,
    current: Option<FileSection>,
    old_left: usize,
    new_left: usize,
}

impl DiffParser {
    fn in_hunk(&self) -> bool {
        self.old_left > 0 || self.new_left > 0
    }

    fn close(&mut self) {
        let Some(mut file) = self.current.take() else {
            return;
        };
        let base = anchor_for(&file.path);
        let taken = |anchor: &str| self.files.iter().any(|file| file.anchor == anchor);
        let mut anchor = base.clone();
        let mut suffix = 1;
        while taken(&anchor) {
            anchor = format!("{base}-{suffix}");
            suffix += 1;
        }
        file.anchor = anchor;
        self.files.push(file);
    }

    fn open(&mut self, path: String) {
        self.close();
        self.current = Some(FileSection::new(path, String::new()));
        self.old_left = 0;
        self.new_left = 0;
    }

    fn feed(&mut self, raw: &str) {
        if self.in_hunk() {
            self.feed_hunk(raw);
            return;
        }

        if let Some(rest) = raw.strip_prefix("diff --git ") {
            let path = rest
                .rsplit_once(" b/")
                .map_or_else(|| rest.to_owned(), |(_, path)| path.to_owned());
            self.open(path);
        } else if let Some(path) = raw.strip_prefix("--- ") {
            let reuse = self.current.as_ref().is_some_and(|file| file.lines.is_empty());
            if !reuse {
                self.open(strip_side(path, "a/"));
            }
        } else if let Some(path) = raw.strip_prefix("+++ ") {
            if path != "/dev/null" {
                if let Some(file) = self.current.as_mut() {
                    file.path = strip_side(path, "b/");
                }
            }
        } else if raw.starts_with("@@") {
            if let (Some(file), Some((old, new))) = (self.current.as_mut(), hunk_counts(raw)) {
                file.push(LineClass::Hunk, raw);
                self.old_left = old;
                self.new_left = new;
            }
        }
    }

    fn feed_hunk(&mut self, raw: &str) {
        let Some(file) = self.current.as_mut() else {
            return;
        };
        match raw.chars().next() {
            Some('+') => {
                file.push(LineClass::Addition, raw);
                self.new_left = self.new_left.saturating_sub(1);
            }
            Some('-') => {
                file.push(LineClass::Deletion, raw);
                self.old_left = self.old_left.saturating_sub(1);
            }
            Some('\\') => {}
            _ => {
                file.push(LineClass::Context, raw);
                self.old_left = self.old_left.saturating_sub(1);
                self.new_left = self.new_left.saturating_sub(1);
            }
        }
    }

    fn finish(mut self) -> Vec<FileSection> {
        self.close();
        self.files
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unified_diffs_are_recognised() {
        assert!(looks_like_unified_diff(DIFF));
        assert!(looks_like_unified_diff("--- a/x.yml\n+++ b/x.yml\n@@ -1 +1 @@\n-a\n+b\n"));
    }

    #[test]
    fn yaml_document_start_is_not_a_diff() {
        let yaml = "--- # vars\nsecret: !vault |\n  $ANSIBLE_VAULT;1.1;AES256\n  6162\n";
        assert!(!looks_like_unified_diff(yaml));
        assert!(!looks_like_unified_diff("---\nkey: value\n"));
    }

    const DIFF: &str = "\
diff --git a/group_vars/all.yml b/group_vars/all.yml
index 1111111..2222222 100644
--- a/group_vars/all.yml
+++ b/group_vars/all.yml
@@ -1,3 +1,3 @@
 $ANSIBLE_VAULT;1.1;AES256
-6162
+6364
 6566
diff --git a/README.md b/README.md
--- a/README.md
+++ b/README.md
@@ -1 +1,2 @@
 # Title
+--- not a header
";

    fn numbers(lines: &[RenderedLine]) -> Vec<usize> {
        lines.iter().map(|line| line.number).collect()
    }

    #[test]
    fn from_blob_numbers_lines_from_zero() {
        let doc = Document::from_blob("secrets.yml", "a\nb\r\nc\n");
        assert_eq!(doc.path().map(Utf8Path::as_str), Some("secrets.yml"));
        assert_eq!(numbers(doc.body()), vec![0, 1, 2]);
        assert_eq!(doc.body()[1].text, "b");
        assert!(doc.files().is_empty());
    }

    #[test]
    fn unified_diff_is_split_into_sections() {
        let doc = Document::from_unified_diff(DIFF);
        assert_eq!(doc.files().len(), 2);

        let first = &doc.files()[0];
        assert_eq!(first.path, "group_vars/all.yml");
        assert_eq!(first.anchor, "diff-group-vars-all-yml");
        let classes: Vec<LineClass> = first.lines.iter().map(|line| line.class).collect();
        assert_eq!(
            classes,
            vec![
                LineClass::Hunk,
                LineClass::Context,
                LineClass::Deletion,
                LineClass::Addition,
                LineClass::Context
            ]
        );
        assert_eq!(first.lines[1].text, " $ANSIBLE_VAULT;1.1;AES256");

        let second = &doc.files()[1];
        assert_eq!(second.path, "README.md");
        assert_eq!(second.lines.last().map(|line| line.class), Some(LineClass::Addition));
        assert_eq!(second.lines.len(), 3);
    }

    #[test]
    fn plain_unified_diff_without_git_header() {
        let doc = Document::from_unified_diff("--- a/x.txt\n+++ b/x.txt\n@@ -1 +1 @@\n-a\n+b\n");
        assert_eq!(doc.files().len(), 1);
        assert_eq!(doc.files()[0].path, "x.txt");
        assert_eq!(doc.files()[0].lines.len(), 3);
    }

    #[test]
    fn duplicate_anchors_get_a_suffix() {
        let text = "--- a/a.b\n+++ b/a.b\n@@ -1 +1 @@\n-x\n+y\n--- a/a-b\n+++ b/a-b\n@@ -1 +1 @@\n-x\n+y\n";
        let doc = Document::from_unified_diff(text);
        let anchors: Vec<&str> = doc.files().iter().map(|file| file.anchor.as_str()).collect();
        assert_eq!(anchors, vec!["diff-a-b", "diff-a-b-1"]);
    }

    #[test]
    fn splice_replaces_by_number() {
        let mut doc = Document::from_blob("f", "0\n1\n2\n3\n4");
        let removed = doc
            .splice(
                &Container::Body,
                Boundary::new(1, 3),
                vec![RenderedLine::new(10, LineClass::Code, "x")],
            )
            .expect("span present");
        assert_eq!(numbers(&removed), vec![1, 2]);
        assert_eq!(numbers(doc.body()), vec![0, 10, 3, 4]);

        doc.splice(&Container::Body, Boundary::new(10, 11), removed)
            .expect("span present");
        assert_eq!(numbers(doc.body()), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn splice_failure_leaves_document_untouched() {
        let mut doc = Document::from_blob("f", "0\n1\n2");
        let before = doc.clone();

        let err = doc
            .splice(&Container::Body, Boundary::new(7, 9), Vec::new())
            .expect_err("missing span");
        assert!(matches!(err, DocumentError::SpanNotFound { .. }));

        let err = doc
            .splice(
                &Container::File {
                    anchor: "nope".into(),
                },
                Boundary::new(0, 1),
                Vec::new(),
            )
            .expect_err("unknown file");
        assert_eq!(
            err,
            DocumentError::UnknownFile {
                anchor: "nope".into()
            }
        );
        assert_eq!(doc, before);
    }

    #[test]
    fn splice_rejects_interleaved_lines() {
        let mut doc = Document::from_blob("f", "0\n1\n2");
        doc.splice(
            &Container::Body,
            Boundary::new(1, 2),
            vec![RenderedLine::new(5, LineClass::Code, "x")],
        )
        .expect("span present");
        let before = doc.clone();
        let err = doc
            .splice(&Container::Body, Boundary::new(0, 3), Vec::new())
            .expect_err("line 5 sits between 0 and 2");
        assert!(matches!(err, DocumentError::Discontiguous { .. }));
        assert_eq!(doc, before);
    }

    #[test]
    fn controls_toggle() {
        let mut doc = Document::new();
        assert!(!doc.has_controls("blob"));
        doc.install_controls("blob");
        assert_eq!(doc.controls("blob"), Some(Controls::ENCRYPTED));
        doc.show_decrypted("blob");
        assert_eq!(
            doc.controls("blob"),
            Some(Controls {
                decrypt_visible: false,
                revert_visible: true
            })
        );
        doc.show_encrypted("blob");
        assert_eq!(doc.controls("blob"), Some(Controls::ENCRYPTED));
        assert!(doc.remove_controls("blob").is_some());
        assert!(!doc.has_controls("blob"));
    }

    #[test]
    fn badges_are_added_once() {
        let mut doc = Document::new();
        doc.add_badge("Encrypted Ansible Vault");
        doc.add_badge("Encrypted Ansible Vault");
        assert_eq!(doc.badges(), ["Encrypted Ansible Vault".to_owned()]);
    }

    #[test]
    fn hunk_counts_default_to_one() {
        assert_eq!(hunk_counts("@@ -1,3 +1,4 @@ fn main"), Some((3, 4)));
        assert_eq!(hunk_counts("@@ -1 +1 @@"), Some((1, 1)));
        assert_eq!(hunk_counts("@@ -0,0 +1 @@"), Some((0, 1)));
        assert_eq!(hunk_counts("@@ garbage"), None);
    }
}
