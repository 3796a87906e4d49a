use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::expect_used)]
static BLOB_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\$ANSIBLE_VAULT;.+AES256$").expect("vault header pattern is valid")
});

#[allow(clippy::expect_used)]
static DIFF_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ +-]?\$ANSIBLE_VAULT;.+AES256$").expect("diff vault header pattern is valid")
});

/// Whether `text`, once trimmed, is an ansible-vault header line.
#[must_use]
pub fn is_vault_header(text: &str) -> bool {
    BLOB_HEADER.is_match(text.trim())
}

/// Like [`is_vault_header`] but tolerating a leading diff marker.
#[must_use]
pub fn is_diff_vault_header(text: &str) -> bool {
    DIFF_HEADER.is_match(text.trim())
}

/// `text` with every whitespace character removed.
#[must_use]
pub fn compact(text: &str) -> String {
    text.chars().filter(|ch| !ch.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_header_variants() {
        assert!(is_vault_header("$ANSIBLE_VAULT;1.1;AES256"));
        assert!(is_vault_header("  $ANSIBLE_VAULT;1.2;AES256  "));
        assert!(!is_vault_header("$ANSIBLE_VAULT;AES256"));
        assert!(!is_vault_header("+$ANSIBLE_VAULT;1.1;AES256"));
        assert!(!is_vault_header("$ANSIBLE_VAULT;1.2;AES256;prod"));
        assert!(!is_vault_header("key: $ANSIBLE_VAULT;1.1;AES256"));
    }

    #[test]
    fn diff_header_accepts_one_marker() {
        assert!(is_diff_vault_header("+$ANSIBLE_VAULT;1.1;AES256"));
        assert!(is_diff_vault_header("-$ANSIBLE_VAULT;1.1;AES256"));
        assert!(is_diff_vault_header(" $ANSIBLE_VAULT;1.1;AES256"));
        assert!(is_diff_vault_header("$ANSIBLE_VAULT;1.1;AES256"));
        assert!(!is_diff_vault_header("++$ANSIBLE_VAULT;1.1;AES256"));
    }

    #[test]
    fn non_breaking_spaces_count_as_whitespace() {
        assert!(is_vault_header("\u{a0}$ANSIBLE_VAULT;1.1;AES256\u{a0}"));
        assert_eq!(compact("61 62\u{a0}63\t64\n"), "61626364");
    }
}
