//! Ansible vault envelope armoring.

/// Header written in front of re-armored payloads.
pub const VAULT_HEADER: &str = "$ANSIBLE_VAULT;1.1;AES256";

const LINE_WIDTH: usize = 80;

/// Rebuild a vault file from a stripped hex payload.
///
/// Whitespace in `payload` is dropped; the hex body is wrapped at 80 columns
/// below the vault header, matching what `ansible-vault` writes.
#[must_use]
pub fn armor(payload: &str) -> String {
    let body: Vec<char> = payload.chars().filter(|ch| !ch.is_whitespace()).collect();
    let mut armored = String::with_capacity(VAULT_HEADER.len() + body.len() + body.len() / LINE_WIDTH + 2);
    armored.push_str(VAULT_HEADER);
    armored.push('\n');
    for chunk in body.chunks(LINE_WIDTH) {
        armored.extend(chunk);
        armored.push('\n');
    }
    armored
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn armor_wraps_at_eighty_columns() {
        let payload = "a".repeat(170);
        let armored = armor(&payload);
        let lines: Vec<&str> = armored.lines().collect();
        assert_eq!(lines[0], VAULT_HEADER);
        assert_eq!(lines[1].len(), 80);
        assert_eq!(lines[2].len(), 80);
        assert_eq!(lines[3].len(), 10);
        assert_eq!(lines.len(), 4);
        assert!(armored.ends_with('\n'));
    }

    #[test]
    fn armor_strips_whitespace() {
        let armored = armor(" 6162\n6364 \t");
        assert_eq!(armored, format!("{VAULT_HEADER}\n61626364\n"));
    }

    #[test]
    fn armor_of_empty_payload_is_header_only() {
        assert_eq!(armor(""), format!("{VAULT_HEADER}\n"));
    }
}
