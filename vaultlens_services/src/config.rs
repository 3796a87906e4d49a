use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_BINARY: &str = "ansible-vault";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_PROMPTS: u32 = 3;

const BIN_VAR: &str = "VAULTLENS_ANSIBLE_VAULT_BIN";
const PASSWORD_FILE_VAR: &str = "VAULTLENS_PASSWORD_FILE";
const AUTO_DECRYPT_VAR: &str = "VAULTLENS_AUTO_DECRYPT";
const TIMEOUT_VAR: &str = "VAULTLENS_TIMEOUT_SECS";
const MAX_PROMPTS_VAR: &str = "VAULTLENS_MAX_PROMPTS";

/// Settings for the `ansible-vault` backed service, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Binary invoked for decryption.
    pub binary: OsString,
    /// File holding the vault password, if any.
    pub password_file: Option<PathBuf>,
    /// Whether regions may be decrypted without a user action.
    pub auto_decrypt: bool,
    /// Time allowed for a single CLI invocation.
    pub timeout: Duration,
    /// Maximum number of password prompts per request.
    pub max_prompts: u32,
}

impl ServiceConfig {
    /// Read the configuration from process environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var_os(key))
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let binary = lookup(BIN_VAR)
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| OsString::from(DEFAULT_BINARY));
        let password_file = lookup(PASSWORD_FILE_VAR)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        let auto_decrypt = lookup(AUTO_DECRYPT_VAR)
            .and_then(|value| parse_flag(&value))
            .unwrap_or(password_file.is_some());
        let timeout = lookup(TIMEOUT_VAR)
            .and_then(|value| parse_number::<u64>(TIMEOUT_VAR, &value))
            .filter(|secs| *secs > 0)
            .map_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS), Duration::from_secs);
        let max_prompts = lookup(MAX_PROMPTS_VAR)
            .and_then(|value| parse_number::<u32>(MAX_PROMPTS_VAR, &value))
            .unwrap_or(DEFAULT_MAX_PROMPTS);

        Self {
            binary,
            password_file,
            auto_decrypt,
            timeout,
            max_prompts,
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn parse_flag(value: &OsString) -> Option<bool> {
    match value.to_string_lossy().trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        other => {
            tracing::warn!(value = other, "ignoring unrecognized {AUTO_DECRYPT_VAR}");
            None
        }
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &OsString) -> Option<T> {
    let text = value.to_string_lossy();
    let parsed = text.trim().parse().ok();
    if parsed.is_none() {
        tracing::warn!(value = %text, "ignoring non-numeric {key}");
    }
    parsed
}
