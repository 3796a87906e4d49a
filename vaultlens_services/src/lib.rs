mod ansible;
mod config;
mod disabled;
mod envelope;
mod prompt;

use std::sync::Arc;

pub use ansible::AnsibleVaultCli;
pub use config::ServiceConfig;
pub use disabled::DisabledService;
pub use envelope::{armor, VAULT_HEADER};
pub use prompt::{NoPrompt, PasswordPrompt, TerminalPrompt};

use vaultlens_service_api::DecryptService;

/// Build the decryption service for the current environment.
///
/// Uses the `ansible-vault` CLI when the configured binary resolves, and a
/// [`DisabledService`] otherwise.
#[must_use]
pub fn default_service() -> Arc<dyn DecryptService> {
    let config = ServiceConfig::from_env();
    match which::which(&config.binary) {
        Ok(path) => {
            tracing::debug!(binary = %path.display(), "using ansible-vault CLI");
            Arc::new(AnsibleVaultCli::with_config(config))
        }
        Err(err) => {
            let reason = format!("{} not found: {err}", config.binary.to_string_lossy());
            tracing::debug!(%reason, "decryption disabled");
            Arc::new(DisabledService::new(reason))
        }
    }
}
