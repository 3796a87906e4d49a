use std::io::{self, IsTerminal};

use dialoguer::Password;
use vaultlens_service_api::{Credential, ServiceError, ServiceResult};

/// Source of vault passwords when a request is allowed to prompt.
pub trait PasswordPrompt: Send + Sync {
    /// Ask for a password. `attempt` is 0 for the first prompt of a request.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::PromptDeclined`] when no password is given.
    fn prompt(&self, attempt: u32) -> ServiceResult<Credential>;
}

/// Hidden-input prompt on the controlling terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl PasswordPrompt for TerminalPrompt {
    fn prompt(&self, attempt: u32) -> ServiceResult<Credential> {
        if !io::stdin().is_terminal() {
            return Err(ServiceError::PromptDeclined);
        }

        let label = if attempt == 0 {
            "Vault password"
        } else {
            "Vault password (try again)"
        };
        let password = Password::new()
            .with_prompt(label)
            .allow_empty_password(false)
            .interact()
            .map_err(|err| ServiceError::message(format!("password prompt failed: {err}")))?;
        Ok(Credential::new(password))
    }
}

/// Prompt that always declines.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPrompt;

impl PasswordPrompt for NoPrompt {
    fn prompt(&self, _attempt: u32) -> ServiceResult<Credential> {
        Err(ServiceError::PromptDeclined)
    }
}
