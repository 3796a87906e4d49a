use std::env;
use std::ffi::OsString;
use std::fs;
use std::io::{self, Read, Write};
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::thread;

use async_trait::async_trait;
use tempfile::NamedTempFile;
use vaultlens_service_api::{
    Credential, DecryptRequest, DecryptService, Decrypted, Plaintext, ServiceCapabilities,
    ServiceError, ServiceResult,
};
use wait_timeout::ChildExt;

use crate::config::ServiceConfig;
use crate::envelope::armor;
use crate::prompt::{PasswordPrompt, TerminalPrompt};

const PASSTHROUGH_PREFIXES: [&str; 2] = ["ANSIBLE_", "VAULTLENS_"];

#[derive(Debug, Clone)]
struct VaultCli {
    config: ServiceConfig,
    path: Option<OsString>,
    home: Option<OsString>,
    passthrough: Vec<(OsString, OsString)>,
}

impl VaultCli {
    fn new(config: ServiceConfig) -> Self {
        let passthrough = env::vars_os()
            .filter(|(key, _)| {
                let key = key.to_string_lossy();
                PASSTHROUGH_PREFIXES
                    .iter()
                    .any(|prefix| key.starts_with(prefix))
            })
            .collect();
        Self {
            config,
            path: env::var_os("PATH"),
            home: env::var_os("HOME"),
            passthrough,
        }
    }

    fn configured_password(&self) -> ServiceResult<Option<Credential>> {
        let Some(path) = &self.config.password_file else {
            return Ok(None);
        };
        let contents = fs::read_to_string(path).map_err(|err| ServiceError::Unavailable {
            message: format!("failed to read password file {}: {err}", path.display()),
        })?;
        Ok(Some(Credential::new(
            contents.trim_end_matches(['\r', '\n']),
        )))
    }

    fn decrypt(&self, envelope: &str, credential: &Credential) -> ServiceResult<Vec<u8>> {
        let mut password_file = NamedTempFile::new().map_err(|err| ServiceError::Unavailable {
            message: format!("failed to create password file: {err}"),
        })?;
        password_file
            .write_all(credential.expose().as_bytes())
            .and_then(|()| password_file.flush())
            .map_err(|err| ServiceError::Unavailable {
                message: format!("failed to write password file: {err}"),
            })?;

        let mut command = Command::new(&self.config.binary);
        command
            .arg("decrypt")
            .arg("--vault-password-file")
            .arg(password_file.path())
            .args(["--output", "-", "-"]);
        command.stdin(Stdio::piped());
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());
        self.configure_environment(&mut command);

        tracing::debug!(binary = %self.config.binary.to_string_lossy(), "running ansible-vault decrypt");
        let mut child = command.spawn().map_err(|err| ServiceError::Unavailable {
            message: format!("failed to spawn ansible-vault: {err}"),
        })?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(err) = stdin.write_all(envelope.as_bytes()) {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ServiceError::message(format!(
                    "failed to write to ansible-vault stdin: {err}"
                )));
            }
        }

        let stdout_handle = child.stdout.take().map(|mut stdout| {
            thread::spawn(move || -> io::Result<Vec<u8>> {
                let mut buffer = Vec::new();
                stdout.read_to_end(&mut buffer)?;
                Ok(buffer)
            })
        });

        let stderr_handle = child.stderr.take().map(|mut stderr| {
            thread::spawn(move || -> io::Result<Vec<u8>> {
                let mut buffer = Vec::new();
                stderr.read_to_end(&mut buffer)?;
                Ok(buffer)
            })
        });

        match child.wait_timeout(self.config.timeout) {
            Ok(Some(_)) => (),
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ServiceError::Timeout {
                    seconds: self.config.timeout.as_secs(),
                });
            }
            Err(err) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ServiceError::message(format!(
                    "failed waiting on ansible-vault: {err}"
                )));
            }
        }

        let status = child
            .wait()
            .map_err(|err| ServiceError::message(format!("failed to reap ansible-vault: {err}")))?;

        let stdout = join_reader(stdout_handle, "stdout")?;
        let stderr = join_reader(stderr_handle, "stderr")?;

        if !status.success() {
            let code = status
                .code()
                .map_or_else(|| "terminated".to_string(), |c| c.to_string());
            return Err(ServiceError::rejected(format!(
                "ansible-vault exited with status {}: {}",
                code,
                String::from_utf8_lossy(&stderr).trim()
            )));
        }

        Ok(stdout)
    }

    fn configure_environment(&self, command: &mut Command) {
        command.env_clear();
        if let Some(path) = &self.path {
            command.env("PATH", path);
        }
        if let Some(home) = &self.home {
            command.env("HOME", home);
        }
        for (key, value) in &self.passthrough {
            command.env(key, value);
        }
    }
}

fn join_reader(
    handle: Option<thread::JoinHandle<io::Result<Vec<u8>>>>,
    stream: &str,
) -> ServiceResult<Vec<u8>> {
    match handle {
        Some(handle) => handle
            .join()
            .map_err(|_| {
                ServiceError::message(format!("failed to join ansible-vault {stream} reader"))
            })?
            .map_err(|err| {
                ServiceError::message(format!("failed to read ansible-vault {stream}: {err}"))
            }),
        None => Ok(Vec::new()),
    }
}

/// Try the initial credential, then prompt (when allowed) until a password
/// opens the vault or the prompt budget runs out.
fn decrypt_with<F>(
    initial: Option<Credential>,
    prompt_on_fail: bool,
    prompt: &dyn PasswordPrompt,
    max_prompts: u32,
    mut run: F,
) -> ServiceResult<Decrypted>
where
    F: FnMut(&Credential) -> ServiceResult<Vec<u8>>,
{
    let mut candidate = initial;
    let mut prompts = 0;
    let mut last_error = None;

    loop {
        let credential = match candidate.take() {
            Some(credential) => credential,
            None if prompt_on_fail && prompts < max_prompts => {
                let credential = prompt.prompt(prompts)?;
                prompts += 1;
                credential
            }
            None => return Err(last_error.unwrap_or(ServiceError::MissingCredential)),
        };

        match run(&credential) {
            Ok(bytes) => return Ok(Decrypted::new(Plaintext::new(bytes), Some(credential))),
            Err(err @ ServiceError::Rejected { .. }) if prompt_on_fail => {
                tracing::warn!(error = %err, "vault password rejected");
                last_error = Some(err);
            }
            Err(err) => return Err(err),
        }
    }
}

/// Decryption service backed by the local `ansible-vault` CLI.
#[derive(Clone)]
pub struct AnsibleVaultCli {
    cli: VaultCli,
    prompt: Arc<dyn PasswordPrompt>,
}

impl AnsibleVaultCli {
    /// Construct a service configured from the environment.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ServiceConfig::from_env())
    }

    /// Construct a service from explicit settings, prompting on the terminal.
    #[must_use]
    pub fn with_config(config: ServiceConfig) -> Self {
        Self {
            cli: VaultCli::new(config),
            prompt: Arc::new(TerminalPrompt),
        }
    }

    /// Replace the password prompt.
    #[must_use]
    pub fn with_prompt<P>(mut self, prompt: P) -> Self
    where
        P: PasswordPrompt + 'static,
    {
        self.prompt = Arc::new(prompt);
        self
    }

    /// Active settings.
    #[must_use]
    pub const fn config(&self) -> &ServiceConfig {
        &self.cli.config
    }

    fn decrypt_blocking(&self, request: &DecryptRequest) -> ServiceResult<Decrypted> {
        let initial = match request.credential.clone() {
            Some(credential) => Some(credential),
            None => self.cli.configured_password()?,
        };
        let envelope = armor(&request.ciphertext);
        decrypt_with(
            initial,
            request.prompt_on_fail,
            self.prompt.as_ref(),
            self.cli.config.max_prompts,
            |credential| self.cli.decrypt(&envelope, credential),
        )
    }
}

impl Default for AnsibleVaultCli {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AnsibleVaultCli {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnsibleVaultCli")
            .field("config", &self.cli.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DecryptService for AnsibleVaultCli {
    fn id(&self) -> &'static str {
        "ansible-vault"
    }

    fn label(&self) -> &'static str {
        "Ansible Vault CLI"
    }

    fn capabilities(&self) -> ServiceCapabilities {
        ServiceCapabilities::new(true, self.cli.config.auto_decrypt)
    }

    async fn decrypt(&self, request: DecryptRequest) -> ServiceResult<Decrypted> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.decrypt_blocking(&request))
            .await
            .map_err(|err| ServiceError::message(format!("decrypt task failed: {err}")))?
    }
}
