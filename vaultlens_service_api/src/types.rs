use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Capabilities advertised by a decryption service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ServiceCapabilities {
    /// Whether the service can ask the user for a password when a request fails.
    pub supports_prompt: bool,
    /// Whether the service allows decrypting without an explicit user action.
    pub supports_auto_decrypt: bool,
}

impl ServiceCapabilities {
    /// Construct a new capabilities struct with explicit flags.
    #[must_use]
    pub const fn new(supports_prompt: bool, supports_auto_decrypt: bool) -> Self {
        Self {
            supports_prompt,
            supports_auto_decrypt,
        }
    }
}

/// A vault password. Wiped from memory on drop and never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(Zeroizing<String>);

impl Credential {
    /// Wrap a password.
    #[must_use]
    pub fn new(password: impl Into<String>) -> Self {
        Self(Zeroizing::new(password.into()))
    }

    /// Borrow the password.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Decrypted bytes returned by a service. Wiped from memory on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct Plaintext(Zeroizing<Vec<u8>>);

impl Plaintext {
    /// Wrap decrypted bytes.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Raw decrypted bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_slice()
    }

    /// Decrypted bytes as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns the UTF-8 error when the plaintext is not text.
    pub fn as_text(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(self.as_bytes())
    }

    /// Number of decrypted bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the plaintext is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Plaintext {
    fn from(text: String) -> Self {
        Self::new(text.into_bytes())
    }
}

impl From<&str> for Plaintext {
    fn from(text: &str) -> Self {
        Self::new(text.as_bytes().to_vec())
    }
}

impl fmt::Debug for Plaintext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Plaintext({} bytes)", self.len())
    }
}

/// A single decrypt request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptRequest {
    /// Hex ciphertext without the vault header or whitespace.
    pub ciphertext: String,
    /// Password to try first, threaded from an earlier request of the same chain.
    pub credential: Option<Credential>,
    /// Whether the service may prompt the user when the request fails.
    pub prompt_on_fail: bool,
}

impl DecryptRequest {
    /// Create a request without a credential.
    #[must_use]
    pub fn new(ciphertext: impl Into<String>, prompt_on_fail: bool) -> Self {
        Self {
            ciphertext: ciphertext.into(),
            credential: None,
            prompt_on_fail,
        }
    }

    /// Attach the credential to try first.
    #[must_use]
    pub fn with_credential(mut self, credential: Option<Credential>) -> Self {
        self.credential = credential;
        self
    }
}

/// Successful decrypt response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decrypted {
    /// Decrypted bytes.
    pub plaintext: Plaintext,
    /// Credential that opened the vault, for reuse by the next request.
    pub credential: Option<Credential>,
}

impl Decrypted {
    /// Construct a response.
    #[must_use]
    pub const fn new(plaintext: Plaintext, credential: Option<Credential>) -> Self {
        Self {
            plaintext,
            credential,
        }
    }
}

/// Errors surfaced by decryption services.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// No password was available and prompting was not permitted.
    #[error("no vault password available")]
    MissingCredential,
    /// The user dismissed the password prompt.
    #[error("password prompt was declined")]
    PromptDeclined,
    /// The backend rejected the ciphertext or the password.
    #[error("decryption rejected: {message}")]
    Rejected {
        /// Backend detail.
        message: String,
    },
    /// The backend did not answer in time.
    #[error("decryption timed out after {seconds}s")]
    Timeout {
        /// Configured timeout.
        seconds: u64,
    },
    /// The service cannot decrypt at all.
    #[error("decryption service unavailable: {message}")]
    Unavailable {
        /// Reason the service is unavailable.
        message: String,
    },
    /// Generic failure surfaced by the service.
    #[error("{message}")]
    Failure {
        /// Human-readable error message.
        message: String,
    },
}

impl ServiceError {
    /// Helper to construct a failure from any displayable message.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
        }
    }

    /// Helper to construct a rejection from any displayable message.
    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}

/// Convenience result alias for service operations.
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
