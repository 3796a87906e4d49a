use async_trait::async_trait;
use vaultlens_service_api::{
    DecryptRequest, DecryptService, Decrypted, ServiceCapabilities, ServiceError, ServiceResult,
};

/// Builtin service used when no decryption backend is available.
#[derive(Debug, Clone)]
pub struct DisabledService {
    reason: String,
}

impl DisabledService {
    /// Create a disabled service that reports `reason` on every request.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Default for DisabledService {
    fn default() -> Self {
        Self::new("no decryption backend configured")
    }
}

#[async_trait]
impl DecryptService for DisabledService {
    fn id(&self) -> &'static str {
        "disabled"
    }

    fn label(&self) -> &'static str {
        "Decryption disabled"
    }

    fn capabilities(&self) -> ServiceCapabilities {
        ServiceCapabilities::new(false, false)
    }

    async fn decrypt(&self, _request: DecryptRequest) -> ServiceResult<Decrypted> {
        Err(ServiceError::Unavailable {
            message: self.reason.clone(),
        })
    }
}
