use std::future::Future;
use std::sync::Arc;

use vaultlens_service_api::{
    Credential, DecryptRequest, DecryptService, Decrypted, ServiceCapabilities, ServiceResult,
};

use crate::{Error, Result};

/// High-level façade for issuing decrypt requests.
#[derive(Clone)]
pub struct DecryptClient {
    service: Arc<dyn DecryptService>,
}

impl DecryptClient {
    /// Create a client backed by the provided service.
    #[must_use]
    pub fn new(service: Arc<dyn DecryptService>) -> Self {
        Self { service }
    }

    /// Create a client owning `service`.
    #[must_use]
    pub fn from_service<S>(service: S) -> Self
    where
        S: DecryptService + 'static,
    {
        Self::new(Arc::new(service))
    }

    /// Access the underlying service.
    #[must_use]
    pub fn service(&self) -> Arc<dyn DecryptService> {
        Arc::clone(&self.service)
    }

    /// Capabilities of the underlying service.
    #[must_use]
    pub fn capabilities(&self) -> ServiceCapabilities {
        self.service.capabilities()
    }

    /// Whether regions should be decrypted as soon as they are detected.
    #[must_use]
    pub fn auto_decrypt_enabled(&self) -> bool {
        self.service.auto_decrypt_enabled()
    }

    /// Run `callback` only when auto-decrypt is enabled.
    pub async fn run_if_auto_decrypt<F, Fut, T>(&self, callback: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        if self.auto_decrypt_enabled() {
            Some(callback().await)
        } else {
            None
        }
    }

    /// Decrypt one ciphertext block.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Service`] wrapping the service failure.
    pub async fn decrypt(
        &self,
        ciphertext: &str,
        credential: Option<Credential>,
        prompt_on_fail: bool,
    ) -> Result<Decrypted> {
        let request = DecryptRequest::new(ciphertext, prompt_on_fail).with_credential(credential);
        tracing::debug!(
            service = self.service.id(),
            bytes = ciphertext.len(),
            prompt_on_fail,
            "issuing decrypt request"
        );
        let result = self.service.decrypt(request).await;
        self.invoke(result)
    }

    fn invoke<T>(&self, result: ServiceResult<T>) -> Result<T> {
        result.map_err(|source| Error::Service {
            service: self.service.id().to_string(),
            source,
        })
    }
}

impl std::fmt::Debug for DecryptClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecryptClient")
            .field("service", &self.service.id())
            .field("capabilities", &self.service.capabilities())
            .finish()
    }
}
