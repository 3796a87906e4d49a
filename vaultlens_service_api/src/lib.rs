mod types;

use async_trait::async_trait;

pub use types::{
    Credential, DecryptRequest, Decrypted, Plaintext, ServiceCapabilities, ServiceError,
    ServiceResult,
};

/// Trait implemented by vault decryption backends.
///
/// Requests are issued one at a time; implementations resolve with plaintext
/// on success. On failure they prompt for a password only when the request
/// allows it, and any retry is theirs to perform.
#[async_trait]
pub trait DecryptService: Send + Sync {
    /// Stable identifier used for lookup and logging.
    fn id(&self) -> &'static str;

    /// Human-friendly label for UI surfaces.
    fn label(&self) -> &'static str;

    /// Capabilities advertised by the service.
    fn capabilities(&self) -> ServiceCapabilities;

    /// Whether regions may be decrypted as soon as they are detected.
    fn auto_decrypt_enabled(&self) -> bool {
        self.capabilities().supports_auto_decrypt
    }

    /// Decrypt one ciphertext block.
    ///
    /// # Errors
    ///
    /// Returns service-defined errors when the ciphertext cannot be decrypted.
    async fn decrypt(&self, request: DecryptRequest) -> ServiceResult<Decrypted>;
}
