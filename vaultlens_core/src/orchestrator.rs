//! Decrypt-and-render orchestration.
//!
//! The orchestrator owns the regions detected in one document. Requests to
//! the decryption service are issued one at a time: every operation borrows
//! the orchestrator mutably and awaits each request before issuing the next,
//! so a prompt raised by the first request is answered before the second is
//! sent, and the credential it yields is offered to the rest of the batch.

use vaultlens_api::{Boundary, Container, EncryptedPayload, RegionKind, RegionState, RenderedLine};
use vaultlens_service_api::{Credential, Decrypted, Plaintext};

use crate::detect;
use crate::diff::{reconstruct, InputError};
use crate::document::Document;
use crate::region::{extent_of, Region};
use crate::render;
use crate::service::DecryptClient;
use crate::{Error, Result};

/// Badge shown in the page header of a whole-file vault.
pub const ENCRYPTED_BADGE: &str = "Encrypted Ansible Vault";

/// How a decrypt operation was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecryptMode {
    /// Triggered by detection; the service must not prompt.
    #[default]
    Auto,
    /// Triggered by the user; the service may prompt on failure.
    Interactive,
}

impl DecryptMode {
    /// Whether requests issued in this mode may prompt.
    #[must_use]
    pub const fn prompt_on_fail(self) -> bool {
        matches!(self, Self::Interactive)
    }
}

/// What a batch does after a region fails to decrypt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChainPolicy {
    /// Keep going with the next region.
    #[default]
    Continue,
    /// Stop issuing requests for the rest of the batch.
    Halt,
}

/// Result of decrypting one region.
#[derive(Debug)]
pub enum DecryptOutcome {
    /// The region now shows its decrypted rendering.
    Decrypted,
    /// The region was already decrypted; nothing was requested.
    AlreadyDecrypted,
    /// The service failed; the region still shows its original rendering.
    Failed(Error),
}

impl DecryptOutcome {
    /// Whether the region shows decrypted content after the operation.
    #[must_use]
    pub const fn is_decrypted(&self) -> bool {
        matches!(self, Self::Decrypted | Self::AlreadyDecrypted)
    }
}

/// Outcome of one region within a batch.
#[derive(Debug)]
pub struct RegionResult {
    /// Region id.
    pub id: String,
    /// Outcome, or the error that aborted the region.
    pub outcome: Result<DecryptOutcome>,
}

impl RegionResult {
    fn failed(&self) -> bool {
        !matches!(&self.outcome, Ok(outcome) if outcome.is_decrypted())
    }
}

/// Per-region outcomes of a batch, in issue order.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Outcomes in the order requests were issued.
    pub results: Vec<RegionResult>,
    /// Whether the batch stopped early under [`ChainPolicy::Halt`].
    pub halted: bool,
}

impl BatchReport {
    /// Ids of the regions that show decrypted content.
    #[must_use]
    pub fn decrypted(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|result| !result.failed())
            .map(|result| result.id.as_str())
            .collect()
    }

    /// Results of the regions left encrypted.
    pub fn failures(&self) -> impl Iterator<Item = &RegionResult> {
        self.results.iter().filter(|result| result.failed())
    }
}

/// Result of [`Orchestrator::rescan`].
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Ids of the newly detected regions.
    pub detected: Vec<String>,
    /// Auto-decrypt batch, when auto-decrypt is enabled and anything was found.
    pub auto_decrypt: Option<BatchReport>,
}

/// Drives detection, decryption and revert for one document.
#[derive(Debug)]
pub struct Orchestrator {
    client: DecryptClient,
    regions: Vec<Region>,
    policy: ChainPolicy,
}

impl Orchestrator {
    /// Create an orchestrator issuing requests through `client`.
    #[must_use]
    pub fn new(client: DecryptClient) -> Self {
        Self {
            client,
            regions: Vec::new(),
            policy: ChainPolicy::Continue,
        }
    }

    /// Use `policy` for batches.
    #[must_use]
    pub fn with_policy(mut self, policy: ChainPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Decrypt client in use.
    #[must_use]
    pub const fn client(&self) -> &DecryptClient {
        &self.client
    }

    /// Regions in detection order.
    #[must_use]
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Region by id.
    #[must_use]
    pub fn region(&self, id: &str) -> Option<&Region> {
        self.regions.iter().find(|region| region.id() == id)
    }

    /// Detect undecorated regions, attach controls and start tracking them.
    ///
    /// Regions whose controls vanished from the document (the host
    /// re-rendered) are forgotten first. A new region overlapping one tracked
    /// by an earlier scan is ignored; regions found in the same pass never
    /// shadow each other. Returns the ids of the new regions.
    pub fn detect(&mut self, document: &mut Document) -> Vec<String> {
        self.regions.retain(|region| {
            let kept = document.has_controls(region.id());
            if !kept {
                tracing::debug!(id = region.id(), "forgetting region after re-render");
            }
            kept
        });

        let tracked = self.regions.len();
        let mut detected = Vec::new();
        for region in detect::detect(document) {
            if Self::overlaps(&self.regions[..tracked], &region) {
                tracing::debug!(id = region.id(), "ignoring region inside a tracked region");
                continue;
            }
            document.install_controls(region.id());
            if region.kind() == RegionKind::Blob {
                document.add_badge(ENCRYPTED_BADGE);
            }
            tracing::info!(id = region.id(), kind = %region.kind(), "detected encrypted region");
            detected.push(region.id().to_owned());
            self.regions.push(region);
        }
        detected
    }

    fn overlaps(tracked: &[Region], candidate: &Region) -> bool {
        let span = candidate.original().span();
        tracked.iter().any(|region| {
            let extent = region.extent();
            region.container() == candidate.container()
                && span.start < extent.end
                && extent.start < span.end
        })
    }

    /// Detect new regions and, when auto-decrypt is enabled, decrypt them in
    /// detection order without prompting.
    pub async fn rescan(&mut self, document: &mut Document) -> ScanReport {
        let detected = self.detect(document);
        let auto_decrypt = if detected.is_empty() {
            None
        } else {
            let client = self.client.clone();
            client
                .run_if_auto_decrypt(|| {
                    let (orchestrator, document) = (self, document);
                    orchestrator.decrypt_ids(document, &detected, DecryptMode::Auto)
                })
                .await
        };
        ScanReport {
            detected,
            auto_decrypt,
        }
    }

    /// Decrypt region `id` and show its decrypted rendering.
    ///
    /// A service failure is reported as [`DecryptOutcome::Failed`] and leaves
    /// the document untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownRegion`] for an unknown id, [`Error::Input`]
    /// when the plaintext is not text, and [`Error::Document`] when the
    /// region's lines are no longer in the document.
    pub async fn decrypt(
        &mut self,
        document: &mut Document,
        id: &str,
        mode: DecryptMode,
    ) -> Result<DecryptOutcome> {
        let (outcome, _) = self.decrypt_with(document, id, mode, None).await?;
        Ok(outcome)
    }

    /// Decrypt every tracked region in detection order.
    pub async fn decrypt_all(&mut self, document: &mut Document, mode: DecryptMode) -> BatchReport {
        let ids: Vec<String> = self
            .regions
            .iter()
            .map(|region| region.id().to_owned())
            .collect();
        self.decrypt_ids(document, &ids, mode).await
    }

    async fn decrypt_ids(
        &mut self,
        document: &mut Document,
        ids: &[String],
        mode: DecryptMode,
    ) -> BatchReport {
        let mut report = BatchReport::default();
        let mut credential = None;
        for id in ids {
            let outcome = match self.decrypt_with(document, id, mode, credential.clone()).await {
                Ok((outcome, used)) => {
                    if used.is_some() {
                        credential = used;
                    }
                    Ok(outcome)
                }
                Err(err) => Err(err),
            };
            let result = RegionResult {
                id: id.clone(),
                outcome,
            };
            let failed = result.failed();
            if failed {
                tracing::warn!(id = %id, "region left encrypted");
            }
            report.results.push(result);
            if failed && self.policy == ChainPolicy::Halt {
                report.halted = true;
                break;
            }
        }
        report
    }

    fn index(&self, id: &str) -> Result<usize> {
        self.regions
            .iter()
            .position(|region| region.id() == id)
            .ok_or_else(|| Error::UnknownRegion { id: id.to_owned() })
    }

    async fn decrypt_with(
        &mut self,
        document: &mut Document,
        id: &str,
        mode: DecryptMode,
        credential: Option<Credential>,
    ) -> Result<(DecryptOutcome, Option<Credential>)> {
        let index = self.index(id)?;
        let region = &self.regions[index];
        if region.state() == RegionState::Decrypted {
            return Ok((DecryptOutcome::AlreadyDecrypted, credential));
        }

        let container = region.container().clone();
        let extent = region.extent();
        let file_id = region.file_id().unwrap_or_default().to_owned();
        let marker = region.original().lines().first().cloned();
        let payload = region.payload().clone();
        let prompt = mode.prompt_on_fail();

        let (replacement, credential) = match payload {
            EncryptedPayload::Blob { ciphertext } => {
                let decrypted = match self.client.decrypt(&ciphertext, credential, prompt).await {
                    Ok(decrypted) => decrypted,
                    Err(err) => return Ok((DecryptOutcome::Failed(err), None)),
                };
                let text = plaintext_text("blob", &decrypted.plaintext)?;
                (render::blob_lines(text), decrypted.credential)
            }
            EncryptedPayload::Diff { removed, added } => {
                let removed = match self.decrypt_half(&removed, credential, prompt).await {
                    Ok(decrypted) => decrypted,
                    Err(err) => return Ok((DecryptOutcome::Failed(err), None)),
                };
                let added = match self
                    .decrypt_half(&added, removed.credential.clone(), prompt)
                    .await
                {
                    Ok(decrypted) => decrypted,
                    Err(err) => return Ok((DecryptOutcome::Failed(err), None)),
                };
                let anchor = match &container {
                    Container::File { anchor } => anchor.as_str(),
                    Container::Body => id,
                };
                let rows = reconstruct(
                    &file_id,
                    anchor,
                    removed.plaintext.as_bytes(),
                    added.plaintext.as_bytes(),
                )?;
                (render::diff_lines(&rows), added.credential)
            }
            EncryptedPayload::Yaml { ciphertext } => {
                let decrypted = match self.client.decrypt(&ciphertext, credential, prompt).await {
                    Ok(decrypted) => decrypted,
                    Err(err) => return Ok((DecryptOutcome::Failed(err), None)),
                };
                let text = plaintext_text("yaml", &decrypted.plaintext)?;
                let lines = marker
                    .map(|marker| vec![render::yaml_marker_line(&marker, text)])
                    .unwrap_or_default();
                (lines, decrypted.credential)
            }
        };

        self.show(document, index, &container, extent, replacement)?;
        tracing::info!(id, "region decrypted");
        Ok((DecryptOutcome::Decrypted, credential))
    }

    /// Decrypt one side of a diff. An empty side decrypts to empty text
    /// without a request and keeps the credential.
    async fn decrypt_half(
        &self,
        ciphertext: &str,
        credential: Option<Credential>,
        prompt: bool,
    ) -> Result<Decrypted> {
        if ciphertext.is_empty() {
            return Ok(Decrypted::new(Plaintext::new(Vec::new()), credential));
        }
        let decrypted = self.client.decrypt(ciphertext, credential.clone(), prompt).await?;
        Ok(Decrypted {
            credential: decrypted.credential.clone().or(credential),
            ..decrypted
        })
    }

    fn show(
        &mut self,
        document: &mut Document,
        index: usize,
        container: &Container,
        extent: Boundary,
        replacement: Vec<RenderedLine>,
    ) -> Result<()> {
        let shown = extent_of(&replacement);
        document.splice(container, extent, replacement)?;
        let region = &mut self.regions[index];
        region.mark_decrypted(shown);
        document.show_decrypted(region.id());
        Ok(())
    }

    /// Restore the original rendering of region `id`.
    ///
    /// Reverting an encrypted region does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownRegion`] for an unknown id and
    /// [`Error::Document`] when the decrypted lines are no longer present.
    pub fn revert(&mut self, document: &mut Document, id: &str) -> Result<()> {
        let index = self.index(id)?;
        let region = &mut self.regions[index];
        if region.state() == RegionState::Encrypted {
            return Ok(());
        }

        document.splice(
            region.container(),
            region.extent(),
            region.original().lines().to_vec(),
        )?;
        region.mark_encrypted();
        document.show_encrypted(region.id());
        tracing::info!(id, "region reverted");
        Ok(())
    }

    /// Revert every decrypted region.
    ///
    /// # Errors
    ///
    /// Stops at the first region that cannot be restored.
    pub fn revert_all(&mut self, document: &mut Document) -> Result<()> {
        let ids: Vec<String> = self
            .regions
            .iter()
            .filter(|region| region.state() == RegionState::Decrypted)
            .map(|region| region.id().to_owned())
            .collect();
        for id in ids {
            self.revert(document, &id)?;
        }
        Ok(())
    }
}

fn plaintext_text<'a>(side: &'static str, plaintext: &'a Plaintext) -> Result<&'a str> {
    plaintext
        .as_text()
        .map_err(|source| Error::from(InputError::NotText { side, source }))
}
