//! # Payment Proof Store
//!
//! Writes decoded payment proof images to disk and hands back the
//! reference stored on the order.
//!
//! ```text
//! raw proof ── ProofPayload::parse ──┬── Reference(r) ──────────────────► r
//!                                    │
//!                                    └── Image { ext, bytes }
//!                                            │  spawn_blocking
//!                                            ▼
//!                                  ProofStore::store
//!                                  {dir}/proof_<uuid>.<ext>
//!                                            │
//!                                            ▼
//!                                  "{url_prefix}/proof_<uuid>.<ext>"
//! ```
//!
//! File writes are not part of the database transaction. A commit that
//! rolls back after the write leaves the file behind.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use atlas_core::proof::{ProofImage, ProofPayload};
use atlas_core::ProofError;

/// Decoded images larger than this are refused by default (5 MiB).
pub const DEFAULT_MAX_PROOF_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("invalid payment proof: {0}")]
    Proof(#[from] ProofError),

    #[error("payment proof is {size} bytes, limit is {max}")]
    TooLarge { size: usize, max: usize },

    #[error("could not write payment proof: {0}")]
    Io(#[from] io::Error),

    #[error("payment proof writer failed: {0}")]
    Join(String),
}

/// Somewhere decoded proof images can be kept.
///
/// `store` is blocking; [`materialize`] runs it off the async runtime.
pub trait ProofStore: Send + Sync {
    /// Persists the image and returns its reference.
    fn store(&self, image: &ProofImage) -> Result<String, ArtifactError>;
}

/// Stores proofs as files in one directory.
#[derive(Debug, Clone)]
pub struct FsProofStore {
    dir: PathBuf,
    url_prefix: String,
    max_bytes: usize,
}

impl FsProofStore {
    /// `url_prefix` is what references start with, e.g.
    /// `uploads/payment_proofs`.
    pub fn new(dir: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        FsProofStore {
            dir: dir.into(),
            url_prefix: url_prefix.into().trim_end_matches('/').to_string(),
            max_bytes: DEFAULT_MAX_PROOF_BYTES,
        }
    }

    pub fn max_bytes(mut self, max: usize) -> Self {
        self.max_bytes = max;
        self
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }
}

impl ProofStore for FsProofStore {
    fn store(&self, image: &ProofImage) -> Result<String, ArtifactError> {
        if image.bytes.len() > self.max_bytes {
            return Err(ArtifactError::TooLarge {
                size: image.bytes.len(),
                max: self.max_bytes,
            });
        }

        fs::create_dir_all(&self.dir)?;

        let filename = format!("proof_{}.{}", Uuid::new_v4().simple(), image.extension.as_str());
        fs::write(self.dir.join(&filename), &image.bytes)?;

        debug!(file = %filename, bytes = image.bytes.len(), "Stored payment proof");

        if self.url_prefix.is_empty() {
            Ok(filename)
        } else {
            Ok(format!("{}/{}", self.url_prefix, filename))
        }
    }
}

/// Turns a raw proof value into a stored reference.
///
/// ## Returns
/// * `Ok(None)` - blank input
/// * `Ok(Some(reference))` - pass-through reference, or the stored image's reference
/// * `Err(ArtifactError)` - malformed payload, too large, or the write failed
pub async fn materialize(store: Arc<dyn ProofStore>, raw: &str) -> Result<Option<String>, ArtifactError> {
    match ProofPayload::parse(raw)? {
        None => Ok(None),
        Some(ProofPayload::Reference(reference)) => Ok(Some(reference)),
        Some(ProofPayload::Image(image)) => {
            let reference = tokio::task::spawn_blocking(move || store.store(&image))
                .await
                .map_err(|e| ArtifactError::Join(e.to_string()))??;
            Ok(Some(reference))
        }
    }
}
