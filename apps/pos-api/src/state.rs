//! Shared handler state.

use std::sync::Arc;

use atlas_db::artifacts::DEFAULT_MAX_PROOF_BYTES;
use atlas_db::{Checkout, Database, ProofStore};

use crate::config::request_body_limit;

/// Cloned into every handler; the handles are cheap.
#[derive(Clone, Debug)]
pub struct AppState {
    pub db: Database,
    pub checkout: Checkout,
    /// Largest accepted request body in bytes.
    pub body_limit: usize,
}

impl AppState {
    pub fn new(db: Database, proofs: Arc<dyn ProofStore>) -> Self {
        let checkout = db.checkout(proofs);
        AppState {
            db,
            checkout,
            body_limit: request_body_limit(DEFAULT_MAX_PROOF_BYTES),
        }
    }

    pub fn with_body_limit(mut self, bytes: usize) -> Self {
        self.body_limit = bytes;
        self
    }
}
