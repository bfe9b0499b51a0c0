//! # atlas-db: Database Layer for the Atlas POS
//!
//! SQLite storage for the order settlement engine: connection pool,
//! embedded migrations, repositories, the checkout transaction and the
//! payment proof file store.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Atlas POS Data Flow                              │
//! │                                                                         │
//! │  HTTP handler (POST /api/pos/orders)                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     atlas-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Checkout    │    │  Repositories │    │  Artifacts   │  │   │
//! │  │   │ (checkout.rs) │───►│ product/order │    │ FsProofStore │  │   │
//! │  │   │ BEGIN         │    │ sequence/...  │    │ proof_*.png  │  │   │
//! │  │   │ IMMEDIATE     │───────────────────────────►             │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │           │                    │                               │   │
//! │  │           ▼                    ▼                               │   │
//! │  │   ┌─────────────────────────────────────┐  ┌──────────────┐  │   │
//! │  │   │        Database (pool.rs)           │  │  Migrations  │  │   │
//! │  │   │        SqlitePool, WAL              │  │  (embedded)  │  │   │
//! │  │   └─────────────────────────────────────┘  └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ./data/atlas.db                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//! - [`checkout`] - Order commit coordinator and inventory guard
//! - [`artifacts`] - Payment proof storage
//! - [`update`] - Partial-update statement builder
//! - [`archive`] - Delete-or-deactivate policy for master data
//!
//! ## Usage
//!
//! ```rust,ignore
//! use atlas_db::{CartLine, CheckoutRequest, Database, DbConfig, FsProofStore};
//!
//! let db = Database::new(DbConfig::new("./data/atlas.db")).await?;
//! let checkout = db.checkout(Arc::new(FsProofStore::new("./uploads/payment_proofs", "uploads/payment_proofs")));
//!
//! let receipt = checkout.commit(request).await?;
//! println!("{}", receipt.order.code);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod archive;
pub mod artifacts;
pub mod checkout;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod update;

// =============================================================================
// Re-exports
// =============================================================================

pub use archive::ArchiveOutcome;
pub use artifacts::{ArtifactError, FsProofStore, ProofStore};
pub use checkout::{CartLine, Checkout, CheckoutError, CheckoutRequest, InventoryGuard};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::category::CategoryRepository;
pub use repository::order::OrderRepository;
pub use repository::parked_cart::ParkedCartRepository;
pub use repository::product::{CatalogError, NewProduct, ProductPatch, ProductRepository};
pub use repository::sequence::SequenceRepository;
pub use repository::settings::SettingsRepository;
