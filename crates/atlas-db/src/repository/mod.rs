//! # Repository Module
//!
//! Database repository implementations for the Atlas POS.
//!
//! ## Two Call Styles
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Pool-bound (one statement, own connection)                            │
//! │       db.products().catalog(None, Some("whey"))                        │
//! │       db.parked_carts().recall(12)                                     │
//! │                                                                         │
//! │  Connection-bound (caller's transaction)              *_in(conn, ..)   │
//! │       ProductRepository::decrement_stock_in(&mut tx, 7, 2)             │
//! │       SequenceRepository::next_in(&mut tx, period)                     │
//! │       OrderRepository::insert_in(&mut tx, &order)                      │
//! │                                                                         │
//! │  The checkout composes the second kind into one BEGIN IMMEDIATE        │
//! │  transaction.                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Catalog, master data, stock
//! - [`CategoryRepository`](category::CategoryRepository) - Product categories
//! - [`OrderRepository`](order::OrderRepository) - Orders and order lines
//! - [`SequenceRepository`](sequence::SequenceRepository) - Order codes
//! - [`ParkedCartRepository`](parked_cart::ParkedCartRepository) - Held carts
//! - [`SettingsRepository`](settings::SettingsRepository) - Charge rates and other settings

pub mod category;
pub mod order;
pub mod parked_cart;
pub mod product;
pub mod sequence;
pub mod settings;
