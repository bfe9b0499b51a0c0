//! HTTP routes.
//!
//! - [`health`] - liveness probe
//! - [`orders`] - commit, read and void orders
//! - [`carts`] - hold and recall carts
//! - [`catalog`] - products and categories for the till
//! - [`products`] - product master data
//! - [`categories`] - category master data
//! - [`settings`] - charge rates and other settings

pub mod carts;
pub mod catalog;
pub mod categories;
pub mod health;
pub mod orders;
pub mod products;
pub mod settings;

use axum::Router;

use crate::state::AppState;

/// All routes, state not yet applied.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(orders::router())
        .merge(carts::router())
        .merge(catalog::router())
        .merge(products::router())
        .merge(categories::router())
        .merge(settings::router())
}
