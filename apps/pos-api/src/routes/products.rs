//! Product master data (Admin).
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /api/master/products | POST | Create a product |
//! | /api/master/products/{id} | PATCH | Update the fields present in the body |
//! | /api/master/products/{id} | DELETE | Delete, or deactivate when sold before |

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::routing::{patch, post};
use axum::{Json, Router};
use serde::Serialize;

use atlas_core::Product;
use atlas_db::{ArchiveOutcome, NewProduct, ProductPatch};

use crate::error::ApiResult;
use crate::operator::CurrentOperator;
use crate::response::ApiResponse;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/master/products", post(create))
        .route("/api/master/products/{id}", patch(update).delete(archive))
}

#[derive(Debug, Serialize)]
pub struct ArchiveResult {
    pub id: i64,
    pub outcome: ArchiveOutcome,
}

/// POST /api/master/products
async fn create(
    State(state): State<AppState>,
    operator: CurrentOperator,
    body: Result<Json<NewProduct>, JsonRejection>,
) -> ApiResult<ApiResponse<Product>> {
    operator.require_admin()?;
    let Json(product) = body?;

    let product = state.db.products().insert(product).await?;
    tracing::info!(id = product.id, name = %product.name, "Product created");
    Ok(ApiResponse::created("Product created", product))
}

/// PATCH /api/master/products/{id}
async fn update(
    State(state): State<AppState>,
    operator: CurrentOperator,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<ProductPatch>, JsonRejection>,
) -> ApiResult<ApiResponse<Product>> {
    operator.require_admin()?;
    let Path(id) = id?;
    let Json(patch) = body?;

    let product = state.db.products().update(id, &patch).await?;
    Ok(ApiResponse::ok(product).with_message("Product updated"))
}

/// DELETE /api/master/products/{id}
async fn archive(
    State(state): State<AppState>,
    operator: CurrentOperator,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<ApiResponse<ArchiveResult>> {
    operator.require_admin()?;
    let Path(id) = id?;

    let outcome = state.db.products().archive(id).await?;
    tracing::info!(id, ?outcome, "Product archived");

    let message = match outcome {
        ArchiveOutcome::Deleted => "Product deleted",
        ArchiveOutcome::Deactivated => "Product is referenced by orders and was deactivated",
    };
    Ok(ApiResponse::ok(ArchiveResult { id, outcome }).with_message(message))
}
