//! Category master data (Admin).

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::routing::{delete, post};
use axum::{Json, Router};
use serde::Deserialize;

use atlas_core::Category;
use atlas_db::ArchiveOutcome;

use crate::error::ApiResult;
use crate::operator::CurrentOperator;
use crate::response::ApiResponse;
use crate::routes::products::ArchiveResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/master/categories", post(create))
        .route("/api/master/categories/{id}", delete(archive))
}

#[derive(Debug, Deserialize)]
pub struct NewCategoryBody {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// POST /api/master/categories
async fn create(
    State(state): State<AppState>,
    operator: CurrentOperator,
    body: Result<Json<NewCategoryBody>, JsonRejection>,
) -> ApiResult<ApiResponse<Category>> {
    operator.require_admin()?;
    let Json(body) = body?;

    let category = state
        .db
        .categories()
        .insert(&body.name, body.description.as_deref())
        .await?;
    Ok(ApiResponse::created("Category created", category))
}

/// DELETE /api/master/categories/{id}
async fn archive(
    State(state): State<AppState>,
    operator: CurrentOperator,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<ApiResponse<ArchiveResult>> {
    operator.require_admin()?;
    let Path(id) = id?;

    let outcome = state.db.categories().archive(id).await?;
    let message = match outcome {
        ArchiveOutcome::Deleted => "Category deleted",
        ArchiveOutcome::Deactivated => "Category still has products and was deactivated",
    };
    Ok(ApiResponse::ok(ArchiveResult { id, outcome }).with_message(message))
}
