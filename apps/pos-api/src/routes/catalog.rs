//! Read-only catalog for the till.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;

use atlas_core::{Category, Product};

use crate::error::{ApiError, ApiResult};
use crate::operator::CurrentOperator;
use crate::response::ApiResponse;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/pos/products", get(products))
        .route("/api/pos/categories", get(categories))
}

/// `?categoryId=3&search=whey`; blank values mean "no filter".
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogQuery {
    #[serde(default, alias = "category_id")]
    pub category_id: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
}

impl CatalogQuery {
    fn category_id(&self) -> ApiResult<Option<i64>> {
        match self.category_id.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| ApiError::validation("categoryId must be a number")),
        }
    }
}

/// GET /api/pos/products
async fn products(
    State(state): State<AppState>,
    _operator: CurrentOperator,
    query: Result<Query<CatalogQuery>, QueryRejection>,
) -> ApiResult<ApiResponse<Vec<Product>>> {
    let Query(query) = query?;
    let category_id = query.category_id()?;

    let products = state
        .db
        .products()
        .catalog(category_id, query.search.as_deref())
        .await?;

    Ok(ApiResponse::ok(products))
}

/// GET /api/pos/categories
async fn categories(State(state): State<AppState>, _operator: CurrentOperator) -> ApiResult<ApiResponse<Vec<Category>>> {
    let categories = state.db.categories().list_active().await?;
    Ok(ApiResponse::ok(categories))
}
