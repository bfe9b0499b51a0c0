//! Held cart routes.
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /api/pos/held-carts | GET | List parked carts, newest first |
//! | /api/pos/held-carts | POST | Park a cart under a label |
//! | /api/pos/held-carts/{id}/recall | POST | Fetch and delete a parked cart |

use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, PathRejection};
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use serde_json::value::RawValue;

use atlas_core::{ParkedCart, ParkedCartSummary};

use crate::error::{ApiError, ApiResult};
use crate::operator::CurrentOperator;
use crate::response::ApiResponse;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/pos/held-carts", get(list).post(hold))
        .route("/api/pos/held-carts/{id}/recall", post(recall))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldCartBody {
    #[serde(alias = "hold_name")]
    pub label: String,
    #[serde(alias = "transaction_data")]
    pub payload: Box<RawValue>,
}

/// GET /api/pos/held-carts
async fn list(State(state): State<AppState>, _operator: CurrentOperator) -> ApiResult<ApiResponse<Vec<ParkedCartSummary>>> {
    let carts = state.db.parked_carts().list().await?;
    Ok(ApiResponse::ok(carts))
}

/// POST /api/pos/held-carts
///
/// The body is parsed with `serde_json` directly so the payload keeps its
/// original bytes.
async fn hold(
    State(state): State<AppState>,
    operator: CurrentOperator,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<ApiResponse<ParkedCartSummary>> {
    let body: HoldCartBody =
        serde_json::from_slice(&body?).map_err(|e| ApiError::validation(format!("Invalid request body: {e}")))?;

    let held = state
        .db
        .parked_carts()
        .hold(&body.label, &body.payload, operator.id())
        .await?;

    Ok(ApiResponse::created("Transaction held successfully", held))
}

/// POST /api/pos/held-carts/{id}/recall
async fn recall(
    State(state): State<AppState>,
    _operator: CurrentOperator,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<ApiResponse<ParkedCart>> {
    let Path(id) = id?;
    let cart = state.db.parked_carts().recall(id).await?;
    Ok(ApiResponse::ok(cart).with_message("Transaction recalled successfully"))
}
