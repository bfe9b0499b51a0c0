//! Order routes.
//!
//! | Path | Method | Description | Role |
//! |------|--------|-------------|------|
//! | /api/pos/orders | POST | Commit a cart | any |
//! | /api/pos/orders/{id} | GET | Order with its lines | any |
//! | /api/pos/orders/{id}/void | POST | Void and restock | Admin |

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use atlas_core::{Money, OrderReceipt, PaymentMethod};
use atlas_db::{CartLine, CheckoutRequest};

use crate::error::{ApiError, ApiResult};
use crate::operator::CurrentOperator;
use crate::response::ApiResponse;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/pos/orders", post(create))
        .route("/api/pos/orders/{id}", get(get_by_id))
        .route("/api/pos/orders/{id}/void", post(void))
}

/// Tills send camelCase; the older snake_case field names are accepted too.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderBody {
    #[serde(default)]
    pub items: Vec<CreateOrderItem>,
    #[serde(alias = "payment_method")]
    pub payment_method: String,
    #[serde(alias = "payment_amount")]
    pub payment_amount: i64,
    #[serde(default, alias = "discount_amount")]
    pub discount_amount: i64,
    #[serde(default, alias = "payment_proof")]
    pub payment_proof: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderItem {
    #[serde(alias = "product_id")]
    pub product_id: i64,
    #[serde(alias = "qty")]
    pub quantity: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CreateOrderBody {
    fn into_request(self, operator_id: i64) -> ApiResult<CheckoutRequest> {
        let payment_method: PaymentMethod = self.payment_method.parse()?;

        Ok(CheckoutRequest {
            items: self
                .items
                .into_iter()
                .map(|item| CartLine {
                    product_id: item.product_id,
                    quantity: item.quantity,
                    notes: item.notes,
                })
                .collect(),
            payment_method,
            payment_amount: Money::from_minor(self.payment_amount),
            discount_amount: Money::from_minor(self.discount_amount),
            payment_proof: self.payment_proof,
            notes: self.notes,
            operator_id,
        })
    }
}

/// POST /api/pos/orders
async fn create(
    State(state): State<AppState>,
    operator: CurrentOperator,
    body: Result<Json<CreateOrderBody>, JsonRejection>,
) -> ApiResult<ApiResponse<OrderReceipt>> {
    let Json(body) = body?;
    let request = body.into_request(operator.id())?;

    let receipt = state.checkout.commit(request).await?;
    Ok(ApiResponse::ok(receipt).with_message("Transaction completed successfully"))
}

/// GET /api/pos/orders/{id}
async fn get_by_id(
    State(state): State<AppState>,
    _operator: CurrentOperator,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<ApiResponse<OrderReceipt>> {
    let Path(id) = id?;
    let receipt = state
        .db
        .orders()
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order", id))?;

    Ok(ApiResponse::ok(receipt))
}

/// POST /api/pos/orders/{id}/void
async fn void(
    State(state): State<AppState>,
    operator: CurrentOperator,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<ApiResponse<OrderReceipt>> {
    operator.require_admin()?;
    let Path(id) = id?;

    let receipt = state.checkout.void(id).await?;
    tracing::info!(code = %receipt.order.code, operator_id = operator.id(), "Order voided via API");
    Ok(ApiResponse::ok(receipt).with_message("Order voided"))
}
