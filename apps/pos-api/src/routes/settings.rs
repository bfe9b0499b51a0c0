//! Settings routes.
//!
//! ```json
//! GET /api/master/settings
//! { "success": true, "data": {
//!     "service_charge_percent": { "value": "5", "description": "..." },
//!     "tax_percent": { "value": "10", "description": "..." } } }
//!
//! PUT /api/master/settings   (Admin)
//! { "settings": { "tax_percent": 11, "service_charge_percent": "5.5" } }
//! ```

use std::collections::BTreeMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use atlas_core::Setting;

use crate::error::{ApiError, ApiResult};
use crate::operator::CurrentOperator;
use crate::response::ApiResponse;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/master/settings", get(list).put(update))
}

#[derive(Debug, Serialize)]
pub struct SettingEntry {
    pub value: String,
    pub description: Option<String>,
}

type SettingsMap = BTreeMap<String, SettingEntry>;

fn to_map(settings: Vec<Setting>) -> SettingsMap {
    settings
        .into_iter()
        .map(|s| {
            (
                s.setting_key,
                SettingEntry {
                    value: s.setting_value,
                    description: s.description,
                },
            )
        })
        .collect()
}

#[derive(Debug, Deserialize)]
pub struct UpdateSettingsBody {
    pub settings: BTreeMap<String, Value>,
}

impl UpdateSettingsBody {
    /// Numbers are stored as their JSON text.
    fn entries(self) -> ApiResult<Vec<(String, String)>> {
        if self.settings.is_empty() {
            return Err(ApiError::validation("settings is required"));
        }

        self.settings
            .into_iter()
            .map(|(key, value)| match value {
                Value::String(s) => Ok((key, s)),
                Value::Number(n) => Ok((key, n.to_string())),
                _ => Err(ApiError::validation(format!("{key} must be a string or number"))),
            })
            .collect()
    }
}

/// GET /api/master/settings
async fn list(State(state): State<AppState>, _operator: CurrentOperator) -> ApiResult<ApiResponse<SettingsMap>> {
    let settings = state.db.settings().list().await?;
    Ok(ApiResponse::ok(to_map(settings)))
}

/// PUT /api/master/settings
async fn update(
    State(state): State<AppState>,
    operator: CurrentOperator,
    body: Result<Json<UpdateSettingsBody>, JsonRejection>,
) -> ApiResult<ApiResponse<SettingsMap>> {
    operator.require_admin()?;
    let Json(body) = body?;
    let entries = body.entries()?;

    let settings = state.db.settings().upsert_many(&entries).await?;
    tracing::info!(count = entries.len(), operator_id = operator.id(), "Settings updated");
    Ok(ApiResponse::ok(to_map(settings)).with_message("Settings updated successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_accept_strings_and_numbers() {
        let body: UpdateSettingsBody =
            serde_json::from_str(r#"{"settings":{"tax_percent":11,"service_charge_percent":"5.5"}}"#).unwrap();
        let entries = body.entries().unwrap();
        assert_eq!(
            entries,
            vec![
                ("service_charge_percent".to_string(), "5.5".to_string()),
                ("tax_percent".to_string(), "11".to_string()),
            ]
        );

        let body: UpdateSettingsBody = serde_json::from_str(r#"{"settings":{"tax_percent":true}}"#).unwrap();
        assert!(body.entries().is_err());

        let body: UpdateSettingsBody = serde_json::from_str(r#"{"settings":{}}"#).unwrap();
        assert!(body.entries().is_err());
    }
}
