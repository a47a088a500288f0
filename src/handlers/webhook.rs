use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::models::GatewayNotification;
use crate::services::reconciliation;
use crate::state::AppState;

// POST /webhook/midtrans
//
// Response codes drive the gateway's retry policy: 2xx stops retries, 4xx is
// a non-retryable rejection, 5xx makes the gateway redeliver later.
pub async fn midtrans_webhook(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<serde_json::Value>,
) -> Response {
    let notification: GatewayNotification = match serde_json::from_value(payload) {
        Ok(n) => n,
        Err(e) => {
            tracing::warn!(error = %e, "malformed payment notification");
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": "invalid notification payload" })),
            )
                .into_response();
        }
    };

    tracing::info!(
        order_id = %notification.order_id,
        transaction_status = %notification.transaction_status,
        "payment notification received"
    );

    let result = {
        let db = state.db.lock().unwrap();
        reconciliation::reconcile(&db, &notification, &state.config.midtrans_server_key)
    };

    match result {
        Ok(_) => Json(serde_json::json!({ "status": "ok" })).into_response(),
        Err(err) => {
            tracing::warn!(order_id = %notification.order_id, error = %err, "notification not applied");
            err.into_response()
        }
    }
}
