use crate::http::envelope::error_response;
use crate::AppState;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

pub async fn list_notices(
    State(state): State<AppState>,
    Path(transaction_uuid): Path<String>,
) -> impl IntoResponse {
    let notices = match state.notice_store.list_for_transaction(&transaction_uuid).await {
        Ok(v) => v,
        Err(e) => return error_response(e),
    };

    let delivered = notices.iter().any(|n| n.success);
    (
        axum::http::StatusCode::OK,
        Json(serde_json::json!({
            "transaction_uuid": transaction_uuid,
            "delivered": delivered,
            "notices": notices
        })),
    )
        .into_response()
}
