use crate::domain::notice::ChargebackReason;
use crate::domain::task::Task;
use crate::domain::transaction::TransactionNotes;
use crate::error::PayError;
use crate::http::envelope::error_response;
use crate::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PaymentNotifyRequest {
    pub transaction_uuid: String,
}

#[derive(Debug, Deserialize)]
pub struct ChargebackNotifyRequest {
    pub transaction_uuid: String,
    pub reason: ChargebackReason,
}

#[derive(Debug, Deserialize)]
pub struct StartPayRequest {
    pub transaction_uuid: String,
    pub notes: TransactionNotes,
}

pub async fn payment_notify(
    State(state): State<AppState>,
    Json(req): Json<PaymentNotifyRequest>,
) -> impl IntoResponse {
    enqueue(
        &state,
        Task::PaymentNotify {
            transaction_uuid: req.transaction_uuid,
        },
    )
    .await
}

pub async fn chargeback_notify(
    State(state): State<AppState>,
    Json(req): Json<ChargebackNotifyRequest>,
) -> impl IntoResponse {
    enqueue(
        &state,
        Task::ChargebackNotify {
            transaction_uuid: req.transaction_uuid,
            reason: req.reason,
        },
    )
    .await
}

pub async fn start_pay(State(state): State<AppState>, Json(req): Json<StartPayRequest>) -> impl IntoResponse {
    let missing = if req.notes.issuer_key.is_none() {
        Some("issuer_key")
    } else if req.notes.pay_request.is_none() {
        Some("pay_request")
    } else {
        None
    };
    if let Some(field) = missing {
        return error_response(
            PayError::MissingNotes {
                transaction_uuid: req.transaction_uuid,
                field,
            }
            .into(),
        );
    }

    enqueue(
        &state,
        Task::StartPay {
            transaction_uuid: req.transaction_uuid,
            notes: req.notes,
        },
    )
    .await
}

async fn enqueue(state: &AppState, task: Task) -> axum::response::Response {
    match state.task_queue.enqueue(&task, 0, chrono::Utc::now()).await {
        Ok(task_id) => {
            tracing::info!(
                task = task.name(),
                transaction_uuid = task.transaction_uuid(),
                task_id,
                "task queued"
            );
            (
                StatusCode::ACCEPTED,
                Json(serde_json::json!({
                    "task_id": task_id,
                    "task": task.name(),
                    "transaction_uuid": task.transaction_uuid(),
                })),
            )
                .into_response()
        }
        Err(e) => error_response(e),
    }
}
