use crate::http::handlers::{notices, ops, tasks};
use crate::http::middleware::admin_auth::require_internal_api_key;
use crate::AppState;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;

pub fn router(state: AppState, internal_api_key: String) -> Router {
    let task_routes = Router::new()
        .route("/tasks/payment-notify", post(tasks::payment_notify))
        .route("/tasks/chargeback-notify", post(tasks::chargeback_notify))
        .route("/tasks/start-pay", post(tasks::start_pay))
        .layer(from_fn_with_state(internal_api_key, require_internal_api_key));

    Router::new()
        .route("/health", get(ops::health))
        .route("/ops/liveness", get(ops::liveness))
        .route("/ops/readiness", get(ops::readiness))
        .route("/notices/:transaction_uuid", get(notices::list_notices))
        .merge(task_routes)
        .with_state(state)
}
