//! Trigger route handlers.
//!
//! Every trigger replies `200 {"status":"ok"}` no matter what happened
//! downstream: failures are logged where they occur and must never bounce
//! back to the function host, which would retry the whole invocation.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use classbell_core::types::TaskDoc;
use classbell_functions::{membership, task_created, ClassChange};

use super::server::AppState;

/// Health check endpoint.
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "classbell-gateway",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Update to `classes/{class_id}`: mirror the new snapshot, then run the
/// membership-change detector.
pub async fn class_updated(
    State(state): State<Arc<AppState>>,
    Path(class_id): Path<String>,
    Json(change): Json<ClassChange>,
) -> Json<serde_json::Value> {
    if let Err(e) = state.store.put_class(&class_id, change.after.clone()).await {
        tracing::error!("Failed to mirror class {class_id}: {e}");
    }
    membership::on_class_updated(&state.store, &class_id, &change).await;
    Json(serde_json::json!({"status": "ok"}))
}

/// Create of `classes/{class_id}/tasks/{task_id}`: mirror the snapshot,
/// then fan out to the class members. The path's class id wins over
/// whatever the body claims.
pub async fn task_created(
    State(state): State<Arc<AppState>>,
    Path((class_id, task_id)): Path<(String, String)>,
    Json(task): Json<TaskDoc>,
) -> Json<serde_json::Value> {
    let task = TaskDoc { class_id, ..task };
    if let Err(e) = state.store.put_task(&task_id, task.clone()).await {
        tracing::error!("Failed to mirror task {task_id}: {e}");
    }
    task_created::on_task_created(&state.deliverer, &state.store, &task_id, &task).await;
    Json(serde_json::json!({"status": "ok"}))
}
