//! Defines the Axum API routes and handlers.

use crate::printer::SharedEngine;
use crate::web::models::{PrinterStatusResponse, ServiceResponse, SnapshotResponse, VersionResponse};
use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

pub type AppState = SharedEngine;

/// Creates the Axum router with all the API endpoints.
pub fn create_router(engine: AppState) -> Router {
    Router::new()
        .route("/api/v1/status", get(get_status))
        .route("/api/v1/snapshot", get(get_snapshot))
        .route("/api/v1/services/{name}", get(get_service))
        .route("/api/v1/version/{key}", get(get_version))
        .with_state(engine)
}

/// Handler to get the current status of the printer.
///
/// Evaluating the status may run transition bookkeeping, so this takes the
/// write lock.
async fn get_status(State(engine): State<AppState>) -> Json<PrinterStatusResponse> {
    let mut engine = engine.write().await;
    let status = engine.evaluate_and_transition();
    let online = engine.online();
    Json(PrinterStatusResponse::new(&engine, status, online))
}

/// Handler to get the full snapshot.
async fn get_snapshot(State(engine): State<AppState>) -> Json<SnapshotResponse> {
    let mut engine = engine.write().await;
    let status = engine.evaluate_and_transition();
    Json(SnapshotResponse {
        status,
        online: engine.online(),
        snapshot: engine.snapshot().clone(),
    })
}

/// Handler for a relay service entry in the status document.
async fn get_service(State(engine): State<AppState>, Path(name): Path<String>) -> Json<ServiceResponse> {
    let engine = engine.read().await;
    Json(ServiceResponse {
        state: engine.service_state(&name),
        online: engine.service_online(&name),
        name,
    })
}

/// Handler for a version entry in the status document.
async fn get_version(State(engine): State<AppState>, Path(key): Path<String>) -> Json<VersionResponse> {
    let engine = engine.read().await;
    Json(VersionResponse {
        value: engine.version_value(&key),
        key,
    })
}
