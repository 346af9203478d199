//! Registry HTTP Routes
//!
//! Read-only views of the discovery registry.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::registry::{DiscoveryRecord, DiscoveryRegistry, ExportRecord, ListOrder, RegistryError};

#[derive(Debug, Deserialize)]
pub struct ListRegistryQuery {
    #[serde(default)]
    pub order: ListOrder,
}

#[derive(Debug, Serialize)]
pub struct RegistryListResponse {
    pub records: Vec<DiscoveryRecord>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

impl From<RegistryError> for ErrorResponse {
    fn from(err: RegistryError) -> Self {
        Self {
            code: err.status_code(),
            error: err.to_string(),
        }
    }
}

fn api_error(err: RegistryError) -> ApiError {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::from(err)))
}

/// Create registry routes
pub fn registry_routes(registry: Arc<DiscoveryRegistry>) -> Router {
    Router::new()
        .route("/registry", get(list_registry_handler))
        .route("/registry/export", get(export_registry_handler))
        .route("/registry/:sequence_number", get(get_record_handler))
        .with_state(registry)
}

async fn list_registry_handler(
    State(registry): State<Arc<DiscoveryRegistry>>,
    Query(query): Query<ListRegistryQuery>,
) -> Result<Json<RegistryListResponse>, ApiError> {
    let records = registry.list(query.order).map_err(api_error)?;
    Ok(Json(RegistryListResponse {
        total: records.len(),
        records,
    }))
}

async fn export_registry_handler(
    State(registry): State<Arc<DiscoveryRegistry>>,
) -> Result<Json<Vec<ExportRecord>>, ApiError> {
    registry.export().map(Json).map_err(api_error)
}

async fn get_record_handler(
    State(registry): State<Arc<DiscoveryRegistry>>,
    Path(sequence_number): Path<u64>,
) -> Result<Json<DiscoveryRecord>, ApiError> {
    registry.get(sequence_number).map(Json).map_err(api_error)
}
