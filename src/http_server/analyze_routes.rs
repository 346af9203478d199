//! Analyze HTTP Routes
//!
//! `POST /api/analyze` takes the raw document as the request body. Every
//! outcome, including rejections and internal faults, is a `200 OK` verdict.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{rejection::QueryRejection, Query, State},
    http::{header::CONTENT_LENGTH, HeaderMap},
    routing::post,
    Json, Router,
};
use futures_util::StreamExt;
use serde::Deserialize;
use uuid::Uuid;

use crate::analyzer::{Analyzer, Verdict};
use crate::codec::DecodeMode;
use crate::observability::{log_event_with_fields, Event};

#[derive(Debug, Deserialize)]
pub struct AnalyzeQuery {
    /// Caller's identifier for the document; generated when absent
    #[serde(default)]
    pub source_id: Option<String>,
    /// Overrides the configured decode mode
    #[serde(default)]
    pub mode: Option<DecodeMode>,
}

/// Create analyze routes
pub fn analyze_routes(analyzer: Arc<Analyzer>) -> Router {
    Router::new()
        .route("/analyze", post(analyze_handler))
        .with_state(analyzer)
}

enum BodyRead {
    Complete(Vec<u8>),
    /// Bytes seen when the cap was crossed
    Exceeded(usize),
}

async fn analyze_handler(
    State(analyzer): State<Arc<Analyzer>>,
    query: Result<Query<AnalyzeQuery>, QueryRejection>,
    headers: HeaderMap,
    body: Body,
) -> Json<Verdict> {
    let query = match query {
        Ok(Query(query)) => query,
        Err(e) => {
            let source_id = generated_source_id();
            return Json(fault(&source_id, format!("invalid query: {}", e)));
        }
    };
    let source_id = query.source_id.unwrap_or_else(generated_source_id);
    let limit = analyzer.config().max_input_bytes;

    if let Some(size) = content_length(&headers) {
        if size > limit {
            return Json(analyzer.oversized_verdict(&source_id, size));
        }
    }

    let input = match read_capped(body, limit).await {
        Ok(BodyRead::Complete(input)) => input,
        Ok(BodyRead::Exceeded(seen)) => return Json(analyzer.oversized_verdict(&source_id, seen)),
        Err(e) => {
            return Json(fault(&source_id, format!("failed to read request body: {}", e)));
        }
    };

    let mode = query.mode.unwrap_or(analyzer.config().decode_mode);
    let task_analyzer = Arc::clone(&analyzer);
    let task_source = source_id.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        task_analyzer.analyze_with_mode(&task_source, &input, mode)
    })
    .await;

    match outcome {
        Ok(verdict) => Json(verdict),
        Err(e) => Json(fault(&source_id, format!("analysis task failed: {}", e))),
    }
}

fn generated_source_id() -> String {
    format!("upload-{}", Uuid::new_v4())
}

fn content_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// Reads at most `limit` bytes; stops as soon as the body grows past it
async fn read_capped(body: Body, limit: usize) -> Result<BodyRead, axum::Error> {
    let mut stream = body.into_data_stream();
    let mut buffer = Vec::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        let seen = buffer.len() + chunk.len();
        if seen > limit {
            return Ok(BodyRead::Exceeded(seen));
        }
        buffer.extend_from_slice(&chunk);
    }

    Ok(BodyRead::Complete(buffer))
}

fn fault(source_id: &str, message: String) -> Verdict {
    log_event_with_fields(
        Event::AnalysisFault,
        &[("source_id", source_id), ("reason", &message)],
    );
    Verdict::fault(source_id, message)
}
