// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// HTTP endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use docvet_analysis::DocumentPipeline;
use docvet_core::DocvetError;
use serde_json::json;
use tracing::{Instrument, error, info_span};
use uuid::Uuid;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<DocumentPipeline>,
}

/// Liveness payload.
pub async fn root() -> impl IntoResponse {
    Json(json!({ "status": "docvet-server running" }))
}

/// Health check endpoint for container orchestration.
pub async fn health() -> impl IntoResponse {
    StatusCode::OK
}

/// Analyse one uploaded document image and respond with the verdict.
///
/// Expects a multipart body with a `file` field holding the image bytes.
/// Decode failures come back as 400 with a `detail` payload, matching the
/// two client-fault categories; everything else that goes wrong is a 500.
pub async fn analyze_document(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Response {
    let request_id = Uuid::new_v4();
    let span = info_span!("analyze_document", %request_id);
    run_analysis(state, multipart).instrument(span).await
}

async fn run_analysis(state: AppState, mut multipart: Multipart) -> Response {
    let data = match read_file_field(&mut multipart).await {
        Ok(data) => data,
        Err(response) => return response,
    };

    // The pipeline is synchronous CPU work; keep it off the async executor.
    let pipeline = state.pipeline.clone();
    let outcome = tokio::task::spawn_blocking(move || pipeline.process(&data)).await;

    match outcome {
        Ok(Ok(verdict)) => Json(verdict).into_response(),
        Ok(Err(err)) if err.is_client_fault() => {
            let detail = match &err {
                DocvetError::UnrecognizedImage(_) => "Invalid image format".to_string(),
                other => format!("Error reading image: {other}"),
            };
            bad_request(detail)
        }
        Ok(Err(err)) => {
            error!(error = %err, "analysis failed");
            internal_error()
        }
        Err(err) => {
            error!(error = %err, "analysis task failed to complete");
            internal_error()
        }
    }
}

/// Pull the bytes of the `file` multipart field, or produce the error
/// response to return instead.
async fn read_file_field(multipart: &mut Multipart) -> Result<Vec<u8>, Response> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(bad_request("missing multipart field 'file'".to_string())),
            Err(err) => return Err(bad_request(format!("malformed multipart body: {err}"))),
        };

        if field.name() != Some("file") {
            continue;
        }

        return match field.bytes().await {
            Ok(bytes) => Ok(bytes.to_vec()),
            Err(err) => Err(bad_request(format!("failed to read upload: {err}"))),
        };
    }
}

fn bad_request(detail: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "detail": detail }))).into_response()
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "detail": "internal error" })),
    )
        .into_response()
}
