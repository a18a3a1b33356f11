// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Docvet — document intake gate service.
//
// Entry point. Initialises logging, resolves configuration from the
// environment once, builds the analysis pipeline (loading OCR models), and
// serves the HTTP boundary.

mod handlers;
mod routes;

use std::sync::Arc;

use docvet_analysis::DocumentPipeline;
use docvet_core::PipelineConfig;
use tracing::info;

/// Environment variable holding the listen port.
const PORT_ENV: &str = "DOCVET_PORT";

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Configuration is resolved exactly once, here; requests never consult
    // the environment.
    let config = PipelineConfig::from_env();
    info!(
        blur_threshold = config.blur_threshold,
        "Docvet server starting"
    );

    let pipeline = Arc::new(DocumentPipeline::new(config));
    info!(ocr_available = pipeline.ocr_available(), "analysis pipeline ready");

    let app = routes::create_router(handlers::AppState { pipeline });

    let port = std::env::var(PORT_ENV)
        .ok()
        .and_then(|raw| raw.parse::<u16>().ok())
        .unwrap_or(8000);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "listening");

    axum::serve(listener, app).await
}
