//! HTTP surface: `POST /api/gemini`.
//!
//! Reads the request according to its transport, hands the validated
//! envelope to the [`Dispatcher`], and normalizes the outcome into either a
//! success payload or `{ "error": ... }` with the matching status.

use crate::dispatcher::Dispatcher;
use crate::models::{
    Attachment, BinaryRequest, Config, ErrorBody, GenerationResult, RequestEnvelope,
    StructuredBody,
};
use crate::transport::Transport;
use crate::{Error, Result};
use axum::extract::{DefaultBodyLimit, FromRequest, Multipart, Request, State};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

pub const GENERATE_PATH: &str = "/api/gemini";

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub max_body_bytes: usize,
}

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.max_body_bytes;

    Router::new()
        .route(GENERATE_PATH, post(generate_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the configured address and serve until Ctrl-C / SIGTERM.
pub async fn serve(config: Config) -> Result<()> {
    let state = AppState {
        dispatcher: Arc::new(Dispatcher::from_config(&config)),
        max_body_bytes: config.max_body_bytes,
    };

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn generate_handler(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<GenerationResult>> {
    let envelope = match Transport::from_headers(request.headers()) {
        Transport::Json => read_structured(request, state.max_body_bytes).await?,
        Transport::Multipart => read_binary(request, &state).await?,
        Transport::Unsupported(content_type) => {
            return Err(Error::UnsupportedMediaType(content_type))
        }
    };

    let result = state.dispatcher.dispatch(envelope).await?;
    Ok(Json(result))
}

async fn read_structured(request: Request, limit: usize) -> Result<RequestEnvelope> {
    let bytes = axum::body::to_bytes(request.into_body(), limit)
        .await
        .map_err(|e| Error::InvalidBody(format!("Failed to read body: {}", e)))?;

    let body: StructuredBody = serde_json::from_slice(&bytes)
        .map_err(|e| Error::InvalidBody(format!("Malformed JSON: {}", e)))?;

    Ok(RequestEnvelope::Structured(body.validate()?))
}

async fn read_binary(request: Request, state: &AppState) -> Result<RequestEnvelope> {
    let mut multipart = Multipart::from_request(request, state)
        .await
        .map_err(|e| Error::InvalidBody(e.body_text()))?;

    let mut image: Option<Attachment> = None;
    let mut prompt: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::InvalidBody(format!("Multipart error: {}", e)))?
    {
        let field_name = field.name().map(|n| n.to_string());
        match field_name.as_deref() {
            Some("image") => {
                let declared = field.content_type().map(|c| c.to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| Error::InvalidBody(format!("Read error: {}", e)))?;
                image = Some(Attachment::new(bytes.to_vec(), declared));
            }
            Some("prompt") => {
                prompt = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| Error::InvalidBody(format!("Read error: {}", e)))?,
                );
            }
            _ => {} // ignore unknown fields
        }
    }

    Ok(RequestEnvelope::Binary(BinaryRequest::new(prompt, image)?))
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.is_validation() {
            warn!("Rejected request ({}): {}", status, self);
        } else {
            error!("Request failed ({}): {}", status, self);
        }

        let body = ErrorBody {
            error: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
