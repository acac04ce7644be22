//! # API Server
//!
//! An `axum` server exposing receiver management, notification dispatch and
//! the Prometheus `/metrics` endpoint.
//!
//! Errors are returned as `{"code": ..., "message": ...}` with the status
//! derived from the error's [`ErrorCategory`]. The server shuts down
//! gracefully when the application's shutdown signal fires.

pub mod dto;
pub mod handlers;

use crate::error::{DispatchError, ErrorCategory, ServiceError};
use crate::notification::Dispatcher;
use crate::receiver::ReceiverService;
use crate::value::EncodeError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use dto::ErrorBody;
use metrics_exporter_prometheus::PrometheusHandle;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, trace, warn};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub service: ReceiverService,
    pub dispatcher: Arc<Dispatcher>,
    pub metrics: Option<PrometheusHandle>,
    pub shutdown: watch::Receiver<()>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/receivers",
            get(handlers::list_receivers).post(handlers::create_receiver),
        )
        .route(
            "/receivers/{id}",
            get(handlers::get_receiver)
                .put(handlers::update_receiver)
                .delete(handlers::delete_receiver),
        )
        .route("/receivers/{id}/send", post(handlers::send_notification))
        .route("/metrics", get(handlers::render_metrics))
        .route("/health", get(handlers::health))
        .with_state(state)
}

// Cancelled dispatches use the non-standard 499 "Client Closed Request".
fn status_for(category: ErrorCategory) -> StatusCode {
    match category {
        ErrorCategory::InvalidArgument => StatusCode::BAD_REQUEST,
        ErrorCategory::NotFound => StatusCode::NOT_FOUND,
        ErrorCategory::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        ErrorCategory::Cancelled => {
            StatusCode::from_u16(499).unwrap_or(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// An error response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    fn new(category: ErrorCategory, message: impl ToString) -> Self {
        Self {
            status: status_for(category),
            body: ErrorBody {
                code: category.as_str().to_string(),
                message: message.to_string(),
            },
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::new(err.category(), err)
    }
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        ApiError::new(err.category(), err)
    }
}

impl From<EncodeError> for ApiError {
    fn from(err: EncodeError) -> Self {
        ApiError::from(ServiceError::from(err))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(ErrorCategory::InvalidArgument, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, message = %self.body.message, "Request failed");
        } else {
            warn!(status = %self.status, message = %self.body.message, "Request rejected");
        }
        (self.status, Json(self.body)).into_response()
    }
}

/// Serves the API on an already-bound listener.
pub struct ApiServer {
    listener: TcpListener,
    router: Router,
    shutdown_rx: watch::Receiver<()>,
}

impl ApiServer {
    pub fn new(listener: TcpListener, router: Router, shutdown_rx: watch::Receiver<()>) -> Self {
        Self {
            listener,
            router,
            shutdown_rx,
        }
    }

    /// Returns a future that serves requests until the shutdown signal
    /// fires, then waits for in-flight requests to finish.
    pub fn run(self) -> impl Future<Output = ()> {
        let mut shutdown_rx = self.shutdown_rx;
        let shutdown = async move {
            // A dropped sender also means shutdown.
            let _ = shutdown_rx.changed().await;
            trace!("API server received shutdown signal.");
        };

        async move {
            if let Err(e) = axum::serve(self.listener, self.router)
                .with_graceful_shutdown(shutdown)
                .await
            {
                error!("API server error: {}", e);
            }
            trace!("API server task finished.");
        }
    }
}
