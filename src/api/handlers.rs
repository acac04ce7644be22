use crate::api::dto::{ReceiverRequest, ReceiverResponse, SendNotificationBody};
use crate::api::{ApiError, AppState};
use crate::core::{NotificationOutcome, NotificationRequest};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

pub async fn list_receivers(
    State(state): State<AppState>,
) -> Result<Json<Vec<ReceiverResponse>>, ApiError> {
    let receivers = state
        .service
        .list()
        .await?
        .into_iter()
        .map(ReceiverResponse::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(receivers))
}

pub async fn create_receiver(
    State(state): State<AppState>,
    body: Result<Json<ReceiverRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ReceiverResponse>), ApiError> {
    let Json(request) = body?;
    let created = state.service.create(request.into()).await?;
    Ok((StatusCode::CREATED, Json(created.try_into()?)))
}

pub async fn get_receiver(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ReceiverResponse>, ApiError> {
    let receiver = state.service.get(id).await?;
    Ok(Json(receiver.try_into()?))
}

pub async fn update_receiver(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    body: Result<Json<ReceiverRequest>, JsonRejection>,
) -> Result<Json<ReceiverResponse>, ApiError> {
    let Json(request) = body?;
    let updated = state.service.update(id, request.into()).await?;
    Ok(Json(updated.try_into()?))
}

pub async fn delete_receiver(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    state.service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Dispatches one notification. The dispatch is abandoned if the server
/// starts shutting down.
pub async fn send_notification(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    body: Result<Json<SendNotificationBody>, JsonRejection>,
) -> Result<Json<NotificationOutcome>, ApiError> {
    let Json(body) = body?;
    let request = NotificationRequest {
        receiver_id: id,
        payload: body.data,
    };
    let outcome = state
        .dispatcher
        .dispatch_until(&request, state.shutdown.clone())
        .await?;
    Ok(Json(outcome))
}

pub async fn render_metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "metrics disabled").into_response(),
    }
}

pub async fn health() -> &'static str {
    "ok"
}
