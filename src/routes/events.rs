use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::{
    error::AppError,
    models::{CalendarItem, DeletedEvent, EventPayload, EventResponse},
    state::AppState,
};

#[derive(Deserialize)]
pub struct CalendarQuery {
    #[serde(default)]
    pub detailed: bool,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route("/events/calendar", get(calendar_feed))
        .route(
            "/events/:id",
            get(get_event).put(update_event).delete(delete_event),
        )
        .with_state(state)
}

async fn list_events(State(state): State<AppState>) -> Result<Json<Vec<EventResponse>>, AppError> {
    let events = state.events.list_events().await?;
    Ok(Json(events.into_iter().map(EventResponse::from).collect()))
}

async fn create_event(
    State(state): State<AppState>,
    Json(body): Json<EventPayload>,
) -> Result<(StatusCode, Json<EventResponse>), AppError> {
    let new = body.validate()?;
    let event = state.events.insert_event(new).await?;
    tracing::info!("📅 Logged {} event {}", event.kind.event_type(), event.id);

    Ok((StatusCode::CREATED, Json(event.into())))
}

async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<EventResponse>, AppError> {
    let Some(event) = state.events.get_event(id).await? else {
        return Err(AppError::not_found("Event not found"));
    };
    Ok(Json(event.into()))
}

async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<EventPayload>,
) -> Result<Json<EventResponse>, AppError> {
    // An unknown id wins over a bad body.
    if state.events.get_event(id).await?.is_none() {
        return Err(AppError::not_found("Event not found"));
    }

    let new = body.validate()?;
    let Some(event) = state.events.update_event(id, new).await? else {
        return Err(AppError::not_found("Event not found"));
    };
    Ok(Json(event.into()))
}

async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DeletedEvent>, AppError> {
    let Some(event) = state.events.delete_event(id).await? else {
        return Err(AppError::not_found("Event not found"));
    };
    tracing::info!("🗑️ Deleted {} event {}", event.kind.event_type(), id);

    Ok(Json(DeletedEvent {
        message: "Event deleted successfully",
        event_type: event.kind.event_type(),
        deleted_event_id: id,
    }))
}

async fn calendar_feed(
    State(state): State<AppState>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<Vec<CalendarItem>>, AppError> {
    let events = state.events.list_events().await?;
    Ok(Json(
        events
            .into_iter()
            .map(|event| CalendarItem::from_event(event, query.detailed))
            .collect(),
    ))
}
