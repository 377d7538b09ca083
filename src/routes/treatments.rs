use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};

use super::events::CalendarQuery;
use crate::{
    error::AppError,
    models::{CalendarItem, TreatmentLog, TreatmentPayload},
    state::AppState,
};

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/treatments", get(list_treatments).post(log_treatment))
        .route("/treatments/calendar", get(treatment_calendar))
        .route("/treatments/:id", put(update_treatment).delete(delete_treatment))
        .with_state(state)
}

async fn list_treatments(State(state): State<AppState>) -> Result<Json<Vec<TreatmentLog>>, AppError> {
    Ok(Json(state.treatments.list_treatments().await?))
}

async fn log_treatment(
    State(state): State<AppState>,
    Json(body): Json<TreatmentPayload>,
) -> Result<(StatusCode, Json<TreatmentLog>), AppError> {
    let log = state.treatments.insert_treatment(body.validate()?).await?;
    tracing::info!("💊 Logged treatment '{}' ({})", log.treatment_name, log.id);

    Ok((StatusCode::CREATED, Json(log)))
}

async fn treatment_calendar(
    State(state): State<AppState>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<Vec<CalendarItem>>, AppError> {
    let logs = state.treatments.list_treatments().await?;
    Ok(Json(
        logs.into_iter()
            .map(|log| CalendarItem::from_treatment(log, query.detailed))
            .collect(),
    ))
}

async fn update_treatment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<TreatmentPayload>,
) -> Result<Json<TreatmentLog>, AppError> {
    let new = body.validate()?;
    let Some(log) = state.treatments.update_treatment(id, new).await? else {
        return Err(AppError::not_found("Treatment log not found"));
    };
    Ok(Json(log))
}

async fn delete_treatment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if !state.treatments.delete_treatment(id).await? {
        return Err(AppError::not_found("Treatment log not found"));
    }
    tracing::info!("🗑️ Deleted treatment log {}", id);
    Ok(StatusCode::NO_CONTENT)
}
