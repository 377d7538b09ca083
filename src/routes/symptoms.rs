use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};

use crate::{
    error::AppError,
    models::{group_by_date, SymptomLog, SymptomPayload, SymptomsByDate},
    state::AppState,
};

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/symptoms", get(get_symptoms_flat).post(log_symptom))
        .route("/symptoms/by-date", get(get_symptoms_grouped))
        .route("/symptoms/:id", put(update_symptom).delete(delete_symptom))
        .with_state(state)
}

async fn log_symptom(
    State(state): State<AppState>,
    Json(body): Json<SymptomPayload>,
) -> Result<(StatusCode, Json<SymptomLog>), AppError> {
    let log = state.symptoms.insert_symptom(body.validate()?).await?;
    tracing::info!("🩺 Logged symptom '{}' ({})", log.symptom, log.id);

    Ok((StatusCode::CREATED, Json(log)))
}

async fn get_symptoms_flat(State(state): State<AppState>) -> Result<Json<Vec<SymptomLog>>, AppError> {
    Ok(Json(state.symptoms.list_symptoms().await?))
}

async fn get_symptoms_grouped(
    State(state): State<AppState>,
) -> Result<Json<Vec<SymptomsByDate>>, AppError> {
    let logs = state.symptoms.list_symptoms().await?;
    Ok(Json(group_by_date(logs)))
}

async fn update_symptom(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<SymptomPayload>,
) -> Result<Json<SymptomLog>, AppError> {
    let new = body.validate()?;
    let Some(log) = state.symptoms.update_symptom(id, new).await? else {
        return Err(AppError::not_found("Symptom log not found"));
    };
    Ok(Json(log))
}

async fn delete_symptom(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if state.symptoms.delete_symptom(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Symptom log not found"))
    }
}
