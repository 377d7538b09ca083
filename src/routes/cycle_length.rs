use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::{
    cycle::{monthly_averages, MonthlyAverage},
    error::AppError,
    state::AppState,
};

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CycleLengthResponse {
    Averages(Vec<MonthlyAverage>),
    NotEnoughData {
        message: String,
        data: Vec<MonthlyAverage>,
    },
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/events/cycle-length", get(get_cycle_length))
        .with_state(state)
}

pub async fn get_cycle_length(
    State(state): State<AppState>,
) -> Result<Json<CycleLengthResponse>, AppError> {
    let starts = state.events.period_starts().await?;

    if starts.len() < 2 {
        return Ok(Json(CycleLengthResponse::NotEnoughData {
            message: format!(
                "Not enough period events to calculate cycle length: this has {}",
                starts.len()
            ),
            data: Vec::new(),
        }));
    }

    Ok(Json(CycleLengthResponse::Averages(monthly_averages(&starts))))
}
