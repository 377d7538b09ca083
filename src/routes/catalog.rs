use axum::{routing::get, Json, Router};

use crate::catalog::{
    Treatment, GOALS, INSIGHT_STATUSES, LOG_TYPES, SYMPTOMS, TREATMENTS, TREATMENT_TYPES,
};

pub fn routes() -> Router {
    Router::new()
        .route("/catalog/symptoms", get(|| async { Json(SYMPTOMS) }))
        .route("/catalog/treatments", get(get_treatments))
        .route("/catalog/treatment-types", get(|| async { Json(TREATMENT_TYPES) }))
        .route("/catalog/goals", get(|| async { Json(GOALS) }))
        .route("/catalog/log-types", get(|| async { Json(LOG_TYPES) }))
        .route("/catalog/insight-statuses", get(|| async { Json(INSIGHT_STATUSES) }))
}

async fn get_treatments() -> Json<&'static [Treatment]> {
    Json(TREATMENTS)
}
