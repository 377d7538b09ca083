use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{NewPlace, NewReview, Place, PlaceDetail, ReviewCreated},
    state::AppState,
};

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/places", get(list_places).post(create_place))
        .route("/places/:id", get(get_place))
        .route("/places/:id/reviews", post(add_review))
        .with_state(state)
}

async fn list_places(State(state): State<AppState>) -> Result<Json<Vec<Place>>, AppError> {
    Ok(Json(state.places.list_places().await?))
}

async fn create_place(
    State(state): State<AppState>,
    Json(body): Json<NewPlace>,
) -> Result<(StatusCode, Json<Place>), AppError> {
    let place = state.places.insert_place(body.validate()?).await?;
    tracing::info!("📍 Added place {} ({})", place.name, place.id);

    Ok((StatusCode::CREATED, Json(place)))
}

async fn get_place(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PlaceDetail>, AppError> {
    let Some(place) = state.places.get_place(id).await? else {
        return Err(AppError::not_found("Place not found"));
    };
    let reviews = state.places.list_reviews(id).await?;

    Ok(Json(PlaceDetail { place, reviews }))
}

async fn add_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<NewReview>,
) -> Result<(StatusCode, Json<ReviewCreated>), AppError> {
    let review = body.validate()?;
    let Some((review, average_rating)) = state.places.add_review(id, review).await? else {
        return Err(AppError::not_found("Place not found"));
    };

    Ok((
        StatusCode::CREATED,
        Json(ReviewCreated {
            review,
            average_rating,
        }),
    ))
}
