use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde_json::{json, Value};
use tower::ServiceExt;

use cyclelog_backend::{
    app,
    models::{Event, NewEvent},
    store::{EventStore, MemoryStore, StoreError, StoreResult},
    AppState,
};

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

async fn log_period(app: &Router, start: &str) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/events",
        Some(json!({ "type": "Period", "start_date": start, "end_date": start })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

#[tokio::test]
async fn health_responds() {
    let app = app(AppState::in_memory());
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("✅ Backend up".into()));
}

#[tokio::test]
async fn cycle_length_with_too_few_periods_is_not_an_error() {
    let app = app(AppState::in_memory());

    let (status, body) = send(&app, Method::GET, "/events/cycle-length", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
    assert_eq!(
        body["message"],
        "Not enough period events to calculate cycle length: this has 0"
    );

    log_period(&app, "2024-01-01").await;
    let (status, body) = send(&app, Method::GET, "/events/cycle-length", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
    assert!(body["message"].as_str().unwrap().ends_with("this has 1"));
}

#[tokio::test]
async fn cycle_length_groups_by_later_month_in_calendar_order() {
    let app = app(AppState::in_memory());
    // Inserted out of order on purpose; a note must not count.
    log_period(&app, "2023-03-01").await;
    log_period(&app, "2023-01-01T09:00:00Z").await;
    log_period(&app, "2023-01-29").await;
    send(
        &app,
        Method::POST,
        "/events",
        Some(json!({ "type": "Note", "start_date": "2023-02-10", "end_date": "2023-02-10" })),
    )
    .await;

    let (status, body) = send(&app, Method::GET, "/events/cycle-length", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            { "month": "Jan", "avg_cycle_length": 27 },
            { "month": "Mar", "avg_cycle_length": 31 },
        ])
    );
}

#[tokio::test]
async fn cycle_length_pools_years_and_rounds_half_to_even() {
    let app = app(AppState::in_memory());
    // Aug gaps: 30 and 32 -> 31. Jul gaps: 336 (2022-08-01 -> 2023-07-03) alone.
    for start in ["2022-07-02", "2022-08-01", "2023-07-03", "2023-08-04"] {
        log_period(&app, start).await;
    }
    let (_, body) = send(&app, Method::GET, "/events/cycle-length", None).await;
    let aug = body.as_array().unwrap().iter().find(|m| m["month"] == "Aug").unwrap();
    assert_eq!(aug["avg_cycle_length"], 31);

    // Two May gaps of 27 and 28 average 27.5, which rounds to 28.
    let app = app_with_periods(&["2024-04-10", "2024-05-07", "2025-04-10", "2025-05-08"]).await;
    let (_, body) = send(&app, Method::GET, "/events/cycle-length", None).await;
    let may = body.as_array().unwrap().iter().find(|m| m["month"] == "May").unwrap();
    assert_eq!(may["avg_cycle_length"], 28);

    // 28 and 29 average 28.5, which rounds down to 28.
    let app = app_with_periods(&["2024-09-03", "2024-10-01", "2025-09-02", "2025-10-01"]).await;
    let (_, body) = send(&app, Method::GET, "/events/cycle-length", None).await;
    let oct = body.as_array().unwrap().iter().find(|m| m["month"] == "Oct").unwrap();
    assert_eq!(oct["avg_cycle_length"], 28);
}

async fn app_with_periods(starts: &[&str]) -> Router {
    let app = app(AppState::in_memory());
    for start in starts {
        log_period(&app, start).await;
    }
    app
}

#[tokio::test]
async fn malformed_dates_are_rejected_with_400() {
    let app = app(AppState::in_memory());
    let (status, body) = send(
        &app,
        Method::POST,
        "/events",
        Some(json!({ "type": "Period", "start_date": "31/01/2024", "end_date": "2024-02-01" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid date format" }));

    let (status, body) = send(&app, Method::POST, "/events", Some(json!({ "type": "Period" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Missing required fields" }));
}

#[tokio::test]
async fn event_crud_round_trip() {
    let app = app(AppState::in_memory());

    let (status, created) = send(
        &app,
        Method::POST,
        "/events",
        Some(json!({
            "type": "Period",
            "start_date": "2024-02-01T08:30",
            "end_date": "2024-02-05",
            "description": "cramps",
            "flow": "Heavy",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["type"], "Period");
    assert_eq!(created["start"], "2024-02-01T08:30:00");
    assert_eq!(created["flow"], "Heavy");
    assert!(created.get("confirmed").is_none());
    let id = created["id"].as_i64().unwrap();

    let (status, fetched) = send(&app, Method::GET, &format!("/events/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/events/{id}"),
        Some(json!({ "type": "OVULATION", "start_date": "2024-02-14", "end_date": "2024-02-14", "confirmed": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["type"], "Ovulation");
    assert_eq!(updated["confirmed"], true);
    assert!(updated.get("flow").is_none());
    assert_eq!(updated["description"], Value::Null);

    let (status, list) = send(&app, Method::GET, "/events", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, deleted) = send(&app, Method::DELETE, &format!("/events/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        deleted,
        json!({ "message": "Event deleted successfully", "event_type": "Ovulation", "deleted_event_id": id })
    );

    let (status, body) = send(&app, Method::GET, &format!("/events/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Event not found" }));
}

#[tokio::test]
async fn update_and_delete_of_unknown_event_are_404() {
    let app = app(AppState::in_memory());
    let body = json!({ "type": "Note", "start_date": "2024-01-01", "end_date": "2024-01-01" });

    let (status, _) = send(&app, Method::PUT, "/events/99", Some(body)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::DELETE, "/events/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn start_after_end_is_rejected() {
    let app = app(AppState::in_memory());
    let (status, _) = send(
        &app,
        Method::POST,
        "/events",
        Some(json!({ "type": "Spotting", "start_date": "2024-03-02", "end_date": "2024-03-01" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn calendar_feed_titles_follow_detail_toggle() {
    let app = app(AppState::in_memory());
    send(
        &app,
        Method::POST,
        "/events",
        Some(json!({ "type": "Note", "start_date": "2024-03-02", "end_date": "2024-03-02", "description": "started metformin" })),
    )
    .await;

    let (_, concise) = send(&app, Method::GET, "/events/calendar", None).await;
    assert_eq!(concise[0]["title"], "Note");
    assert_eq!(concise[0]["allDay"], true);
    assert_eq!(concise[0]["extendedProps"]["description"], "started metformin");

    let (_, detailed) = send(&app, Method::GET, "/events/calendar?detailed=true", None).await;
    assert_eq!(detailed[0]["title"], "Note: started metformin");
}

#[tokio::test]
async fn place_reviews_update_average_rating() {
    let app = app(AppState::in_memory());

    let (status, place) = send(
        &app,
        Method::POST,
        "/places",
        Some(json!({
            "name": "Endocrinology Clinic",
            "address": "200 College St",
            "link": "https://example.org/clinic",
            "latitude": 43.66,
            "longitude": -79.39,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(place["average_rating"], Value::Null);
    let id = place["id"].as_str().unwrap().to_string();

    let uri = format!("/places/{id}/reviews");
    let (status, first) = send(&app, Method::POST, &uri, Some(json!({ "rating": 4, "comment": "kind staff" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["average_rating"], 4.0);
    let (_, second) = send(&app, Method::POST, &uri, Some(json!({ "rating": 5 }))).await;
    assert_eq!(second["average_rating"], 4.5);

    let (status, _) = send(&app, Method::POST, &uri, Some(json!({ "rating": 6 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, detail) = send(&app, Method::GET, &format!("/places/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["place"]["average_rating"], 4.5);
    assert_eq!(detail["reviews"].as_array().unwrap().len(), 2);

    let (status, places) = send(&app, Method::GET, "/places", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(places.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_place_is_404() {
    let app = app(AppState::in_memory());
    let missing = "00000000-0000-4000-8000-000000000000";

    let (status, _) = send(&app, Method::GET, &format!("/places/{missing}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/places/{missing}/reviews"),
        Some(json!({ "rating": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Place not found" }));
}

#[tokio::test]
async fn catalog_lists_are_served() {
    let app = app(AppState::in_memory());

    let (status, symptoms) = send(&app, Method::GET, "/catalog/symptoms", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(symptoms.as_array().unwrap().contains(&json!("Brain Fog")));

    let (_, treatments) = send(&app, Method::GET, "/catalog/treatments", None).await;
    assert_eq!(treatments[0]["name"], "Metformin");

    let (_, statuses) = send(&app, Method::GET, "/catalog/insight-statuses", None).await;
    assert_eq!(statuses, json!(["IMPROVED", "WORSENED", "NO_CHANGE"]));
}

#[tokio::test]
async fn symptom_logs_group_by_day_and_delete() {
    let app = app(AppState::in_memory());

    for (symptom, start) in [
        ("Acne", "2024-05-02T20:00"),
        ("Brain Fog", "2024-05-01"),
        ("Fatigue", "2024-05-02T07:30"),
    ] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/symptoms",
            Some(json!({ "symptom": symptom, "start_date": start, "intensity": "mild" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, flat) = send(&app, Method::GET, "/symptoms", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(flat[0]["symptom"], "Acne");
    assert_eq!(flat[0]["intensity"], "Mild");
    assert_eq!(flat[2]["symptom"], "Brain Fog");

    let (status, grouped) = send(&app, Method::GET, "/symptoms/by-date", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        grouped,
        json!([
            { "date": "2024-05-01", "symptoms": ["Brain Fog"] },
            { "date": "2024-05-02", "symptoms": ["Acne", "Fatigue"] },
        ])
    );

    let (status, _) = send(&app, Method::DELETE, "/symptoms/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = send(&app, Method::DELETE, "/symptoms/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Symptom log not found" }));
}

#[tokio::test]
async fn symptom_update_replaces_fields() {
    let app = app(AppState::in_memory());
    let (_, created) = send(
        &app,
        Method::POST,
        "/symptoms",
        Some(json!({ "symptom": "Pelvic Pain", "start_date": "2024-05-01", "intensity": "Severe" })),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/symptoms/{id}"),
        Some(json!({ "symptom": "Pelvic Pain", "start_date": "2024-05-01", "end_date": "2024-05-03" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["intensity"], Value::Null);
    assert_eq!(updated["end"], "2024-05-03T00:00:00");

    let (status, _) = send(
        &app,
        Method::PUT,
        "/symptoms/404",
        Some(json!({ "symptom": "Acne", "start_date": "2024-05-01" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        Method::POST,
        "/symptoms",
        Some(json!({ "symptom": "Acne", "start_date": "not a date" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid date format" }));
}

/// Event store whose every call fails, standing in for a broken database.
struct FailingEventStore;

#[async_trait]
impl EventStore for FailingEventStore {
    async fn list_events(&self) -> StoreResult<Vec<Event>> {
        Err(StoreError::Corrupt("events unavailable".into()))
    }

    async fn get_event(&self, _id: i64) -> StoreResult<Option<Event>> {
        Err(StoreError::Corrupt("events unavailable".into()))
    }

    async fn insert_event(&self, _new: NewEvent) -> StoreResult<Event> {
        Err(StoreError::Corrupt("events unavailable".into()))
    }

    async fn update_event(&self, _id: i64, _new: NewEvent) -> StoreResult<Option<Event>> {
        Err(StoreError::Corrupt("events unavailable".into()))
    }

    async fn delete_event(&self, _id: i64) -> StoreResult<Option<Event>> {
        Err(StoreError::Corrupt("events unavailable".into()))
    }

    async fn period_starts(&self) -> StoreResult<Vec<NaiveDateTime>> {
        Err(StoreError::Corrupt("events unavailable".into()))
    }
}

#[tokio::test]
async fn store_failure_is_a_500_with_error_body() {
    let mem = Arc::new(MemoryStore::new());
    let app = app(AppState::new(
        Arc::new(FailingEventStore),
        mem.clone(),
        mem.clone(),
        mem,
    ));

    let (status, body) = send(&app, Method::GET, "/events/cycle-length", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Database error: corrupt row: events unavailable" }));

    let (status, body) = send(&app, Method::GET, "/events", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());

    // Other stores keep working.
    let (status, _) = send(&app, Method::GET, "/symptoms", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn treatment_logs_crud_and_calendar() {
    let app = app(AppState::in_memory());

    let (status, created) = send(
        &app,
        Method::POST,
        "/treatments",
        Some(json!({
            "treatment_name": "Metformin",
            "treatment_type": "medication",
            "start_date": "2024-06-01",
            "description": "500mg with dinner",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["treatment_type"], "Medication");
    assert_eq!(created["end"], Value::Null);
    let id = created["id"].as_i64().unwrap();

    send(
        &app,
        Method::POST,
        "/treatments",
        Some(json!({ "treatment_name": "Regular exercise", "start_date": "2024-05-20", "end_date": "2024-05-30" })),
    )
    .await;

    let (status, list) = send(&app, Method::GET, "/treatments", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list[0]["treatment_name"], "Regular exercise");
    assert_eq!(list[1]["treatment_name"], "Metformin");

    let (_, concise) = send(&app, Method::GET, "/treatments/calendar", None).await;
    assert_eq!(concise[1]["title"], "Treatment: Metformin");
    assert_eq!(concise[1]["allDay"], true);
    assert_eq!(concise[1]["extendedProps"]["type"], "Treatment");
    assert_eq!(concise[1]["extendedProps"]["treatment_name"], "Metformin");

    let (_, detailed) = send(&app, Method::GET, "/treatments/calendar?detailed=true", None).await;
    assert_eq!(detailed[0]["title"], "Regular exercise");
    assert_eq!(detailed[1]["title"], "Metformin: 500mg with dinner");

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/treatments/{id}"),
        Some(json!({ "treatment_name": "Metformin", "start_date": "2024-06-01", "end_date": "2024-06-30" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["end"], "2024-06-30T00:00:00");
    assert_eq!(updated["description"], Value::Null);

    let (status, _) = send(&app, Method::DELETE, &format!("/treatments/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = send(&app, Method::DELETE, &format!("/treatments/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Treatment log not found" }));
}

#[tokio::test]
async fn treatment_logs_reject_bad_input() {
    let app = app(AppState::in_memory());

    let (status, body) = send(&app, Method::POST, "/treatments", Some(json!({ "start_date": "2024-06-01" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Missing required fields" }));

    let (status, _) = send(
        &app,
        Method::POST,
        "/treatments",
        Some(json!({ "treatment_name": "Metformin", "start_date": "2024-06-01", "treatment_type": "Homeopathy" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/treatments/77",
        Some(json!({ "treatment_name": "Metformin", "start_date": "2024-06-01" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
