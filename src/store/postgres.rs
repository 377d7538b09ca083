use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use super::{EventStore, PlaceStore, StoreError, StoreResult, SymptomStore, TreatmentStore};
use crate::models::{
    Event, EventKind, Flow, Intensity, NewEvent, NewPlace, NewReview, NewSymptomLog,
    NewTreatmentLog, Place, Review, SymptomLog, TreatmentLog,
};

const EVENT_COLUMNS: &str = "id, kind, start_date, end_date, description, flow, confirmed";
const PLACE_COLUMNS: &str =
    "id, name, address, link, latitude, longitude, posted_by, average_rating, created_at";
const REVIEW_COLUMNS: &str = "id, place_id, author, rating, comment, created_at";
const SYMPTOM_COLUMNS: &str = "id, symptom, intensity, start_date, end_date, description";
const TREATMENT_COLUMNS: &str =
    "id, treatment_name, treatment_type, start_date, end_date, description";

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(db_error)?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn db_error(e: sqlx::Error) -> StoreError {
    if let Some(db_err) = e.as_database_error() {
        tracing::error!("❌ DB query failed: {}", db_err.message());

        if let Some(code) = db_err.code() {
            tracing::info!("ℹ️ SQLSTATE code: {}", code);
        }

        if let Some(constraint) = db_err.constraint() {
            tracing::info!("🔒 Constraint violated: {}", constraint);
        }
    } else {
        tracing::error!("❌ DB error: {}", e);
    }

    StoreError::Database(e)
}

/// One row of `events`; subtype columns are null unless the kind uses them.
#[derive(sqlx::FromRow)]
struct EventRow {
    id: i64,
    kind: String,
    start_date: NaiveDateTime,
    end_date: NaiveDateTime,
    description: Option<String>,
    flow: Option<String>,
    confirmed: Option<bool>,
}

impl TryFrom<EventRow> for Event {
    type Error = StoreError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let corrupt = |msg: String| StoreError::Corrupt(format!("event {}: {msg}", row.id));

        let kind = match row.kind.as_str() {
            "Period" => EventKind::Period {
                flow: row.flow.as_deref().map(str::parse::<Flow>).transpose().map_err(corrupt)?,
            },
            "Ovulation" => EventKind::Ovulation {
                confirmed: row.confirmed.unwrap_or(false),
            },
            "Spotting" => EventKind::Spotting,
            "Note" => EventKind::Note,
            other => return Err(corrupt(format!("unknown event kind '{other}'"))),
        };

        Ok(Event {
            id: row.id,
            kind,
            start: row.start_date,
            end: row.end_date,
            description: row.description,
        })
    }
}

fn subtype_columns(kind: &EventKind) -> (&'static str, Option<&'static str>, Option<bool>) {
    (
        kind.event_type().as_str(),
        kind.flow().map(|f| f.as_str()),
        kind.confirmed(),
    )
}

#[async_trait]
impl EventStore for PgStore {
    async fn list_events(&self) -> StoreResult<Vec<Event>> {
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events ORDER BY start_date ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter().map(Event::try_from).collect()
    }

    async fn get_event(&self, id: i64) -> StoreResult<Option<Event>> {
        sqlx::query_as::<_, EventRow>(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .map(Event::try_from)
            .transpose()
    }

    async fn insert_event(&self, new: NewEvent) -> StoreResult<Event> {
        let (kind, flow, confirmed) = subtype_columns(&new.kind);
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "INSERT INTO events (kind, start_date, end_date, description, flow, confirmed)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(kind)
        .bind(new.start)
        .bind(new.end)
        .bind(&new.description)
        .bind(flow)
        .bind(confirmed)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        Event::try_from(row)
    }

    async fn update_event(&self, id: i64, new: NewEvent) -> StoreResult<Option<Event>> {
        let (kind, flow, confirmed) = subtype_columns(&new.kind);
        sqlx::query_as::<_, EventRow>(&format!(
            "UPDATE events
             SET kind = $2, start_date = $3, end_date = $4, description = $5, flow = $6, confirmed = $7
             WHERE id = $1
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(id)
        .bind(kind)
        .bind(new.start)
        .bind(new.end)
        .bind(&new.description)
        .bind(flow)
        .bind(confirmed)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        .map(Event::try_from)
        .transpose()
    }

    async fn delete_event(&self, id: i64) -> StoreResult<Option<Event>> {
        sqlx::query_as::<_, EventRow>(&format!(
            "DELETE FROM events WHERE id = $1 RETURNING {EVENT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        .map(Event::try_from)
        .transpose()
    }

    async fn period_starts(&self) -> StoreResult<Vec<NaiveDateTime>> {
        sqlx::query_scalar::<_, NaiveDateTime>(
            "SELECT start_date FROM events WHERE kind = 'Period' ORDER BY start_date ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)
    }
}

#[async_trait]
impl PlaceStore for PgStore {
    async fn list_places(&self) -> StoreResult<Vec<Place>> {
        sqlx::query_as::<_, Place>(&format!(
            "SELECT {PLACE_COLUMNS} FROM places ORDER BY name ASC, created_at ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)
    }

    async fn get_place(&self, id: Uuid) -> StoreResult<Option<Place>> {
        sqlx::query_as::<_, Place>(&format!("SELECT {PLACE_COLUMNS} FROM places WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)
    }

    async fn insert_place(&self, new: NewPlace) -> StoreResult<Place> {
        sqlx::query_as::<_, Place>(&format!(
            "INSERT INTO places (id, name, address, link, latitude, longitude, posted_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {PLACE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&new.name)
        .bind(&new.address)
        .bind(&new.link)
        .bind(new.latitude)
        .bind(new.longitude)
        .bind(&new.posted_by)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)
    }

    async fn list_reviews(&self, place_id: Uuid) -> StoreResult<Vec<Review>> {
        sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE place_id = $1 ORDER BY created_at ASC"
        ))
        .bind(place_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)
    }

    async fn add_review(&self, place_id: Uuid, new: NewReview) -> StoreResult<Option<(Review, f64)>> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let place = sqlx::query_scalar::<_, Uuid>("SELECT id FROM places WHERE id = $1 FOR UPDATE")
            .bind(place_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error)?;
        if place.is_none() {
            return Ok(None);
        }

        let review = sqlx::query_as::<_, Review>(&format!(
            "INSERT INTO reviews (id, place_id, author, rating, comment)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(place_id)
        .bind(&new.author)
        .bind(new.rating)
        .bind(&new.comment)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error)?;

        let average = sqlx::query_scalar::<_, Option<f64>>(
            "UPDATE places
             SET average_rating = (SELECT AVG(rating)::float8 FROM reviews WHERE place_id = $1)
             WHERE id = $1
             RETURNING average_rating",
        )
        .bind(place_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error)?
        .unwrap_or(review.rating as f64);

        tx.commit().await.map_err(db_error)?;
        Ok(Some((review, average)))
    }
}

#[derive(sqlx::FromRow)]
struct SymptomRow {
    id: i64,
    symptom: String,
    intensity: Option<String>,
    start_date: NaiveDateTime,
    end_date: Option<NaiveDateTime>,
    description: Option<String>,
}

impl TryFrom<SymptomRow> for SymptomLog {
    type Error = StoreError;

    fn try_from(row: SymptomRow) -> Result<Self, Self::Error> {
        let intensity = row
            .intensity
            .as_deref()
            .map(str::parse::<Intensity>)
            .transpose()
            .map_err(|msg| StoreError::Corrupt(format!("symptom log {}: {msg}", row.id)))?;

        Ok(SymptomLog {
            id: row.id,
            symptom: row.symptom,
            intensity,
            start: row.start_date,
            end: row.end_date,
            description: row.description,
        })
    }
}

#[async_trait]
impl SymptomStore for PgStore {
    async fn list_symptoms(&self) -> StoreResult<Vec<SymptomLog>> {
        let rows = sqlx::query_as::<_, SymptomRow>(&format!(
            "SELECT {SYMPTOM_COLUMNS} FROM symptom_logs ORDER BY start_date DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter().map(SymptomLog::try_from).collect()
    }

    async fn insert_symptom(&self, new: NewSymptomLog) -> StoreResult<SymptomLog> {
        let row = sqlx::query_as::<_, SymptomRow>(&format!(
            "INSERT INTO symptom_logs (symptom, intensity, start_date, end_date, description)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {SYMPTOM_COLUMNS}"
        ))
        .bind(&new.symptom)
        .bind(new.intensity.map(|i| i.as_str()))
        .bind(new.start)
        .bind(new.end)
        .bind(&new.description)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        SymptomLog::try_from(row)
    }

    async fn update_symptom(&self, id: i64, new: NewSymptomLog) -> StoreResult<Option<SymptomLog>> {
        sqlx::query_as::<_, SymptomRow>(&format!(
            "UPDATE symptom_logs
             SET symptom = $2, intensity = $3, start_date = $4, end_date = $5, description = $6
             WHERE id = $1
             RETURNING {SYMPTOM_COLUMNS}"
        ))
        .bind(id)
        .bind(&new.symptom)
        .bind(new.intensity.map(|i| i.as_str()))
        .bind(new.start)
        .bind(new.end)
        .bind(&new.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        .map(SymptomLog::try_from)
        .transpose()
    }

    async fn delete_symptom(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM symptom_logs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(sqlx::FromRow)]
struct TreatmentRow {
    id: i64,
    treatment_name: String,
    treatment_type: Option<String>,
    start_date: NaiveDateTime,
    end_date: Option<NaiveDateTime>,
    description: Option<String>,
}

impl From<TreatmentRow> for TreatmentLog {
    fn from(row: TreatmentRow) -> Self {
        Self {
            id: row.id,
            treatment_name: row.treatment_name,
            treatment_type: row.treatment_type,
            start: row.start_date,
            end: row.end_date,
            description: row.description,
        }
    }
}

#[async_trait]
impl TreatmentStore for PgStore {
    async fn list_treatments(&self) -> StoreResult<Vec<TreatmentLog>> {
        let rows = sqlx::query_as::<_, TreatmentRow>(&format!(
            "SELECT {TREATMENT_COLUMNS} FROM treatment_logs ORDER BY start_date ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows.into_iter().map(TreatmentLog::from).collect())
    }

    async fn insert_treatment(&self, new: NewTreatmentLog) -> StoreResult<TreatmentLog> {
        let row = sqlx::query_as::<_, TreatmentRow>(&format!(
            "INSERT INTO treatment_logs (treatment_name, treatment_type, start_date, end_date, description)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {TREATMENT_COLUMNS}"
        ))
        .bind(&new.treatment_name)
        .bind(&new.treatment_type)
        .bind(new.start)
        .bind(new.end)
        .bind(&new.description)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.into())
    }

    async fn update_treatment(&self, id: i64, new: NewTreatmentLog) -> StoreResult<Option<TreatmentLog>> {
        let row = sqlx::query_as::<_, TreatmentRow>(&format!(
            "UPDATE treatment_logs
             SET treatment_name = $2, treatment_type = $3, start_date = $4, end_date = $5, description = $6
             WHERE id = $1
             RETURNING {TREATMENT_COLUMNS}"
        ))
        .bind(id)
        .bind(&new.treatment_name)
        .bind(&new.treatment_type)
        .bind(new.start)
        .bind(new.end)
        .bind(&new.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(TreatmentLog::from))
    }

    async fn delete_treatment(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM treatment_logs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
