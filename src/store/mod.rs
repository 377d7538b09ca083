//! Persistence seams for events, places, symptom and treatment logs.
//!
//! Handlers only see the [`EventStore`], [`PlaceStore`], [`SymptomStore`]
//! and [`TreatmentStore`] traits. The server binds them to [`PgStore`] when a database is
//! configured and to [`MemoryStore`] otherwise; tests always use the
//! in-memory one.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    Event, NewEvent, NewPlace, NewReview, NewSymptomLog, NewTreatmentLog, Place, Review,
    SymptomLog, TreatmentLog,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error("corrupt row: {0}")]
    Corrupt(String),
}

#[async_trait]
pub trait EventStore: Send + Sync {
    /// All events, ordered by start ascending.
    async fn list_events(&self) -> StoreResult<Vec<Event>>;

    async fn get_event(&self, id: i64) -> StoreResult<Option<Event>>;

    async fn insert_event(&self, new: NewEvent) -> StoreResult<Event>;

    /// Replaces every field of an existing event. `None` when the id is unknown.
    async fn update_event(&self, id: i64, new: NewEvent) -> StoreResult<Option<Event>>;

    /// Removes the event together with its subtype data and returns what was removed.
    async fn delete_event(&self, id: i64) -> StoreResult<Option<Event>>;

    /// Start timestamps of all Period events, ascending.
    async fn period_starts(&self) -> StoreResult<Vec<NaiveDateTime>>;
}

#[async_trait]
pub trait PlaceStore: Send + Sync {
    /// All places, ordered by name.
    async fn list_places(&self) -> StoreResult<Vec<Place>>;

    async fn get_place(&self, id: Uuid) -> StoreResult<Option<Place>>;

    async fn insert_place(&self, new: NewPlace) -> StoreResult<Place>;

    /// Reviews of a place, oldest first.
    async fn list_reviews(&self, place_id: Uuid) -> StoreResult<Vec<Review>>;

    /// Stores the review and refreshes the place's average rating.
    /// `None` when the place does not exist.
    async fn add_review(&self, place_id: Uuid, new: NewReview) -> StoreResult<Option<(Review, f64)>>;
}

#[async_trait]
pub trait SymptomStore: Send + Sync {
    /// All symptom logs, newest start first.
    async fn list_symptoms(&self) -> StoreResult<Vec<SymptomLog>>;

    async fn insert_symptom(&self, new: NewSymptomLog) -> StoreResult<SymptomLog>;

    async fn update_symptom(&self, id: i64, new: NewSymptomLog) -> StoreResult<Option<SymptomLog>>;

    /// `false` when nothing matched.
    async fn delete_symptom(&self, id: i64) -> StoreResult<bool>;
}

#[async_trait]
pub trait TreatmentStore: Send + Sync {
    /// All treatment logs, oldest start first.
    async fn list_treatments(&self) -> StoreResult<Vec<TreatmentLog>>;

    async fn insert_treatment(&self, new: NewTreatmentLog) -> StoreResult<TreatmentLog>;

    async fn update_treatment(&self, id: i64, new: NewTreatmentLog) -> StoreResult<Option<TreatmentLog>>;

    async fn delete_treatment(&self, id: i64) -> StoreResult<bool>;
}
