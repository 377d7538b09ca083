use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{EventStore, PlaceStore, StoreResult, SymptomStore, TreatmentStore};
use crate::models::{
    average_rating, Event, EventType, NewEvent, NewPlace, NewReview, NewSymptomLog,
    NewTreatmentLog, Place, Review, SymptomLog, TreatmentLog,
};

/// Process-local store, used when no database is configured and in tests.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    last_event_id: i64,
    events: BTreeMap<i64, Event>,
    places: HashMap<Uuid, Place>,
    reviews: Vec<Review>,
    last_symptom_id: i64,
    symptoms: BTreeMap<i64, SymptomLog>,
    last_treatment_id: i64,
    treatments: BTreeMap<i64, TreatmentLog>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn list_events(&self) -> StoreResult<Vec<Event>> {
        let inner = self.inner.read().await;
        let mut events: Vec<Event> = inner.events.values().cloned().collect();
        events.sort_by_key(|e| (e.start, e.id));
        Ok(events)
    }

    async fn get_event(&self, id: i64) -> StoreResult<Option<Event>> {
        Ok(self.inner.read().await.events.get(&id).cloned())
    }

    async fn insert_event(&self, new: NewEvent) -> StoreResult<Event> {
        let mut inner = self.inner.write().await;
        inner.last_event_id += 1;
        let event = Event::from_new(inner.last_event_id, new);
        inner.events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn update_event(&self, id: i64, new: NewEvent) -> StoreResult<Option<Event>> {
        let mut inner = self.inner.write().await;
        Ok(inner.events.get_mut(&id).map(|slot| {
            *slot = Event::from_new(id, new);
            slot.clone()
        }))
    }

    async fn delete_event(&self, id: i64) -> StoreResult<Option<Event>> {
        Ok(self.inner.write().await.events.remove(&id))
    }

    async fn period_starts(&self) -> StoreResult<Vec<NaiveDateTime>> {
        let inner = self.inner.read().await;
        let mut starts: Vec<NaiveDateTime> = inner
            .events
            .values()
            .filter(|e| e.kind.event_type() == EventType::Period)
            .map(|e| e.start)
            .collect();
        starts.sort();
        Ok(starts)
    }
}

#[async_trait]
impl PlaceStore for MemoryStore {
    async fn list_places(&self) -> StoreResult<Vec<Place>> {
        let inner = self.inner.read().await;
        let mut places: Vec<Place> = inner.places.values().cloned().collect();
        places.sort_by(|a, b| a.name.cmp(&b.name).then(a.created_at.cmp(&b.created_at)));
        Ok(places)
    }

    async fn get_place(&self, id: Uuid) -> StoreResult<Option<Place>> {
        Ok(self.inner.read().await.places.get(&id).cloned())
    }

    async fn insert_place(&self, new: NewPlace) -> StoreResult<Place> {
        let place = Place {
            id: Uuid::new_v4(),
            name: new.name,
            address: new.address,
            link: new.link,
            latitude: new.latitude,
            longitude: new.longitude,
            posted_by: new.posted_by,
            average_rating: None,
            created_at: Utc::now(),
        };
        self.inner.write().await.places.insert(place.id, place.clone());
        Ok(place)
    }

    async fn list_reviews(&self, place_id: Uuid) -> StoreResult<Vec<Review>> {
        let inner = self.inner.read().await;
        Ok(inner
            .reviews
            .iter()
            .filter(|r| r.place_id == place_id)
            .cloned()
            .collect())
    }

    async fn add_review(&self, place_id: Uuid, new: NewReview) -> StoreResult<Option<(Review, f64)>> {
        let mut inner = self.inner.write().await;
        if !inner.places.contains_key(&place_id) {
            return Ok(None);
        }

        let review = Review {
            id: Uuid::new_v4(),
            place_id,
            author: new.author,
            rating: new.rating,
            comment: new.comment,
            created_at: Utc::now(),
        };
        inner.reviews.push(review.clone());

        let of_place: Vec<Review> = inner
            .reviews
            .iter()
            .filter(|r| r.place_id == place_id)
            .cloned()
            .collect();
        let average = average_rating(&of_place).unwrap_or(review.rating as f64);
        if let Some(place) = inner.places.get_mut(&place_id) {
            place.average_rating = Some(average);
        }

        Ok(Some((review, average)))
    }
}

#[async_trait]
impl SymptomStore for MemoryStore {
    async fn list_symptoms(&self) -> StoreResult<Vec<SymptomLog>> {
        let inner = self.inner.read().await;
        let mut logs: Vec<SymptomLog> = inner.symptoms.values().cloned().collect();
        logs.sort_by(|a, b| b.start.cmp(&a.start).then(b.id.cmp(&a.id)));
        Ok(logs)
    }

    async fn insert_symptom(&self, new: NewSymptomLog) -> StoreResult<SymptomLog> {
        let mut inner = self.inner.write().await;
        inner.last_symptom_id += 1;
        let log = SymptomLog::from_new(inner.last_symptom_id, new);
        inner.symptoms.insert(log.id, log.clone());
        Ok(log)
    }

    async fn update_symptom(&self, id: i64, new: NewSymptomLog) -> StoreResult<Option<SymptomLog>> {
        let mut inner = self.inner.write().await;
        Ok(inner.symptoms.get_mut(&id).map(|slot| {
            *slot = SymptomLog::from_new(id, new);
            slot.clone()
        }))
    }

    async fn delete_symptom(&self, id: i64) -> StoreResult<bool> {
        Ok(self.inner.write().await.symptoms.remove(&id).is_some())
    }
}

#[async_trait]
impl TreatmentStore for MemoryStore {
    async fn list_treatments(&self) -> StoreResult<Vec<TreatmentLog>> {
        let inner = self.inner.read().await;
        let mut logs: Vec<TreatmentLog> = inner.treatments.values().cloned().collect();
        logs.sort_by_key(|log| (log.start, log.id));
        Ok(logs)
    }

    async fn insert_treatment(&self, new: NewTreatmentLog) -> StoreResult<TreatmentLog> {
        let mut inner = self.inner.write().await;
        inner.last_treatment_id += 1;
        let log = TreatmentLog::from_new(inner.last_treatment_id, new);
        inner.treatments.insert(log.id, log.clone());
        Ok(log)
    }

    async fn update_treatment(&self, id: i64, new: NewTreatmentLog) -> StoreResult<Option<TreatmentLog>> {
        let mut inner = self.inner.write().await;
        Ok(inner.treatments.get_mut(&id).map(|slot| {
            *slot = TreatmentLog::from_new(id, new);
            slot.clone()
        }))
    }

    async fn delete_treatment(&self, id: i64) -> StoreResult<bool> {
        Ok(self.inner.write().await.treatments.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventKind, Flow};
    use chrono::NaiveDate;

    fn period(y: i32, m: u32, d: u32) -> NewEvent {
        let start = NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap();
        NewEvent {
            kind: EventKind::Period { flow: Some(Flow::Medium) },
            start,
            end: start + chrono::Duration::days(4),
            description: None,
        }
    }

    #[tokio::test]
    async fn ids_are_sequential_and_survive_deletes() {
        let store = MemoryStore::new();
        let a = store.insert_event(period(2024, 1, 1)).await.unwrap();
        let b = store.insert_event(period(2024, 1, 29)).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));

        store.delete_event(b.id).await.unwrap();
        let c = store.insert_event(period(2024, 2, 26)).await.unwrap();
        assert_eq!(c.id, 3);
    }

    #[tokio::test]
    async fn period_starts_skip_other_types_and_sort() {
        let store = MemoryStore::new();
        store.insert_event(period(2024, 3, 1)).await.unwrap();
        let mut note = period(2024, 2, 1);
        note.kind = EventKind::Note;
        store.insert_event(note).await.unwrap();
        store.insert_event(period(2024, 1, 1)).await.unwrap();

        let starts = store.period_starts().await.unwrap();
        assert_eq!(starts.len(), 2);
        assert!(starts[0] < starts[1]);
    }

    #[tokio::test]
    async fn update_of_missing_event_is_none() {
        let store = MemoryStore::new();
        assert!(store.update_event(42, period(2024, 1, 1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn symptoms_list_newest_first() {
        let store = MemoryStore::new();
        for day in [3, 9, 5] {
            let start = NaiveDate::from_ymd_opt(2024, 6, day).unwrap().and_hms_opt(0, 0, 0).unwrap();
            store
                .insert_symptom(NewSymptomLog {
                    symptom: "Headaches".into(),
                    intensity: None,
                    start,
                    end: None,
                    description: None,
                })
                .await
                .unwrap();
        }

        let days: Vec<u32> = store
            .list_symptoms()
            .await
            .unwrap()
            .iter()
            .map(|log| chrono::Datelike::day(&log.start))
            .collect();
        assert_eq!(days, vec![9, 5, 3]);
        assert!(store.delete_symptom(2).await.unwrap());
        assert!(!store.delete_symptom(2).await.unwrap());
    }

    #[tokio::test]
    async fn review_refreshes_place_average() {
        let store = MemoryStore::new();
        let place = store
            .insert_place(NewPlace {
                name: "Women's Health Clinic".into(),
                address: "12 Elm St".into(),
                link: None,
                latitude: 40.0,
                longitude: -75.0,
                posted_by: None,
            })
            .await
            .unwrap();

        for rating in [4, 5] {
            store
                .add_review(place.id, NewReview { rating, comment: None, author: None })
                .await
                .unwrap()
                .unwrap();
        }

        let stored = store.get_place(place.id).await.unwrap().unwrap();
        assert_eq!(stored.average_rating, Some(4.5));
        assert!(store
            .add_review(Uuid::new_v4(), NewReview { rating: 3, comment: None, author: None })
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn treatments_list_oldest_first_and_update_in_place() {
        let store = MemoryStore::new();
        let log = |day: u32| NewTreatmentLog {
            treatment_name: "Metformin".into(),
            treatment_type: Some("Medication".into()),
            start: NaiveDate::from_ymd_opt(2024, 6, day).unwrap().and_hms_opt(0, 0, 0).unwrap(),
            end: None,
            description: None,
        };
        store.insert_treatment(log(12)).await.unwrap();
        store.insert_treatment(log(2)).await.unwrap();

        let ids: Vec<i64> = store.list_treatments().await.unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 1]);

        let mut replacement = log(20);
        replacement.treatment_name = "Myo-inositol".into();
        let updated = store.update_treatment(2, replacement).await.unwrap().unwrap();
        assert_eq!((updated.id, updated.treatment_name.as_str()), (2, "Myo-inositol"));
        assert!(store.update_treatment(9, log(1)).await.unwrap().is_none());
        assert!(store.delete_treatment(1).await.unwrap());
    }
}
