use std::sync::Arc;

use crate::store::{EventStore, MemoryStore, PlaceStore, SymptomStore, TreatmentStore};

/// Handles every route needs; cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub events: Arc<dyn EventStore>,
    pub places: Arc<dyn PlaceStore>,
    pub symptoms: Arc<dyn SymptomStore>,
    pub treatments: Arc<dyn TreatmentStore>,
}

impl AppState {
    pub fn new(
        events: Arc<dyn EventStore>,
        places: Arc<dyn PlaceStore>,
        symptoms: Arc<dyn SymptomStore>,
        treatments: Arc<dyn TreatmentStore>,
    ) -> Self {
        Self {
            events,
            places,
            symptoms,
            treatments,
        }
    }

    /// Binds every store to one backend implementing all of them.
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: EventStore + PlaceStore + SymptomStore + TreatmentStore + 'static,
    {
        Self::new(store.clone(), store.clone(), store.clone(), store)
    }

    pub fn in_memory() -> Self {
        Self::shared(Arc::new(MemoryStore::new()))
    }
}
