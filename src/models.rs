use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{catalog::TREATMENT_TYPES, dates::parse_date, error::AppError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EventType {
    Period,
    Ovulation,
    Spotting,
    Note,
}

impl EventType {
    pub const ALL: [EventType; 4] = [
        EventType::Period,
        EventType::Ovulation,
        EventType::Spotting,
        EventType::Note,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Period => "Period",
            EventType::Ovulation => "Ovulation",
            EventType::Spotting => "Spotting",
            EventType::Note => "Note",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Accepts both "Period" and the upper-case "PERIOD" older clients send.
impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Invalid event type: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Flow {
    Light,
    Medium,
    Heavy,
}

impl Flow {
    pub fn as_str(&self) -> &'static str {
        match self {
            Flow::Light => "Light",
            Flow::Medium => "Medium",
            Flow::Heavy => "Heavy",
        }
    }
}

impl FromStr for Flow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Flow::Light, Flow::Medium, Flow::Heavy]
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Invalid flow: {s}"))
    }
}

/// Subtype data of an event, selected by its type.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    Period { flow: Option<Flow> },
    Ovulation { confirmed: bool },
    Spotting,
    Note,
}

impl EventKind {
    pub fn event_type(&self) -> EventType {
        match self {
            EventKind::Period { .. } => EventType::Period,
            EventKind::Ovulation { .. } => EventType::Ovulation,
            EventKind::Spotting => EventType::Spotting,
            EventKind::Note => EventType::Note,
        }
    }

    pub fn flow(&self) -> Option<Flow> {
        match self {
            EventKind::Period { flow } => *flow,
            _ => None,
        }
    }

    pub fn confirmed(&self) -> Option<bool> {
        match self {
            EventKind::Ovulation { confirmed } => Some(*confirmed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: i64,
    pub kind: EventKind,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub description: Option<String>,
}

impl Event {
    pub fn from_new(id: i64, new: NewEvent) -> Self {
        Self {
            id,
            kind: new.kind,
            start: new.start,
            end: new.end,
            description: new.description,
        }
    }

    pub fn calendar_title(&self, detailed: bool) -> String {
        let kind = self.kind.event_type();
        match self.description.as_deref() {
            Some(desc) if detailed && !desc.is_empty() => format!("{kind}: {desc}"),
            _ => kind.to_string(),
        }
    }
}

/// A validated event, ready to insert or to replace an existing one.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub kind: EventKind,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventPayload {
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub description: Option<String>,
    pub flow: Option<String>,
    pub confirmed: Option<bool>,
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl EventPayload {
    pub fn validate(self) -> Result<NewEvent, AppError> {
        let (Some(event_type), Some(start), Some(end)) = (
            present(&self.event_type),
            present(&self.start_date),
            present(&self.end_date),
        ) else {
            return Err(AppError::bad_request("Missing required fields"));
        };

        let event_type: EventType = event_type.parse().map_err(AppError::BadRequest)?;

        let (Some(start), Some(end)) = (parse_date(start), parse_date(end)) else {
            return Err(AppError::bad_request("Invalid date format"));
        };
        if start > end {
            return Err(AppError::bad_request("Start date must not be after end date"));
        }

        let flow = present(&self.flow)
            .map(str::parse::<Flow>)
            .transpose()
            .map_err(AppError::BadRequest)?;
        if flow.is_some() && event_type != EventType::Period {
            return Err(AppError::bad_request("Flow is only valid for Period events"));
        }
        if self.confirmed.is_some() && event_type != EventType::Ovulation {
            return Err(AppError::bad_request("Confirmed is only valid for Ovulation events"));
        }

        let kind = match event_type {
            EventType::Period => EventKind::Period { flow },
            EventType::Ovulation => EventKind::Ovulation {
                confirmed: self.confirmed.unwrap_or(false),
            },
            EventType::Spotting => EventKind::Spotting,
            EventType::Note => EventKind::Note,
        };

        Ok(NewEvent {
            kind,
            start,
            end,
            description: self.description.filter(|d| !d.trim().is_empty()),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub id: i64,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow: Option<Flow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmed: Option<bool>,
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        Self {
            id: event.id,
            event_type: event.kind.event_type(),
            start: event.start,
            end: event.end,
            flow: event.kind.flow(),
            confirmed: event.kind.confirmed(),
            description: event.description,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeletedEvent {
    pub message: &'static str,
    pub event_type: EventType,
    pub deleted_event_id: i64,
}

#[derive(Debug, Serialize)]
pub struct CalendarItem {
    pub id: String,
    pub title: String,
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
    #[serde(rename = "allDay")]
    pub all_day: bool,
    #[serde(rename = "extendedProps")]
    pub extended_props: CalendarProps,
}

#[derive(Debug, Serialize)]
pub struct CalendarProps {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treatment_name: Option<String>,
}

impl CalendarItem {
    pub fn from_event(event: Event, detailed: bool) -> Self {
        Self {
            id: event.id.to_string(),
            title: event.calendar_title(detailed),
            start: event.start,
            end: Some(event.end),
            all_day: true,
            extended_props: CalendarProps {
                kind: event.kind.event_type().as_str(),
                description: event.description,
                treatment_name: None,
            },
        }
    }

    pub fn from_treatment(log: TreatmentLog, detailed: bool) -> Self {
        Self {
            id: log.id.to_string(),
            title: log.calendar_title(detailed),
            start: log.start,
            end: log.end,
            all_day: true,
            extended_props: CalendarProps {
                kind: "Treatment",
                description: log.description,
                treatment_name: Some(log.treatment_name),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Place {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub link: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub posted_by: Option<String>,
    pub average_rating: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Review {
    pub id: Uuid,
    pub place_id: Uuid,
    pub author: Option<String>,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPlace {
    pub name: String,
    pub address: String,
    pub link: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub posted_by: Option<String>,
}

impl NewPlace {
    pub fn validate(self) -> Result<NewPlace, AppError> {
        let name = self.name.trim().to_string();
        let address = self.address.trim().to_string();
        if name.is_empty() || address.is_empty() {
            return Err(AppError::bad_request("Name and address are required"));
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(AppError::bad_request("Latitude must be between -90 and 90"));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(AppError::bad_request("Longitude must be between -180 and 180"));
        }

        let link = self.link.map(|l| l.trim().to_string()).filter(|l| !l.is_empty());
        if let Some(link) = &link {
            if !(link.starts_with("http://") || link.starts_with("https://")) {
                return Err(AppError::bad_request("Link must be an http(s) URL"));
            }
        }

        Ok(NewPlace {
            name,
            address,
            link,
            latitude: self.latitude,
            longitude: self.longitude,
            posted_by: self.posted_by.filter(|p| !p.trim().is_empty()),
        })
    }
}

pub const MAX_COMMENT_LEN: usize = 500;

#[derive(Debug, Clone, Deserialize)]
pub struct NewReview {
    pub rating: i32,
    pub comment: Option<String>,
    pub author: Option<String>,
}

impl NewReview {
    pub fn validate(self) -> Result<NewReview, AppError> {
        if !(1..=5).contains(&self.rating) {
            return Err(AppError::bad_request("Rating must be between 1 and 5"));
        }
        let comment = self.comment.filter(|c| !c.trim().is_empty());
        if comment.as_ref().is_some_and(|c| c.chars().count() > MAX_COMMENT_LEN) {
            return Err(AppError::bad_request(format!(
                "Comment must be at most {MAX_COMMENT_LEN} characters"
            )));
        }

        Ok(NewReview {
            rating: self.rating,
            comment,
            author: self.author.filter(|a| !a.trim().is_empty()),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct PlaceDetail {
    pub place: Place,
    pub reviews: Vec<Review>,
}

#[derive(Debug, Serialize)]
pub struct ReviewCreated {
    pub review: Review,
    pub average_rating: f64,
}

pub fn average_rating(reviews: &[Review]) -> Option<f64> {
    if reviews.is_empty() {
        return None;
    }
    let total: i64 = reviews.iter().map(|r| r.rating as i64).sum();
    Some(total as f64 / reviews.len() as f64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Intensity {
    Mild,
    Moderate,
    Severe,
}

impl Intensity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intensity::Mild => "Mild",
            Intensity::Moderate => "Moderate",
            Intensity::Severe => "Severe",
        }
    }
}

impl FromStr for Intensity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Intensity::Mild, Intensity::Moderate, Intensity::Severe]
            .into_iter()
            .find(|i| i.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Invalid intensity: {s}"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymptomLog {
    pub id: i64,
    pub symptom: String,
    pub intensity: Option<Intensity>,
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
    pub description: Option<String>,
}

impl SymptomLog {
    pub fn from_new(id: i64, new: NewSymptomLog) -> Self {
        Self {
            id,
            symptom: new.symptom,
            intensity: new.intensity,
            start: new.start,
            end: new.end,
            description: new.description,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSymptomLog {
    pub symptom: String,
    pub intensity: Option<Intensity>,
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
    pub description: Option<String>,
}

pub const MAX_SYMPTOM_LEN: usize = 100;

#[derive(Debug, Default, Deserialize)]
pub struct SymptomPayload {
    pub symptom: Option<String>,
    pub intensity: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub description: Option<String>,
}

impl SymptomPayload {
    pub fn validate(self) -> Result<NewSymptomLog, AppError> {
        let (Some(symptom), Some(start)) = (present(&self.symptom), present(&self.start_date)) else {
            return Err(AppError::bad_request("Missing required fields"));
        };
        if symptom.chars().count() > MAX_SYMPTOM_LEN {
            return Err(AppError::bad_request(format!(
                "Symptom must be at most {MAX_SYMPTOM_LEN} characters"
            )));
        }

        let start = parse_date(start).ok_or_else(|| AppError::bad_request("Invalid date format"))?;
        let end = present(&self.end_date)
            .map(|end| parse_date(end).ok_or_else(|| AppError::bad_request("Invalid date format")))
            .transpose()?;
        if end.is_some_and(|end| end < start) {
            return Err(AppError::bad_request("Start date must not be after end date"));
        }

        let intensity = present(&self.intensity)
            .map(str::parse::<Intensity>)
            .transpose()
            .map_err(AppError::BadRequest)?;

        Ok(NewSymptomLog {
            symptom: symptom.to_string(),
            intensity,
            start,
            end,
            description: self.description.filter(|d| !d.trim().is_empty()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreatmentLog {
    pub id: i64,
    pub treatment_name: String,
    pub treatment_type: Option<String>,
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
    pub description: Option<String>,
}

impl TreatmentLog {
    pub fn from_new(id: i64, new: NewTreatmentLog) -> Self {
        Self {
            id,
            treatment_name: new.treatment_name,
            treatment_type: new.treatment_type,
            start: new.start,
            end: new.end,
            description: new.description,
        }
    }

    /// Detailed: `"<name>: <description>"`, or the name alone.
    /// Concise: `"Treatment: <name>"`.
    pub fn calendar_title(&self, detailed: bool) -> String {
        if !detailed {
            return format!("Treatment: {}", self.treatment_name);
        }
        match self.description.as_deref() {
            Some(desc) if !desc.is_empty() => format!("{}: {desc}", self.treatment_name),
            _ => self.treatment_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTreatmentLog {
    pub treatment_name: String,
    pub treatment_type: Option<String>,
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
    pub description: Option<String>,
}

pub const MAX_TREATMENT_NAME_LEN: usize = 100;

#[derive(Debug, Default, Deserialize)]
pub struct TreatmentPayload {
    pub treatment_name: Option<String>,
    pub treatment_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub description: Option<String>,
}

impl TreatmentPayload {
    pub fn validate(self) -> Result<NewTreatmentLog, AppError> {
        let (Some(name), Some(start)) = (present(&self.treatment_name), present(&self.start_date))
        else {
            return Err(AppError::bad_request("Missing required fields"));
        };
        if name.chars().count() > MAX_TREATMENT_NAME_LEN {
            return Err(AppError::bad_request(format!(
                "Treatment name must be at most {MAX_TREATMENT_NAME_LEN} characters"
            )));
        }

        let start = parse_date(start).ok_or_else(|| AppError::bad_request("Invalid date format"))?;
        let end = present(&self.end_date)
            .map(|end| parse_date(end).ok_or_else(|| AppError::bad_request("Invalid date format")))
            .transpose()?;
        if end.is_some_and(|end| end < start) {
            return Err(AppError::bad_request("Start date must not be after end date"));
        }

        // Normalized to the catalog spelling.
        let treatment_type = present(&self.treatment_type)
            .map(|t| {
                TREATMENT_TYPES
                    .iter()
                    .find(|known| known.eq_ignore_ascii_case(t))
                    .map(|known| known.to_string())
                    .ok_or_else(|| AppError::bad_request(format!("Invalid treatment type: {t}")))
            })
            .transpose()?;

        Ok(NewTreatmentLog {
            treatment_name: name.to_string(),
            treatment_type,
            start,
            end,
            description: self.description.filter(|d| !d.trim().is_empty()),
        })
    }
}

#[derive(Debug, PartialEq, Serialize)]
pub struct SymptomsByDate {
    pub date: NaiveDate,
    pub symptoms: Vec<String>,
}

/// One entry per calendar day of the logs' start, days ascending.
pub fn group_by_date(logs: Vec<SymptomLog>) -> Vec<SymptomsByDate> {
    let mut map = BTreeMap::<NaiveDate, Vec<String>>::new();
    for log in logs {
        map.entry(log.start.date()).or_default().push(log.symptom);
    }

    map.into_iter()
        .map(|(date, symptoms)| SymptomsByDate { date, symptoms })
        .collect()
}
