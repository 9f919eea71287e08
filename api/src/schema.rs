//! Declarative field validation for incoming records.
//!
//! Each record kind has one entry point taking the raw JSON mapping and
//! returning either a normalized record or the full list of violated
//! fields. Validation is pure; nothing here touches the store.

use serde::Serialize;
use serde_json::{json, Value};

use docstore::NewDocument;

#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        Self(vec![FieldError {
            field,
            message: message.into(),
        }])
    }

    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Vlog submitted with an external video link.
#[derive(Debug, Clone)]
pub struct NewVlog {
    pub user_id: String,
    pub video_url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration: Option<f64>,
}

/// Metadata accompanying a vlog file upload; the video URL is derived
/// from the stored file, not taken from the client.
#[derive(Debug, Clone)]
pub struct NewVlogUpload {
    pub user_id: String,
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewSentiment {
    pub user_id: String,
    pub emotion: String,
    pub intensity: f64,
    pub note: Option<String>,
    pub context: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewGpsCoordinate {
    pub user_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
    pub accuracy: Option<f64>,
    pub location_name: Option<String>,
}

impl NewVlog {
    pub fn into_document(self) -> NewDocument {
        NewDocument {
            user_id: self.user_id,
            fields: json!({
                "video_url": self.video_url,
                "title": self.title,
                "description": self.description,
                "duration": self.duration,
            }),
        }
    }
}

impl NewSentiment {
    pub fn into_document(self) -> NewDocument {
        NewDocument {
            user_id: self.user_id,
            fields: json!({
                "emotion": self.emotion,
                "intensity": self.intensity,
                "note": self.note,
                "context": self.context,
            }),
        }
    }
}

impl NewGpsCoordinate {
    pub fn into_document(self) -> NewDocument {
        NewDocument {
            user_id: self.user_id,
            fields: json!({
                "latitude": self.latitude,
                "longitude": self.longitude,
                "altitude": self.altitude,
                "accuracy": self.accuracy,
                "location_name": self.location_name,
            }),
        }
    }
}

pub fn validate_vlog(raw: &Value) -> Result<NewVlog, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    require_object(raw)?;

    let user_id = require_string(raw, "user_id", &mut errors);
    let video_url = require_string(raw, "video_url", &mut errors);
    let title = optional_string(raw, "title", &mut errors);
    let description = optional_string(raw, "description", &mut errors);
    let duration = optional_number(raw, "duration", &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(NewVlog {
        user_id: user_id.unwrap_or_default(),
        video_url: video_url.unwrap_or_default(),
        title,
        description,
        duration,
    })
}

pub fn validate_vlog_upload(raw: &Value) -> Result<NewVlogUpload, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    require_object(raw)?;

    let user_id = require_string(raw, "user_id", &mut errors);
    let title = optional_string(raw, "title", &mut errors);
    let description = optional_string(raw, "description", &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(NewVlogUpload {
        user_id: user_id.unwrap_or_default(),
        title,
        description,
    })
}

pub fn validate_sentiment(raw: &Value) -> Result<NewSentiment, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    require_object(raw)?;

    let user_id = require_string(raw, "user_id", &mut errors);
    let emotion = require_string(raw, "emotion", &mut errors);
    let intensity = require_number_in_range(raw, "intensity", 0.0, 1.0, &mut errors);
    let note = optional_string(raw, "note", &mut errors);
    let context = optional_string(raw, "context", &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(NewSentiment {
        user_id: user_id.unwrap_or_default(),
        emotion: emotion.unwrap_or_default(),
        intensity: intensity.unwrap_or_default(),
        note,
        context,
    })
}

pub fn validate_gps(raw: &Value) -> Result<NewGpsCoordinate, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    require_object(raw)?;

    let user_id = require_string(raw, "user_id", &mut errors);
    let latitude = require_number_in_range(raw, "latitude", -90.0, 90.0, &mut errors);
    let longitude = require_number_in_range(raw, "longitude", -180.0, 180.0, &mut errors);
    let altitude = optional_number(raw, "altitude", &mut errors);
    let accuracy = optional_number(raw, "accuracy", &mut errors);
    let location_name = optional_string(raw, "location_name", &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(NewGpsCoordinate {
        user_id: user_id.unwrap_or_default(),
        latitude: latitude.unwrap_or_default(),
        longitude: longitude.unwrap_or_default(),
        altitude,
        accuracy,
        location_name,
    })
}

fn require_object(raw: &Value) -> Result<(), ValidationErrors> {
    if raw.is_object() {
        Ok(())
    } else {
        Err(ValidationErrors::single("body", "expected a JSON object"))
    }
}

fn require_string(raw: &Value, field: &'static str, errors: &mut ValidationErrors) -> Option<String> {
    match raw.get(field) {
        None | Some(Value::Null) => {
            errors.push(field, "field is required");
            None
        }
        Some(Value::String(s)) if s.is_empty() => {
            errors.push(field, "must not be empty");
            None
        }
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.push(field, "must be a string");
            None
        }
    }
}

fn optional_string(raw: &Value, field: &'static str, errors: &mut ValidationErrors) -> Option<String> {
    match raw.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.push(field, "must be a string");
            None
        }
    }
}

fn require_number_in_range(
    raw: &Value,
    field: &'static str,
    min: f64,
    max: f64,
    errors: &mut ValidationErrors,
) -> Option<f64> {
    match raw.get(field) {
        None | Some(Value::Null) => {
            errors.push(field, "field is required");
            None
        }
        Some(value) => match value.as_f64() {
            Some(n) if (min..=max).contains(&n) => Some(n),
            Some(n) => {
                errors.push(field, format!("{n} is outside the range {min} to {max}"));
                None
            }
            None => {
                errors.push(field, "must be a number");
                None
            }
        },
    }
}

fn optional_number(raw: &Value, field: &'static str, errors: &mut ValidationErrors) -> Option<f64> {
    match raw.get(field) {
        None | Some(Value::Null) => None,
        Some(value) => match value.as_f64() {
            Some(n) => Some(n),
            None => {
                errors.push(field, "must be a number");
                None
            }
        },
    }
}
