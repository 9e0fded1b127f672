use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use time::{format_description::FormatItem, macros::format_description, Date, OffsetDateTime, Time};
use uuid::Uuid;

use super::repo::{NewReminder, Reminder, ReminderPatch};
use crate::error::FieldErrors;

const MAX_TYPE_LEN: usize = 100;

const DATE_FORMAT: &[FormatItem<'_>] = format_description!("[year]-[month]-[day]");
const TIME_FORMATS: [&[FormatItem<'_>]; 3] = [
    format_description!("[hour padding:none]:[minute]"),
    format_description!("[hour padding:none]:[minute]:[second]"),
    format_description!("[hour repr:12 padding:none]:[minute] [period case_sensitive:false]"),
];

/// Body of `POST /reminders`. Any owner field in the payload is ignored.
///
/// Fields stay raw JSON so a wrong type is reported against its field.
#[derive(Debug, Default, Deserialize)]
pub struct CreateReminderRequest {
    #[serde(default)]
    pub reminder_type: Option<Value>,
    #[serde(default)]
    pub due_date: Option<Value>,
    #[serde(default)]
    pub due_time: Option<Value>,
    #[serde(default)]
    pub presentation_type: Option<Value>,
}

/// Body of `PUT /reminders/{id}`; absent fields stay as they are.
///
/// `Some(Value::Null)` is an explicit `null`, which clears `presentation_type`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateReminderRequest {
    #[serde(default, deserialize_with = "present")]
    pub reminder_type: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub due_date: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub due_time: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub presentation_type: Option<Value>,
}

fn present<'de, D: Deserializer<'de>>(de: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(de).map(Some)
}

impl CreateReminderRequest {
    pub fn validate(self) -> Result<NewReminder, FieldErrors> {
        let mut errors = FieldErrors::new();
        let reminder_type = required(&mut errors, "reminder_type", self.reminder_type)
            .and_then(|v| check_type(&mut errors, v));
        let due_date = required(&mut errors, "due_date", self.due_date)
            .and_then(|v| check_date(&mut errors, v));
        let due_time = required(&mut errors, "due_time", self.due_time)
            .and_then(|v| check_time(&mut errors, v));
        let presentation_type =
            optional(&mut errors, "presentation_type", self.presentation_type).flatten();

        match (reminder_type, due_date, due_time) {
            (Some(reminder_type), Some(due_date), Some(due_time)) if errors.is_empty() => {
                Ok(NewReminder {
                    reminder_type,
                    due_date,
                    due_time,
                    presentation_type,
                })
            }
            _ => Err(errors),
        }
    }
}

impl UpdateReminderRequest {
    pub fn validate(self) -> Result<ReminderPatch, FieldErrors> {
        let mut errors = FieldErrors::new();
        let patch = ReminderPatch {
            reminder_type: self
                .reminder_type
                .and_then(|v| required(&mut errors, "reminder_type", Some(v)))
                .and_then(|v| check_type(&mut errors, v)),
            due_date: self
                .due_date
                .and_then(|v| required(&mut errors, "due_date", Some(v)))
                .and_then(|v| check_date(&mut errors, v)),
            due_time: self
                .due_time
                .and_then(|v| required(&mut errors, "due_time", Some(v)))
                .and_then(|v| check_time(&mut errors, v)),
            presentation_type: optional(&mut errors, "presentation_type", self.presentation_type),
        };
        if errors.is_empty() {
            Ok(patch)
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReminderResponse {
    pub id: Uuid,
    pub user: Uuid,
    pub reminder_type: String,
    pub due_date: String,
    pub due_time: String,
    pub presentation_type: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Reminder> for ReminderResponse {
    fn from(r: Reminder) -> Self {
        Self {
            id: r.id,
            user: r.user_id,
            reminder_type: r.reminder_type,
            due_date: r.due_date,
            due_time: r.due_time,
            presentation_type: r.presentation_type,
            created_at: r.created_at,
        }
    }
}

fn required(errors: &mut FieldErrors, field: &'static str, value: Option<Value>) -> Option<String> {
    match value {
        None => {
            errors.add(field, "This field is required.");
            None
        }
        Some(Value::Null) => {
            errors.add(field, "This field may not be null.");
            None
        }
        Some(v) => text(errors, field, v),
    }
}

/// `None` when absent, `Some(None)` when null or blank.
fn optional(
    errors: &mut FieldErrors,
    field: &'static str,
    value: Option<Value>,
) -> Option<Option<String>> {
    match value? {
        Value::Null => Some(None),
        v => Some(text(errors, field, v).filter(|s| !s.is_empty())),
    }
}

fn text(errors: &mut FieldErrors, field: &'static str, value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        _ => {
            errors.add(field, "Not a valid string.");
            None
        }
    }
}

fn check_type(errors: &mut FieldErrors, v: String) -> Option<String> {
    if v.is_empty() {
        errors.add("reminder_type", "This field may not be blank.");
        None
    } else if v.chars().count() > MAX_TYPE_LEN {
        errors.add("reminder_type", "Ensure this field has no more than 100 characters.");
        None
    } else {
        Some(v)
    }
}

fn check_date(errors: &mut FieldErrors, v: String) -> Option<String> {
    if Date::parse(&v, DATE_FORMAT).is_ok() {
        Some(v)
    } else {
        errors.add("due_date", "Date has wrong format. Use YYYY-MM-DD.");
        None
    }
}

fn check_time(errors: &mut FieldErrors, v: String) -> Option<String> {
    if TIME_FORMATS.iter().any(|f| Time::parse(&v, *f).is_ok()) {
        Some(v)
    } else {
        errors.add("due_time", "Time has wrong format. Use HH:MM or HH:MM AM/PM.");
        None
    }
}
