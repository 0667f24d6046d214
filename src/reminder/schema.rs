// File: ./src/reminder/schema.rs
// Declared output schema and the check that enforces it
use crate::error::ReminderError;
use crate::model::SmartReminder;
use crate::model::validate::parse_instant;
use serde_json::{Map, Value, json};

const REMINDER_DATE: &str = "reminderDate";
const REASONING: &str = "reasoning";

/// JSON Schema handed to the model for constrained decoding.
pub fn reminder_output_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            REMINDER_DATE: {
                "type": "string",
                "description": "The date and time to send the reminder in ISO format."
            },
            REASONING: {
                "type": "string",
                "description": "The reasoning behind the reminder date."
            }
        },
        "required": [REMINDER_DATE, REASONING],
        "additionalProperties": false
    })
}

/// Checks raw model text against the output schema.
///
/// Accepts exactly one JSON object with a string `reminderDate` that parses as
/// an instant and a non-empty string `reasoning`. Anything else is an
/// [`ReminderError::InferenceOutput`].
pub fn parse_reminder_output(raw: &str) -> Result<SmartReminder, ReminderError> {
    let value: Value = serde_json::from_str(raw.trim())
        .map_err(|e| ReminderError::output(format!("model output is not JSON: {}", e)))?;

    let Value::Object(mut obj) = value else {
        return Err(ReminderError::output("model output is not a JSON object"));
    };

    let reminder_date = take_string(&mut obj, REMINDER_DATE)?;
    let reasoning = take_string(&mut obj, REASONING)?;

    if let Some(extra) = obj.keys().next() {
        return Err(ReminderError::output(format!(
            "model output has unexpected field '{}'",
            extra
        )));
    }
    if parse_instant(&reminder_date).is_err() {
        return Err(ReminderError::output(format!(
            "reminderDate '{}' is not an ISO 8601 instant",
            reminder_date
        )));
    }
    if reasoning.trim().is_empty() {
        return Err(ReminderError::output("reasoning is empty"));
    }

    Ok(SmartReminder {
        reminder_date,
        reasoning,
    })
}

fn take_string(obj: &mut Map<String, Value>, field: &str) -> Result<String, ReminderError> {
    match obj.remove(field) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(ReminderError::output(format!(
            "field '{}' must be a string, got {}",
            field, other
        ))),
        None => Err(ReminderError::output(format!("missing field '{}'", field))),
    }
}
