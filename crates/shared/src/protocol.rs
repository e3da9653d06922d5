use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

use crate::{domain::GeoPoint, error::ToolCallError};

pub const LOCATION_FUNCTION: &str = "location";
pub const LINE_FUNCTION: &str = "line";

/// Function call exactly as the model emitted it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: Value,
}

impl FunctionCall {
    pub fn new(name: impl Into<String>, args: Value) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    Location(LocationCall),
    Connection(ConnectionCall),
}

impl ToolCall {
    pub fn decode(call: &FunctionCall) -> Result<Self, ToolCallError> {
        let invalid = |source| ToolCallError::InvalidArguments {
            function: call.name.clone(),
            source,
        };
        match call.name.as_str() {
            LOCATION_FUNCTION => serde_json::from_value(call.args.clone())
                .map(ToolCall::Location)
                .map_err(invalid),
            LINE_FUNCTION => serde_json::from_value(call.args.clone())
                .map(ToolCall::Connection)
                .map_err(invalid),
            other => Err(ToolCallError::UnknownFunction(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LocationCall {
    pub name: String,
    pub description: String,
    #[serde(deserialize_with = "coordinate")]
    pub lat: f64,
    #[serde(deserialize_with = "coordinate")]
    pub lng: f64,
    #[serde(default, deserialize_with = "optional_label")]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "optional_label")]
    pub duration: Option<String>,
    #[serde(default, deserialize_with = "optional_sequence")]
    pub sequence: Option<u32>,
}

impl LocationCall {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Endpoint {
    #[serde(deserialize_with = "coordinate")]
    pub lat: f64,
    #[serde(deserialize_with = "coordinate")]
    pub lng: f64,
}

impl From<Endpoint> for GeoPoint {
    fn from(value: Endpoint) -> Self {
        GeoPoint::new(value.lat, value.lng)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConnectionCall {
    pub name: String,
    pub start: Endpoint,
    pub end: Endpoint,
    #[serde(
        default,
        alias = "transportMode",
        alias = "transport_mode",
        deserialize_with = "optional_label"
    )]
    pub transport: Option<String>,
    #[serde(
        default,
        rename = "travelTime",
        alias = "travel_time",
        deserialize_with = "optional_label"
    )]
    pub travel_time: Option<String>,
}

/// Numeric coercion the way a browser's `Number(..)` treats model output:
/// blank strings are zero, anything unparsable is NaN.
pub fn coerce_number(value: &Value) -> f64 {
    match value {
        Value::Number(number) => number.as_f64().unwrap_or(f64::NAN),
        Value::String(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().unwrap_or(f64::NAN)
            }
        }
        Value::Bool(flag) => {
            if *flag {
                1.0
            } else {
                0.0
            }
        }
        Value::Null => 0.0,
        Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}

fn coordinate<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_number(&value))
}

fn optional_label<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(label) if !label.trim().is_empty() => Some(label),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}

fn optional_sequence<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let raw = match value {
        Value::Null => return Ok(None),
        other => coerce_number(&other),
    };
    if raw.is_finite() && raw >= 1.0 && raw.fract() == 0.0 && raw <= f64::from(u32::MAX) {
        Ok(Some(raw as u32))
    } else {
        Ok(None)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

pub fn location_declaration() -> FunctionDeclaration {
    FunctionDeclaration {
        name: LOCATION_FUNCTION.to_string(),
        description: "Geographic coordinates of a location.".to_string(),
        parameters: json!({
            "type": "OBJECT",
            "properties": {
                "name": {"type": "STRING", "description": "Name of the location."},
                "description": {
                    "type": "STRING",
                    "description": "Description of the location: why is it relevant, details to know."
                },
                "lat": {"type": "STRING", "description": "Latitude of the location."},
                "lng": {"type": "STRING", "description": "Longitude of the location."},
                "time": {
                    "type": "STRING",
                    "description": "Time of day to visit this location (e.g., \"09:00\", \"14:30\")."
                },
                "duration": {
                    "type": "STRING",
                    "description": "Suggested duration of stay at this location (e.g., \"1 hour\", \"45 minutes\")."
                },
                "sequence": {
                    "type": "NUMBER",
                    "description": "Order in the day itinerary (1 = first stop of the day)."
                }
            },
            "required": ["name", "description", "lat", "lng"]
        }),
    }
}

pub fn line_declaration() -> FunctionDeclaration {
    let endpoint = |label: &str| {
        json!({
            "type": "OBJECT",
            "description": format!("{label} location of the route"),
            "properties": {
                "lat": {"type": "STRING", "description": format!("Latitude of the {} location.", label.to_lowercase())},
                "lng": {"type": "STRING", "description": format!("Longitude of the {} location.", label.to_lowercase())}
            },
            "required": ["lat", "lng"]
        })
    };
    FunctionDeclaration {
        name: LINE_FUNCTION.to_string(),
        description: "Connection between a start location and an end location.".to_string(),
        parameters: json!({
            "type": "OBJECT",
            "properties": {
                "name": {"type": "STRING", "description": "Name of the route or connection"},
                "start": endpoint("Start"),
                "end": endpoint("End"),
                "transport": {
                    "type": "STRING",
                    "description": "Mode of transportation between locations (e.g., \"walking\", \"driving\", \"public transit\")."
                },
                "travelTime": {
                    "type": "STRING",
                    "description": "Estimated travel time between locations (e.g., \"15 minutes\", \"1 hour\")."
                }
            },
            "required": ["name", "start", "end"]
        }),
    }
}

pub fn tool_declarations() -> Vec<FunctionDeclaration> {
    vec![location_declaration(), line_declaration()]
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
