use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// An account from the admin user listing.
///
/// Only `subscribed_package` and `subscription_start` feed the revenue
/// summaries; the remaining fields are carried for display and decode to
/// `None` when the API sends an unexpected type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberRecord {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub subscribed_package: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_timestamp")]
    pub subscription_start: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_lenient_timestamp")]
    pub subscription_end: Option<DateTime<Utc>>,
}

impl SubscriberRecord {
    /// The plan name this subscriber is enrolled in, treating an empty string as no plan.
    pub fn plan_name(&self) -> Option<&str> {
        self.subscribed_package
            .as_deref()
            .filter(|name| !name.is_empty())
    }
}

/// A subscription tier from the plan listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDefinition {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(default = "default_active", deserialize_with = "deserialize_lenient_flag")]
    pub active: bool,
    #[serde(default, deserialize_with = "deserialize_lenient_quantity")]
    pub creators: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_lenient_quantity")]
    pub employees: Option<f64>,
    /// Storage allowance in GB.
    #[serde(default, deserialize_with = "deserialize_lenient_quantity")]
    pub storage: Option<f64>,
}

fn default_active() -> bool {
    true
}

impl PlanDefinition {
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            price,
            active: true,
            creators: None,
            employees: None,
            storage: None,
        }
    }
}

/// Parse an ISO-8601 timestamp the way the listing API emits them.
///
/// Accepts RFC 3339, a naive date-time, or a bare date (midnight). Values
/// without an offset are read as UTC, not in the machine's local zone.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn deserialize_lenient_timestamp<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => None,
        Some(serde_json::Value::String(s)) => {
            let parsed = parse_timestamp(&s);
            if parsed.is_none() {
                log::debug!("Ignoring unparseable timestamp '{s}'");
            }
            parsed
        }
        Some(other) => {
            log::debug!("Ignoring non-string timestamp {other}");
            None
        }
    })
}

/// Decode an optional field, dropping values of the wrong type.
fn deserialize_lenient<'de, D, T>(
    deserializer: D,
) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|value| match serde_json::from_value::<T>(value.clone()) {
        Ok(v) => Some(v),
        Err(e) => {
            log::debug!("Ignoring field value {value}: {e}");
            None
        }
    }))
}

/// A count or size sent either as a JSON number or a numeric string.
fn deserialize_lenient_quantity<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => None,
        Some(serde_json::Value::String(s)) => {
            let parsed = s.trim().parse::<f64>().ok();
            if parsed.is_none() {
                log::debug!("Ignoring non-numeric quantity '{s}'");
            }
            parsed
        }
        Some(other) => {
            log::debug!("Ignoring non-numeric quantity {other}");
            None
        }
    })
}

/// The plan `active` flag; anything but a boolean or `"true"`/`"false"` keeps the default.
fn deserialize_lenient_flag<'de, D>(
    deserializer: D,
) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::Bool(b)) => b,
        Some(serde_json::Value::String(s)) if s.trim().eq_ignore_ascii_case("true") => true,
        Some(serde_json::Value::String(s)) if s.trim().eq_ignore_ascii_case("false") => false,
        None | Some(serde_json::Value::Null) => default_active(),
        Some(other) => {
            log::debug!("Ignoring non-boolean active flag {other}");
            default_active()
        }
    })
}

/// Extract a record array from either a bare JSON array or an API envelope
/// object holding the array under `key`.
fn records_from_document<T: serde::de::DeserializeOwned>(json: &str, key: &str) -> Result<Vec<T>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let array = match value {
        array @ serde_json::Value::Array(_) => array,
        serde_json::Value::Object(mut map) => map
            .remove(key)
            .ok_or_else(|| Error::Other(format!("expected a `{key}` array in document")))?,
        _ => {
            return Err(Error::Other(format!(
                "expected a JSON array or an object with `{key}`"
            )))
        }
    };
    Ok(serde_json::from_value(array)?)
}

/// Parse the user listing (`{"users": [...]}` or a bare array).
pub fn parse_subscribers(json: &str) -> Result<Vec<SubscriberRecord>> {
    records_from_document(json, "users")
}

/// Parse the plan listing (`{"packages": [...]}` or a bare array).
pub fn parse_plans(json: &str) -> Result<Vec<PlanDefinition>> {
    records_from_document(json, "packages")
}

pub fn load_subscribers(path: &Path) -> Result<Vec<SubscriberRecord>> {
    let json = std::fs::read_to_string(path)?;
    let subscribers = parse_subscribers(&json)?;
    log::info!("Loaded {} subscribers from {}", subscribers.len(), path.display());
    Ok(subscribers)
}

pub fn load_plans(path: &Path) -> Result<Vec<PlanDefinition>> {
    let json = std::fs::read_to_string(path)?;
    let plans = parse_plans(&json)?;
    log::info!("Loaded {} plans from {}", plans.len(), path.display());
    Ok(plans)
}
