use chrono::{DateTime, Utc};
use serde_derive::Deserialize;

use crate::{errors::AppError, timestamp::parse_created_time};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentProperties {
    #[serde(default)]
    pub created_time_utc: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub incident_number: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Incident {
    /// Incident identifier, a GUID in Sentinel.
    pub name: String,
    #[serde(default)]
    pub properties: IncidentProperties,
}

impl Incident {
    /// `Ok(None)` when the incident carries no creation time at all.
    pub fn created_time(&self) -> Result<Option<DateTime<Utc>>, AppError> {
        match self.properties.created_time_utc.as_deref() {
            Some(value) if !value.is_empty() => parse_created_time(value).map(Some),
            _ => Ok(None),
        }
    }
}
