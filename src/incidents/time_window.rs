use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, warn};

use super::Incident;

/// How far back from the reference time an incident still counts as new.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    seconds: i64,
    delta: TimeDelta,
}

impl TimeWindow {
    /// `None` for negative or out of range lengths. Callers report the setting the value came from.
    pub fn from_seconds(seconds: i64) -> Option<TimeWindow> {
        if seconds < 0 {
            return None;
        }

        let delta = TimeDelta::try_seconds(seconds)?;
        Some(TimeWindow { seconds, delta })
    }

    pub fn seconds(&self) -> i64 {
        self.seconds
    }

    /// Inclusive upper bound, no lower bound: future-dated records are inside the window.
    pub fn contains(&self, reference_time: DateTime<Utc>, created: DateTime<Utc>) -> bool {
        reference_time - created <= self.delta
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let units = [(86400, "day"), (3600, "hour"), (60, "minute")];
        let (amount, unit) = units.iter()
            .find(|(size, _)| self.seconds > 0 && self.seconds % size == 0)
            .map(|(size, unit)| (self.seconds / size, *unit))
            .unwrap_or((self.seconds, "second"));

        if amount == 1 {
            write!(f, "{}", unit)
        } else {
            write!(f, "{} {}s", amount, unit)
        }
    }
}

/**
  * Keep the incidents created inside the window ending at `reference_time`, in input order.
  * Incidents whose creation time is missing or can't be parsed are dropped.
 */
pub fn filter_recent(incidents: Vec<Incident>, reference_time: DateTime<Utc>, window: TimeWindow) -> Vec<Incident> {
    incidents.into_iter()
        .filter(|incident| match incident.created_time() {
            Ok(Some(created)) => window.contains(reference_time, created),
            Ok(None) => {
                debug!(incident_id = %incident.name, "Skipping incident without creation time");
                false
            }
            Err(err) => {
                warn!(incident_id = %incident.name, error = %err, "Skipping incident with unparseable creation time");
                false
            }
        })
        .collect()
}
