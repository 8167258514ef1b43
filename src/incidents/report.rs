use std::fmt;

use super::{EntityResolution, TimeWindow};

pub const NO_ENDPOINT_FOUND: &str = "No endpoint found";
pub const NO_NEW_INCIDENTS: &str = "No new incidents found.";

/// An incident that passed the time window, paired with its resolved entities. Displays as one report line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentIncident {
    pub incident_id: String,
    pub resolution: EntityResolution,
}

impl fmt::Display for RecentIncident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Incident ID: {}, Endpoint(s): ", self.incident_id)?;

        match &self.resolution {
            EntityResolution::Resolved(values) if values.is_empty() => write!(f, "{}", NO_ENDPOINT_FOUND),
            EntityResolution::Resolved(values) => write!(f, "{}", values.join(", ")),
            EntityResolution::Failed { status: Some(status), .. } => write!(f, "lookup failed ({})", status),
            EntityResolution::Failed { status: None, message } => write!(f, "lookup failed ({})", message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub window: TimeWindow,
    pub lines: Vec<RecentIncident>,
}

impl Report {
    /// Lines keep the order of `recent_incidents`.
    pub fn assemble(window: TimeWindow, recent_incidents: Vec<RecentIncident>) -> Report {
        Report { window, lines: recent_incidents }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn endpoint_count(&self) -> usize {
        self.lines.iter().map(|line| line.resolution.values().len()).sum()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "{}", NO_NEW_INCIDENTS);
        }

        write!(f, "Found {} new incidents in the last {} and {} endpoints:", self.lines.len(), self.window, self.endpoint_count())?;
        for line in &self.lines {
            write!(f, "\n- {}", line)?;
        }

        Ok(())
    }
}
