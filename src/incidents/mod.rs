mod entity;
mod incident;
mod report;
mod time_window;

pub use entity::{extract_entity_values, EntitiesResponse, Entity, EntityResolution};
pub use incident::{Incident, IncidentProperties};
pub use report::{RecentIncident, Report};
pub use time_window::{filter_recent, TimeWindow};
