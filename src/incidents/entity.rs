use serde_derive::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Entity {
    pub kind: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct EntitiesResponse {
    #[serde(default)]
    pub entities: Vec<Entity>,
}

/// Outcome of looking up the entities of one incident.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityResolution {
    /// The lookup succeeded; empty when no entity of the requested kind had the field.
    Resolved(Vec<String>),
    Failed { status: Option<u16>, message: String },
}

impl EntityResolution {
    pub fn values(&self) -> &[String] {
        match self {
            EntityResolution::Resolved(values) => values,
            EntityResolution::Failed { .. } => &[],
        }
    }
}

/// Project `field` out of every entity of `kind`. Entities without a string value for the field are skipped.
pub fn extract_entity_values(entities: &[Entity], kind: &str, field: &str) -> Vec<String> {
    entities.iter()
        .filter(|entity| entity.kind == kind)
        .filter_map(|entity| entity.properties.get(field))
        .filter_map(|value| value.as_str())
        .filter(|value| !value.is_empty())
        .map(|value| value.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::incidents::{extract_entity_values, EntitiesResponse, EntityResolution};

    fn response(value: serde_json::Value) -> EntitiesResponse {
        serde_json::from_value(value).expect("should deserialize")
    }

    #[test]
    fn extracts_host_names_only() {
        let response = response(json!({
            "entities": [
                { "kind": "Host", "properties": { "hostName": "h1", "osFamily": "Windows" } },
                { "kind": "Ip", "properties": { "address": "10.0.0.1" } },
                { "kind": "IP", "properties": { "hostName": "not-a-host" } },
                { "kind": "Host", "properties": { "hostName": "h2" } },
            ],
            "metaData": [{ "count": 2, "entityKind": "Host" }]
        }));

        let hosts = extract_entity_values(&response.entities, "Host", "hostName");

        assert_eq!(hosts, vec!["h1", "h2"]);
    }

    #[test]
    fn skips_entities_missing_the_field() {
        let response = response(json!({
            "entities": [
                { "kind": "Host", "properties": { "netBiosName": "H1" } },
                { "kind": "Host" },
                { "kind": "Host", "properties": { "hostName": 12 } },
                { "kind": "Host", "properties": { "hostName": "srv01" } },
            ]
        }));

        assert_eq!(extract_entity_values(&response.entities, "Host", "hostName"), vec!["srv01"]);
    }

    #[test]
    fn other_kinds_and_fields_can_be_projected() {
        let response = response(json!({
            "entities": [
                { "kind": "Account", "properties": { "accountName": "alice" } },
                { "kind": "Ip", "properties": { "address": "10.0.0.1" } },
            ]
        }));

        assert_eq!(extract_entity_values(&response.entities, "Ip", "address"), vec!["10.0.0.1"]);
    }

    #[test]
    fn missing_entities_array_is_empty() {
        let response = response(json!({}));

        assert!(extract_entity_values(&response.entities, "Host", "hostName").is_empty());
    }

    #[test]
    fn failed_resolution_has_no_values() {
        let failed = EntityResolution::Failed { status: Some(404), message: "not found".to_string() };

        assert!(failed.values().is_empty());
    }
}
