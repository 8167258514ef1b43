use reqwest::Client;
use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::{debug, warn};
use url::{ParseError, Url};

use crate::{
    errors::AppError,
    incidents::{extract_entity_values, EntitiesResponse, EntityResolution, Incident},
    pagination::{CursorFetcher, FetchStrategy},
};

use super::identity::Credential;

/// Location of a Sentinel workspace in Azure Resource Manager.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub management_endpoint: String,
    pub subscription_id: String,
    pub resource_group: String,
    pub workspace_name: String,
    pub api_version: String,
}

pub struct Sentinel<'a> {
    http_client: &'a Client,
    workspace: Workspace,
}

impl<'a> Sentinel<'a> {
    pub fn new(http_client: &'a Client, workspace: Workspace) -> Sentinel<'a> {
        Sentinel { http_client, workspace }
    }

    fn incidents_url(&self, trailing_segments: &[&str]) -> Result<Url, AppError> {
        let w = &self.workspace;
        let mut url = Url::parse(w.management_endpoint.trim_end_matches('/'))?;

        url.path_segments_mut()
            .map_err(|_| ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend([
                "subscriptions", w.subscription_id.as_str(),
                "resourceGroups", w.resource_group.as_str(),
                "providers", "Microsoft.OperationalInsights",
                "workspaces", w.workspace_name.as_str(),
                "providers", "Microsoft.SecurityInsights",
                "incidents",
            ])
            .extend(trailing_segments);

        url.query_pairs_mut().append_pair("api-version", &w.api_version);

        Ok(url)
    }

    pub fn incident_list_url(&self) -> Result<Url, AppError> {
        self.incidents_url(&[])
    }

    pub fn incident_entities_url(&self, incident_id: &str) -> Result<Url, AppError> {
        self.incidents_url(&[incident_id, "entities"])
    }

    pub async fn list_incidents(&self, credential: &Credential, strategy: FetchStrategy) -> Result<Vec<Incident>, AppError> {
        let url = self.incident_list_url()?;

        CursorFetcher::new(self.http_client, strategy)
            .fetch_all(url.as_str(), credential)
            .await
    }

    /// The raw entities response of one incident.
    pub async fn get_incident_entities(&self, incident_id: &str, credential: &Credential) -> Result<Value, AppError> {
        let url = self.incident_entities_url(incident_id)?;
        debug!("Fetching entities for incident {}", incident_id);

        let response = self.http_client
            .post(url)
            .bearer_auth(credential.token().expose_secret())
            .header("Content-Type", "application/json")
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(AppError::upstream(status, body))
        }
    }

    /**
      * Look up the values of `projected_field` on the `target_kind` entities of an incident.
      * Request failures come back as `EntityResolution::Failed` so the caller decides whether they end the run.
     */
    pub async fn resolve_entities(
        &self,
        incident_id: &str,
        credential: &Credential,
        target_kind: &str,
        projected_field: &str,
    ) -> Result<EntityResolution, AppError> {
        let raw = match self.get_incident_entities(incident_id, credential).await {
            Ok(raw) => raw,
            Err(AppError::UpstreamRequestError { status, body }) => {
                warn!(incident_id, status, "Entities request failed");
                return Ok(EntityResolution::Failed { status: Some(status), message: body });
            }
            Err(AppError::ReqwestError(err)) => {
                warn!(incident_id, error = %err, "Entities request failed");
                return Ok(EntityResolution::Failed { status: err.status().map(|s| s.as_u16()), message: err.to_string() });
            }
            Err(err) => return Err(err),
        };

        let response: EntitiesResponse = match serde_json::from_value(raw) {
            Ok(response) => response,
            Err(err) => {
                warn!(incident_id, error = %err, "Unexpected entities response");
                return Ok(EntityResolution::Failed { status: None, message: err.to_string() });
            }
        };
        let values = extract_entity_values(&response.entities, target_kind, projected_field);
        debug!(incident_id, found = values.len(), "Resolved {} entities", target_kind);

        Ok(EntityResolution::Resolved(values))
    }
}
