use chrono::{DateTime, Utc};
use reqwest::Client;
use tracing::{info, warn};

use crate::{
    build_http_client,
    config::{Config, EntityFailurePolicy},
    errors::AppError,
    incidents::{filter_recent, EntityResolution, RecentIncident, Report},
    pagination::FetchStrategy,
    service_provider::{identity::{Credential, TokenProvider}, sentinel::Sentinel},
};

async fn authenticate(http_client: &Client, config: &Config) -> Result<Credential, AppError> {
    TokenProvider::new(
        http_client,
        &config.authority_host,
        &config.tenant_id,
        &config.client_id,
        &config.client_secret,
        config.token_scope(),
    )
    .acquire_token()
    .await
}

pub fn fetch_strategy(config: &Config, follow_next_link: bool) -> FetchStrategy {
    if follow_next_link {
        FetchStrategy::FollowNextLink { max_pages: config.max_pages }
    } else {
        FetchStrategy::SinglePage
    }
}

/**
  * Authenticate, list incidents, keep those created within the window ending at `reference_time`
  * and resolve their entities one incident at a time.
 */
pub async fn get_new_incidents(config: &Config, strategy: FetchStrategy, reference_time: DateTime<Utc>) -> Result<Report, AppError> {
    let http_client = build_http_client(config.request_timeout)?;

    let credential = authenticate(&http_client, config).await?;

    let sentinel = Sentinel::new(&http_client, config.workspace());
    let incidents = sentinel.list_incidents(&credential, strategy).await?;
    info!("Found {} incidents in workspace {}", incidents.len(), config.workspace_name);

    let recent = filter_recent(incidents, reference_time, config.time_window);
    info!("{} incidents created in the last {}", recent.len(), config.time_window);

    info!("Resolving entities with the {} policy", config.entity_failure_policy);
    let mut recent_incidents = Vec::with_capacity(recent.len());
    for incident in recent {
        let resolution = sentinel
            .resolve_entities(&incident.name, &credential, &config.entity_kind, &config.entity_field)
            .await?;

        if let EntityResolution::Failed { status, message } = &resolution {
            if config.entity_failure_policy == EntityFailurePolicy::Abort {
                return Err(match status {
                    Some(status) => AppError::UpstreamRequestError { status: *status, body: message.clone() },
                    None => AppError::EntityLookupError { incident_id: incident.name, message: message.clone() },
                });
            }
            warn!(incident_id = %incident.name, "Continuing without entities");
        }

        recent_incidents.push(RecentIncident { incident_id: incident.name, resolution });
    }

    Ok(Report::assemble(config.time_window, recent_incidents))
}

pub async fn get_incident_entities(config: &Config, incident_id: &str) -> Result<serde_json::Value, AppError> {
    let http_client = build_http_client(config.request_timeout)?;

    let credential = authenticate(&http_client, config).await?;

    Sentinel::new(&http_client, config.workspace())
        .get_incident_entities(incident_id, &credential)
        .await
}
