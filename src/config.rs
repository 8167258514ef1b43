use std::{env, num::NonZeroUsize, str::FromStr, time::Duration};

use clap::ValueEnum;
use derive_more::Display;
use secrecy::SecretString;

use crate::{errors::AppError, incidents::TimeWindow, service_provider::sentinel::Workspace};

pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";
pub const DEFAULT_MANAGEMENT_ENDPOINT: &str = "https://management.azure.com";
pub const DEFAULT_API_VERSION: &str = "2024-09-01";
pub const DEFAULT_TIME_WINDOW_SECONDS: i64 = 86400;
pub const DEFAULT_MAX_PAGES: NonZeroUsize = match NonZeroUsize::new(1000) {
    Some(max_pages) => max_pages,
    None => panic!("page cap must be positive"),
};
/// `SENTINEL_MAX_PAGES` value that lifts the page cap.
pub const UNLIMITED_PAGES: &str = "unlimited";
pub const DEFAULT_ENTITY_KIND: &str = "Host";
pub const DEFAULT_ENTITY_FIELD: &str = "hostName";

/// What to do when the entities request of a single incident fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, ValueEnum)]
pub enum EntityFailurePolicy {
    /// Record the failure on the report line and carry on.
    #[default]
    #[display("tolerate")]
    Tolerate,
    /// Fail the whole run.
    #[display("abort")]
    Abort,
}

impl FromStr for EntityFailurePolicy {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "tolerate" => Ok(EntityFailurePolicy::Tolerate),
            "abort" => Ok(EntityFailurePolicy::Abort),
            _ => Err(AppError::InvalidConfig {
                name: "SENTINEL_ENTITY_FAILURE_POLICY".to_string(),
                value: value.to_string(),
            }),
        }
    }
}

#[derive(Debug)]
pub struct Config {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: SecretString,

    pub subscription_id: String,
    pub resource_group: String,
    pub workspace_name: String,

    pub time_window: TimeWindow,
    pub api_version: String,
    /// `None` follows `nextLink` without a cap; the cycle guard still applies.
    pub max_pages: Option<NonZeroUsize>,

    pub entity_kind: String,
    pub entity_field: String,
    pub entity_failure_policy: EntityFailurePolicy,

    pub request_timeout: Option<Duration>,
    pub authority_host: String,
    pub management_endpoint: String,
}

impl Config {
    pub fn from_env() -> Result<Config, AppError> {
        Config::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from any variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |name: &str| optional(name).ok_or_else(|| AppError::MissingConfig(name.to_string()));

        let window_seconds = match optional("SENTINEL_TIME_WINDOW_SECONDS") {
            Some(value) => parse_number::<i64>("SENTINEL_TIME_WINDOW_SECONDS", &value)?,
            None => DEFAULT_TIME_WINDOW_SECONDS,
        };

        let max_pages = match optional("SENTINEL_MAX_PAGES") {
            Some(value) if value.eq_ignore_ascii_case(UNLIMITED_PAGES) => None,
            Some(value) => Some(parse_number::<NonZeroUsize>("SENTINEL_MAX_PAGES", &value)?),
            None => Some(DEFAULT_MAX_PAGES),
        };

        let request_timeout = optional("SENTINEL_REQUEST_TIMEOUT_SECONDS")
            .map(|value| parse_number::<u64>("SENTINEL_REQUEST_TIMEOUT_SECONDS", &value))
            .transpose()?
            .map(Duration::from_secs);

        let entity_failure_policy = optional("SENTINEL_ENTITY_FAILURE_POLICY")
            .map(|value| value.parse::<EntityFailurePolicy>())
            .transpose()?
            .unwrap_or_default();

        Ok(Config {
            tenant_id: required("AZURE_TENANT_ID")?,
            client_id: required("AZURE_CLIENT_ID")?,
            client_secret: SecretString::new(required("AZURE_CLIENT_SECRET")?.into()),

            subscription_id: required("AZURE_SUBSCRIPTION_ID")?,
            resource_group: required("SENTINEL_RESOURCE_GROUP")?,
            workspace_name: required("SENTINEL_WORKSPACE_NAME")?,

            time_window: TimeWindow::from_seconds(window_seconds).ok_or_else(|| AppError::InvalidConfig {
                name: "SENTINEL_TIME_WINDOW_SECONDS".to_string(),
                value: window_seconds.to_string(),
            })?,
            api_version: optional("SENTINEL_API_VERSION").unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            max_pages,

            entity_kind: optional("SENTINEL_ENTITY_KIND").unwrap_or_else(|| DEFAULT_ENTITY_KIND.to_string()),
            entity_field: optional("SENTINEL_ENTITY_FIELD").unwrap_or_else(|| DEFAULT_ENTITY_FIELD.to_string()),
            entity_failure_policy,

            request_timeout,
            authority_host: optional("AZURE_AUTHORITY_HOST").unwrap_or_else(|| DEFAULT_AUTHORITY_HOST.to_string()),
            management_endpoint: optional("AZURE_MANAGEMENT_ENDPOINT").unwrap_or_else(|| DEFAULT_MANAGEMENT_ENDPOINT.to_string()),
        })
    }

    pub fn workspace(&self) -> Workspace {
        Workspace {
            management_endpoint: self.management_endpoint.clone(),
            subscription_id: self.subscription_id.clone(),
            resource_group: self.resource_group.clone(),
            workspace_name: self.workspace_name.clone(),
            api_version: self.api_version.clone(),
        }
    }

    pub fn token_scope(&self) -> String {
        format!("{}/.default", self.management_endpoint.trim_end_matches('/'))
    }
}

fn parse_number<T: FromStr>(name: &str, value: &str) -> Result<T, AppError> {
    value.parse::<T>().map_err(|_| AppError::InvalidConfig {
        name: name.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, time::Duration};

    use secrecy::ExposeSecret;
    use serial_test::serial;

    use crate::config::{Config, EntityFailurePolicy, DEFAULT_MAX_PAGES};
    use crate::errors::AppError;

    fn required_vars() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("AZURE_TENANT_ID", "tenant"),
            ("AZURE_CLIENT_ID", "client"),
            ("AZURE_CLIENT_SECRET", "secret"),
            ("AZURE_SUBSCRIPTION_ID", "subscription"),
            ("SENTINEL_RESOURCE_GROUP", "rg"),
            ("SENTINEL_WORKSPACE_NAME", "workspace"),
        ])
    }

    fn load(vars: &HashMap<&'static str, &'static str>) -> Result<Config, AppError> {
        Config::from_lookup(|name| vars.get(name).map(|v| v.to_string()))
    }

    #[test]
    fn applies_defaults_for_optional_values() {
        let config = load(&required_vars()).expect("config should load");

        assert_eq!(config.tenant_id, "tenant");
        assert_eq!(config.client_secret.expose_secret(), "secret");
        assert_eq!(config.time_window.seconds(), 86400);
        assert_eq!(config.api_version, "2024-09-01");
        assert_eq!(config.max_pages, Some(DEFAULT_MAX_PAGES));
        assert_eq!(config.entity_kind, "Host");
        assert_eq!(config.entity_field, "hostName");
        assert_eq!(config.entity_failure_policy, EntityFailurePolicy::Tolerate);
        assert_eq!(config.request_timeout, None);
        assert_eq!(config.token_scope(), "https://management.azure.com/.default");
    }

    #[test]
    fn reads_overrides() {
        let mut vars = required_vars();
        vars.insert("SENTINEL_TIME_WINDOW_SECONDS", "604800");
        vars.insert("SENTINEL_MAX_PAGES", "5");
        vars.insert("SENTINEL_ENTITY_FAILURE_POLICY", "Abort");
        vars.insert("SENTINEL_REQUEST_TIMEOUT_SECONDS", "30");
        vars.insert("AZURE_MANAGEMENT_ENDPOINT", "http://localhost:8080/");

        let config = load(&vars).expect("config should load");

        assert_eq!(config.time_window.seconds(), 604800);
        assert_eq!(config.max_pages.map(|max_pages| max_pages.get()), Some(5));
        assert_eq!(config.entity_failure_policy, EntityFailurePolicy::Abort);
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.token_scope(), "http://localhost:8080/.default");
    }

    #[test]
    fn empty_required_value_is_missing() {
        let mut vars = required_vars();
        vars.insert("AZURE_CLIENT_SECRET", "  ");

        match load(&vars) {
            Err(AppError::MissingConfig(name)) => assert_eq!(name, "AZURE_CLIENT_SECRET"),
            other => panic!("expected MissingConfig, got {:?}", other),
        }
    }

    #[test]
    fn rejects_invalid_numbers_and_policies() {
        let mut vars = required_vars();
        vars.insert("SENTINEL_TIME_WINDOW_SECONDS", "a day");
        assert!(matches!(load(&vars), Err(AppError::InvalidConfig { .. })));

        let mut vars = required_vars();
        vars.insert("SENTINEL_ENTITY_FAILURE_POLICY", "ignore");
        assert!(matches!(load(&vars), Err(AppError::InvalidConfig { .. })));
    }

    #[test]
    fn rejects_a_page_cap_of_zero() {
        let mut vars = required_vars();
        vars.insert("SENTINEL_MAX_PAGES", "0");

        match load(&vars) {
            Err(AppError::InvalidConfig { name, value }) => {
                assert_eq!(name, "SENTINEL_MAX_PAGES");
                assert_eq!(value, "0");
            }
            other => panic!("expected InvalidConfig, got {:?}", other),
        }
    }

    #[test]
    fn unlimited_lifts_the_page_cap() {
        let mut vars = required_vars();
        vars.insert("SENTINEL_MAX_PAGES", "Unlimited");

        let config = load(&vars).expect("config should load");

        assert_eq!(config.max_pages, None);
    }

    #[test]
    fn negative_window_names_the_variable() {
        let mut vars = required_vars();
        vars.insert("SENTINEL_TIME_WINDOW_SECONDS", "-60");

        match load(&vars) {
            Err(AppError::InvalidConfig { name, .. }) => assert_eq!(name, "SENTINEL_TIME_WINDOW_SECONDS"),
            other => panic!("expected InvalidConfig, got {:?}", other),
        }
    }

    #[test]
    fn policy_displays_as_its_setting_value() {
        assert_eq!(EntityFailurePolicy::Tolerate.to_string(), "tolerate");
        assert_eq!(EntityFailurePolicy::Abort.to_string(), "abort");
        assert_eq!(EntityFailurePolicy::Abort.to_string().parse::<EntityFailurePolicy>().unwrap(), EntityFailurePolicy::Abort);
    }

    #[test]
    fn client_secret_is_not_printed() {
        let config = load(&required_vars()).expect("config should load");
        let printed = format!("{:?}", config);

        assert!(!printed.contains("\"secret\""));
    }

    #[test]
    #[serial]
    fn loads_from_process_environment() {
        temp_env::with_vars(
            [
                ("AZURE_TENANT_ID", Some("env-tenant")),
                ("AZURE_CLIENT_ID", Some("env-client")),
                ("AZURE_CLIENT_SECRET", Some("env-secret")),
                ("AZURE_SUBSCRIPTION_ID", Some("env-subscription")),
                ("SENTINEL_RESOURCE_GROUP", Some("env-rg")),
                ("SENTINEL_WORKSPACE_NAME", Some("env-workspace")),
                ("SENTINEL_TIME_WINDOW_SECONDS", Some("3600")),
                ("SENTINEL_MAX_PAGES", None),
            ],
            || {
                let config = Config::from_env().expect("config should load");
                assert_eq!(config.tenant_id, "env-tenant");
                assert_eq!(config.workspace_name, "env-workspace");
                assert_eq!(config.time_window.seconds(), 3600);
            },
        );
    }
}
