use std::num::NonZeroUsize;

use clap::{Args, Parser, Subcommand};

use crate::{
    config::{Config, EntityFailurePolicy},
    errors::AppError,
    incidents::TimeWindow,
    recent_incidents::{fetch_strategy, get_incident_entities, get_new_incidents},
    timestamp::get_current_timestamp_utc,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Report recent Microsoft Sentinel incidents and their endpoints", long_about = None)]
pub struct App {
    #[clap(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Args, Default)]
pub struct RecentArgs {
    /// Overrides SENTINEL_TIME_WINDOW_SECONDS, e.g. 604800 for 7 days
    #[arg(long)]
    pub window_seconds: Option<i64>,

    /// Only read the first page of incidents
    #[arg(long)]
    pub single_page: bool,

    /// Overrides SENTINEL_MAX_PAGES, must be at least 1
    #[arg(long)]
    pub max_pages: Option<NonZeroUsize>,

    /// Follow nextLink without a page cap
    #[arg(long, conflicts_with = "max_pages")]
    pub no_page_limit: bool,

    #[arg(long)]
    pub entity_kind: Option<String>,

    #[arg(long)]
    pub entity_field: Option<String>,

    #[arg(long, value_enum)]
    pub entity_failure_policy: Option<EntityFailurePolicy>,
}

#[derive(Debug, Args)]
pub struct EntitiesArgs {
    #[arg(long)]
    pub incident_id: String,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List incidents created within the time window with their endpoints
    Recent(RecentArgs),
    /// Print the raw entities response of one incident
    Entities(EntitiesArgs),
}

impl RecentArgs {
    pub fn apply(&self, config: &mut Config) -> Result<(), AppError> {
        if let Some(seconds) = self.window_seconds {
            config.time_window = TimeWindow::from_seconds(seconds).ok_or_else(|| AppError::InvalidConfig {
                name: "--window-seconds".to_string(),
                value: seconds.to_string(),
            })?;
        }
        if self.no_page_limit {
            config.max_pages = None;
        } else if let Some(max_pages) = self.max_pages {
            config.max_pages = Some(max_pages);
        }
        if let Some(kind) = &self.entity_kind {
            config.entity_kind = kind.clone();
        }
        if let Some(field) = &self.entity_field {
            config.entity_field = field.clone();
        }
        if let Some(policy) = self.entity_failure_policy {
            config.entity_failure_policy = policy;
        }

        Ok(())
    }
}

/// Run the parsed command and return what should be printed on stdout.
pub async fn run(app: App, mut config: Config) -> Result<String, AppError> {
    match app.command.unwrap_or_else(|| Command::Recent(RecentArgs::default())) {
        Command::Recent(args) => {
            args.apply(&mut config)?;
            let strategy = fetch_strategy(&config, !args.single_page);

            let report = get_new_incidents(&config, strategy, get_current_timestamp_utc()).await?;
            Ok(report.to_string())
        }
        Command::Entities(args) => {
            let entities = get_incident_entities(&config, &args.incident_id).await?;
            Ok(serde_json::to_string_pretty(&entities)?)
        }
    }
}
