use tracing::metadata::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::errors::AppError;

pub struct Logging;

impl Logging {
    /// Logs go to stderr so the report on stdout stays clean. `RUST_LOG` overrides the `info` default.
    pub fn try_init() -> Result<(), AppError> {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                EnvFilter::builder()
                    .with_default_directive(LevelFilter::INFO.into())
                    .from_env_lossy(),
            )
            .try_init()
            .map_err(|err| AppError::LoggingError(err.to_string()))
    }
}
