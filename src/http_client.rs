use std::time::Duration;

use reqwest::Client;

use crate::errors::AppError;

pub fn build_http_client(timeout: Option<Duration>) -> Result<Client, AppError> {
    let mut builder = Client::builder();

    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    let client = builder.build()?;

    Ok(client)
}
