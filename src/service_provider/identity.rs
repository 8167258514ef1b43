use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_derive::Deserialize;
use tracing::{error, info};

use crate::errors::AppError;

/// Bearer token for the management API. Lives for one run and is never printed.
#[derive(Debug)]
pub struct Credential(SecretString);

impl Credential {
    pub fn new(token: String) -> Credential {
        Credential(SecretString::new(token.into()))
    }

    pub fn token(&self) -> &SecretString {
        &self.0
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// Client-credentials token exchange against Microsoft Entra ID.
pub struct TokenProvider<'a> {
    http_client: &'a Client,
    authority_host: String,
    tenant_id: String,
    client_id: String,
    client_secret: &'a SecretString,
    scope: String,
}

impl<'a> TokenProvider<'a> {
    pub fn new(
        http_client: &'a Client,
        authority_host: &str,
        tenant_id: &str,
        client_id: &str,
        client_secret: &'a SecretString,
        scope: String,
    ) -> TokenProvider<'a> {
        TokenProvider {
            http_client,
            authority_host: authority_host.trim_end_matches('/').to_string(),
            tenant_id: tenant_id.to_string(),
            client_id: client_id.to_string(),
            client_secret,
            scope,
        }
    }

    fn token_url(&self) -> String {
        format!("{}/{}/oauth2/v2.0/token", self.authority_host, self.tenant_id)
    }

    pub async fn acquire_token(&self) -> Result<Credential, AppError> {
        info!("Requesting access token for client {}", self.client_id);

        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose_secret()),
            ("scope", self.scope.as_str()),
        ];

        let response = self.http_client
            .post(self.token_url())
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let token_response: Option<TokenResponse> = serde_json::from_str(&body).ok();

        match token_response {
            Some(TokenResponse { access_token: Some(token), .. }) if status.is_success() && !token.is_empty() => {
                Ok(Credential::new(token))
            }
            Some(TokenResponse { error, error_description, .. }) => {
                let message = match (error, error_description) {
                    (Some(error), Some(description)) => format!("{}: {}", error, description),
                    (Some(error), None) => error,
                    (None, Some(description)) => description,
                    (None, None) => format!("response without access_token, status: {}", status),
                };
                error!("Failed to obtain token: {}", message);
                Err(AppError::AuthenticationError(message))
            }
            None => {
                error!("Failed to obtain token, status: {}, body: {}", status, body);
                Err(AppError::AuthenticationError(format!("status: {}, body: {}", status, body)))
            }
        }
    }
}
