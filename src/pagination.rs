use std::{collections::HashSet, num::NonZeroUsize};

use reqwest::Client;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde_derive::Deserialize;
use tracing::{debug, info};

use crate::{errors::AppError, service_provider::identity::Credential};

/// One page of an Azure list response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(default)]
    pub next_link: Option<String>,
}

impl<T> Page<T> {
    /// The cursor to follow, if any. An empty link marks the last page as well.
    pub fn next(&self) -> Option<&str> {
        self.next_link.as_deref().filter(|link| !link.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStrategy {
    /// Only the first page, `nextLink` is ignored.
    SinglePage,
    /// Follow `nextLink` until it runs out, failing once `max_pages` pages have been fetched and more remain.
    FollowNextLink { max_pages: Option<NonZeroUsize> },
}

pub struct CursorFetcher<'a> {
    http_client: &'a Client,
    strategy: FetchStrategy,
}

impl<'a> CursorFetcher<'a> {
    pub fn new(http_client: &'a Client, strategy: FetchStrategy) -> CursorFetcher<'a> {
        CursorFetcher { http_client, strategy }
    }

    /**
      * GET `initial_url` and every page it links to, returning all items in page order.
      * Any failing page fails the whole fetch; nothing accumulated so far is returned.
     */
    pub async fn fetch_all<T>(&self, initial_url: &str, credential: &Credential) -> Result<Vec<T>, AppError>
    where
        T: DeserializeOwned,
    {
        let mut items: Vec<T> = Vec::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut current_url = Some(initial_url.to_string());

        while let Some(url) = current_url.take() {
            if let FetchStrategy::FollowNextLink { max_pages: Some(max_pages) } = self.strategy {
                if visited.len() >= max_pages.get() {
                    return Err(AppError::PaginationLimitExceeded(max_pages.get()));
                }
            }

            let page: Page<T> = self.fetch_page(&url, credential).await?;
            visited.insert(url);
            debug!(page = visited.len(), items = page.value.len(), "Fetched page");

            let next = match self.strategy {
                FetchStrategy::SinglePage => None,
                FetchStrategy::FollowNextLink { .. } => page.next().map(|link| link.to_string()),
            };
            items.extend(page.value);

            if let Some(next) = next {
                if visited.contains(&next) {
                    return Err(AppError::PaginationCycle(next));
                }
                current_url = Some(next);
            }
        }

        info!("Fetched {} items from {} page(s)", items.len(), visited.len());
        Ok(items)
    }

    async fn fetch_page<T>(&self, url: &str, credential: &Credential) -> Result<Page<T>, AppError>
    where
        T: DeserializeOwned,
    {
        let response = self.http_client
            .get(url)
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
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::pagination::Page;

    #[test]
    fn empty_or_missing_next_link_ends_pagination() {
        let last: Page<String> = serde_json::from_value(json!({ "value": ["a"] })).unwrap();
        let blank: Page<String> = serde_json::from_value(json!({ "value": [], "nextLink": "" })).unwrap();
        let null: Page<String> = serde_json::from_value(json!({ "value": [], "nextLink": null })).unwrap();
        let more: Page<String> = serde_json::from_value(json!({ "value": [], "nextLink": "https://next" })).unwrap();

        assert_eq!(last.next(), None);
        assert_eq!(blank.next(), None);
        assert_eq!(null.next(), None);
        assert_eq!(more.next(), Some("https://next"));
    }

    #[test]
    fn missing_value_is_an_empty_page() {
        let page: Page<String> = serde_json::from_value(json!({})).unwrap();

        assert!(page.value.is_empty());
    }
}
