//! Google Places "searchText" client.
//!
//! Results are paged through `nextPageToken`. The provider rejects a token
//! that is reused too quickly, so every follow-up page waits `page_delay`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

use crate::models::place::Place;

pub const DEFAULT_PLACES_ENDPOINT: &str = "https://places.googleapis.com/v1/places:searchText";
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_secs(2);

const FIELD_MASK: [&str; 5] = [
    "places.displayName",
    "places.formattedAddress",
    "places.currentOpeningHours.openNow",
    "places.rating",
    "places.priceLevel",
];
const HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum PlacesError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Places API returned {status}: {message}")]
    Status { status: u16, message: String },
}

#[async_trait]
pub trait PlacesSearch: Send + Sync {
    /// Up to `max_results` places matching the free-text `query`.
    async fn search_text(&self, query: &str, max_results: usize) -> Result<Vec<Place>, PlacesError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchTextRequest<'a> {
    text_query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    page_token: Option<&'a str>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlacesPage {
    #[serde(default)]
    pub places: Vec<Place>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Drive a page-token loop until `max_results` places are collected or the
/// provider stops handing out tokens.
pub async fn collect_pages<F, Fut>(
    max_results: usize,
    page_delay: Duration,
    mut fetch_page: F,
) -> Result<Vec<Place>, PlacesError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<PlacesPage, PlacesError>>,
{
    let mut all_places = Vec::new();
    if max_results == 0 {
        return Ok(all_places);
    }

    let mut page_token: Option<String> = None;
    loop {
        if page_token.is_some() && !page_delay.is_zero() {
            tokio::time::sleep(page_delay).await;
        }

        let page = fetch_page(page_token.take()).await?;
        all_places.extend(page.places);

        if all_places.len() >= max_results {
            all_places.truncate(max_results);
            return Ok(all_places);
        }

        match page.next_page_token {
            Some(token) if !token.is_empty() => page_token = Some(token),
            _ => break,
        }
    }

    Ok(all_places)
}

#[derive(Clone)]
pub struct GooglePlacesClient {
    client: Client,
    api_key: String,
    endpoint: String,
    page_delay: Duration,
}

impl GooglePlacesClient {
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            page_delay: DEFAULT_PAGE_DELAY,
        })
    }

    pub fn with_page_delay(mut self, page_delay: Duration) -> Self {
        self.page_delay = page_delay;
        self
    }

    async fn fetch_page(&self, query: &str, page_token: Option<&str>) -> Result<PlacesPage, PlacesError> {
        let body = SearchTextRequest {
            text_query: query,
            page_token,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("X-Goog-Api-Key", &self.api_key)
            .header("X-Goog-FieldMask", FIELD_MASK.join(","))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(PlacesError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<PlacesPage>().await?)
    }
}

#[async_trait]
impl PlacesSearch for GooglePlacesClient {
    async fn search_text(&self, query: &str, max_results: usize) -> Result<Vec<Place>, PlacesError> {
        log::debug!("Places text search: '{}' (max {})", query, max_results);
        collect_pages(max_results, self.page_delay, |token| async move {
            self.fetch_page(query, token.as_deref()).await
        })
        .await
    }
}
