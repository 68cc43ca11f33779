//! HTTP client for the PokeAPI.
//!
//! Every request carries a fixed ten second time limit and an
//! `Accept: application/json` header. Failures are classified where they
//! happen into timeout, not-found, network or unknown, and given the
//! resource-specific message the views display.

use crate::api::models::{DetailsResponse, ListResponse, TypeResponse};
use crate::api::source::DataSource;
use crate::domain::{DexError, Entity, EntityDetails, ErrorKind, Page, RemoteError, Result};
use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::Instrument;

/// Default PokeAPI endpoint.
pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";

/// Upper bound on a single request, not user-configurable.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Characters escaped when a user-supplied name is placed in a URL path.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'?')
    .add(b'`');

const TIMEOUT_MESSAGE: &str = "Request timeout. Please try again.";
const NETWORK_MESSAGE: &str = "Network error. Please check your internet connection.";

/// User-facing messages for one kind of request.
#[derive(Debug, Clone)]
struct Messages {
    timeout: String,
    not_found: String,
    unknown: String,
}

impl Messages {
    fn list() -> Self {
        Self {
            timeout: TIMEOUT_MESSAGE.to_string(),
            not_found: "Pokémon API endpoint not found.".to_string(),
            unknown: "Failed to load Pokémon. Please try again.".to_string(),
        }
    }

    fn category(category: &str) -> Self {
        Self {
            timeout: TIMEOUT_MESSAGE.to_string(),
            not_found: format!("Type \"{category}\" not found"),
            unknown: "Failed to load Pokémon of this type. Please try again.".to_string(),
        }
    }

    fn details(id: &str) -> Self {
        Self {
            timeout: TIMEOUT_MESSAGE.to_string(),
            not_found: format!("Pokémon with ID \"{id}\" not found"),
            unknown: "Failed to load Pokémon details. Please try again.".to_string(),
        }
    }

    fn search(name: &str) -> Self {
        Self {
            timeout: "Search timeout. Please try again.".to_string(),
            not_found: format!("Pokémon \"{name}\" not found"),
            unknown: "Failed to search Pokémon. Please try again.".to_string(),
        }
    }

    fn not_found(&self) -> RemoteError {
        RemoteError::new(ErrorKind::NotFound, self.not_found.clone())
    }

    fn classify(&self, error: &reqwest::Error) -> RemoteError {
        if error.is_timeout() {
            RemoteError::new(ErrorKind::Timeout, self.timeout.clone())
        } else if error.status() == Some(StatusCode::NOT_FOUND) {
            self.not_found()
        } else if error.is_connect() || error.is_request() {
            RemoteError::new(ErrorKind::Network, NETWORK_MESSAGE)
        } else {
            RemoteError::new(ErrorKind::Unknown, self.unknown.clone())
        }
    }
}

/// reqwest-backed [`DataSource`].
#[derive(Debug, Clone)]
pub struct PokeApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl PokeApiClient {
    /// Creates a client for the API rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::Config`] if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()
            .map_err(|e| DexError::Config(format!("failed to build HTTP client: {e}")))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        tracing::debug!(base_url = %base_url, "api client created");

        Ok(Self { http, base_url })
    }

    /// Root URL the client sends requests to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, u32)],
        messages: &Messages,
    ) -> std::result::Result<T, RemoteError> {
        let url = format!("{}{path}", self.base_url);
        let span = tracing::debug_span!("api_get", url = %url);

        async {
            let response = self
                .http
                .get(&url)
                .query(query)
                .send()
                .await
                .map_err(|e| {
                    let err = messages.classify(&e);
                    tracing::warn!(kind = %err.kind, error = %e, "request failed");
                    err
                })?;

            let status = response.status();
            if status == StatusCode::NOT_FOUND {
                tracing::debug!("resource not found");
                return Err(messages.not_found());
            }
            if !status.is_success() {
                tracing::warn!(status = %status, "unexpected status");
                return Err(RemoteError::new(ErrorKind::Unknown, messages.unknown.clone()));
            }

            response.json::<T>().await.map_err(|e| {
                let err = messages.classify(&e);
                tracing::warn!(kind = %err.kind, error = %e, "failed to read response body");
                err
            })
        }
        .instrument(span)
        .await
    }
}

#[async_trait]
impl DataSource for PokeApiClient {
    async fn list_page(&self, offset: u32, limit: u32) -> std::result::Result<Page<Entity>, RemoteError> {
        tracing::debug!(offset, limit, "fetching list page");
        let response: ListResponse = self
            .get_json("/pokemon", &[("offset", offset), ("limit", limit)], &Messages::list())
            .await?;
        Ok(response.into())
    }

    async fn name_index(&self, limit: u32) -> std::result::Result<Vec<Entity>, RemoteError> {
        tracing::debug!(limit, "fetching name index");
        let response: ListResponse = self
            .get_json("/pokemon", &[("limit", limit)], &Messages::list())
            .await?;
        let page: Page<Entity> = response.into();
        Ok(page.results)
    }

    async fn category_index(&self, category: &str) -> std::result::Result<Vec<Entity>, RemoteError> {
        let category = category.trim().to_lowercase();
        tracing::debug!(category = %category, "fetching category index");
        let path = format!("/type/{}", utf8_percent_encode(&category, PATH_SEGMENT));
        let response: TypeResponse = self
            .get_json(&path, &[], &Messages::category(&category))
            .await?;
        Ok(response.into_entities())
    }

    async fn entity_by_id(&self, id: &str) -> std::result::Result<EntityDetails, RemoteError> {
        tracing::debug!(id = %id, "fetching details");
        let path = format!("/pokemon/{}", utf8_percent_encode(id.trim(), PATH_SEGMENT));
        let response: DetailsResponse = self.get_json(&path, &[], &Messages::details(id)).await?;
        Ok(response.into())
    }

    async fn entity_by_name(&self, name: &str) -> std::result::Result<EntityDetails, RemoteError> {
        let normalized = name.trim().to_lowercase();
        tracing::debug!(name = %normalized, "looking up by name");
        let path = format!("/pokemon/{}", utf8_percent_encode(&normalized, PATH_SEGMENT));
        let response: DetailsResponse = self.get_json(&path, &[], &Messages::search(name)).await?;
        Ok(response.into())
    }

    async fn ping(&self) -> bool {
        match self.list_page(0, 1).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "api ping failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = PokeApiClient::new("https://pokeapi.co/api/v2/").unwrap();
        assert_eq!(client.base_url(), "https://pokeapi.co/api/v2");
    }

    #[test]
    fn resource_messages_carry_identifier() {
        assert_eq!(Messages::search("missingno").not_found().message, "Pokémon \"missingno\" not found");
        assert_eq!(Messages::details("9999").not_found().message, "Pokémon with ID \"9999\" not found");
        assert_eq!(Messages::category("plasma").not_found().kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn unreachable_host_is_a_network_error() {
        // Port 9 (discard) on localhost is closed on any sane test machine.
        let client = PokeApiClient::new("http://127.0.0.1:9").unwrap();
        let err = client.list_page(0, 20).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Network);
        assert!(!client.ping().await);
    }
}
