//! monday.com client module
//!
//! Provides `MondayClient` for posting GraphQL queries to monday.com.

use super::{GraphQl, GraphQlRequest};
use crate::config::ApiConfig;
use crate::error::FetchError;
use eyre::Result;
use reqwest::Client;
use serde_json::Value;
use url::Url;

/// monday.com client for making GraphQL requests.
///
/// Every request carries the API key in the `Authorization` header and, when
/// configured, the `API-Version` header.
///
/// # Example
/// ```no_run
/// use monday_asset_sync::client::{GraphQl, GraphQlRequest, MondayClient};
/// use url::Url;
///
/// # async fn example() -> eyre::Result<()> {
/// let url = Url::parse("https://api.monday.com/v2")?;
/// let client = MondayClient::try_new(url, "my-token", Some("2024-10"))?;
/// let me = client.execute(&GraphQlRequest::new("query { me { id } }")).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct MondayClient {
    client: Client,
    url: Url,
}

impl MondayClient {
    /// Create a new MondayClient from an endpoint URL, API key and API version.
    ///
    /// # Errors
    /// Returns an error if the key or version are not valid header values, or
    /// the HTTP client cannot be built
    pub fn try_new(url: Url, api_key: &str, api_version: Option<&str>) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(reqwest::header::AUTHORIZATION, api_key.parse()?);
        if let Some(version) = api_version {
            headers.insert("api-version", version.parse()?);
        }
        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self { client, url })
    }

    /// Create a client from the API section of the run configuration
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::try_new(
            config.url.clone(),
            &config.api_key,
            config.api_version.as_deref(),
        )
    }
}

impl GraphQl for MondayClient {
    async fn execute(&self, request: &GraphQlRequest) -> Result<Value> {
        log::trace!("POST {} {}", self.url, request.query.trim());

        let response = self
            .client
            .post(self.url.clone())
            .json(request)
            .send()
            .await
            .map_err(FetchError::Transport)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body }.into());
        }

        let body: Value = response.json().await.map_err(FetchError::Decode)?;

        if let Some(errors) = body.get("errors").and_then(Value::as_array)
            && !errors.is_empty()
        {
            let messages: Vec<String> = errors
                .iter()
                .map(|e| match e.get("message").and_then(Value::as_str) {
                    Some(message) => message.to_string(),
                    None => e.to_string(),
                })
                .collect();
            return Err(FetchError::Api(messages.join("; ")).into());
        }

        Ok(body)
    }
}
