use crate::config::ClientConfig;
use crate::domain::model::{RemoteAccount, TargetList};
use crate::domain::ports::SocialApi;
use crate::utils::error::ApiError;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;

type ApiResult<T> = std::result::Result<T, ApiError>;

/// Error payload returned by Mastodon on 4xx/5xx.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// `SocialApi` implementation for the Mastodon REST API.
pub struct MastodonClient {
    client: Client,
    base_url: String,
    access_token: String,
    resolve: bool,
}

impl MastodonClient {
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("bulk-follow/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
            resolve: false,
        })
    }

    /// Ask the server to WebFinger-resolve accounts it does not know yet.
    pub fn with_resolve(mut self, resolve: bool) -> Self {
        self.resolve = resolve;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check(response: Response) -> ApiResult<Response> {
        let status = response.status();
        tracing::debug!("API response status: {}", status);
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorBody>(&text) {
            Ok(ErrorBody {
                error,
                error_description: Some(description),
            }) => format!("{} ({})", error, description),
            Ok(body) => body.error,
            Err(_) if !text.trim().is_empty() => text.trim().to_string(),
            Err(_) => status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
        };

        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl SocialApi for MastodonClient {
    async fn search_accounts(&self, query: &str, limit: usize) -> ApiResult<Vec<RemoteAccount>> {
        let mut params = vec![("q", query.to_string()), ("limit", limit.to_string())];
        if self.resolve {
            params.push(("resolve", "true".to_string()));
        }

        tracing::debug!("Searching accounts for {}", query);
        let response = self
            .client
            .get(self.url("/api/v1/accounts/search"))
            .bearer_auth(&self.access_token)
            .query(&params)
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    async fn follow(&self, account_id: &str) -> ApiResult<()> {
        let response = self
            .client
            .post(self.url(&format!("/api/v1/accounts/{}/follow", account_id)))
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    async fn add_to_list(&self, list_id: &str, account_id: &str) -> ApiResult<()> {
        let response = self
            .client
            .post(self.url(&format!("/api/v1/lists/{}/accounts", list_id)))
            .bearer_auth(&self.access_token)
            .json(&json!({ "account_ids": [account_id] }))
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    async fn lists(&self) -> ApiResult<Vec<TargetList>> {
        let response = self
            .client
            .get(self.url("/api/v1/lists"))
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    async fn create_list(&self, title: &str) -> ApiResult<TargetList> {
        let response = self
            .client
            .post(self.url("/api/v1/lists"))
            .bearer_auth(&self.access_token)
            .json(&json!({ "title": title }))
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }
}
