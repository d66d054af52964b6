use crate::error::{Result, StarredReleasesError};
use crate::models::RateLimitState;
use crate::queries::{
    LegacyStarredRepositories, ReleaseDescriptions, ReleaseDescriptionsVariables, StarredRepositories,
    StarredVariables, MAX_NODE_IDS,
};
use crate::types::{LegacyStarredResponse, ReleaseDescriptionsResponse, StarredResponse};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt, TryStreamExt};
use graphql_client::GraphQLQuery;
use reqwest::{Client, Response, StatusCode};
use std::collections::HashMap;
use std::time::{Duration, SystemTime};
use tokio::time::sleep;
use tracing::{debug, warn};
use url::Url;

pub const GRAPHQL_URL: &str = "https://api.github.com/graphql";
const MAX_RETRIES: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_secs(2);
const MAX_RATE_LIMIT_WAIT: Duration = Duration::from_secs(60);
const LOW_QUOTA: u32 = 10;
const MAX_CONCURRENT_BATCHES: usize = 2;

pub struct GitHubClient {
    client: Client,
    token: String,
    endpoint: Url,
}

impl GitHubClient {
    pub fn new(token: String) -> Result<Self> {
        let endpoint = Url::parse(GRAPHQL_URL)
            .map_err(|e| StarredReleasesError::InvalidRequest(format!("Invalid endpoint: {}", e)))?;
        Self::with_endpoint(token, endpoint)
    }

    pub fn with_endpoint(token: String, endpoint: Url) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("starred-releases/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(GitHubClient { client, token, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Issues one query and decodes its `data`.
    async fn execute<Q: GraphQLQuery>(&self, variables: Q::Variables) -> Result<Q::ResponseData> {
        let body = Q::build_query(variables);
        debug!(operation = body.operation_name, endpoint = %self.endpoint, "Sending GraphQL query");

        let response = self.make_request(&body).await?;
        let text = response.text().await?;
        let parsed: graphql_client::Response<Q::ResponseData> = serde_json::from_str(&text)?;

        let errors = parsed.errors.unwrap_or_default();

        match parsed.data {
            // Partial success, e.g. `nodes(ids:)` with an id that no longer resolves.
            Some(data) => {
                for error in &errors {
                    warn!(operation = body.operation_name, "GraphQL error: {}", error.message);
                }
                Ok(data)
            }
            None if !errors.is_empty() => Err(StarredReleasesError::from_graphql_errors(&errors)),
            None => Err(StarredReleasesError::ApiError(format!(
                "{} returned no data",
                body.operation_name
            ))),
        }
    }

    async fn make_request<V: serde::Serialize>(&self, body: &V) -> Result<Response> {
        let mut retries = 0;

        loop {
            let response = self
                .client
                .post(self.endpoint.clone())
                .bearer_auth(&self.token)
                .json(body)
                .send()
                .await?;

            let rate_limit = rate_limit_from_headers(&response);

            match response.status() {
                StatusCode::OK => {
                    if rate_limit.remaining < LOW_QUOTA {
                        warn!(remaining = rate_limit.remaining, "Rate limit low");
                    }
                    return Ok(response);
                }
                StatusCode::UNAUTHORIZED => {
                    let error_text = response.text().await.unwrap_or_default();
                    return Err(StarredReleasesError::AuthError(format!("Bad credentials: {}", error_text)));
                }
                StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS if rate_limit.is_limited => {
                    let reset_time = SystemTime::from(rate_limit.reset_time);
                    let wait_time = reset_time
                        .duration_since(SystemTime::now())
                        .unwrap_or(Duration::from_secs(0));

                    if wait_time > MAX_RATE_LIMIT_WAIT || retries >= MAX_RETRIES {
                        return Err(StarredReleasesError::RateLimitExceeded(format!(
                            "API rate limit exceeded. Reset at: {}",
                            rate_limit.reset_time
                        )));
                    }

                    warn!("Rate limit reached. Waiting {} seconds...", wait_time.as_secs() + 1);
                    sleep(wait_time + Duration::from_secs(1)).await;
                    retries += 1;
                }
                StatusCode::FORBIDDEN => {
                    let error_text = response.text().await.unwrap_or_default();
                    return Err(StarredReleasesError::ApiError(format!("Forbidden: {}", error_text)));
                }
                status if status.is_server_error() && retries < MAX_RETRIES => {
                    warn!("Server error ({}). Retrying in {} seconds...", status, RETRY_DELAY.as_secs());
                    sleep(RETRY_DELAY).await;
                    retries += 1;
                }
                status => {
                    let error_text = response.text().await.unwrap_or_default();
                    return Err(StarredReleasesError::ApiError(format!(
                        "API request failed with status {}: {}",
                        status, error_text
                    )));
                }
            }
        }
    }

    /// Fetch a page of starred repositories (20 per page) without release descriptions
    pub async fn fetch_starred_page(&self, cursor: Option<&str>) -> Result<StarredResponse> {
        let variables = StarredVariables {
            cursor: cursor.map(str::to_string),
        };
        self.execute::<StarredRepositories>(variables).await
    }

    /// Fetch a page of starred repositories (5 per page) with release descriptions inlined
    pub async fn fetch_legacy_starred_page(&self, cursor: Option<&str>) -> Result<LegacyStarredResponse> {
        let variables = StarredVariables {
            cursor: cursor.map(str::to_string),
        };
        self.execute::<LegacyStarredRepositories>(variables).await
    }

    /// Fetch rendered descriptions for at most [`MAX_NODE_IDS`] releases
    pub async fn fetch_release_descriptions(&self, release_ids: &[String]) -> Result<ReleaseDescriptionsResponse> {
        if release_ids.is_empty() {
            return Err(StarredReleasesError::InvalidRequest("No release ids given".to_string()));
        }
        if release_ids.len() > MAX_NODE_IDS {
            return Err(StarredReleasesError::InvalidRequest(format!(
                "{} release ids given, at most {} per request",
                release_ids.len(),
                MAX_NODE_IDS
            )));
        }

        let variables = ReleaseDescriptionsVariables {
            release_ids: release_ids.to_vec(),
        };
        self.execute::<ReleaseDescriptions>(variables).await
    }

    /// Descriptions for any number of releases, fetched in batches with at most
    /// two requests in flight
    pub async fn fetch_description_map(&self, release_ids: &[String]) -> Result<HashMap<String, Option<String>>> {
        if release_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let responses: Vec<ReleaseDescriptionsResponse> = stream::iter(release_ids.chunks(MAX_NODE_IDS))
            .map(|batch| self.fetch_release_descriptions(batch))
            .buffered(MAX_CONCURRENT_BATCHES)
            .try_collect()
            .await?;

        if let Some(last) = responses.last() {
            debug!(
                batches = responses.len(),
                remaining = last.rate_limit.remaining,
                "Fetched release descriptions"
            );
        }

        Ok(responses
            .iter()
            .flat_map(|response| response.descriptions())
            .map(|node| (node.id.clone(), node.description_html.clone()))
            .collect())
    }
}

/// Rate limit state carried by the `X-RateLimit-*` response headers
pub fn rate_limit_from_headers(response: &Response) -> RateLimitState {
    let headers = response.headers();

    let header = |name: &str| headers.get(name).and_then(|h| h.to_str().ok());

    let remaining = header("X-RateLimit-Remaining").and_then(|s| s.parse::<u32>().ok());

    let limit = header("X-RateLimit-Limit")
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(5000);

    let reset_time = header("X-RateLimit-Reset")
        .and_then(|s| s.parse::<i64>().ok())
        .and_then(|timestamp| DateTime::<Utc>::from_timestamp(timestamp, 0))
        .unwrap_or_else(|| Utc::now() + chrono::Duration::hours(1));

    match remaining {
        Some(remaining) => RateLimitState {
            remaining,
            limit,
            reset_time,
            is_limited: remaining == 0,
        },
        // No header means no quota information, not an exhausted quota.
        None => RateLimitState {
            remaining: limit,
            limit,
            reset_time,
            is_limited: false,
        },
    }
}
