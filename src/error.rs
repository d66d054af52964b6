use thiserror::Error;

#[derive(Error, Debug)]
pub enum StarredReleasesError {
    #[error("GitHub API error: {0}")]
    ApiError(String),

    #[error("GraphQL error: {0}")]
    GraphQl(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    AuthError(String),
}

impl StarredReleasesError {
    /// Joins the messages of a GraphQL `errors` array into one error.
    pub fn from_graphql_errors(errors: &[graphql_client::Error]) -> Self {
        let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
        StarredReleasesError::GraphQl(messages.join("; "))
    }
}

pub type Result<T> = std::result::Result<T, StarredReleasesError>;
