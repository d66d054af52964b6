use crate::types::{RateLimit, Release, ReleaseWithDescription, Repository, RepositoryInfo};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A release annotated with the repository it belongs to, independent of
/// how the API grouped it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseObj {
    #[serde(flatten)]
    pub release: Release,
    #[serde(rename = "descriptionHTML")]
    pub description_html: Option<String>,
    pub repo: RepositoryInfo,
}

impl ReleaseObj {
    /// Release name, falling back to the repository name for untitled releases.
    pub fn display_name(&self) -> &str {
        match self.release.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.repo.name,
        }
    }
}

/// Release record that can be placed in the feed.
pub trait FeedRelease {
    fn into_parts(self) -> (Release, Option<String>);
}

impl FeedRelease for Release {
    fn into_parts(self) -> (Release, Option<String>) {
        (self, None)
    }
}

impl FeedRelease for ReleaseWithDescription {
    fn into_parts(self) -> (Release, Option<String>) {
        (self.release, self.description_html)
    }
}

/// Flattens a page of repositories into one feed, newest publication first.
/// Unpublished releases go last; equal timestamps keep page order.
pub fn release_feed<R, I>(repositories: I) -> Vec<ReleaseObj>
where
    R: FeedRelease,
    I: IntoIterator<Item = Repository<R>>,
{
    let mut feed: Vec<ReleaseObj> = repositories
        .into_iter()
        .flat_map(|repository| {
            let info = repository.info;
            repository
                .releases
                .nodes
                .into_iter()
                .map(move |node| {
                    let (release, description_html) = node.into_parts();
                    ReleaseObj {
                        release,
                        description_html,
                        repo: info.clone(),
                    }
                })
        })
        .collect();

    feed.sort_by(|a, b| b.release.published_at.cmp(&a.release.published_at));
    feed
}

/// Fills in descriptions fetched separately, keyed by release id.
pub fn apply_descriptions(feed: &mut [ReleaseObj], descriptions: &HashMap<String, Option<String>>) {
    for item in feed.iter_mut() {
        if let Some(html) = descriptions.get(&item.release.id) {
            item.description_html = html.clone();
        }
    }
}

/// Rate limit state as last reported by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitState {
    pub remaining: u32,
    pub limit: u32,
    pub reset_time: DateTime<Utc>,
    pub is_limited: bool,
}

impl Default for RateLimitState {
    fn default() -> Self {
        Self {
            remaining: 5000,
            limit: 5000,
            reset_time: Utc::now() + chrono::Duration::hours(1),
            is_limited: false,
        }
    }
}

impl From<&RateLimit> for RateLimitState {
    fn from(rate_limit: &RateLimit) -> Self {
        Self {
            remaining: rate_limit.remaining,
            limit: rate_limit.limit,
            reset_time: rate_limit.reset_at,
            is_limited: rate_limit.remaining == 0,
        }
    }
}
