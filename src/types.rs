use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// GitHub GraphQL response structures. Field names mirror the selections in
// `crate::queries` one-to-one.

/// `{ nodes: [...] }` wrapper used by every connection in these queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nodes<T> {
    pub nodes: Vec<T>,
}

/// Response of the legacy page query, releases carry their HTML description.
pub type LegacyStarredResponse = StarredResponse<ReleaseWithDescription>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StarredResponse<R = Release> {
    pub viewer: Viewer<R>,
    pub rate_limit: RateLimit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewer<R> {
    pub starred_repositories: StarredRepositoriesPage<R>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StarredRepositoriesPage<R> {
    pub total_count: u32,
    pub page_info: PageInfo,
    pub nodes: Vec<Repository<R>>,
}

/// Cursors are opaque, they are only ever echoed back to the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub start_cursor: Option<String>,
    pub has_previous_page: bool,
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository<R> {
    #[serde(flatten)]
    pub info: RepositoryInfo,
    /// Newest first.
    pub releases: Nodes<R>,
}

/// Repository fields without its releases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryInfo {
    pub description: Option<String>,
    pub languages: Nodes<Language>,
    pub license_info: Option<LicenseInfo>,
    pub name: String,
    pub owner: Owner,
    pub primary_language: Option<Language>,
    pub stargazer_count: u32,
    pub url: String,
}

impl RepositoryInfo {
    /// `owner/name`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner.login, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseInfo {
    pub spdx_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    pub avatar_url: String,
    pub login: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    pub id: String,
    pub is_draft: bool,
    pub is_prerelease: bool,
    pub name: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseWithDescription {
    #[serde(flatten)]
    pub release: Release,
    #[serde(rename = "descriptionHTML")]
    pub description_html: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimit {
    pub cost: u32,
    pub limit: u32,
    pub remaining: u32,
    pub used: u32,
    pub reset_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseDescriptionsResponse {
    pub nodes: Vec<Option<DescriptionNode>>,
    pub rate_limit: RateLimit,
}

impl ReleaseDescriptionsResponse {
    /// Release nodes only; unresolved ids and other node types are skipped.
    pub fn descriptions(&self) -> impl Iterator<Item = &ReleaseDescription> {
        self.nodes.iter().filter_map(|node| match node {
            Some(DescriptionNode::Release(release)) => Some(release),
            _ => None,
        })
    }
}

/// An entry of `nodes(ids:)`. The `... on Release` fragment leaves any other
/// node type as an empty object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DescriptionNode {
    Release(ReleaseDescription),
    Other(OtherNode),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherNode {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseDescription {
    pub id: String,
    #[serde(rename = "descriptionHTML")]
    pub description_html: Option<String>,
}
