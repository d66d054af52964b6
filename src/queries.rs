//! GraphQL documents sent to the GitHub API and the variables they take.
//!
//! Each document is paired with its response type in `crate::types` through
//! [`GraphQLQuery`], so a request body and the shape it decodes into are
//! always chosen together.

use crate::types::{LegacyStarredResponse, PageInfo, ReleaseDescriptionsResponse, StarredResponse};
use graphql_client::{GraphQLQuery, QueryBody};
use serde::{Deserialize, Serialize};

/// Repositories per page in [`LEGACY_STARRED_QUERY`].
pub const LEGACY_PAGE_SIZE: usize = 5;

/// Repositories per page in [`STARRED_QUERY`].
pub const PAGE_SIZE: usize = 20;

/// Largest `ids` list GitHub accepts for a `nodes` lookup.
pub const MAX_NODE_IDS: usize = 100;

/// First page-fetch variant. Requests the rendered description of every
/// release on every page, which makes each page expensive.
pub const LEGACY_STARRED_QUERY: &str = r#"
query StarredRepositoriesWithDescriptions($cursor: String) {
  viewer {
    starredRepositories(first: 5, after: $cursor, orderBy: { field: STARRED_AT, direction: DESC }) {
      totalCount
      pageInfo {
        startCursor
        hasPreviousPage
        endCursor
        hasNextPage
      }
      nodes {
        description
        languages(first: 100) {
          nodes {
            id
            name
          }
        }
        licenseInfo {
          spdxId
        }
        name
        owner {
          avatarUrl
          login
          url
        }
        primaryLanguage {
          id
          name
        }
        releases(first: 100, orderBy: { field: CREATED_AT, direction: DESC }) {
          nodes {
            descriptionHTML
            id
            isDraft
            isPrerelease
            name
            publishedAt
            url
          }
        }
        stargazerCount
        url
      }
    }
  }

  rateLimit {
    cost
    limit
    remaining
    used
    resetAt
  }
}
"#;

/// Page fetch without release descriptions; those come from
/// [`RELEASE_DESCRIPTIONS_QUERY`] for just the releases being shown.
pub const STARRED_QUERY: &str = r#"
query StarredRepositories($cursor: String) {
  viewer {
    starredRepositories(first: 20, after: $cursor, orderBy: { field: STARRED_AT, direction: DESC }) {
      totalCount
      pageInfo {
        startCursor
        hasPreviousPage
        endCursor
        hasNextPage
      }
      nodes {
        description
        languages(first: 100) {
          nodes {
            id
            name
          }
        }
        licenseInfo {
          spdxId
        }
        name
        owner {
          avatarUrl
          login
          url
        }
        primaryLanguage {
          id
          name
        }
        releases(first: 100, orderBy: { field: CREATED_AT, direction: DESC }) {
          nodes {
            id
            isDraft
            isPrerelease
            name
            publishedAt
            url
          }
        }
        stargazerCount
        url
      }
    }
  }

  rateLimit {
    cost
    limit
    remaining
    used
    resetAt
  }
}
"#;

pub const RELEASE_DESCRIPTIONS_QUERY: &str = r#"
query ReleaseDescriptions($releaseIds: [ID!]!) {
  nodes(ids: $releaseIds) {
    ... on Release {
      id
      descriptionHTML
    }
  }

  rateLimit {
    cost
    limit
    remaining
    used
    resetAt
  }
}
"#;

/// Variables of both page queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarredVariables {
    pub cursor: Option<String>,
}

impl StarredVariables {
    pub fn first_page() -> Self {
        Self::default()
    }

    /// Variables for the page after `page_info`, or `None` on the last page.
    pub fn after(page_info: &PageInfo) -> Option<Self> {
        if !page_info.has_next_page {
            return None;
        }
        page_info.end_cursor.as_ref().map(|cursor| Self {
            cursor: Some(cursor.clone()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseDescriptionsVariables {
    pub release_ids: Vec<String>,
}

pub struct LegacyStarredRepositories;

impl GraphQLQuery for LegacyStarredRepositories {
    type Variables = StarredVariables;
    type ResponseData = LegacyStarredResponse;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: LEGACY_STARRED_QUERY,
            operation_name: "StarredRepositoriesWithDescriptions",
        }
    }
}

pub struct StarredRepositories;

impl GraphQLQuery for StarredRepositories {
    type Variables = StarredVariables;
    type ResponseData = StarredResponse;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: STARRED_QUERY,
            operation_name: "StarredRepositories",
        }
    }
}

pub struct ReleaseDescriptions;

impl GraphQLQuery for ReleaseDescriptions {
    type Variables = ReleaseDescriptionsVariables;
    type ResponseData = ReleaseDescriptionsResponse;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: RELEASE_DESCRIPTIONS_QUERY,
            operation_name: "ReleaseDescriptions",
        }
    }
}
