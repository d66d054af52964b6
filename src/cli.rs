use clap::Parser;
use url::Url;

#[derive(Parser)]
#[command(name = "starred-releases")]
#[command(about = "Lists releases of the repositories you starred on GitHub, newest first")]
#[command(version)]
pub struct Cli {
    /// GitHub token used for the GraphQL API
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: String,

    /// GraphQL endpoint
    #[arg(long, env = "GITHUB_GRAPHQL_URL", default_value = crate::github::GRAPHQL_URL)]
    pub endpoint: Url,

    /// Cursor of the page to fetch, as printed after the previous page
    #[arg(long)]
    pub cursor: Option<String>,

    /// Use the older query: 5 repositories per page, descriptions inlined
    #[arg(long)]
    pub legacy: bool,

    /// Fetch rendered release descriptions with a second query
    #[arg(long, conflicts_with = "legacy")]
    pub descriptions: bool,

    /// Print the feed as JSON
    #[arg(long)]
    pub json: bool,
}
