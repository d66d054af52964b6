use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use serde::Serialize;
use starred_releases::cli::Cli;
use starred_releases::github::GitHubClient;
use starred_releases::models::{apply_descriptions, release_feed, RateLimitState, ReleaseObj};
use starred_releases::queries::StarredVariables;
use starred_releases::types::{PageInfo, RateLimit};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FeedPage {
    total_count: u32,
    page_info: PageInfo,
    rate_limit: RateLimit,
    releases: Vec<ReleaseObj>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenv::dotenv().ok();

    // Logs go to stderr so --json output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let client = GitHubClient::with_endpoint(cli.token.clone(), cli.endpoint.clone())
        .context("Failed to create GitHub client")?;

    let page = if cli.legacy {
        let response = client
            .fetch_legacy_starred_page(cli.cursor.as_deref())
            .await
            .context("Failed to fetch starred repositories")?;
        let starred = response.viewer.starred_repositories;
        FeedPage {
            total_count: starred.total_count,
            page_info: starred.page_info,
            rate_limit: response.rate_limit,
            releases: release_feed(starred.nodes),
        }
    } else {
        let response = client
            .fetch_starred_page(cli.cursor.as_deref())
            .await
            .context("Failed to fetch starred repositories")?;
        let starred = response.viewer.starred_repositories;
        let mut releases = release_feed(starred.nodes);

        if cli.descriptions {
            let ids: Vec<String> = releases.iter().map(|item| item.release.id.clone()).collect();
            info!(releases = ids.len(), "Fetching release descriptions");
            let descriptions = client
                .fetch_description_map(&ids)
                .await
                .context("Failed to fetch release descriptions")?;
            apply_descriptions(&mut releases, &descriptions);
        }

        FeedPage {
            total_count: starred.total_count,
            page_info: starred.page_info,
            rate_limit: response.rate_limit,
            releases,
        }
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&page)?);
    } else {
        print_page(&page);
    }

    Ok(())
}

fn print_page(page: &FeedPage) {
    println!("{}", "Releases from starred repositories".bold().green());
    println!("{}\n", "=".repeat(50).dimmed());

    if page.releases.is_empty() {
        println!("{}", "No releases on this page".dimmed());
    }

    for item in &page.releases {
        let published = item
            .release
            .published_at
            .map(|at| at.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "unpublished".to_string());

        let mut badges = String::new();
        if item.release.is_draft {
            badges.push_str(" [draft]");
        }
        if item.release.is_prerelease {
            badges.push_str(" [pre-release]");
        }

        println!(
            "{} {} {}{}",
            published.cyan(),
            item.display_name().bold(),
            item.repo.full_name().dimmed(),
            badges.yellow()
        );
        println!("    {}", item.release.url.blue());

        if let Some(html) = item.description_html.as_deref().filter(|html| !html.trim().is_empty()) {
            for line in html.lines().filter(|line| !line.trim().is_empty()) {
                println!("    {}", line.trim());
            }
        }
    }

    let rate_limit = RateLimitState::from(&page.rate_limit);
    println!(
        "\n📊 {} releases, {} starred repositories in total",
        page.releases.len(),
        page.total_count
    );
    println!(
        "⏱️ Rate limit: {}/{} remaining (query cost {}), resets at {}",
        rate_limit.remaining, rate_limit.limit, page.rate_limit.cost, rate_limit.reset_time
    );
    if rate_limit.is_limited {
        println!("{}", "⚠️ Rate limit exhausted".red());
    }

    match StarredVariables::after(&page.page_info).and_then(|vars| vars.cursor) {
        Some(cursor) => println!("➡️ Next page: --cursor {}", cursor),
        None => println!("{}", "Last page".dimmed()),
    }
}
