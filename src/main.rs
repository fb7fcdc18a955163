use anyhow::Context;
use org_pulls::config::AppConfig;
use org_pulls::fetcher;
use org_pulls::transport::OctocrabTransport;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing (logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "org_pulls=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env().context("failed to load configuration")?;

    let org = std::env::args()
        .nth(1)
        .or_else(|| config.github_org.clone())
        .context("no organization given: pass one as the first argument or set GITHUB_ORG")?;

    let transport = Arc::new(OctocrabTransport::new(&config.github_api_root)?);
    let service = fetcher::build_service(transport, &config)?;

    let estimate = service.estimate_repo_count(&org).await?;
    tracing::info!(org = %org, estimate, "Fetching repositories");

    let report = fetcher::fetch_org_report(&service, &org, |repos, prs| {
        tracing::info!(repos, prs, "Fetched {} repositories, {} pull requests", repos, prs);
    })
    .await?;

    for repo in &report.repositories {
        println!("Name: {}", repo.name);
        println!("Amount of Pull Requests: {}\n", repo.pull_requests.len());
    }

    let summary = &report.summary;
    println!("Total Amount of Repositories: {}", summary.repositories);
    println!("Total Amount of Pull Requests: {}", summary.pull_requests);
    println!("Merged Pull Requests: {}", summary.merged);
    match summary.mean_open_to_merge_minutes {
        Some(minutes) => println!("Mean Open-to-Merge Time: {:.1} minutes", minutes),
        None => println!("Mean Open-to-Merge Time: n/a"),
    }

    Ok(())
}
