//! mwviews - Query the Wikimedia pageviews API from the command line

use clap::Parser;
use mwviews::{
    PageviewsClient, Result,
    cli::{Cli, Command, article_request, project_request, top_request},
    output::get_formatter,
};
use std::io::Write;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // --quiet and --verbose override RUST_LOG
    let filter = if cli.quiet {
        tracing_subscriber::EnvFilter::new("warn")
    } else if cli.verbose {
        tracing_subscriber::EnvFilter::new("mwviews=debug,mwviews_client=debug,mwviews_core=debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new("mwviews=info,mwviews_client=info,mwviews_core=info")
        })
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let show_progress = !cli.json && is_terminal::is_terminal(std::io::stdout());
    let client = PageviewsClient::new(cli.client_config()?)?.with_progress(show_progress);
    let formatter = get_formatter(cli.json);

    let rendered = match &cli.command {
        Command::Articles {
            project,
            articles,
            series,
        } => {
            info!("Fetching views for {} article(s) on {}", articles.len(), project);
            let request = article_request(project, articles, series);
            let table = client.article_views(&request).await?;
            formatter.format_views(&table, series.granularity)
        }

        Command::Projects { projects, series } => {
            info!("Fetching aggregate views for {} project(s)", projects.len());
            let request = project_request(projects, series);
            let table = client.project_views(&request).await?;
            formatter.format_views(&table, series.granularity)
        }

        Command::Top {
            project,
            access,
            year,
            month,
            day,
            limit,
        } => {
            info!("Fetching top articles for {}", project);
            let request = top_request(project, *access, *year, *month, *day, *limit);
            let entries = client.top_articles(&request).await?;
            formatter.format_top(&entries)
        }
    };

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{rendered}")?;
    stdout.flush()?;

    Ok(())
}
