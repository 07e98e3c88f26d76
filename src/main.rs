use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lodestone::config::Config;
use lodestone::crawler::{fetch_all, RequestBuilder};
use lodestone::policy::DomainPolicyCache;
use lodestone::remote::RemoteUrl;

#[derive(Parser)]
#[command(
    name = "lodestone",
    version,
    about = "Content acquisition engine for feed and bookmark aggregators",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true, default_value = "text")]
    log_format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a URL and print its aggregated property map as JSON
    Props {
        /// URL to acquire
        url: String,
    },

    /// Print the feed URLs discoverable for a resource
    Feeds {
        /// URL to inspect
        url: String,
    },

    /// Report the robots policy decision and sitemaps for a URL
    Robots {
        /// URL to check
        url: String,
    },

    /// Fetch a list of URLs (one per line) in bounded batches
    Bulk {
        /// File holding the URL list
        #[arg(short, long)]
        input: String,

        /// Batch size
        #[arg(short, long, default_value = "10")]
        batch_size: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_tracing(&cli.log_format, cli.verbose)?;

    let config = Config::from_env()?;
    let builder = RequestBuilder::new(&config)?;

    match cli.command {
        Commands::Props { url } => {
            tracing::info!(url = %url, "acquiring properties");
            let mut remote = RemoteUrl::new(&url);
            let props = remote.properties(&builder).await?;
            println!("{}", serde_json::to_string_pretty(&props)?);
        }

        Commands::Feeds { url } => {
            tracing::info!(url = %url, "discovering feeds");
            let mut remote = RemoteUrl::new(&url);
            for feed in remote.feeds(&builder).await {
                println!("{feed}");
            }
        }

        Commands::Robots { url } => {
            tracing::info!(url = %url, "checking robots policy");
            let cache = DomainPolicyCache::new(config.policy.cache_size);
            let allowed = cache.is_allowed(&builder, &url).await;
            println!("allowed: {allowed}");
            for sitemap in cache.sitemaps(&builder, &url).await {
                println!("sitemap: {sitemap}");
            }
        }

        Commands::Bulk { input, batch_size } => {
            let text = tokio::fs::read_to_string(&input).await?;
            let urls: Vec<String> = text
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with('#'))
                .map(str::to_string)
                .collect();
            tracing::info!(count = urls.len(), batch_size = %batch_size, "bulk fetch");

            let results = fetch_all(
                &builder,
                &urls,
                batch_size,
                config.crawler.max_concurrent_requests,
            )
            .await;
            for (url, response) in results {
                match response {
                    Some(r) => println!("{}\t{}", r.status_code, url),
                    None => println!("dead\t{url}"),
                }
            }
        }
    }

    Ok(())
}

fn setup_tracing(format: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("lodestone=debug,info")
    } else {
        tracing_subscriber::EnvFilter::new("lodestone=info,warn")
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    Ok(())
}
