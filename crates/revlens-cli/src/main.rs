mod reviews;
mod scrape;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use revlens_core::{AppConfig, Environment};

#[derive(Debug, Parser)]
#[command(name = "revlens")]
#[command(about = "Scrape marketplace product reviews and summarize their sentiment")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape reviews for a product, classify them, and store the results
    Scrape {
        /// Product-detail or review-listing URL
        url: String,

        /// Number of reviews to collect (defaults to `REVLENS_SCRAPE_LIMIT`)
        #[arg(long)]
        limit: Option<usize>,

        /// Product name to store with the reviews; extracted from the product page when omitted
        #[arg(long)]
        product_name: Option<String>,

        /// Skip review blocks with missing fields instead of filling placeholders
        #[arg(long)]
        strict: bool,

        /// Print classified reviews as JSON without writing to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the name, image, and price extracted from a product page as JSON
    Product {
        /// Product-detail or review-listing URL
        url: String,
    },
    /// Classify a piece of text and print its label and polarity
    Classify {
        /// Text to classify
        text: String,
    },
    /// List stored reviews, newest first
    Reviews {
        /// Maximum number of reviews to show
        #[arg(long)]
        limit: Option<i64>,
    },
    /// Show summary statistics for all stored reviews
    Stats,
    /// Delete every stored review
    Clear,
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Apply pending migrations
    Migrate,
    /// Check that the database is reachable
    Ping,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = revlens_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(use_ansi_logs(&config.env))
        .init();
    tracing::debug!(env = %config.env, "configuration loaded");

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Scrape {
            url,
            limit,
            product_name,
            strict,
            dry_run,
        }) => {
            let pool = if dry_run {
                None
            } else {
                Some(connect_and_migrate(&config).await?)
            };
            let args = scrape::ScrapeArgs {
                url,
                limit: limit.unwrap_or(config.scrape_limit),
                product_name,
                strict,
            };
            scrape::run_scrape(&config, pool.as_ref(), args).await?;
        }
        Some(Commands::Product { url }) => scrape::run_product(&config, &url).await?,
        Some(Commands::Classify { text }) => {
            let (label, polarity) = revlens_sentiment::classify(&text);
            println!("{label}\t{polarity:.3}");
        }
        Some(Commands::Reviews { limit }) => {
            let pool = connect_and_migrate(&config).await?;
            reviews::run_list_reviews(&pool, limit).await?;
        }
        Some(Commands::Stats) => {
            let pool = connect_and_migrate(&config).await?;
            reviews::run_stats(&pool).await?;
        }
        Some(Commands::Clear) => {
            let pool = connect_and_migrate(&config).await?;
            reviews::run_clear(&pool).await?;
        }
        Some(Commands::Db { command }) => {
            let pool_config = revlens_db::PoolConfig::from_app_config(&config);
            let pool = revlens_db::connect_pool(&config.database_url, pool_config).await?;
            match command {
                DbCommands::Migrate => {
                    let applied = revlens_db::run_migrations(&pool).await?;
                    println!("applied {applied} migration(s)");
                }
                DbCommands::Ping => {
                    revlens_db::ping(&pool).await?;
                    println!("database reachable");
                }
            }
        }
        None => println!("revlens ready; run `revlens --help` for commands"),
    }

    Ok(())
}

/// Production logs are shipped to collectors, so they carry no colour codes.
fn use_ansi_logs(env: &Environment) -> bool {
    !matches!(env, Environment::Production)
}

async fn connect_and_migrate(config: &AppConfig) -> anyhow::Result<sqlx::SqlitePool> {
    let pool_config = revlens_db::PoolConfig::from_app_config(config);
    let pool = revlens_db::connect_pool(&config.database_url, pool_config).await?;
    revlens_db::run_migrations(&pool).await?;
    Ok(pool)
}
