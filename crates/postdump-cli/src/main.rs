mod batch;
mod crawl;
mod discover;
mod extract;
mod parse;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "postdump")]
#[command(about = "Medium article discovery, crawling and datadump normalization")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Collect article URLs from the daily posts sitemaps
    Discover {
        /// First day to scan (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,
        /// Last day to scan, inclusive (YYYY-MM-DD)
        #[arg(long)]
        to: NaiveDate,
        /// Output CSV (defaults to `<data dir>/discovered_urls.csv`)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Fetch article pages and store their raw datadumps
    Crawl {
        /// CSV of articles with a `url` column
        #[arg(long)]
        input: PathBuf,
        /// Output CSV (defaults to `<data dir>/crawled_articles.csv`)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Maximum number of articles to crawl in this run
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Normalize crawled datadumps into post records
    Parse {
        /// CSV written by `crawl`
        #[arg(long)]
        input: PathBuf,
        /// Output CSV (defaults to `<data dir>/posts.csv`)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Rewrite the output from scratch instead of resuming
        #[arg(long)]
        overwrite: bool,
        /// Maximum number of rows to parse in this run
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Fetch and normalize the given articles, printing one JSON record per line
    Extract {
        /// Article URL; may be repeated
        #[arg(long = "url", required = true)]
        urls: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = postdump_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Discover { from, to, output }) => {
            let output = output.unwrap_or_else(|| config.data_dir.join("discovered_urls.csv"));
            discover::run_discover(&config, from, to, &output).await?;
        }
        Some(Commands::Crawl {
            input,
            output,
            limit,
        }) => {
            let output = output.unwrap_or_else(|| config.data_dir.join("crawled_articles.csv"));
            crawl::run_crawl(&config, &input, &output, limit).await?;
        }
        Some(Commands::Parse {
            input,
            output,
            overwrite,
            limit,
        }) => {
            let output = output.unwrap_or_else(|| config.data_dir.join("posts.csv"));
            parse::run_parse(&config, &input, &output, overwrite, limit)?;
        }
        Some(Commands::Extract { urls }) => {
            extract::run_extract(&config, &urls).await?;
        }
        None => println!("postdump: no command given, see --help"),
    }

    Ok(())
}
