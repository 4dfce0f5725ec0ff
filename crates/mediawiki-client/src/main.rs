//! MediaWiki client CLI application.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use mediawiki_client::{Categories, ClientConfig, GeoQuery, MediaWiki, Params};
use serde::Serialize;
use shared::Config;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Override the configured wiki language
    #[arg(short, long)]
    lang: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show version, base URL and extensions of the wiki
    SiteInfo,

    /// Full-text search for page titles
    Search {
        query: String,
        #[arg(short, long, default_value_t = 10)]
        results: usize,
        /// Also request a spelling suggestion
        #[arg(long)]
        suggestion: bool,
    },

    /// Best matching title for a query
    Suggest { query: String },

    /// Plain-text summary of a page
    Summary {
        title: String,
        #[arg(long, default_value_t = 0)]
        sentences: u32,
        #[arg(long, default_value_t = 0)]
        chars: u32,
        #[arg(long)]
        no_auto_suggest: bool,
        #[arg(long)]
        no_redirect: bool,
    },

    /// Pages and subcategories of a category
    Members {
        category: String,
        /// Maximum number of members (all when omitted)
        #[arg(short, long)]
        results: Option<usize>,
        #[arg(long)]
        no_subcategories: bool,
    },

    /// Category tree below one or more categories
    Tree {
        #[arg(required = true)]
        categories: Vec<String>,
        /// Levels of subcategories to expand (whole tree when omitted)
        #[arg(short, long)]
        depth: Option<u32>,
    },

    /// Pages near a coordinate pair or another page
    Geo {
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        lon: Option<String>,
        /// Search around this page instead of coordinates
        #[arg(long)]
        title: Option<String>,
        /// Radius in meters
        #[arg(long, default_value_t = 1000)]
        radius: u32,
        #[arg(short, long, default_value_t = 10)]
        results: usize,
        #[arg(long)]
        no_auto_suggest: bool,
    },

    /// Random page titles
    Random {
        #[arg(default_value_t = 1)]
        pages: usize,
    },

    /// Titles starting with a prefix
    Prefix {
        prefix: String,
        #[arg(short, long, default_value_t = 10)]
        results: usize,
    },

    /// Opensearch suggestions with descriptions and URLs
    Open {
        query: String,
        #[arg(short, long, default_value_t = 10)]
        results: usize,
        #[arg(long)]
        no_redirect: bool,
    },

    /// Page titles in title order starting at a prefix
    AllPages {
        #[arg(default_value = "")]
        from: String,
        #[arg(short, long, default_value_t = 10)]
        results: usize,
    },

    /// Raw API request from key=value pairs
    Request { params: Vec<String> },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Initialize logging; the guard flushes the log file on exit
    let _log_guard = shared::logging::init(shared::LogConfig::from_config(
        &config,
        "mediawiki-client",
        args.verbose,
    ))?;

    info!(config_file = %args.config.display(), "Loaded configuration");

    let mut client_config = ClientConfig::try_from(&config.mediawiki)?;
    if let Some(lang) = &args.lang {
        client_config.lang = lang.clone();
    }

    let api_url = client_config.api_url();
    let mut client = MediaWiki::new(client_config)
        .await
        .with_context(|| format!("Failed to connect to {}", api_url))?;

    run(&mut client, args.command).await?;

    let stats = client.cache_stats();
    info!(
        operations = stats.operations,
        entries = stats.entries,
        "Cache statistics"
    );

    Ok(())
}

async fn run(client: &mut MediaWiki, command: Command) -> Result<()> {
    match command {
        Command::SiteInfo => print_json(client.site_info()),
        Command::Search {
            query,
            results,
            suggestion,
        } => print_json(&client.search(&query, Some(results), suggestion).await?),
        Command::Suggest { query } => print_json(&client.suggest(&query).await?),
        Command::Summary {
            title,
            sentences,
            chars,
            no_auto_suggest,
            no_redirect,
        } => {
            let summary = client
                .summary(&title, sentences, chars, !no_auto_suggest, !no_redirect)
                .await?;
            println!("{}", summary);
            Ok(())
        }
        Command::Members {
            category,
            results,
            no_subcategories,
        } => print_json(
            &client
                .categorymembers(&category, results, !no_subcategories)
                .await?,
        ),
        Command::Tree { categories, depth } => {
            let categories = Categories::from(categories);
            tokio::select! {
                tree = client.categorytree(categories, depth) => print_json(&tree?),
                _ = tokio::signal::ctrl_c() => {
                    warn!("Interrupted, category tree abandoned");
                    bail!("category tree build interrupted");
                }
            }
        }
        Command::Geo {
            lat,
            lon,
            title,
            radius,
            results,
            no_auto_suggest,
        } => {
            let query = GeoQuery {
                latitude: lat,
                longitude: lon,
                radius,
                title,
                auto_suggest: !no_auto_suggest,
                results: Some(results),
            };
            print_json(&client.geosearch(query).await?)
        }
        Command::Random { pages } => print_json(&client.random(pages).await?),
        Command::Prefix { prefix, results } => {
            print_json(&client.prefixsearch(&prefix, Some(results)).await?)
        }
        Command::Open {
            query,
            results,
            no_redirect,
        } => print_json(&client.opensearch(&query, Some(results), !no_redirect).await?),
        Command::AllPages { from, results } => {
            print_json(&client.allpages(&from, Some(results)).await?)
        }
        Command::Request { params } => {
            let params = parse_params(&params)?;
            print_json(&client.wiki_request(params).await?)
        }
    }
}

/// Parse `key=value` arguments into request parameters
fn parse_params(pairs: &[String]) -> Result<Params> {
    pairs
        .iter()
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => Ok((key.to_string(), value.to_string())),
            None => bail!("Expected key=value, got '{}'", pair),
        })
        .collect()
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let output = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", output);
    Ok(())
}
