mod autocomplete;
mod catalog;
mod search;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "venuescout")]
#[command(about = "Find nearby sports venues")]
struct Cli {
    /// Print JSON instead of a table
    #[arg(long, global = true)]
    json: bool,

    /// Category catalog YAML (defaults to the built-in catalog)
    #[arg(long, global = true, env = "VENUESCOUT_CATALOG_PATH")]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search for venues by text, location and category
    Search {
        /// Free-text query, e.g. "stadium" or a place name
        #[arg(long, short)]
        query: Option<String>,
        /// Bias latitude (requires --lng)
        #[arg(long, requires = "lng", allow_hyphen_values = true)]
        lat: Option<f64>,
        /// Bias longitude (requires --lat)
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lng: Option<f64>,
        /// Category ids, comma separated (e.g. gym,stadium)
        #[arg(long = "type", short = 't', value_delimiter = ',')]
        types: Vec<String>,
        /// Results per page (defaults to VENUESCOUT_PAGE_SIZE)
        #[arg(long)]
        page_size: Option<usize>,
        /// Keep loading pages until the result set is exhausted
        #[arg(long)]
        all: bool,
        /// Only show venues whose classified category was selected
        #[arg(long, requires = "types")]
        strict: bool,
    },
    /// Suggest addresses for partial input
    Autocomplete {
        input: String,
        #[arg(long, requires = "lng", allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lng: Option<f64>,
    },
    /// List the venue categories available as search filters
    Categories,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // `categories` works without an API key, so a config error is only
    // fatal for the commands that reach the network.
    let config = venuescout_core::load_app_config_from_env();
    let log_level = config
        .as_ref()
        .map_or_else(|_| "info".to_string(), |c| c.log_level.clone());
    let production = config.as_ref().is_ok_and(|c| c.env.is_production());
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_ansi(!production)
        .with_writer(std::io::stderr)
        .init();

    let catalog = catalog::load_catalog_or_default(cli.catalog.as_deref())?;

    match cli.command {
        Commands::Search {
            query,
            lat,
            lng,
            types,
            page_size,
            all,
            strict,
        } => {
            let config = config?;
            let options = search::SearchOptions {
                page_size: page_size.unwrap_or(config.page_size),
                all,
                strict,
                json: cli.json,
            };
            let intent = search::build_intent(query, lat, lng, types);
            search::run_search(&config, catalog, intent, options).await?;
        }
        Commands::Autocomplete { input, lat, lng } => {
            let config = config?;
            let bias = lat.zip(lng).and_then(|(lat, lng)| {
                venuescout_core::GeoPoint::new_checked(lat, lng)
            });
            autocomplete::run_autocomplete(&config, &input, bias, cli.json).await?;
        }
        Commands::Categories => catalog::run_categories(&catalog, cli.json)?,
    }

    Ok(())
}
