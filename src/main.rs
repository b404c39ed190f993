use clap::{Parser, Subcommand};
use std::fs;
use std::sync::Arc;
use tracing::{error, info};

use catalog_search::config::SearchConfig;
use catalog_search::domain::{LogicalOperator, SearchRequest};
use catalog_search::infra::HttpSearchEngine;
use catalog_search::logging;
use catalog_search::merge::merge_raw_catalog;
use catalog_search::observability::metrics;
use catalog_search::query::QueryCompiler;
use catalog_search::search::SearchOrchestrator;

#[derive(Parser)]
#[command(name = "catalog_search")]
#[command(about = "Intent-driven catalog search: query compilation and catalog merging")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a search request into an engine query tree
    Compile {
        /// Path to a JSON search request (bare body or envelope)
        #[arg(long)]
        file: String,
        /// Logical operator combining the per-field predicates
        #[arg(long, default_value = "AND")]
        operator: String,
    },
    /// Merge raw catalog documents into one normalized catalog response
    Merge {
        /// Path to a raw catalog payload (JSON array or single document)
        #[arg(long)]
        file: String,
    },
    /// Execute a search against the configured engine and print the merged catalog
    Search {
        /// Path to a JSON search request (bare body or envelope)
        #[arg(long)]
        file: String,
        #[arg(long, default_value = "AND")]
        operator: String,
        /// Page number, zero-based
        #[arg(long, default_value_t = 0)]
        page: i64,
        /// Page size; falls back to the configured default
        #[arg(long, default_value_t = 0)]
        size: i64,
        /// Engine base URL, overriding the configured one
        #[arg(long)]
        engine_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logging();
    metrics::describe_all();

    let cli = Cli::parse();
    let config = SearchConfig::load()?;

    match cli.command {
        Commands::Compile { file, operator } => {
            let operator: LogicalOperator = operator.parse()?;
            let request = SearchRequest::parse(&fs::read_to_string(&file)?)?;

            let compiler = QueryCompiler::new(config);
            let query = compiler.compile(&request, operator)?;
            println!("{}", serde_json::to_string_pretty(&query.to_value())?);
        }
        Commands::Merge { file } => {
            let raw = fs::read_to_string(&file)?;
            let response = merge_raw_catalog(&raw);
            if let Some(err) = response.error.as_ref() {
                info!(code = %err.code, "Merge attached an error");
            }
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Search {
            file,
            operator,
            page,
            size,
            engine_url,
        } => {
            let operator: LogicalOperator = operator.parse()?;
            let request = SearchRequest::parse(&fs::read_to_string(&file)?)?;

            // Flags win; an in-request page block is the fallback.
            let request_page = request.search.as_ref().and_then(|s| s.page.as_ref());
            let page = if page == 0 {
                request_page.map(|p| p.from).unwrap_or(page)
            } else {
                page
            };
            let size = if size == 0 {
                request_page.map(|p| p.size).unwrap_or(size)
            } else {
                size
            };

            let url = engine_url
                .or_else(|| config.engine_url.clone())
                .ok_or_else(|| {
                    anyhow::anyhow!("No engine URL configured; pass --engine-url or set engine_url in config.toml")
                })?;
            let engine = Arc::new(HttpSearchEngine::with_timeout(url, config.timeout_seconds));
            let orchestrator = SearchOrchestrator::new(engine, config);

            match orchestrator.search_merged(&request, page, size, operator).await {
                Ok(response) => {
                    println!("{}", serde_json::to_string_pretty(&response)?);
                }
                Err(e) => {
                    error!("Search failed: {}", e);
                    return Err(e.into());
                }
            }
        }
    }

    Ok(())
}
