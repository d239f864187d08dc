mod config;
mod main_lib;
mod provider;

use clap::{Parser, Subcommand};
use serde_json::json;

use config::Config;
use main_lib::{build_state, init_tracing, AppState, LogFormat};
use samplehub_resilience::catalog::DEFAULT_CACHE_PREFIX;
use samplehub_resilience::CatalogQuery;

#[derive(Parser)]
#[command(name = "samplehub")]
#[command(author, version, about = "Search the SampleHub catalog with cache and placeholder fallback")]
#[command(after_help = "Examples:
  samplehub search \"amen break\"            Search, falling back to cached data
  samplehub search kick --tag drums -n 3     Run the same search three times
  samplehub --offline search pads            Skip the network entirely
  samplehub errors                           Show the persisted error log")]
struct Cli {
    /// Treat the host as offline (never contact the provider)
    #[arg(long, global = true)]
    offline: bool,

    /// Format of the diagnostic log written to stderr
    #[arg(
        long,
        global = true,
        value_enum,
        env = "SAMPLEHUB_LOG_FORMAT",
        default_value_t = LogFormat::Text
    )]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the catalog
    Search {
        query: String,

        /// Zero-based page index
        #[arg(long, default_value = "0")]
        page: u32,

        /// Results per page
        #[arg(long, default_value = "24")]
        page_size: u32,

        /// Restrict results to a tag (repeatable)
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,

        /// Repeat the search, sharing health state between runs
        #[arg(short = 'n', long, default_value = "1")]
        repeat: u32,
    },
    /// Show error log statistics and records
    Errors {
        /// Clear the log after printing it
        #[arg(long)]
        clear: bool,
    },
    /// Remove every cached catalog page
    ClearCache,
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run_search(state: &AppState, query: &CatalogQuery, repeat: u32) -> anyhow::Result<()> {
    for run in 1..=repeat.max(1) {
        match state.orchestrator.fetch_with_fallback(query).await {
            Ok(outcome) => {
                tracing::info!(
                    "Run {}: served by {:?} ({})",
                    run,
                    outcome.source,
                    outcome.diagnostics.summary()
                );
                print_json(&json!({
                    "run": run,
                    "outcome": outcome,
                    "health": state.orchestrator.health_report(),
                }))?;
            }
            Err(e) => {
                tracing::error!("Run {}: {}", run, e);
                return Err(e.into());
            }
        }
    }

    print_json(&json!({ "errorStats": state.orchestrator.error_log().get_error_stats() }))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loads `.env` first so its SAMPLEHUB_LOG_FORMAT reaches the flag default.
    let config = Config::from_env();
    let cli = Cli::parse();
    init_tracing(cli.log_format);
    let state = build_state(&config, cli.offline)?;

    match cli.command {
        Commands::Search {
            query,
            page,
            page_size,
            tags,
            repeat,
        } => {
            let query = CatalogQuery::new(query)
                .with_page(page)
                .with_page_size(page_size)
                .with_tags(tags);
            run_search(&state, &query, repeat).await?;
        }
        Commands::Errors { clear } => {
            let log = state.orchestrator.error_log();
            print_json(&json!({
                "stats": log.get_error_stats(),
                "records": log.records(),
            }))?;
            if clear {
                log.clear_error_logs();
                tracing::info!("Error log cleared");
            }
        }
        Commands::ClearCache => {
            let removed = state.store.remove_prefix(DEFAULT_CACHE_PREFIX)?;
            tracing::info!("Removed {} cached pages", removed);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["samplehub", "errors", "--log-format", "json"]).unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);
        assert!(matches!(cli.command, Commands::Errors { clear: false }));
    }

    #[test]
    fn test_unknown_log_format_is_rejected() {
        assert!(Cli::try_parse_from(["samplehub", "--log-format", "xml", "clear-cache"]).is_err());
    }
}
