use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::error;

use relayer_sync::accounts::GraphqlAccountSource;
use relayer_sync::config::{
    RunConfig, DEFAULT_BATCH_SIZE, DEFAULT_DELAY_SECONDS, DEFAULT_GRAPHQL_SUBDOMAIN,
    DEFAULT_RELAYER_SUBDOMAIN,
};
use relayer_sync::driver::{Driver, RunOutcome, RunSummary};
use relayer_sync::error::Result;
use relayer_sync::logging;
use relayer_sync::relayer::HttpRelayer;

#[derive(Parser)]
#[command(name = "relayer-sync")]
#[command(about = "Fetch accounts from the ela.city GraphQL API and add them as users to the Lit relayer")]
#[command(version = "0.1.0")]
struct Cli {
    /// API key for the Lit relayer
    #[arg(long, short = 'k', env = "RELAYER_API_KEY")]
    api_key: String,

    /// Payer secret key for the Lit relayer
    #[arg(long, short = 'p', env = "PAYER_SECRET_KEY")]
    payer_secret_key: String,

    /// Number of addresses to fetch and send per batch
    #[arg(long, short = 'b', default_value_t = DEFAULT_BATCH_SIZE, value_parser = clap::value_parser!(u64).range(1..))]
    batch_size: u64,

    /// Delay in seconds between chunk requests
    #[arg(long, short = 'd', default_value_t = DEFAULT_DELAY_SECONDS)]
    delay: f64,

    /// Subdomain for the ela.city GraphQL API, empty for ela.city itself
    #[arg(long, default_value = DEFAULT_GRAPHQL_SUBDOMAIN)]
    graphql_subdomain: String,

    /// Subdomain for the relayer API
    #[arg(long, default_value = DEFAULT_RELAYER_SUBDOMAIN)]
    relayer_subdomain: String,
}

impl Cli {
    fn into_config(self) -> RunConfig {
        RunConfig {
            api_key: self.api_key,
            payer_secret_key: self.payer_secret_key,
            batch_size: self.batch_size,
            delay_seconds: self.delay.max(0.0),
            graphql_subdomain: self.graphql_subdomain,
            relayer_subdomain: self.relayer_subdomain,
        }
    }
}

async fn run(config: &RunConfig) -> Result<RunOutcome> {
    let source = Arc::new(GraphqlAccountSource::new(config)?);
    let relayer = Arc::new(HttpRelayer::new(config)?);
    let driver = Driver::new(
        source,
        relayer,
        config.batch_size,
        Duration::from_secs_f64(config.delay_seconds),
    );
    driver.run().await
}

fn print_summary(summary: &RunSummary) {
    println!("Total unique addresses processed: {}", summary.processed());
    println!("Successfully added: {}", summary.added);
    println!("Failed: {}", summary.failed_addresses);
    if summary.chunks_failed > 0 {
        println!(
            "Chunks failed: {}/{}",
            summary.chunks_failed, summary.chunks_planned
        );
    }
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    logging::init_logging();

    let config = Cli::parse().into_config();

    println!("Starting account fetching and user addition process...");
    println!("GraphQL URL: {}", config.graphql_url());
    println!("Relayer URL: {}", config.relayer_url());
    println!("Batch size: {}", config.batch_size);
    println!("Delay between requests: {}s", config.delay_seconds);

    let exit_code = match run(&config).await {
        Ok(RunOutcome::Done(summary)) => {
            println!("\nProcess completed!");
            print_summary(&summary);
            0
        }
        Ok(RunOutcome::Interrupted(summary)) => {
            println!("\nProcess interrupted by user.");
            print_summary(&summary);
            1
        }
        Err(e) => {
            error!("run aborted: {e}");
            eprintln!("Unexpected error: {e}");
            1
        }
    };

    std::process::exit(exit_code);
}
