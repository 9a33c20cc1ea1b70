use bulk_follow::core::engine::dry_run;
use bulk_follow::utils::{logger, validation::Validate};
use bulk_follow::{BatchError, BatchFollower, CliConfig, ClientConfig, FollowEngine, MastodonClient};
use clap::Parser;

fn fail(e: &BatchError) -> ! {
    tracing::error!("❌ {} (Severity: {:?})", e, e.severity());
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        fail(&e);
    }

    if config.dry_run {
        if let Err(e) = dry_run(&config) {
            fail(&e);
        }
        return Ok(());
    }

    let client_config = match ClientConfig::from_env() {
        Ok(client_config) => client_config,
        Err(e) => fail(&e),
    };
    tracing::info!(
        "api_base_url={} request_timeout={:?}",
        client_config.api_base_url,
        client_config.request_timeout
    );

    let client = match MastodonClient::new(&client_config) {
        Ok(client) => client.with_resolve(config.resolve),
        Err(e) => fail(&BatchError::from(e)),
    };

    let retry_file = config.retry_file.clone();
    let engine = FollowEngine::new(BatchFollower::new(client), config);

    match engine.run().await {
        Ok(summary) => {
            if let Err(e) = summary.ensure_complete(&retry_file) {
                fail(&e);
            }
            println!(
                "✅ {} accounts followed, {} already listed",
                summary.succeeded, summary.already_listed
            );
        }
        Err(e) => fail(&e),
    }

    Ok(())
}
