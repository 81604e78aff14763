use minimal_account::{api::Server, config::Config, entry::EntryPoint, registry::Registry};
use tracing::info;

/// The main entry point for the account node.
///
/// Initializes logging, loads the configuration, restores persisted accounts
/// into the entry point and starts the JSON-RPC server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::load("config/default.toml")?;
    info!("Account node starting with config: {:?}", config);

    let registry = Registry::connect(&config.database.url).await?;

    // Resume every known account at its persisted nonce
    let mut entry_point = EntryPoint::new(config.account.clone());
    let records = registry.load_all().await?;
    info!("Restoring {} accounts from {}", records.len(), config.database.url);
    for record in records {
        entry_point.restore_account(record);
    }

    let server = Server::new(config.api, entry_point, registry);
    server.start().await?;

    Ok(())
}
