use std::time::Duration;

use clap::Parser;
use scripts::{
    artifacts::ArtifactStore,
    cli::Cli,
    client::setup_client,
    deploy::Deployer,
    deployments::NetworkConfig,
    errors::ScriptError,
    verify::{EtherscanVerifier, SkipVerification, SourceVerifier},
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ScriptError> {
    dotenvy::dotenv().ok();

    let Cli {
        priv_key,
        rpc_url,
        config,
        artifacts,
        etherscan_api_key,
        verifier_url,
        confirmations,
        tx_delay_secs,
        command,
    } = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let client = setup_client(&priv_key, &rpc_url, confirmations)?;
    let artifacts = ArtifactStore::new(artifacts);

    let verifier: Box<dyn SourceVerifier> = match etherscan_api_key {
        Some(api_key) => {
            let chain_id = client.chain_id().await?;
            Box::new(EtherscanVerifier::new(
                &verifier_url,
                &api_key,
                chain_id,
                artifacts.clone(),
            ))
        }
        None => Box::new(SkipVerification),
    };

    let network = NetworkConfig::load(&config)?;
    let mut deployer = Deployer::new(client, verifier, artifacts, network)
        .with_config_path(config)
        .with_pacing(Duration::from_secs(tx_delay_secs));

    command.run(&mut deployer).await
}
