//! `lease-migrate`: deploy the `Lease` contract described by a `lease.toml`
//! and verify what was recorded.
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use eyre::WrapErr;
use lease_deployer::{
    logging, Config, Deployer, DirectoryArtifacts, JsonFileRegistry, Network,
    RpcNetwork, Verifier,
};

#[derive(Debug, Parser)]
#[command(name = "lease-migrate", version, about)]
struct Cli {
    /// Path to the deployment configuration.
    #[arg(long, env = "LEASE_CONFIG", default_value = "lease.toml")]
    config: PathBuf,
    /// Network table of the configuration to use.
    #[arg(long, env = "LEASE_NETWORK", default_value = "development")]
    network: String,
    /// Log directives, e.g. `info` or `lease_deployer=debug`.
    #[arg(long, env = "LOG_FILTER", default_value = "info")]
    log_filter: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Deploy the configured contract and record it.
    Migrate {
        /// Key of the account paying for the deployment.
        #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
        private_key: String,
    },
    /// Check the most recent recorded deployment of a contract.
    Verify {
        /// Contract to check. Defaults to the configured one.
        #[arg(long)]
        contract: Option<String>,
    },
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_filter);

    let config = Config::load(&cli.config).wrap_err_with(|| {
        format!("failed to load {}", cli.config.display())
    })?;
    let network_config = config.network(&cli.network)?;
    let registry = JsonFileRegistry::new(&config.registry);

    match cli.command {
        Command::Migrate { private_key } => {
            let network = RpcNetwork::connect(network_config, &private_key)?;
            let artifacts = DirectoryArtifacts::new(&config.artifacts);

            let handle = Deployer::new(&network, &artifacts, &registry)
                .deploy(&config.deployment)
                .await
                .wrap_err_with(|| {
                    format!("failed to deploy {}", config.deployment.contract)
                })?;
            println!("{} deployed at {}", handle.contract, handle.address);
        }
        Command::Verify { contract } => {
            let contract = contract
                .unwrap_or_else(|| config.deployment.contract.clone());
            let network = RpcNetwork::read_only(network_config)?;
            let chain_id = network.chain_id().await?;

            let handle = Verifier::new(&registry)
                .verify(chain_id, &contract)
                .wrap_err_with(|| format!("{contract} failed verification"))?;
            println!(
                "{} at {} on chain {} is valid",
                handle.contract, handle.address, handle.chain_id
            );
        }
    }

    Ok(())
}
