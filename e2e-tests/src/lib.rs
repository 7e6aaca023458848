//! Environment of the live-node tests.
//!
//! Tests run with `cargo test -p e2e-tests --features e2e` against a node
//! reachable at `RPC_URL`, using the compiled artifacts in `LEASE_ARTIFACTS`
//! and paying with `PRIVATE_KEY`. Each falls back to a local development
//! setup when unset.
use std::path::PathBuf;

use lease_deployer::NetworkConfig;

/// Key of the first pre-funded account of local development nodes.
const DEV_PRIVATE_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// Settings the tests read from the environment.
#[derive(Debug, Clone)]
pub struct Env {
    /// Node to deploy to.
    pub network: NetworkConfig,
    /// Deployer's private key.
    pub private_key: String,
    /// Directory holding `Lease.json`.
    pub artifacts: PathBuf,
}

impl Env {
    /// Loads the settings, applying development defaults.
    #[must_use]
    pub fn load() -> Self {
        let rpc_url = var("RPC_URL").unwrap_or(env!("DEFAULT_RPC_URL").into());
        let private_key =
            var("PRIVATE_KEY").unwrap_or(DEV_PRIVATE_KEY.into());
        let artifacts = var("LEASE_ARTIFACTS")
            .unwrap_or(env!("DEFAULT_LEASE_ARTIFACTS").into());

        Self {
            network: NetworkConfig {
                rpc_url,
                confirmations: 1,
                chain_id: None,
            },
            private_key,
            artifacts: PathBuf::from(artifacts),
        }
    }
}

fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}
