#![cfg(feature = "e2e")]

use alloy::primitives::Address;
use e2e_tests::Env;
use eyre::Result;
use lease_deployer::{
    logging, Deployer, DeploymentConfig, DeploymentError, DirectoryArtifacts,
    JsonFileRegistry, Network, RpcNetwork, Verifier,
};

const TENANT: &str = "0x9585d2dCc5328be860210018a2f0F17b7fd8a56E";
const DEFAULT_EXPIRATION: i64 = 1000;

// ============================================================================
// Integration Tests: Lease
// ============================================================================

#[tokio::test]
async fn deploys() -> Result<()> {
    logging::init("lease_deployer=debug");
    let env = Env::load();
    let dir = tempfile::tempdir()?;

    let network = RpcNetwork::connect(&env.network, &env.private_key)?;
    let artifacts = DirectoryArtifacts::new(&env.artifacts);
    let registry = JsonFileRegistry::new(dir.path().join("deployments.json"));

    let config = DeploymentConfig::new(TENANT, DEFAULT_EXPIRATION);
    let deployed =
        Deployer::new(&network, &artifacts, &registry).deploy(&config).await?;

    let chain_id = network.chain_id().await?;
    let verified = Verifier::new(&registry).verify(chain_id, "Lease")?;
    assert_eq!(verified.address, deployed.address);
    assert_ne!(verified.address, Address::ZERO);

    Ok(())
}

#[tokio::test]
async fn deploys_distinct_instances() -> Result<()> {
    let env = Env::load();
    let dir = tempfile::tempdir()?;

    let network = RpcNetwork::connect(&env.network, &env.private_key)?;
    let artifacts = DirectoryArtifacts::new(&env.artifacts);
    let registry = JsonFileRegistry::new(dir.path().join("deployments.json"));
    let deployer = Deployer::new(&network, &artifacts, &registry);

    let config = DeploymentConfig::new(TENANT, DEFAULT_EXPIRATION);
    let first = deployer.deploy(&config).await?;
    let second = deployer.deploy(&config).await?;
    assert_ne!(first.address, second.address);

    Ok(())
}

#[tokio::test]
async fn malformed_tenant_is_not_deployed() -> Result<()> {
    let env = Env::load();
    let dir = tempfile::tempdir()?;

    let network = RpcNetwork::connect(&env.network, &env.private_key)?;
    let artifacts = DirectoryArtifacts::new(&env.artifacts);
    let registry = JsonFileRegistry::new(dir.path().join("deployments.json"));

    let config =
        DeploymentConfig::new(format!("{TENANT}1"), DEFAULT_EXPIRATION);
    let err = Deployer::new(&network, &artifacts, &registry)
        .deploy(&config)
        .await
        .expect_err("malformed tenant must not deploy");

    assert!(matches!(err, DeploymentError::Config(_)));
    assert!(!registry.path().exists());

    Ok(())
}
