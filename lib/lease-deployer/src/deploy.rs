use std::sync::Arc;

use alloy::{
    json_abi::JsonAbi,
    primitives::{Address, TxHash},
};

use crate::{
    artifact::{artifact_name, ArtifactRegistry},
    config::{ConstructorArgs, DeploymentConfig},
    error::DeploymentError,
    network::{Deployment, Network},
    registry::{DeploymentRecord, DeploymentRegistry},
    verify::check_address,
};

/// A contract instance living on a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployedContractHandle {
    /// Contract name.
    pub contract: String,
    /// Chain the instance lives on.
    pub chain_id: u64,
    /// Address of the instance.
    pub address: Address,
    /// Hash of the creation transaction, if known.
    pub transaction_hash: Option<TxHash>,
    /// Block the instance was created in, if known.
    pub block_number: Option<u64>,
    /// Interface of the instance.
    pub abi: Arc<JsonAbi>,
}

/// Publishes a contract to a [`Network`] and records it in a
/// [`DeploymentRegistry`].
pub struct Deployer<'a, N, A, R> {
    network: &'a N,
    artifacts: &'a A,
    registry: &'a R,
}

impl<'a, N, A, R> Deployer<'a, N, A, R>
where
    N: Network,
    A: ArtifactRegistry,
    R: DeploymentRegistry,
{
    /// Creates a deployer over the given collaborators.
    pub fn new(network: &'a N, artifacts: &'a A, registry: &'a R) -> Self {
        Self { network, artifacts, registry }
    }

    /// Deploys the contract described by `config`.
    ///
    /// Constructor arguments are validated before anything is sent. With
    /// `overwrite` disabled, an already recorded instance with a valid
    /// address and the same constructor arguments is returned instead of
    /// deploying a new one.
    ///
    /// # Errors
    ///
    /// May error if:
    ///
    /// - The tenant address or default expiration is invalid.
    /// - The artifact cannot be resolved or is not deployable.
    /// - The network is unavailable, rejects the transaction or the
    ///   constructor reverts.
    /// - The deployment cannot be recorded.
    pub async fn deploy(
        &self,
        config: &DeploymentConfig,
    ) -> Result<DeployedContractHandle, DeploymentError> {
        let args = config.constructor_args()?;
        let contract = artifact_name(&config.contract);
        let artifact = self.artifacts.resolve(contract)?;
        let chain_id = self.network.chain_id().await?;

        if !config.overwrite {
            if let Some(existing) = self.existing(chain_id, contract, &args)?
            {
                tracing::info!(
                    contract,
                    chain_id,
                    address = %existing.address,
                    "reusing recorded deployment"
                );
                return Ok(existing);
            }
        }

        tracing::info!(
            contract,
            chain_id,
            tenant = %args.tenant,
            default_expiration = args.default_expiration,
            "deploying contract"
        );
        let Deployment { address, transaction_hash, block_number } =
            self.network.deploy(&artifact, &args.abi_encode()).await?;

        let record = DeploymentRecord {
            address: Some(address.to_checksum(None)),
            transaction_hash: Some(transaction_hash),
            block_number,
            constructor_args: args.display_values(),
            abi: (*artifact.abi).clone(),
        };
        self.registry.record(chain_id, contract, record)?;

        tracing::info!(
            contract,
            chain_id,
            %address,
            tx_hash = %transaction_hash,
            "deployed contract"
        );
        Ok(DeployedContractHandle {
            contract: contract.to_owned(),
            chain_id,
            address,
            transaction_hash: Some(transaction_hash),
            block_number,
            abi: artifact.abi,
        })
    }

    /// The recorded instance of `contract`, if its address passes
    /// verification and it was constructed with `args`.
    fn existing(
        &self,
        chain_id: u64,
        contract: &str,
        args: &ConstructorArgs,
    ) -> Result<Option<DeployedContractHandle>, DeploymentError> {
        let Some(record) = self.registry.latest(chain_id, contract)? else {
            return Ok(None);
        };

        let address = match check_address(contract, chain_id, Some(&record)) {
            Ok(address) => address,
            Err(e) => {
                tracing::warn!(
                    contract,
                    chain_id,
                    error = %e,
                    "recorded deployment is invalid, deploying a new one"
                );
                return Ok(None);
            }
        };

        let configured = args.display_values();
        if record.constructor_args != configured {
            tracing::warn!(
                contract,
                chain_id,
                recorded = ?record.constructor_args,
                ?configured,
                "constructor args changed, deploying a new instance"
            );
            return Ok(None);
        }

        Ok(Some(DeployedContractHandle {
            contract: contract.to_owned(),
            chain_id,
            address,
            transaction_hash: record.transaction_hash,
            block_number: record.block_number,
            abi: Arc::new(record.abi),
        }))
    }
}
