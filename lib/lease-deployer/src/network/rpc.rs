use alloy::{
    network::{EthereumWallet, TransactionBuilder},
    primitives::Address,
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
    transports::{http::reqwest::Url, RpcError, TransportErrorKind},
};
use async_trait::async_trait;

use super::{check_chain_id, creation_code, Deployment, Network};
use crate::{
    artifact::ContractArtifact,
    config::NetworkConfig,
    error::{ConfigError, DeploymentError},
    receipt::ReceiptExt,
};

/// A JSON-RPC node reached over HTTP.
#[derive(Clone)]
pub struct RpcNetwork {
    provider: DynProvider,
    deployer: Option<Address>,
    confirmations: u64,
    expected_chain_id: Option<u64>,
}

impl std::fmt::Debug for RpcNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcNetwork")
            .field("deployer", &self.deployer)
            .field("confirmations", &self.confirmations)
            .field("expected_chain_id", &self.expected_chain_id)
            .finish_non_exhaustive()
    }
}

fn parse_url(config: &NetworkConfig) -> Result<Url, ConfigError> {
    config.rpc_url.parse::<Url>().map_err(|e| ConfigError::RpcUrl {
        url: config.rpc_url.clone(),
        reason: e.to_string(),
    })
}

impl RpcNetwork {
    /// Connects to `config` and signs deployments with `private_key`.
    ///
    /// # Errors
    ///
    /// May error if the rpc url or the private key is invalid. No request
    /// is sent until the network is used.
    pub fn connect(
        config: &NetworkConfig,
        private_key: &str,
    ) -> Result<Self, DeploymentError> {
        let signer = private_key
            .parse::<PrivateKeySigner>()
            .map_err(|e| DeploymentError::Signer(e.to_string()))?;
        let deployer = signer.address();
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(parse_url(config)?)
            .erased();

        Ok(Self {
            provider,
            deployer: Some(deployer),
            confirmations: config.confirmations,
            expected_chain_id: config.chain_id,
        })
    }

    /// Connects to `config` without a signing key. Such a network can be
    /// queried but refuses to deploy.
    ///
    /// # Errors
    ///
    /// May error if the rpc url is invalid.
    pub fn read_only(config: &NetworkConfig) -> Result<Self, DeploymentError> {
        let provider =
            ProviderBuilder::new().connect_http(parse_url(config)?).erased();

        Ok(Self {
            provider,
            deployer: None,
            confirmations: config.confirmations,
            expected_chain_id: config.chain_id,
        })
    }

    /// Account paying for deployments, if a signing key is configured.
    #[must_use]
    pub fn deployer(&self) -> Option<Address> {
        self.deployer
    }
}

/// Error responses come from a reachable node refusing the request; anything
/// else means the node could not be reached.
fn classify(err: &RpcError<TransportErrorKind>) -> DeploymentError {
    match err.as_error_resp() {
        Some(payload) => DeploymentError::Rejected(payload.message.to_string()),
        None => DeploymentError::Unavailable(err.to_string()),
    }
}

#[async_trait]
impl Network for RpcNetwork {
    async fn chain_id(&self) -> Result<u64, DeploymentError> {
        let actual = self
            .provider
            .get_chain_id()
            .await
            .map_err(|e| DeploymentError::Unavailable(e.to_string()))?;

        check_chain_id(self.expected_chain_id, actual)
    }

    async fn deploy(
        &self,
        artifact: &ContractArtifact,
        constructor_args: &[u8],
    ) -> Result<Deployment, DeploymentError> {
        let Some(deployer) = self.deployer else {
            return Err(DeploymentError::Signer(
                "no private key configured".to_owned(),
            ));
        };

        let tx = TransactionRequest::default()
            .with_from(deployer)
            .with_deploy_code(creation_code(artifact, constructor_args));

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| classify(&e))?;
        tracing::info!(
            contract = %artifact.name,
            tx_hash = %pending.tx_hash(),
            "sent deployment transaction"
        );

        let receipt = pending
            .with_required_confirmations(self.confirmations)
            .get_receipt()
            .await
            .map_err(|e| DeploymentError::Unavailable(e.to_string()))?;

        receipt.deployment()
    }
}
