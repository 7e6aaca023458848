//! Connections to the chain a contract is deployed on.
use alloy::primitives::{Address, Bytes, TxHash};
use async_trait::async_trait;

use crate::{artifact::ContractArtifact, error::DeploymentError};

mod memory;
mod rpc;

pub use memory::MemoryNetwork;
pub use rpc::RpcNetwork;

/// Outcome of a confirmed contract-creation transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deployment {
    /// Address of the created contract.
    pub address: Address,
    /// Hash of the creation transaction.
    pub transaction_hash: TxHash,
    /// Block the transaction was included in, if reported.
    pub block_number: Option<u64>,
}

/// A chain that accepts contract deployments.
#[async_trait]
pub trait Network: Send + Sync {
    /// Id of the chain behind this connection.
    ///
    /// # Errors
    ///
    /// May error if the connection is unavailable or the chain is not the
    /// expected one.
    async fn chain_id(&self) -> Result<u64, DeploymentError>;

    /// Sends one contract-creation transaction for `artifact`, appending
    /// the already encoded `constructor_args` to its bytecode, and waits
    /// for it to be confirmed.
    ///
    /// # Errors
    ///
    /// May error if the connection is unavailable, the transaction is
    /// rejected or the constructor reverts.
    async fn deploy(
        &self,
        artifact: &ContractArtifact,
        constructor_args: &[u8],
    ) -> Result<Deployment, DeploymentError>;
}

#[async_trait]
impl<T: Network + ?Sized> Network for &T {
    async fn chain_id(&self) -> Result<u64, DeploymentError> {
        (**self).chain_id().await
    }

    async fn deploy(
        &self,
        artifact: &ContractArtifact,
        constructor_args: &[u8],
    ) -> Result<Deployment, DeploymentError> {
        (**self).deploy(artifact, constructor_args).await
    }
}

/// Creation code of a deployment: bytecode followed by constructor args.
pub(crate) fn creation_code(
    artifact: &ContractArtifact,
    constructor_args: &[u8],
) -> Bytes {
    [artifact.bytecode.as_ref(), constructor_args].concat().into()
}

/// Returns `actual` unless a pinned `expected` chain id differs from it.
pub(crate) fn check_chain_id(
    expected: Option<u64>,
    actual: u64,
) -> Result<u64, DeploymentError> {
    match expected {
        Some(expected) if expected != actual => {
            Err(DeploymentError::ChainMismatch { expected, actual })
        }
        _ => Ok(actual),
    }
}
