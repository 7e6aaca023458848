use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use alloy::primitives::{address, keccak256, Address, Bytes};
use async_trait::async_trait;

use super::{check_chain_id, creation_code, Deployment, Network};
use crate::{artifact::ContractArtifact, error::DeploymentError};

const DEFAULT_DEPLOYER: Address =
    address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266");

/// How a [`MemoryNetwork`] fails deployments.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Failure {
    Unavailable,
    Reject(String),
    Revert,
}

#[derive(Debug, Default)]
struct State {
    nonce: u64,
    block: u64,
    code: HashMap<Address, Bytes>,
}

/// In-process chain that derives contract addresses the way a real node
/// does, from the deployer address and its nonce.
#[derive(Debug)]
pub struct MemoryNetwork {
    chain_id: u64,
    expected_chain_id: Option<u64>,
    deployer: Address,
    failure: Option<Failure>,
    state: Mutex<State>,
}

impl MemoryNetwork {
    /// Creates a healthy network with id `chain_id`.
    #[must_use]
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            expected_chain_id: None,
            deployer: DEFAULT_DEPLOYER,
            failure: None,
            state: Mutex::new(State::default()),
        }
    }

    /// A network whose node cannot be reached.
    #[must_use]
    pub fn unavailable(chain_id: u64) -> Self {
        Self { failure: Some(Failure::Unavailable), ..Self::new(chain_id) }
    }

    /// A network that rejects every transaction with `reason`.
    #[must_use]
    pub fn rejecting(chain_id: u64, reason: impl Into<String>) -> Self {
        Self {
            failure: Some(Failure::Reject(reason.into())),
            ..Self::new(chain_id)
        }
    }

    /// A network on which every constructor reverts.
    #[must_use]
    pub fn reverting(chain_id: u64) -> Self {
        Self { failure: Some(Failure::Revert), ..Self::new(chain_id) }
    }

    /// Pins the chain id callers expect, as a configured network does.
    #[must_use]
    pub fn expecting_chain_id(mut self, expected: u64) -> Self {
        self.expected_chain_id = Some(expected);
        self
    }

    /// Account paying for deployments.
    #[must_use]
    pub fn deployer(&self) -> Address {
        self.deployer
    }

    /// Number of transactions accepted so far.
    #[must_use]
    pub fn transaction_count(&self) -> u64 {
        self.state().nonce
    }

    /// Creation code stored at `address`, if a contract was deployed there.
    #[must_use]
    pub fn code_at(&self, address: Address) -> Option<Bytes> {
        self.state().code.get(&address).cloned()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        // State is only mutated in short, panic-free sections.
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl Network for MemoryNetwork {
    async fn chain_id(&self) -> Result<u64, DeploymentError> {
        if self.failure == Some(Failure::Unavailable) {
            return Err(DeploymentError::Unavailable(
                "connection refused".to_owned(),
            ));
        }
        check_chain_id(self.expected_chain_id, self.chain_id)
    }

    async fn deploy(
        &self,
        artifact: &ContractArtifact,
        constructor_args: &[u8],
    ) -> Result<Deployment, DeploymentError> {
        match &self.failure {
            Some(Failure::Unavailable) => {
                return Err(DeploymentError::Unavailable(
                    "connection refused".to_owned(),
                ))
            }
            Some(Failure::Reject(reason)) => {
                return Err(DeploymentError::Rejected(reason.clone()))
            }
            _ => {}
        }

        let code = creation_code(artifact, constructor_args);
        let mut state = self.state();
        let nonce = state.nonce;
        state.nonce += 1;
        state.block += 1;

        let transaction_hash = keccak256(
            [self.deployer.as_slice(), &nonce.to_be_bytes(), code.as_ref()]
                .concat(),
        );
        if self.failure == Some(Failure::Revert) {
            return Err(DeploymentError::Reverted(transaction_hash));
        }

        let address = self.deployer.create(nonce);
        state.code.insert(address, code);

        Ok(Deployment {
            address,
            transaction_hash,
            block_number: Some(state.block),
        })
    }
}
