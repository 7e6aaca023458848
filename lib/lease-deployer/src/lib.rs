//! Deployment and smoke verification for the `Lease` contract.
//!
//! A [`Deployer`] validates a [`DeploymentConfig`], resolves the contract's
//! artifact, sends a single contract-creation transaction and records the
//! result in a [`DeploymentRegistry`]. A [`Verifier`] later reads that record
//! back and asserts the deployed address is usable.
mod artifact;
mod config;
mod deploy;
mod error;
pub mod logging;
mod network;
mod receipt;
mod registry;
mod verify;

pub use artifact::{
    artifact_name, ArtifactRegistry, ContractArtifact, DirectoryArtifacts,
    MemoryArtifacts,
};
pub use config::{
    parse_address, Config, ConstructorArgs, DeploymentConfig, NetworkConfig,
};
pub use deploy::{DeployedContractHandle, Deployer};
pub use error::{
    AddressError, ArtifactError, AssertionError, ConfigError, DeploymentError,
    RegistryError, VerifyError,
};
pub use network::{Deployment, MemoryNetwork, Network, RpcNetwork};
pub use receipt::ReceiptExt;
pub use registry::{
    DeploymentRecord, DeploymentRegistry, JsonFileRegistry, MemoryRegistry,
};
pub use verify::{check_address, Verifier};
