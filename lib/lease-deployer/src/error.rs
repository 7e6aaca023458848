use std::path::PathBuf;

use alloy::primitives::TxHash;

/// Reasons a string is not an acceptable account address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    /// The value does not start with `0x`.
    #[error("address must start with `0x`")]
    MissingPrefix,
    /// The value does not hold exactly 40 hex digits.
    #[error("address must have 40 hex digits, got {0}")]
    Length(usize),
    /// The value contains a non-hex character.
    #[error("address contains non-hex characters")]
    NotHex,
    /// Mixed-case input that fails the EIP-55 checksum.
    #[error("address has an invalid EIP-55 checksum")]
    Checksum,
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config at {}", path.display())]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The configuration file is not valid TOML for [`crate::Config`].
    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),
    /// No `[networks.<name>]` table exists for the selected network.
    #[error("network `{0}` is not configured")]
    UnknownNetwork(String),
    /// The RPC endpoint is not a valid URL.
    #[error("invalid rpc url `{url}`: {reason}")]
    RpcUrl {
        /// Raw configured value.
        url: String,
        /// Parser message.
        reason: String,
    },
    /// The tenant address is malformed.
    #[error("invalid tenant address `{value}`")]
    TenantAddress {
        /// Raw configured value.
        value: String,
        /// What is wrong with it.
        #[source]
        source: AddressError,
    },
    /// The default expiration is negative.
    #[error("default expiration must be non-negative, got {0}")]
    NegativeExpiration(i64),
}

/// Errors raised while resolving a contract artifact.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    /// No artifact file exists for the contract.
    #[error("artifact for `{name}` not found (searched {searched:?})")]
    NotFound {
        /// Contract name.
        name: String,
        /// Every path that was tried.
        searched: Vec<PathBuf>,
    },
    /// The artifact file could not be read.
    #[error("failed to read artifact at {}", path.display())]
    Io {
        /// Artifact path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The artifact file is not a recognized artifact document.
    #[error("failed to parse artifact at {}", path.display())]
    Parse {
        /// Artifact path.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// The bytecode is not valid hex.
    #[error("artifact for `{name}` has malformed bytecode: {reason}")]
    Bytecode {
        /// Contract name.
        name: String,
        /// Decoder message.
        reason: String,
    },
    /// The bytecode still references libraries that were never linked.
    #[error("artifact for `{0}` has unlinked library references")]
    Unlinked(String),
    /// The artifact carries no creation code (abstract contract, interface).
    #[error("artifact for `{0}` has no bytecode to deploy")]
    EmptyBytecode(String),
    /// The artifact's constructor does not take `(address, uint256)`.
    #[error(
        "constructor of `{name}` takes ({found}), expected (address,uint256)"
    )]
    ConstructorMismatch {
        /// Contract name.
        name: String,
        /// Comma separated input types declared by the ABI.
        found: String,
    },
}

/// Errors raised by a deployment registry backend.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The registry file could not be read or written.
    #[error("registry I/O failed at {}", path.display())]
    Io {
        /// Registry path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The registry file is corrupt.
    #[error("registry at {} is not valid JSON", path.display())]
    Parse {
        /// Registry path.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// A lock guarding in-memory state was poisoned by a panic.
    #[error("registry state poisoned")]
    Poisoned,
}

/// Fatal failure of a deployment run.
#[derive(Debug, thiserror::Error)]
pub enum DeploymentError {
    /// The deployment configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The contract artifact could not be resolved.
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    /// The deployment registry could not be read or updated.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// The signing key could not be loaded.
    #[error("invalid private key: {0}")]
    Signer(String),
    /// The network connection is unavailable.
    #[error("network unavailable: {0}")]
    Unavailable(String),
    /// The node rejected the transaction (insufficient funds, revert during
    /// gas estimation, nonce issues).
    #[error("deployment transaction rejected: {0}")]
    Rejected(String),
    /// The transaction was mined but the constructor reverted.
    #[error("constructor reverted in transaction {0}")]
    Reverted(TxHash),
    /// The receipt contains no created contract address.
    #[error("receipt of transaction {0} contains no contract address")]
    MissingContractAddress(TxHash),
    /// The node reports another chain than the configured one.
    #[error("connected to chain {actual}, expected chain {expected}")]
    ChainMismatch {
        /// Configured chain id.
        expected: u64,
        /// Chain id reported by the node.
        actual: u64,
    },
}

/// A failed structural check on a deployed contract's address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssertionError {
    /// No deployment of the contract is recorded on the chain.
    #[error("address of `{contract}` is undefined on chain {chain_id}")]
    Undefined {
        /// Contract name.
        contract: String,
        /// Chain id that was searched.
        chain_id: u64,
    },
    /// The recorded address is null.
    #[error("address of `{0}` is null")]
    Null(String),
    /// The recorded address is an empty string.
    #[error("address of `{0}` is empty")]
    Empty(String),
    /// The recorded address is the zero-address sentinel.
    #[error("address of `{0}` is the zero address")]
    Zero(String),
    /// The recorded address is not a 20-byte hex value.
    #[error("address of `{contract}` is malformed: `{value}`")]
    Malformed {
        /// Contract name.
        contract: String,
        /// Raw recorded value.
        value: String,
    },
}

/// Failure of a verification run.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// The deployed address failed a check.
    #[error(transparent)]
    Assertion(#[from] AssertionError),
    /// The deployment registry could not be read.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl AssertionError {
    /// True when the check failing is about a missing deployment rather than
    /// a bad recorded value.
    #[must_use]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined { .. })
    }
}

impl DeploymentError {
    /// The tenant address problem, when the run failed on it.
    #[must_use]
    pub fn tenant_error(&self) -> Option<&AddressError> {
        match self {
            Self::Config(ConfigError::TenantAddress { source, .. }) => {
                Some(source)
            }
            _ => None,
        }
    }
}
