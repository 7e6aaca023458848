use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use alloy::{
    primitives::{Address, U256},
    sol_types::SolConstructor,
};
use serde::Deserialize;

use crate::error::{AddressError, ConfigError};

mod abi {
    #![allow(missing_docs, unreachable_pub)]

    alloy::sol! {
        contract Lease {
            constructor(address tenant, uint256 defaultExpiration);
        }
    }
}

const DEFAULT_CONTRACT: &str = "Lease";
const DEFAULT_ARTIFACTS: &str = "build/contracts";
const DEFAULT_REGISTRY: &str = "deployments.json";

/// Contents of a `lease.toml` file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// What to deploy and with which constructor arguments.
    pub deployment: DeploymentConfig,
    /// Directory holding compiled contract artifacts.
    #[serde(default = "default_artifacts")]
    pub artifacts: PathBuf,
    /// File that records deployments per chain.
    #[serde(default = "default_registry")]
    pub registry: PathBuf,
    /// Named networks selectable at run time.
    #[serde(default)]
    pub networks: BTreeMap<String, NetworkConfig>,
}

/// Deployment options for a single contract.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeploymentConfig {
    /// Artifact name of the contract, e.g. `Lease`.
    #[serde(default = "default_contract")]
    pub contract: String,
    /// Tenant bound into the contract at construction.
    pub tenant_address: String,
    /// Default lease term passed to the constructor.
    pub default_expiration: i64,
    /// Deploy a new instance even if one is already recorded.
    #[serde(default = "default_overwrite")]
    pub overwrite: bool,
}

/// Connection settings of a named network.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkConfig {
    /// HTTP JSON-RPC endpoint.
    pub rpc_url: String,
    /// Blocks to wait for after the deployment transaction is mined.
    #[serde(default = "default_confirmations")]
    pub confirmations: u64,
    /// Chain id the node must report, if pinned.
    #[serde(default)]
    pub chain_id: Option<u64>,
}

/// Validated constructor arguments of the `Lease` contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstructorArgs {
    /// Tenant address.
    pub tenant: Address,
    /// Default expiration.
    pub default_expiration: u64,
}

fn default_contract() -> String {
    DEFAULT_CONTRACT.to_owned()
}

fn default_artifacts() -> PathBuf {
    PathBuf::from(DEFAULT_ARTIFACTS)
}

fn default_registry() -> PathBuf {
    PathBuf::from(DEFAULT_REGISTRY)
}

fn default_overwrite() -> bool {
    true
}

fn default_confirmations() -> u64 {
    1
}

impl Config {
    /// Reads the configuration at `path`.
    ///
    /// Relative `artifacts` and `registry` paths are resolved against the
    /// directory containing the file.
    ///
    /// # Errors
    ///
    /// May error if the file cannot be read or is not a valid config.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| {
            ConfigError::Io { path: path.to_path_buf(), source }
        })?;
        let mut config = Self::from_str(&contents)?;

        if let Some(base) = path.parent() {
            config.artifacts = base.join(&config.artifacts);
            config.registry = base.join(&config.registry);
        }
        Ok(config)
    }

    /// Looks up the network called `name`.
    ///
    /// # Errors
    ///
    /// May error if no such network is configured.
    pub fn network(&self, name: &str) -> Result<&NetworkConfig, ConfigError> {
        self.networks
            .get(name)
            .ok_or_else(|| ConfigError::UnknownNetwork(name.to_owned()))
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(s)?)
    }
}

impl DeploymentConfig {
    /// Creates a config for the `Lease` contract that always deploys a new
    /// instance.
    #[must_use]
    pub fn new(
        tenant_address: impl Into<String>,
        default_expiration: i64,
    ) -> Self {
        Self {
            contract: default_contract(),
            tenant_address: tenant_address.into(),
            default_expiration,
            overwrite: true,
        }
    }

    /// Sets the artifact name of the contract.
    #[must_use]
    pub fn with_contract(mut self, contract: impl Into<String>) -> Self {
        self.contract = contract.into();
        self
    }

    /// Sets whether an already recorded instance gets replaced.
    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Validates the constructor options.
    ///
    /// # Errors
    ///
    /// May error if the tenant address is malformed or the default
    /// expiration is negative.
    pub fn constructor_args(&self) -> Result<ConstructorArgs, ConfigError> {
        let tenant = parse_address(&self.tenant_address).map_err(|source| {
            ConfigError::TenantAddress {
                value: self.tenant_address.clone(),
                source,
            }
        })?;
        let default_expiration = u64::try_from(self.default_expiration)
            .map_err(|_| {
                ConfigError::NegativeExpiration(self.default_expiration)
            })?;

        Ok(ConstructorArgs { tenant, default_expiration })
    }
}

impl ConstructorArgs {
    /// ABI encodes the arguments as `(address, uint256)`.
    #[must_use]
    pub fn abi_encode(&self) -> Vec<u8> {
        abi::Lease::constructorCall {
            tenant: self.tenant,
            defaultExpiration: U256::from(self.default_expiration),
        }
        .abi_encode()
    }

    /// Human readable form stored alongside a deployment.
    #[must_use]
    pub fn display_values(&self) -> Vec<String> {
        vec![
            self.tenant.to_checksum(None),
            self.default_expiration.to_string(),
        ]
    }
}

/// Parses a `0x`-prefixed, 40 hex digit address.
///
/// Mixed-case input must carry a valid EIP-55 checksum. All-lowercase and
/// all-uppercase input is accepted as is.
///
/// # Errors
///
/// May error if the value has the wrong prefix, length, characters or
/// checksum.
pub fn parse_address(raw: &str) -> Result<Address, AddressError> {
    let digits = raw.strip_prefix("0x").ok_or(AddressError::MissingPrefix)?;
    if digits.len() != 40 {
        return Err(AddressError::Length(digits.len()));
    }
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(AddressError::NotHex);
    }

    let has_lower = digits.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = digits.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper {
        Address::parse_checksummed(raw, None)
            .map_err(|_| AddressError::Checksum)
    } else {
        Address::from_str(raw).map_err(|_| AddressError::NotHex)
    }
}
