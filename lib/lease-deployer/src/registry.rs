use std::{
    collections::{BTreeMap, HashMap},
    fs, io,
    path::{Path, PathBuf},
    sync::Mutex,
};

use alloy::{json_abi::JsonAbi, primitives::TxHash};
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// A deployment as persisted in a registry.
///
/// `address` stays a raw optional string so that a registry written by other
/// tools, or edited by hand, can be checked rather than rejected on load.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    /// Contract address.
    #[serde(default)]
    pub address: Option<String>,
    /// Hash of the creation transaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<TxHash>,
    /// Block the creation transaction was included in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    /// Constructor arguments the instance was created with.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constructor_args: Vec<String>,
    /// Interface of the deployed contract.
    #[serde(default)]
    pub abi: JsonAbi,
}

/// Where deployments are recorded, keyed by chain id and contract name.
///
/// Records are only ever appended; the last one is the most recent.
pub trait DeploymentRegistry {
    /// Most recent deployment of `contract` on `chain_id`.
    ///
    /// # Errors
    ///
    /// May error if the backing store cannot be read.
    fn latest(
        &self,
        chain_id: u64,
        contract: &str,
    ) -> Result<Option<DeploymentRecord>, RegistryError>;

    /// Appends `record` as the most recent deployment of `contract`.
    ///
    /// # Errors
    ///
    /// May error if the backing store cannot be updated.
    fn record(
        &self,
        chain_id: u64,
        contract: &str,
        record: DeploymentRecord,
    ) -> Result<(), RegistryError>;
}

impl<T: DeploymentRegistry + ?Sized> DeploymentRegistry for &T {
    fn latest(
        &self,
        chain_id: u64,
        contract: &str,
    ) -> Result<Option<DeploymentRecord>, RegistryError> {
        (**self).latest(chain_id, contract)
    }

    fn record(
        &self,
        chain_id: u64,
        contract: &str,
        record: DeploymentRecord,
    ) -> Result<(), RegistryError> {
        (**self).record(chain_id, contract, record)
    }
}

type Chains = BTreeMap<u64, BTreeMap<String, Vec<DeploymentRecord>>>;

/// Registry stored as a JSON document of the form
/// `{ "<chain id>": { "<contract>": [record, ...] } }`.
#[derive(Debug, Clone)]
pub struct JsonFileRegistry {
    path: PathBuf,
}

impl JsonFileRegistry {
    /// Opens the registry at `path`. A missing file is an empty registry.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the registry file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every recorded deployment of `contract` on `chain_id`, oldest first.
    ///
    /// # Errors
    ///
    /// May error if the registry file cannot be read.
    pub fn history(
        &self,
        chain_id: u64,
        contract: &str,
    ) -> Result<Vec<DeploymentRecord>, RegistryError> {
        let mut chains = self.load()?;
        Ok(chains
            .get_mut(&chain_id)
            .and_then(|contracts| contracts.remove(contract))
            .unwrap_or_default())
    }

    fn io_error(&self, source: io::Error) -> RegistryError {
        RegistryError::Io { path: self.path.clone(), source }
    }

    fn load(&self) -> Result<Chains, RegistryError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(Chains::new())
            }
            Err(e) => return Err(self.io_error(e)),
        };
        if contents.trim().is_empty() {
            return Ok(Chains::new());
        }

        serde_json::from_str(&contents).map_err(|source| RegistryError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn store(&self, chains: &Chains) -> Result<(), RegistryError> {
        let json = serde_json::to_string_pretty(chains).map_err(|source| {
            RegistryError::Parse { path: self.path.clone(), source }
        })?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }
        fs::write(&self.path, json).map_err(|e| self.io_error(e))
    }
}

impl DeploymentRegistry for JsonFileRegistry {
    fn latest(
        &self,
        chain_id: u64,
        contract: &str,
    ) -> Result<Option<DeploymentRecord>, RegistryError> {
        Ok(self.history(chain_id, contract)?.pop())
    }

    fn record(
        &self,
        chain_id: u64,
        contract: &str,
        record: DeploymentRecord,
    ) -> Result<(), RegistryError> {
        let mut chains = self.load()?;
        chains
            .entry(chain_id)
            .or_default()
            .entry(contract.to_owned())
            .or_default()
            .push(record);
        self.store(&chains)?;

        tracing::debug!(
            chain_id,
            contract,
            path = %self.path.display(),
            "recorded deployment"
        );
        Ok(())
    }
}

/// Registry kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    records: Mutex<HashMap<(u64, String), Vec<DeploymentRecord>>>,
}

impl MemoryRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of deployments recorded for `contract` on `chain_id`.
    ///
    /// # Errors
    ///
    /// May error if the registry state is poisoned.
    pub fn count(
        &self,
        chain_id: u64,
        contract: &str,
    ) -> Result<usize, RegistryError> {
        let records =
            self.records.lock().map_err(|_| RegistryError::Poisoned)?;
        Ok(records
            .get(&(chain_id, contract.to_owned()))
            .map_or(0, Vec::len))
    }
}

impl DeploymentRegistry for MemoryRegistry {
    fn latest(
        &self,
        chain_id: u64,
        contract: &str,
    ) -> Result<Option<DeploymentRecord>, RegistryError> {
        let records =
            self.records.lock().map_err(|_| RegistryError::Poisoned)?;
        Ok(records
            .get(&(chain_id, contract.to_owned()))
            .and_then(|history| history.last().cloned()))
    }

    fn record(
        &self,
        chain_id: u64,
        contract: &str,
        record: DeploymentRecord,
    ) -> Result<(), RegistryError> {
        let mut records =
            self.records.lock().map_err(|_| RegistryError::Poisoned)?;
        records
            .entry((chain_id, contract.to_owned()))
            .or_default()
            .push(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(address: &str) -> DeploymentRecord {
        DeploymentRecord {
            address: Some(address.to_owned()),
            block_number: Some(7),
            ..DeploymentRecord::default()
        }
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let registry =
            JsonFileRegistry::new(dir.path().join("deployments.json"));
        assert_eq!(registry.latest(1337, "Lease").unwrap(), None);
    }

    #[test]
    fn keeps_history_per_chain_and_contract() {
        let dir = tempfile::tempdir().unwrap();
        let registry =
            JsonFileRegistry::new(dir.path().join("nested/deployments.json"));

        registry.record(1337, "Lease", record("0x01")).unwrap();
        registry.record(1337, "Lease", record("0x02")).unwrap();
        registry.record(5, "Lease", record("0x03")).unwrap();

        let latest = registry.latest(1337, "Lease").unwrap().unwrap();
        assert_eq!(latest.address.as_deref(), Some("0x02"));
        assert_eq!(registry.history(1337, "Lease").unwrap().len(), 2);
        assert_eq!(registry.history(5, "Lease").unwrap().len(), 1);
        assert_eq!(registry.latest(1337, "Escrow").unwrap(), None);

        // A second handle on the same file sees the same state.
        let reopened = JsonFileRegistry::new(registry.path());
        assert_eq!(reopened.latest(5, "Lease").unwrap(), Some(record("0x03")));
    }

    #[test]
    fn reads_null_and_missing_addresses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployments.json");
        fs::write(
            &path,
            r#"{ "1": { "Lease": [{ "address": "0xab" }, { "address": null }] },
                 "2": { "Lease": [{ "blockNumber": 3 }] } }"#,
        )
        .unwrap();

        let registry = JsonFileRegistry::new(&path);
        assert_eq!(registry.latest(1, "Lease").unwrap().unwrap().address, None);
        let record = registry.latest(2, "Lease").unwrap().unwrap();
        assert_eq!(record.address, None);
        assert_eq!(record.block_number, Some(3));
    }

    #[test]
    fn reports_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployments.json");
        fs::write(&path, "{ not json").unwrap();

        let err = JsonFileRegistry::new(&path).latest(1, "Lease").unwrap_err();
        assert!(matches!(err, RegistryError::Parse { .. }));
    }

    #[test]
    fn memory_registry_appends() {
        let registry = MemoryRegistry::new();
        registry.record(1, "Lease", record("0x01")).unwrap();
        registry.record(1, "Lease", record("0x02")).unwrap();

        assert_eq!(registry.count(1, "Lease").unwrap(), 2);
        assert_eq!(registry.count(2, "Lease").unwrap(), 0);
        assert_eq!(
            registry.latest(1, "Lease").unwrap().unwrap().address.as_deref(),
            Some("0x02")
        );
    }
}
