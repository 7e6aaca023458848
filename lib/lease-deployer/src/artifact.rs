use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use alloy::{hex, json_abi::JsonAbi, primitives::Bytes};
use serde::Deserialize;

use crate::error::ArtifactError;

/// Constructor input types the deployer knows how to encode.
const EXPECTED_CONSTRUCTOR: [&str; 2] = ["address", "uint256"];

/// Compiled contract: interface plus creation code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractArtifact {
    /// Contract name.
    pub name: String,
    /// Contract interface.
    pub abi: Arc<JsonAbi>,
    /// Creation bytecode, without constructor arguments.
    pub bytecode: Bytes,
}

/// Resolves a contract name to its compiled artifact.
pub trait ArtifactRegistry {
    /// Returns the artifact of the contract called `name`.
    ///
    /// # Errors
    ///
    /// May error if the artifact does not exist or cannot be decoded.
    fn resolve(&self, name: &str) -> Result<ContractArtifact, ArtifactError>;
}

impl<T: ArtifactRegistry + ?Sized> ArtifactRegistry for &T {
    fn resolve(&self, name: &str) -> Result<ContractArtifact, ArtifactError> {
        (**self).resolve(name)
    }
}

/// Normalizes an artifact reference such as `./Lease.sol` to `Lease`.
#[must_use]
pub fn artifact_name(reference: &str) -> &str {
    let file = reference.rsplit('/').next().unwrap_or(reference);
    file.strip_suffix(".sol").unwrap_or(file)
}

/// Artifact document as emitted by Truffle or Foundry.
#[derive(Deserialize)]
struct ArtifactFile {
    abi: JsonAbi,
    bytecode: RawBytecode,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBytecode {
    /// Truffle and Hardhat: `"bytecode": "0x..."`.
    Hex(String),
    /// Foundry: `"bytecode": { "object": "0x...", ... }`.
    Object { object: String },
}

impl RawBytecode {
    fn as_str(&self) -> &str {
        match self {
            Self::Hex(s) | Self::Object { object: s } => s,
        }
    }
}

impl ContractArtifact {
    /// Builds an artifact, checking it is deployable with the `Lease`
    /// constructor.
    ///
    /// # Errors
    ///
    /// May error if the bytecode is empty or the ABI declares an
    /// incompatible constructor.
    pub fn new(
        name: impl Into<String>,
        abi: JsonAbi,
        bytecode: Bytes,
    ) -> Result<Self, ArtifactError> {
        let name = name.into();
        if bytecode.is_empty() {
            return Err(ArtifactError::EmptyBytecode(name));
        }

        // An ABI without a constructor entry is taken at face value.
        if let Some(constructor) = &abi.constructor {
            let found: Vec<&str> =
                constructor.inputs.iter().map(|p| p.ty.as_str()).collect();
            if found != EXPECTED_CONSTRUCTOR {
                return Err(ArtifactError::ConstructorMismatch {
                    name,
                    found: found.join(","),
                });
            }
        }

        Ok(Self { name, abi: Arc::new(abi), bytecode })
    }

    /// Parses an artifact document.
    ///
    /// # Errors
    ///
    /// May error if the document is not an artifact or is not deployable.
    pub fn from_json(
        name: &str,
        path: &Path,
        json: &str,
    ) -> Result<Self, ArtifactError> {
        let file: ArtifactFile = serde_json::from_str(json).map_err(|source| {
            ArtifactError::Parse { path: path.to_path_buf(), source }
        })?;

        let raw = file.bytecode.as_str();
        if raw.contains("__") {
            return Err(ArtifactError::Unlinked(name.to_owned()));
        }
        let bytecode = hex::decode(raw).map_err(|e| ArtifactError::Bytecode {
            name: name.to_owned(),
            reason: e.to_string(),
        })?;

        Self::new(name, file.abi, bytecode.into())
    }
}

/// Reads artifacts from a build output directory.
///
/// Both `<dir>/<Name>.json` (Truffle, Hardhat) and
/// `<dir>/<Name>.sol/<Name>.json` (Foundry) layouts are searched.
#[derive(Debug, Clone)]
pub struct DirectoryArtifacts {
    root: PathBuf,
}

impl DirectoryArtifacts {
    /// Creates a registry over `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn candidates(&self, name: &str) -> Vec<PathBuf> {
        let file = format!("{name}.json");
        vec![
            self.root.join(&file),
            self.root.join(format!("{name}.sol")).join(&file),
        ]
    }
}

impl ArtifactRegistry for DirectoryArtifacts {
    fn resolve(&self, name: &str) -> Result<ContractArtifact, ArtifactError> {
        let name = artifact_name(name);
        let searched = self.candidates(name);
        let Some(path) = searched.iter().find(|p| p.is_file()) else {
            return Err(ArtifactError::NotFound {
                name: name.to_owned(),
                searched,
            });
        };

        tracing::debug!(name, path = %path.display(), "resolving artifact");
        let json = fs::read_to_string(path).map_err(|source| {
            ArtifactError::Io { path: path.clone(), source }
        })?;
        ContractArtifact::from_json(name, path, &json)
    }
}

/// Artifacts held in memory, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct MemoryArtifacts {
    artifacts: HashMap<String, ContractArtifact>,
}

impl MemoryArtifacts {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `artifact` under its own name.
    #[must_use]
    pub fn with(mut self, artifact: ContractArtifact) -> Self {
        self.artifacts.insert(artifact.name.clone(), artifact);
        self
    }
}

impl ArtifactRegistry for MemoryArtifacts {
    fn resolve(&self, name: &str) -> Result<ContractArtifact, ArtifactError> {
        let name = artifact_name(name);
        self.artifacts.get(name).cloned().ok_or_else(|| {
            ArtifactError::NotFound { name: name.to_owned(), searched: vec![] }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEASE_ABI: &str = r#"[
        {
            "type": "constructor",
            "stateMutability": "nonpayable",
            "inputs": [
                {
                    "name": "tenant",
                    "type": "address",
                    "internalType": "address"
                },
                {
                    "name": "defaultExpiration",
                    "type": "uint256",
                    "internalType": "uint256"
                }
            ]
        }
    ]"#;

    fn write(dir: &Path, relative: &str, contents: &str) {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn normalizes_artifact_references() {
        assert_eq!(artifact_name("./Lease.sol"), "Lease");
        assert_eq!(artifact_name("contracts/Lease.sol"), "Lease");
        assert_eq!(artifact_name("Lease"), "Lease");
    }

    #[test]
    fn reads_truffle_layout() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "Lease.json",
            &format!(
                r#"{{
                    "contractName": "Lease",
                    "abi": {LEASE_ABI},
                    "bytecode": "0x6080604052"
                }}"#
            ),
        );

        let artifact =
            DirectoryArtifacts::new(dir.path()).resolve("./Lease.sol").unwrap();
        assert_eq!(artifact.name, "Lease");
        assert_eq!(
            artifact.bytecode,
            Bytes::from(vec![0x60, 0x80, 0x60, 0x40, 0x52])
        );
        assert!(artifact.abi.constructor.is_some());
    }

    #[test]
    fn reads_foundry_layout() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "Lease.sol/Lease.json",
            &format!(
                r#"{{
                    "abi": {LEASE_ABI},
                    "bytecode": {{ "object": "0x6080", "linkReferences": {{}} }}
                }}"#
            ),
        );

        let artifact =
            DirectoryArtifacts::new(dir.path()).resolve("Lease").unwrap();
        assert_eq!(artifact.bytecode, Bytes::from(vec![0x60, 0x80]));
    }

    #[test]
    fn reports_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let err =
            DirectoryArtifacts::new(dir.path()).resolve("Lease").unwrap_err();
        let ArtifactError::NotFound { name, searched } = err else {
            panic!("expected NotFound, got {err:?}");
        };
        assert_eq!(name, "Lease");
        assert_eq!(searched.len(), 2);
    }

    #[test]
    fn rejects_undeployable_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let registry = DirectoryArtifacts::new(dir.path());

        write(dir.path(), "ILease.json", r#"{ "abi": [], "bytecode": "0x" }"#);
        assert!(matches!(
            registry.resolve("ILease"),
            Err(ArtifactError::EmptyBytecode(_))
        ));

        write(
            dir.path(),
            "Linked.json",
            r#"{
                "abi": [],
                "bytecode": "0x60__LeaseMath_______________________________60"
            }"#,
        );
        assert!(matches!(
            registry.resolve("Linked"),
            Err(ArtifactError::Unlinked(_))
        ));

        write(dir.path(), "Broken.json", r#"{ "abi": [] }"#);
        assert!(matches!(
            registry.resolve("Broken"),
            Err(ArtifactError::Parse { .. })
        ));
    }

    #[test]
    fn rejects_incompatible_constructor() {
        let abi: JsonAbi = serde_json::from_str(
            r#"[{ "type": "constructor", "stateMutability": "nonpayable",
                  "inputs": [{ "name": "owner", "type": "address" }] }]"#,
        )
        .unwrap();

        let err = ContractArtifact::new("Lease", abi, Bytes::from(vec![0x60]))
            .unwrap_err();
        assert!(matches!(
            err,
            ArtifactError::ConstructorMismatch { found, .. }
                if found == "address"
        ));
    }
}
