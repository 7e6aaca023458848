use std::{str::FromStr, sync::Arc};

use alloy::primitives::Address;

use crate::{
    artifact::artifact_name,
    deploy::DeployedContractHandle,
    error::{AssertionError, VerifyError},
    registry::{DeploymentRecord, DeploymentRegistry},
};

/// Checks that a recorded deployment has a usable address.
pub struct Verifier<'a, R> {
    registry: &'a R,
}

impl<'a, R: DeploymentRegistry> Verifier<'a, R> {
    /// Creates a verifier reading from `registry`.
    pub fn new(registry: &'a R) -> Self {
        Self { registry }
    }

    /// Verifies the most recent deployment of `contract` on `chain_id` and
    /// returns its handle.
    ///
    /// # Errors
    ///
    /// Fails with [`VerifyError::Assertion`] when the address is undefined,
    /// null, empty, zero or malformed, and with [`VerifyError::Registry`]
    /// when the registry cannot be read.
    pub fn verify(
        &self,
        chain_id: u64,
        contract: &str,
    ) -> Result<DeployedContractHandle, VerifyError> {
        let contract = artifact_name(contract);
        let record = self.registry.latest(chain_id, contract)?;
        let address = check_address(contract, chain_id, record.as_ref())?;
        let record = record.unwrap_or_default();

        tracing::info!(contract, chain_id, %address, "verified deployment");
        Ok(DeployedContractHandle {
            contract: contract.to_owned(),
            chain_id,
            address,
            transaction_hash: record.transaction_hash,
            block_number: record.block_number,
            abi: Arc::new(record.abi),
        })
    }
}

/// Asserts, in order, that the address of `record` is defined, not null, not
/// empty and not the zero address, and that it parses.
///
/// # Errors
///
/// Returns the first [`AssertionError`] that applies.
pub fn check_address(
    contract: &str,
    chain_id: u64,
    record: Option<&DeploymentRecord>,
) -> Result<Address, AssertionError> {
    let Some(record) = record else {
        return Err(AssertionError::Undefined {
            contract: contract.to_owned(),
            chain_id,
        });
    };
    let Some(raw) = record.address.as_deref() else {
        return Err(AssertionError::Null(contract.to_owned()));
    };

    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AssertionError::Empty(contract.to_owned()));
    }

    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);
    if !digits.is_empty() && digits.bytes().all(|b| b == b'0') {
        return Err(AssertionError::Zero(contract.to_owned()));
    }

    Address::from_str(raw).map_err(|_| AssertionError::Malformed {
        contract: contract.to_owned(),
        value: raw.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MemoryRegistry;

    const LEASE: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

    fn with_address(address: Option<&str>) -> DeploymentRecord {
        DeploymentRecord {
            address: address.map(str::to_owned),
            ..DeploymentRecord::default()
        }
    }

    fn check(address: Option<&str>) -> Result<Address, AssertionError> {
        check_address("Lease", 1337, Some(&with_address(address)))
    }

    #[test]
    fn accepts_deployed_address() {
        let address = check(Some(LEASE)).unwrap();
        assert_eq!(address.to_checksum(None), LEASE);
    }

    #[test]
    fn undefined_when_nothing_recorded() {
        assert_eq!(
            check_address("Lease", 1337, None),
            Err(AssertionError::Undefined {
                contract: "Lease".to_owned(),
                chain_id: 1337
            })
        );
    }

    #[test]
    fn rejects_null_empty_and_zero() {
        let lease = || "Lease".to_owned();
        assert_eq!(check(None), Err(AssertionError::Null(lease())));
        assert_eq!(check(Some("")), Err(AssertionError::Empty(lease())));
        assert_eq!(check(Some("  ")), Err(AssertionError::Empty(lease())));
        assert_eq!(check(Some("0x0")), Err(AssertionError::Zero(lease())));
        assert_eq!(
            check(Some("0x0000000000000000000000000000000000000000")),
            Err(AssertionError::Zero(lease()))
        );
    }

    #[test]
    fn rejects_malformed_address() {
        assert!(matches!(
            check(Some("0x")),
            Err(AssertionError::Malformed { value, .. }) if value == "0x"
        ));
        assert!(matches!(
            check(Some("lease.eth")),
            Err(AssertionError::Malformed { .. })
        ));
    }

    #[test]
    fn verifies_most_recent_record() {
        let registry = MemoryRegistry::new();
        registry.record(1337, "Lease", with_address(Some(LEASE))).unwrap();
        registry.record(1337, "Lease", with_address(Some("0x0"))).unwrap();

        let err = Verifier::new(&registry).verify(1337, "Lease").unwrap_err();
        assert!(matches!(err, VerifyError::Assertion(AssertionError::Zero(_))));

        let err = Verifier::new(&registry).verify(1, "Lease").unwrap_err();
        assert!(matches!(
            err,
            VerifyError::Assertion(ref e) if e.is_undefined()
        ));
    }
}
