use alloy::{network::ReceiptResponse, rpc::types::TransactionReceipt};

use crate::{error::DeploymentError, network::Deployment};

/// Extension trait to recover the contract created by a transaction.
pub trait ReceiptExt {
    /// Returns the [`Deployment`] described by the receipt.
    ///
    /// # Errors
    ///
    /// May fail if the transaction reverted or created no contract.
    fn deployment(&self) -> Result<Deployment, DeploymentError>;
}

impl ReceiptExt for TransactionReceipt {
    fn deployment(&self) -> Result<Deployment, DeploymentError> {
        let transaction_hash = self.transaction_hash();
        if !self.status() {
            return Err(DeploymentError::Reverted(transaction_hash));
        }

        let address = self
            .contract_address()
            .filter(|address| !address.is_zero())
            .ok_or(DeploymentError::MissingContractAddress(transaction_hash))?;

        Ok(Deployment {
            address,
            transaction_hash,
            block_number: self.block_number(),
        })
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{b256, Address, TxHash};
    use serde_json::{json, Value};

    use super::*;

    const TX_HASH: TxHash = b256!(
        "1111111111111111111111111111111111111111111111111111111111111111"
    );
    const LEASE: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";

    fn receipt_json() -> Value {
        json!({
            "type": "0x2",
            "status": "0x1",
            "cumulativeGasUsed": "0x5208",
            "logs": [],
            "logsBloom": format!("0x{}", "0".repeat(512)),
            "transactionHash": TX_HASH,
            "transactionIndex": "0x0",
            "blockHash": format!("0x{}", "2".repeat(64)),
            "blockNumber": "0x7",
            "gasUsed": "0x5208",
            "effectiveGasPrice": "0x3b9aca00",
            "from": "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
            "to": null,
            "contractAddress": LEASE,
        })
    }

    fn receipt(patch: impl FnOnce(&mut Value)) -> TransactionReceipt {
        let mut value = receipt_json();
        patch(&mut value);
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn reads_created_contract() {
        let deployment = receipt(|_| {}).deployment().unwrap();
        assert_eq!(deployment.address, LEASE.parse::<Address>().unwrap());
        assert_eq!(deployment.transaction_hash, TX_HASH);
        assert_eq!(deployment.block_number, Some(7));
    }

    #[test]
    fn reverted_status_fails() {
        let err = receipt(|r| r["status"] = json!("0x0"))
            .deployment()
            .unwrap_err();
        assert!(matches!(
            err,
            DeploymentError::Reverted(hash) if hash == TX_HASH
        ));
    }

    #[test]
    fn missing_contract_address_fails() {
        for address in [Value::Null, json!(Address::ZERO)] {
            let err = receipt(|r| r["contractAddress"] = address)
                .deployment()
                .unwrap_err();
            assert!(matches!(
                err,
                DeploymentError::MissingContractAddress(hash) if hash == TX_HASH
            ));
        }
    }
}
