//! Transaction request and fee types

use std::str::FromStr;

use ethers::prelude::{Address, Bytes, TransactionRequest as EthersTransactionRequest, U256};
use ethers::types::transaction::{eip1559::Eip1559TransactionRequest, eip2718::TypedTransaction};
use serde::{Serialize, Deserialize};

use crate::chain::ChainDescriptor;
use crate::error::{Error, Result};

/// A partial transaction as supplied by the wallet application.
///
/// Only `to` and `value` are required. Missing gas, fee and nonce fields are
/// filled by the wallet client before signing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    /// Recipient address
    pub to: String,
    /// Value in wei, decimal or `0x`-prefixed hex
    pub value: String,
    /// Call data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Bytes>,
    /// Gas limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<String>,
    /// Legacy gas price; forces a legacy transaction when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<String>,
    /// EIP-1559 max fee per gas
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_fee_per_gas: Option<String>,
    /// EIP-1559 max priority fee per gas
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_priority_fee_per_gas: Option<String>,
    /// Nonce
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<u64>,
}

impl TransactionRequest {
    /// Create a plain value transfer
    pub fn new(to: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            value: value.into(),
            ..Default::default()
        }
    }

    /// Attach call data
    pub fn data(mut self, data: impl Into<Bytes>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Set the gas limit
    pub fn gas_limit(mut self, gas_limit: impl Into<String>) -> Self {
        self.gas_limit = Some(gas_limit.into());
        self
    }

    /// Set a legacy gas price
    pub fn gas_price(mut self, gas_price: impl Into<String>) -> Self {
        self.gas_price = Some(gas_price.into());
        self
    }

    /// Set EIP-1559 fees
    pub fn eip1559_fees(mut self, max_fee_per_gas: impl Into<String>, max_priority_fee_per_gas: impl Into<String>) -> Self {
        self.max_fee_per_gas = Some(max_fee_per_gas.into());
        self.max_priority_fee_per_gas = Some(max_priority_fee_per_gas.into());
        self
    }

    /// Set the nonce
    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    /// Convert into an ethers typed transaction for `chain`.
    ///
    /// The result is a legacy transaction when a gas price is given or the
    /// chain has no EIP-1559 support, otherwise an EIP-1559 transaction.
    pub fn to_typed_transaction(&self, chain: &ChainDescriptor) -> Result<TypedTransaction> {
        let to = Address::from_str(self.to.trim())
            .map_err(|e| Error::InvalidInput(format!("Invalid recipient {}: {}", self.to, e)))?;
        let value = parse_quantity("value", &self.value)?;
        let gas = parse_optional_quantity("gas limit", self.gas_limit.as_deref())?;
        let gas_price = parse_optional_quantity("gas price", self.gas_price.as_deref())?;
        let max_fee = parse_optional_quantity("max fee per gas", self.max_fee_per_gas.as_deref())?;
        let max_priority_fee =
            parse_optional_quantity("max priority fee per gas", self.max_priority_fee_per_gas.as_deref())?;

        if gas_price.is_some() && (max_fee.is_some() || max_priority_fee.is_some()) {
            return Err(Error::InvalidInput(
                "Both a gas price and EIP-1559 fees were supplied".to_string(),
            ));
        }

        if gas_price.is_some() || !chain.eip1559 {
            if max_fee.is_some() || max_priority_fee.is_some() {
                return Err(Error::InvalidInput(format!(
                    "Chain {} does not accept EIP-1559 fees",
                    chain.id
                )));
            }

            let mut tx = EthersTransactionRequest::new()
                .to(to)
                .value(value)
                .chain_id(chain.id);
            tx.gas = gas;
            tx.gas_price = gas_price;
            tx.nonce = self.nonce.map(U256::from);
            tx.data = self.data.clone();
            return Ok(TypedTransaction::Legacy(tx));
        }

        let mut tx = Eip1559TransactionRequest::new()
            .to(to)
            .value(value)
            .chain_id(chain.id);
        tx.gas = gas;
        tx.max_fee_per_gas = max_fee;
        tx.max_priority_fee_per_gas = max_priority_fee;
        tx.nonce = self.nonce.map(U256::from);
        tx.data = self.data.clone();
        Ok(TypedTransaction::Eip1559(tx))
    }
}

/// Current network fee data
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeData {
    /// Legacy gas price
    pub gas_price: Option<U256>,
    /// EIP-1559 max fee per gas
    pub max_fee_per_gas: Option<U256>,
    /// EIP-1559 max priority fee per gas
    pub max_priority_fee_per_gas: Option<U256>,
}

impl FeeData {
    /// Fill fee fields the transaction does not already carry
    pub fn apply_to(&self, tx: &mut TypedTransaction) {
        match tx {
            TypedTransaction::Eip1559(inner) => {
                if inner.max_fee_per_gas.is_none() {
                    inner.max_fee_per_gas = self.max_fee_per_gas;
                }
                if inner.max_priority_fee_per_gas.is_none() {
                    inner.max_priority_fee_per_gas = self.max_priority_fee_per_gas;
                }
            }
            _ => {
                if tx.gas_price().is_none() {
                    if let Some(gas_price) = self.gas_price {
                        tx.set_gas_price(gas_price);
                    }
                }
            }
        }
    }
}

/// Parse a decimal or `0x`-prefixed hex quantity
pub fn parse_quantity(field: &str, raw: &str) -> Result<U256> {
    let raw = raw.trim();
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => U256::from_str_radix(hex, 16).map_err(|e| e.to_string()),
        None => U256::from_dec_str(raw).map_err(|e| e.to_string()),
    };
    parsed.map_err(|e| Error::InvalidInput(format!("Invalid {} {:?}: {}", field, raw, e)))
}

fn parse_optional_quantity(field: &str, raw: Option<&str>) -> Result<Option<U256>> {
    raw.map(|raw| parse_quantity(field, raw)).transpose()
}
