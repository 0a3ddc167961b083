//! EIP-712 payload assembly

use std::collections::BTreeMap;

use ethers_core::types::transaction::eip712::{EIP712Domain, TypedData, Types};
use serde_json::Value;

use crate::error::{Error, Result};

/// Name of the domain type, which is never a valid primary type
pub const EIP712_DOMAIN_TYPE: &str = "EIP712Domain";

/// Pick the primary type for a typed-data request.
///
/// An explicit `primary_type` always wins. Otherwise the first declared type
/// other than `EIP712Domain` is used; callers should not rely on this.
pub fn resolve_primary_type(types: &Value, primary_type: Option<&str>) -> Result<String> {
    if let Some(primary_type) = primary_type {
        return Ok(primary_type.to_string());
    }

    let declared = types
        .as_object()
        .ok_or_else(|| Error::Signing("sign_typed_data: types must be a JSON object".to_string()))?;

    declared
        .keys()
        .find(|name| name.as_str() != EIP712_DOMAIN_TYPE)
        .cloned()
        .ok_or_else(|| Error::Signing("sign_typed_data: no type declared besides EIP712Domain".to_string()))
}

/// Assemble an ethers `TypedData` from the pieces a dApp sends
pub fn build_typed_data(
    domain: EIP712Domain,
    types: &Value,
    data: &Value,
    primary_type: Option<&str>,
) -> Result<TypedData> {
    let primary_type = resolve_primary_type(types, primary_type)?;

    let types: Types = serde_json::from_value(types.clone())
        .map_err(|e| Error::Signing(format!("sign_typed_data: invalid types: {}", e)))?;
    if !types.contains_key(&primary_type) {
        return Err(Error::Signing(format!(
            "sign_typed_data: primary type {} is not declared",
            primary_type
        )));
    }

    let message: BTreeMap<String, Value> = serde_json::from_value(data.clone())
        .map_err(|e| Error::Signing(format!("sign_typed_data: message must be a JSON object: {}", e)))?;

    Ok(TypedData {
        domain,
        types,
        primary_type,
        message,
    })
}
