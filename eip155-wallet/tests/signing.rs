//! Tests for message, typed-data and transaction signing

use ethers_core::types::transaction::eip712::{EIP712Domain, Eip712};
use ethers_core::types::{Address, Signature, H256};
use ethers_signers::{coins_bip39::English, MnemonicBuilder, Signer};
use serde_json::{json, Value};

use eip155_wallet::account::typed_data::build_typed_data;
use eip155_wallet::{chain, AccountSigner, Error, SignerConfig, TransactionRequest};

const MNEMONIC: &str = "test test test test test test test test test test test junk";
const RECIPIENT: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";
const UNREACHABLE_RPC: &str = "http://127.0.0.1:1";

fn mail_domain() -> EIP712Domain {
    serde_json::from_value(json!({
        "name": "Ether Mail",
        "version": "1",
        "chainId": 1,
        "verifyingContract": "0xCcCCccccCCCCcCCCCCCcCcCccCcCCCcCcccccccC"
    }))
    .unwrap()
}

fn mail_types() -> Value {
    json!({
        "Mail": [
            { "name": "from", "type": "Person" },
            { "name": "to", "type": "Person" },
            { "name": "contents", "type": "string" }
        ],
        "Person": [
            { "name": "name", "type": "string" },
            { "name": "wallet", "type": "address" }
        ]
    })
}

fn mail_message() -> Value {
    json!({
        "from": { "name": "Cow", "wallet": "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826" },
        "to": { "name": "Bob", "wallet": "0xbBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB" },
        "contents": "Hello, Bob!"
    })
}

#[tokio::test]
async fn test_sign_message_shape_and_recovery() {
    let signer = AccountSigner::init(Some(MNEMONIC)).unwrap();
    let signature = signer.sign_message("hello").await.unwrap();

    assert!(signature.starts_with("0x"));
    assert_eq!(signature.len(), 132);

    let parsed: Signature = signature.parse().unwrap();
    parsed.verify("hello", signer.address()).unwrap();
    assert_eq!(parsed.recover("hello").unwrap(), signer.get_address().parse::<Address>().unwrap());
}

#[tokio::test]
async fn test_same_mnemonic_same_signature() {
    let a = AccountSigner::init(Some(MNEMONIC)).unwrap();
    let mut b = AccountSigner::init(Some(MNEMONIC)).unwrap();
    b.set_chain(84532).unwrap();

    // Personal messages are chain independent
    assert_eq!(a.sign_message("hello").await.unwrap(), b.sign_message("hello").await.unwrap());
}

#[tokio::test]
async fn test_sign_typed_data_recovers_to_account() {
    let signer = AccountSigner::init(Some(MNEMONIC)).unwrap();
    let signature = signer
        .sign_typed_data(mail_domain(), &mail_types(), &mail_message(), Some("Mail"))
        .await
        .unwrap();
    assert_eq!(signature.len(), 132);

    let typed_data = build_typed_data(mail_domain(), &mail_types(), &mail_message(), Some("Mail")).unwrap();
    let digest = H256::from(typed_data.encode_eip712().unwrap());
    let parsed: Signature = signature.parse().unwrap();
    assert_eq!(parsed.recover(digest).unwrap(), signer.address());
}

#[tokio::test]
async fn test_typed_data_default_primary_type() {
    let signer = AccountSigner::init(Some(MNEMONIC)).unwrap();

    let implicit = signer
        .sign_typed_data(mail_domain(), &mail_types(), &mail_message(), None)
        .await
        .unwrap();
    let explicit = signer
        .sign_typed_data(mail_domain(), &mail_types(), &mail_message(), Some("Mail"))
        .await
        .unwrap();
    assert_eq!(implicit, explicit);

    // An explicit primary type overrides the default
    let person = json!({ "name": "Cow", "wallet": "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826" });
    let as_person = signer
        .sign_typed_data(mail_domain(), &mail_types(), &person, Some("Person"))
        .await
        .unwrap();
    assert_ne!(as_person, implicit);
}

#[tokio::test]
async fn test_typed_data_malformed_message() {
    let signer = AccountSigner::init(Some(MNEMONIC)).unwrap();
    let message = json!({ "from": { "name": "Cow", "wallet": "not an address" }, "to": {}, "contents": 1 });

    let result = signer
        .sign_typed_data(mail_domain(), &mail_types(), &message, Some("Mail"))
        .await;
    assert!(matches!(result, Err(Error::Signing(_))));
}

#[tokio::test]
async fn test_sign_transaction_fully_specified() {
    let config = SignerConfig::default().with_rpc_override(84532, UNREACHABLE_RPC);
    let mut signer = AccountSigner::with_config(Some(MNEMONIC), &config).unwrap();
    signer.set_chain(84532).unwrap();

    let request = TransactionRequest::new(RECIPIENT, "1000000000000000")
        .gas_limit("21000")
        .eip1559_fees("2000000000", "1000000000")
        .nonce(0);

    // Every field is present, so nothing is fetched from the unreachable endpoint
    let raw = signer.sign_transaction(&request).await.unwrap();
    assert!(raw.starts_with("0x02"));
    assert_eq!(raw, signer.sign_transaction(&request).await.unwrap());

    let wallet = MnemonicBuilder::<English>::default()
        .phrase(MNEMONIC)
        .build()
        .unwrap()
        .with_chain_id(84532u64);
    let tx = request.to_typed_transaction(chain::lookup(84532).unwrap()).unwrap();
    let signature = wallet.sign_transaction(&tx).await.unwrap();
    assert_eq!(raw, format!("0x{}", hex::encode(tx.rlp_signed(&signature))));
    assert_eq!(signature.recover(tx.sighash()).unwrap(), signer.address());
}

#[tokio::test]
async fn test_sign_legacy_transaction() {
    let config = SignerConfig::default().with_rpc_override(97, UNREACHABLE_RPC);
    let mut signer = AccountSigner::with_config(Some(MNEMONIC), &config).unwrap();
    signer.set_chain(97).unwrap();

    let request = TransactionRequest::new(RECIPIENT, "1")
        .gas_limit("21000")
        .gas_price("10000000000")
        .nonce(3);

    let raw = signer.sign_transaction(&request).await.unwrap();
    // Legacy transactions are bare RLP lists
    assert!(raw.starts_with("0xf8"));
}

#[tokio::test]
async fn test_sign_transaction_invalid_recipient() {
    let signer = AccountSigner::init(Some(MNEMONIC)).unwrap();
    let request = TransactionRequest::new("0x1234", "1").gas_limit("21000").gas_price("1").nonce(0);

    match signer.sign_transaction(&request).await {
        Err(Error::Signing(msg)) => assert!(msg.contains("0x1234")),
        other => panic!("expected Signing error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_sign_transaction_fails_when_fields_cannot_be_filled() {
    let config = SignerConfig::default().with_rpc_override(1, UNREACHABLE_RPC);
    let signer = AccountSigner::with_config(Some(MNEMONIC), &config).unwrap();

    // Nonce and gas must be fetched from the node
    let request = TransactionRequest::new(RECIPIENT, "1");
    assert!(matches!(signer.sign_transaction(&request).await, Err(Error::Signing(_))));
}
