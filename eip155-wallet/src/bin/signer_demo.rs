//! Account signer demo
//!
//! Reads `EIP155_MNEMONIC` (a new phrase is generated when unset) and the
//! `EIP155_*` signer settings, prints the account address and a signed
//! message, and binds to `EIP155_PROVIDER_URL` when it is set.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use eip155_wallet::{AccountSigner, JsonRpcNetwork, ProviderConfig, SignerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = SignerConfig::from_env();
    let mnemonic = std::env::var("EIP155_MNEMONIC").ok();
    let generated = mnemonic.is_none();

    let mut signer = AccountSigner::with_config(mnemonic.as_deref(), &config)
        .context("failed to create account signer")?;

    if generated {
        println!("mnemonic: {}", signer.get_mnemonic());
    }
    println!("address:  {}", signer.get_address());
    println!("chain:    {} ({})", signer.chain().name, signer.chain_id());

    let signature = signer.sign_message("hello").await?;
    println!("signature of \"hello\": {}", signature);

    if let Ok(url) = std::env::var("EIP155_PROVIDER_URL") {
        let mut config = ProviderConfig::http(url);
        if let Ok(api_key) = std::env::var("EIP155_PROVIDER_API_KEY") {
            config = config.with_api_key(api_key);
        }
        let network = JsonRpcNetwork::connect(&config)
            .await
            .context("failed to reach provider")?;
        signer.connect(Arc::new(network))?;
        println!("bound to: {} ({})", signer.chain().name, signer.chain_id());
    }

    Ok(())
}
