//! EIP-155 account signer
//!
//! [`AccountSigner`] wraps one HD account derived from a mnemonic, binds it
//! to a supported chain and forwards signing requests to an ethers wallet
//! client built from {account, chain, HTTP transport}. The client is built
//! once and rebuilt only when the chain or the bound network changes.

use std::fmt;
use std::sync::Arc;

use ethers::middleware::SignerMiddleware;
use ethers_core::types::transaction::{eip2718::TypedTransaction, eip712::EIP712Domain};
use ethers_core::types::Address;
use ethers_core::utils::to_checksum;
use ethers_providers::{Http, Middleware, Provider};
use ethers_signers::{coins_bip39::English, LocalWallet, MnemonicBuilder, Signer};
use serde_json::Value;
use tracing::{debug, info};

use crate::chain::{self, ChainDescriptor};
use crate::config::SignerConfig;
use crate::crypto::mnemonic::{generate_mnemonic, normalize_phrase, validate_mnemonic};
use crate::error::{Error, Result};
use crate::transaction::provider::{build_http_provider, NetworkProvider, ProviderConfig};
use crate::transaction::types::TransactionRequest;
use super::typed_data::build_typed_data;

/// Wallet client the signer delegates to
pub(crate) type WalletClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Whether a network provider has been attached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignerState {
    /// Constructed with the configured chain, no provider
    Unbound,
    /// Chain taken from an attached provider
    Bound,
}

/// Signs messages and transactions with an HD account on a supported chain
pub struct AccountSigner {
    mnemonic: String,
    account: LocalWallet,
    chain: &'static ChainDescriptor,
    network: Option<Arc<dyn NetworkProvider>>,
    client: WalletClient,
    config: SignerConfig,
}

impl AccountSigner {
    /// Create a signer from an existing mnemonic, or a freshly generated one
    pub fn init(mnemonic: Option<&str>) -> Result<Self> {
        Self::with_config(mnemonic, &SignerConfig::default())
    }

    /// Create a signer using an explicit configuration
    pub fn with_config(mnemonic: Option<&str>, config: &SignerConfig) -> Result<Self> {
        config.validate()?;

        let mnemonic = match mnemonic {
            Some(phrase) => {
                validate_mnemonic(phrase)?;
                phrase.to_string()
            }
            None => generate_mnemonic(config.strength)?,
        };

        let account = derive_account(&mnemonic, config)?;
        let chain = chain::lookup(config.default_chain_id)?;
        let client = build_client(&account, chain, configured_transport(config, chain)?);

        debug!(address = %to_checksum(&account.address(), None), chain_id = chain.id, "account signer created");

        Ok(Self {
            mnemonic,
            account,
            chain,
            network: None,
            client,
            config: config.clone(),
        })
    }

    /// The mnemonic this signer was created from
    pub fn get_mnemonic(&self) -> &str {
        &self.mnemonic
    }

    /// Always fails: private keys of HD accounts are never materialized or exported
    pub fn get_private_key(&self) -> Result<String> {
        Err(Error::UnsupportedOperation(
            "get_private_key: HD-derived accounts do not export private keys".to_string(),
        ))
    }

    /// EIP-55 checksummed address of the account
    pub fn get_address(&self) -> String {
        to_checksum(&self.account.address(), None)
    }

    /// Address of the account
    pub fn address(&self) -> Address {
        self.account.address()
    }

    /// The selected chain
    pub fn chain(&self) -> &'static ChainDescriptor {
        self.chain
    }

    /// Id of the selected chain
    pub fn chain_id(&self) -> u64 {
        self.chain.id
    }

    /// Whether a network provider is attached
    pub fn state(&self) -> SignerState {
        match self.network {
            Some(_) => SignerState::Bound,
            None => SignerState::Unbound,
        }
    }

    /// The attached network provider, if any
    pub fn network(&self) -> Option<&Arc<dyn NetworkProvider>> {
        self.network.as_ref()
    }

    /// The wallet client requests are forwarded to. It holds the signing
    /// key, so it stays inside the crate.
    pub(crate) fn client(&self) -> &WalletClient {
        &self.client
    }

    /// Sign a message with the EIP-191 personal-message prefix.
    ///
    /// Returns the 65-byte signature as `0x`-prefixed hex.
    pub async fn sign_message<S>(&self, message: S) -> Result<String>
    where
        S: AsRef<[u8]> + Send + Sync,
    {
        let signature = self
            .client
            .signer()
            .sign_message(message)
            .await
            .map_err(|e| Error::Signing(format!("sign_message: {}", e)))?;

        Ok(format!("0x{}", signature))
    }

    /// Sign EIP-712 typed data.
    ///
    /// `types` is the JSON type schema in declaration order and `data` the
    /// message object. Pass `primary_type` explicitly; when it is absent the
    /// first declared type other than `EIP712Domain` is used.
    pub async fn sign_typed_data(
        &self,
        domain: EIP712Domain,
        types: &Value,
        data: &Value,
        primary_type: Option<&str>,
    ) -> Result<String> {
        let typed_data = build_typed_data(domain, types, data, primary_type)?;

        let signature = self
            .client
            .signer()
            .sign_typed_data(&typed_data)
            .await
            .map_err(|e| Error::Signing(format!("sign_typed_data ({}): {}", typed_data.primary_type, e)))?;

        Ok(format!("0x{}", signature))
    }

    /// Select a supported chain and rebuild the wallet client for it.
    ///
    /// An unsupported id fails with [`Error::UnsupportedChain`] and leaves the
    /// signer unchanged.
    pub fn set_chain(&mut self, chain_id: u64) -> Result<()> {
        let chain = chain::lookup(chain_id)?;

        // Keep using the bound network's transport while it serves this chain
        let transport = match &self.network {
            Some(network) if network.chain_id() == chain.id => network.transport()?,
            _ => configured_transport(&self.config, chain)?,
        };
        let client = build_client(&self.account, chain, transport);

        info!(from = self.chain.id, to = chain.id, "switching chain");

        self.chain = chain;
        self.client = client;
        Ok(())
    }

    /// Bind to a network provider.
    ///
    /// Reads the provider's chain id, selects that chain, keeps the provider
    /// for fee queries and rebuilds the client against its endpoint. An
    /// unsupported chain id fails with [`Error::UnsupportedChain`] and leaves
    /// the signer unchanged.
    pub fn connect(&mut self, network: Arc<dyn NetworkProvider>) -> Result<&mut Self> {
        let chain_id = network.chain_id();
        let chain = chain::lookup(chain_id)?;
        let client = build_client(&self.account, chain, network.transport()?);

        info!(chain_id, url = %network.url(), "connecting account signer");

        self.chain = chain;
        self.client = client;
        self.network = Some(network);
        Ok(self)
    }

    /// Prepare and sign a transaction without broadcasting it.
    ///
    /// Missing nonce, gas and fee fields are filled by the wallet client,
    /// which queries the chain's RPC endpoint only for those fields. Returns
    /// the RLP-encoded signed transaction as `0x`-prefixed hex.
    pub async fn sign_transaction(&self, request: &TransactionRequest) -> Result<String> {
        let mut tx = request
            .to_typed_transaction(self.chain)
            .map_err(|e| Error::Signing(format!("sign_transaction: {}", e)))?;
        tx.set_from(self.account.address());

        self.client
            .fill_transaction(&mut tx, None)
            .await
            .map_err(|e| Error::Signing(format!("sign_transaction: failed to prepare transaction: {}", e)))?;

        let signature = self
            .client
            .signer()
            .sign_transaction(&tx)
            .await
            .map_err(|e| Error::Signing(format!("sign_transaction: {}", e)))?;

        let raw = tx.rlp_signed(&signature);
        Ok(format!("0x{}", hex::encode(raw)))
    }

    /// Enrich a transaction with current fee data and broadcast it.
    ///
    /// Requires a bound network provider serving the selected chain. Returns
    /// the transaction hash once the node accepts the submission; does not
    /// wait for confirmation.
    pub async fn send_transaction(&self, request: &TransactionRequest) -> Result<String> {
        let tx = self.prepare_broadcast(request).await?;

        let pending = self
            .client
            .send_transaction(tx, None)
            .await
            .map_err(|e| Error::Broadcast(format!("send_transaction on chain {}: {}", self.chain.id, e)))?;

        let tx_hash = format!("{:?}", pending.tx_hash());
        info!(tx_hash = %tx_hash, chain_id = self.chain.id, "transaction submitted");
        Ok(tx_hash)
    }

    /// Check the binding, convert the request and apply the network's fee data
    async fn prepare_broadcast(&self, request: &TransactionRequest) -> Result<TypedTransaction> {
        let network = self.network.as_ref().ok_or_else(|| {
            Error::NotConnected("send_transaction: no network provider, call connect first".to_string())
        })?;
        if network.chain_id() != self.chain.id {
            return Err(Error::NotConnected(format!(
                "send_transaction: bound network serves chain {} but chain {} is selected",
                network.chain_id(),
                self.chain.id
            )));
        }

        let mut tx = request
            .to_typed_transaction(self.chain)
            .map_err(|e| Error::Signing(format!("send_transaction: {}", e)))?;
        tx.set_from(self.account.address());

        let fee_data = network
            .fee_data()
            .await
            .map_err(|e| Error::Broadcast(format!("send_transaction: failed to read fee data: {}", e)))?;
        debug!(?fee_data, "applying network fee data");
        fee_data.apply_to(&mut tx);
        Ok(tx)
    }
}

// do not log the mnemonic
impl fmt::Debug for AccountSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountSigner")
            .field("address", &self.get_address())
            .field("chain_id", &self.chain.id)
            .field("state", &self.state())
            .finish()
    }
}

/// Derive the HD account for a phrase at the configured path
fn derive_account(phrase: &str, config: &SignerConfig) -> Result<LocalWallet> {
    let path = config.derivation_path();
    let phrase = normalize_phrase(phrase);

    let mut builder = MnemonicBuilder::<English>::default()
        .phrase(phrase.as_str())
        .derivation_path(&path)
        .map_err(|e| Error::KeyDerivation(format!("Invalid derivation path {}: {}", path, e)))?;
    if let Some(password) = &config.password {
        builder = builder.password(password);
    }

    builder
        .build()
        .map_err(|e| Error::KeyDerivation(e.to_string()))
}

/// Transport for a chain when no bound network serves it
fn configured_transport(config: &SignerConfig, chain: &ChainDescriptor) -> Result<Provider<Http>> {
    build_http_provider(&ProviderConfig::http(config.rpc_url_for(chain)?))
}

/// Build the wallet client for an account on a chain
fn build_client(account: &LocalWallet, chain: &ChainDescriptor, transport: Provider<Http>) -> WalletClient {
    let account = account.clone().with_chain_id(chain.id);

    debug!(chain_id = chain.id, "building wallet client");
    SignerMiddleware::new(transport, account)
}
