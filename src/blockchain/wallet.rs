//! Local-key wallet provider.
//!
//! # Security
//! - Private keys are loaded ONLY from environment variables
//! - Keys are never logged or serialized
//! - Only addresses leave this module; signing happens inside alloy's filler

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::lottery::service::WalletProvider;

/// Default environment variable holding comma-separated private keys.
pub const PRIVATE_KEYS_ENV_VAR: &str = "LOTTERY_PRIVATE_KEYS";

/// Wallet holding one or more local signers, one of which is active.
pub struct Wallet {
    /// Loaded signers in configuration order.
    signers: Arc<Vec<PrivateKeySigner>>,
    /// Index of the active signer.
    active: Arc<AtomicUsize>,
    /// Account-change notifications.
    changes: broadcast::Sender<Vec<Address>>,
    /// Chain ID for EIP-155 replay protection.
    chain_id: u64,
}

impl Wallet {
    /// Create a wallet from hex-encoded private keys.
    ///
    /// # Arguments
    /// * `private_keys_hex` - Hex strings (with or without 0x prefix)
    /// * `chain_id` - Chain ID for transaction signing
    ///
    /// # Security
    /// The private keys are parsed and stored securely. They are never logged.
    pub fn from_private_keys<'a, I>(private_keys_hex: I, chain_id: u64) -> BlockchainResult<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut signers = Vec::new();
        for (idx, raw) in private_keys_hex.into_iter().enumerate() {
            let key_hex = raw.trim();
            let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);
            if key_hex.is_empty() {
                continue;
            }

            let signer: PrivateKeySigner = key_hex.parse().map_err(|e| {
                BlockchainError::Wallet(format!("Invalid private key format at position {}: {}", idx, e))
            })?;
            signers.push(signer.with_chain_id(Some(chain_id)));
        }

        if signers.is_empty() {
            return Err(BlockchainError::Wallet("No private keys supplied".to_string()));
        }

        tracing::info!(
            accounts = signers.len(),
            active = %signers[0].address(),
            chain_id = chain_id,
            "Wallet initialized"
        );

        let (changes, _) = broadcast::channel(16);
        Ok(Self {
            signers: Arc::new(signers),
            active: Arc::new(AtomicUsize::new(0)),
            changes,
            chain_id,
        })
    }

    /// Load wallet from the named environment variable.
    pub fn from_env(var: &str, chain_id: u64) -> BlockchainResult<Self> {
        let keys = std::env::var(var).map_err(|_| {
            BlockchainError::NotAvailable(format!("Environment variable {} not set", var))
        })?;

        Self::from_private_keys(keys.split(','), chain_id)
    }

    /// Get the active account's address.
    pub fn address(&self) -> Address {
        self.signers[self.active.load(Ordering::SeqCst)].address()
    }

    /// All accounts, active first, then the rest in configuration order.
    pub fn accounts(&self) -> Vec<Address> {
        let active = self.active.load(Ordering::SeqCst);
        let mut accounts = Vec::with_capacity(self.signers.len());
        accounts.push(self.signers[active].address());
        accounts.extend(
            self.signers
                .iter()
                .enumerate()
                .filter(|(idx, _)| *idx != active)
                .map(|(_, s)| s.address()),
        );
        accounts
    }

    /// Make the signer at `index` the active account and notify listeners.
    pub fn switch_account(&self, index: usize) -> BlockchainResult<Address> {
        if index >= self.signers.len() {
            return Err(BlockchainError::Wallet(format!(
                "Account index {} out of range ({} loaded)",
                index,
                self.signers.len()
            )));
        }

        self.active.store(index, Ordering::SeqCst);
        let accounts = self.accounts();
        tracing::info!(active = %accounts[0], "Active account switched");
        // No receivers is fine: nobody has connected yet.
        let _ = self.changes.send(accounts.clone());
        Ok(accounts[0])
    }

    /// Get the chain ID this wallet is configured for.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Signing wallet for alloy providers, holding every loaded key.
    ///
    /// Transactions pick their signer from the `from` field, so switching the
    /// active account needs no rebuild.
    pub fn ethereum_wallet(&self) -> EthereumWallet {
        let mut wallet = EthereumWallet::new(self.signers[0].clone());
        for signer in self.signers.iter().skip(1) {
            wallet.register_signer(signer.clone());
        }
        wallet
    }
}

#[async_trait]
impl WalletProvider for Wallet {
    async fn request_accounts(&self) -> BlockchainResult<Vec<Address>> {
        Ok(self.accounts())
    }

    fn account_changes(&self) -> broadcast::Receiver<Vec<Address>> {
        self.changes.subscribe()
    }
}

impl Clone for Wallet {
    fn clone(&self) -> Self {
        Self {
            signers: self.signers.clone(),
            active: self.active.clone(),
            changes: self.changes.clone(),
            chain_id: self.chain_id,
        }
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("active", &self.address())
            .field("accounts", &self.signers.len())
            .field("chain_id", &self.chain_id)
            .finish()
    }
}
