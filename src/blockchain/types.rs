//! Chain-facing error types.

use alloy::primitives::TxHash;
use alloy::providers::PendingTransactionError;
use thiserror::Error;

pub use crate::config::schema::BlockchainConfig;

/// Chain ID reported by a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

/// Failures talking to the node, the contract or the local wallet.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// Transport failure or every provider refused the request.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// A mined receipt did not arrive in time.
    #[error("transaction not mined after {0} seconds")]
    Timeout(u64),

    /// Call rejected by the node or response that could not be decoded.
    #[error("contract error: {0}")]
    Contract(String),

    /// Mined, but the contract reverted it.
    #[error("{action} reverted in transaction {tx}")]
    Reverted { action: &'static str, tx: TxHash },

    /// Bad key material or an account the wallet does not hold.
    #[error("wallet error: {0}")]
    Wallet(String),

    #[error("chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    /// The capability is not configured (no keys, no signer).
    #[error("not available: {0}")]
    NotAvailable(String),
}

impl BlockchainError {
    /// Whether trying again later can succeed without any change on our side.
    pub fn is_transient(&self) -> bool {
        matches!(self, BlockchainError::Rpc(_) | BlockchainError::Timeout(_))
    }
}

impl From<alloy::contract::Error> for BlockchainError {
    fn from(e: alloy::contract::Error) -> Self {
        match e {
            alloy::contract::Error::TransportError(e) => BlockchainError::Rpc(e.to_string()),
            other => BlockchainError::Contract(other.to_string()),
        }
    }
}

impl From<PendingTransactionError> for BlockchainError {
    fn from(e: PendingTransactionError) -> Self {
        BlockchainError::Rpc(format!("failed to get receipt: {}", e))
    }
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;
