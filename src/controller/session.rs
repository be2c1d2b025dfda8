//! Wallet session state.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The one logical session against the wallet provider.
///
/// `active_address` changes only on a successful connect or an account-change
/// notification. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub active_address: Option<Address>,
    pub provider_available: bool,
    pub access_granted: bool,
    /// Why access was refused, when it was.
    pub access_error: Option<String>,
}

impl Session {
    pub(crate) fn new(provider_available: bool) -> Self {
        Self {
            active_address: None,
            provider_available,
            access_granted: false,
            access_error: None,
        }
    }

    /// Active address if the session is usable, otherwise why it is not.
    pub fn require_active(&self) -> Result<Address, SessionError> {
        if !self.provider_available {
            return Err(SessionError::ProviderUnavailable);
        }
        if let Some(reason) = &self.access_error {
            return Err(SessionError::AccessDenied(reason.clone()));
        }
        match (self.access_granted, self.active_address) {
            (true, Some(address)) => Ok(address),
            _ => Err(SessionError::NotConnected),
        }
    }

    /// Terminal states that only a restart clears.
    pub fn is_blocked(&self) -> bool {
        !self.provider_available || self.access_error.is_some()
    }
}

/// Session-level failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    /// No wallet provider present; blocks until restart.
    #[error("no wallet provider available")]
    ProviderUnavailable,

    /// The provider refused or failed to grant account access; blocks until restart.
    #[error("wallet access denied: {0}")]
    AccessDenied(String),

    /// `connect()` has not completed yet.
    #[error("wallet not connected")]
    NotConnected,

    /// The controller was torn down.
    #[error("session closed")]
    Closed,
}
