//! User-initiated writes and action gating.
//!
//! # Responsibilities
//! - Forward write intents to the contract from the active address
//! - Re-fetch exactly the projections each write affects
//! - Decide which actions the current projections expose
//!
//! Ownership is enforced by the contract; nothing here blocks an owner-only
//! call from a non-owner except the UI gating in [`AvailableActions`].

use alloy::primitives::Address;
use serde::Serialize;
use std::future::Future;
use thiserror::Error;

use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::controller::projections::ProjectionKind;
use crate::controller::session::SessionError;
use crate::controller::SessionController;
use crate::lottery::address::{is_valid_address, normalize_address};
use crate::lottery::types::TxReceipt;
use crate::observability::metrics;

/// Failure of a user action.
#[derive(Debug, Error)]
pub enum ActionError {
    /// The session cannot submit anything.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Transfer target failed local validation. No call was made.
    #[error("this is not a valid address")]
    InvalidAddress(String),

    /// The contract call failed or reverted.
    #[error("{action} failed: {source}")]
    Write {
        action: &'static str,
        #[source]
        source: BlockchainError,
    },
}

/// Which actions the UI should expose for the active address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AvailableActions {
    /// Bidding is open: not an owner and winners not yet declared.
    pub bid: bool,
    /// Winners are declared and the active address is not an owner.
    pub check_winner: bool,
    /// Declare winners, withdraw, reset, transfer ownership, destroy.
    pub owner_actions: bool,
}

impl SessionController {
    /// Place a paid bid on `item_id`, then re-fetch items and balance.
    pub async fn submit_bid(&self, item_id: u64) -> Result<TxReceipt, ActionError> {
        let from = self.active_for_write()?;
        let settings = self.settings();
        let receipt = self
            .write(
                "bid",
                self.service
                    .bid(from, item_id, settings.bid_value, settings.bid_gas_limit),
            )
            .await?;

        tracing::info!(item_id = item_id, tx = %receipt.tx_hash, "Bid placed");
        self.refresh(&[ProjectionKind::Items, ProjectionKind::Balance]).await;
        Ok(receipt)
    }

    /// Declare winners, then re-fetch items and the winners flag.
    pub async fn submit_declare_winners(&self) -> Result<TxReceipt, ActionError> {
        let from = self.active_for_write()?;
        let receipt = self
            .write("declare winners", self.service.declare_winners(from))
            .await?;

        self.refresh(&[ProjectionKind::Items, ProjectionKind::WinnersDeclared])
            .await;
        Ok(receipt)
    }

    /// Withdraw the contract balance, then re-fetch the balance.
    pub async fn submit_withdraw(&self) -> Result<TxReceipt, ActionError> {
        let from = self.active_for_write()?;
        let receipt = self.write("withdraw", self.service.withdraw(from)).await?;

        self.refresh(&[ProjectionKind::Balance]).await;
        Ok(receipt)
    }

    /// Reset the lottery, then re-fetch items and the winners flag.
    pub async fn submit_reset(&self) -> Result<TxReceipt, ActionError> {
        let from = self.active_for_write()?;
        let receipt = self.write("reset", self.service.reset(from)).await?;

        self.refresh(&[ProjectionKind::Items, ProjectionKind::WinnersDeclared])
            .await;
        Ok(receipt)
    }

    /// Transfer ownership to `new_owner`, then re-fetch owners.
    ///
    /// `new_owner` is validated locally first; malformed input is rejected
    /// without touching the network.
    pub async fn submit_transfer_ownership(&self, new_owner: &str) -> Result<TxReceipt, ActionError> {
        let target = match normalize_address(new_owner) {
            Some(address) if is_valid_address(new_owner.trim()) => address,
            _ => {
                tracing::info!(input = %new_owner, "Rejected transfer target");
                return Err(ActionError::InvalidAddress(new_owner.to_string()));
            }
        };

        let from = self.active_for_write()?;
        let receipt = self
            .write(
                "transfer ownership",
                self.service.transfer_ownership(from, target),
            )
            .await?;

        tracing::info!(new_owner = %target, "Ownership transferred");
        self.refresh(&[ProjectionKind::Owners]).await;
        Ok(receipt)
    }

    /// Destroy the contract. Nothing is re-fetched.
    pub async fn submit_destroy(&self) -> Result<TxReceipt, ActionError> {
        let from = self.active_for_write()?;
        self.write("self destruct", self.service.self_destruct(from))
            .await
    }

    /// Actions exposed for the active address under the current projections.
    pub fn available_actions(&self) -> AvailableActions {
        let Ok(active) = self.session().require_active() else {
            return AvailableActions::default();
        };
        available_actions_for(active, &self.snapshot())
    }

    fn active_for_write(&self) -> Result<Address, SessionError> {
        if self.is_torn_down() {
            return Err(SessionError::Closed);
        }
        self.session().require_active()
    }

    async fn write(
        &self,
        action: &'static str,
        call: impl Future<Output = BlockchainResult<TxReceipt>>,
    ) -> Result<TxReceipt, ActionError> {
        match call.await {
            Ok(receipt) => {
                metrics::record_write(action, true);
                tracing::info!(
                    action = action,
                    tx = %receipt.tx_hash,
                    block = ?receipt.block_number,
                    gas_used = receipt.gas_used,
                    "Transaction mined"
                );
                Ok(receipt)
            }
            Err(e) => {
                metrics::record_write(action, false);
                tracing::warn!(
                    action = action,
                    error = %e,
                    transient = e.is_transient(),
                    "Transaction failed"
                );
                Err(ActionError::Write { action, source: e })
            }
        }
    }
}

/// Gating rules, separated from the controller for direct testing.
pub fn available_actions_for(
    active: Address,
    snapshot: &crate::controller::projections::Snapshot,
) -> AvailableActions {
    let is_owner = snapshot.owners.contains(&active);
    let declared = snapshot.status.winners_declared;

    AvailableActions {
        bid: !is_owner && !declared,
        check_winner: !is_owner && declared,
        owner_actions: is_owner,
    }
}
