//! Render-ready view of the session and projections.
//!
//! The rendering layer is whatever subscribes to controller events; this type
//! gives it one serializable value to draw from.

use alloy::primitives::Address;
use serde::Serialize;
use std::fmt;

use crate::controller::actions::{available_actions_for, AvailableActions};
use crate::controller::session::{Session, SessionError};
use crate::controller::SessionController;
use crate::lottery::address::checksum;
use crate::lottery::types::{format_ether, ItemCatalog};

/// One item row.
#[derive(Debug, Clone, Serialize)]
pub struct ItemRow {
    pub id: u64,
    pub name: String,
    pub bids: usize,
    pub winner: Option<Address>,
}

/// Everything a front-end needs to draw one frame.
#[derive(Debug, Clone, Serialize)]
pub struct LotteryView {
    /// Set when the session is blocked; nothing else is meaningful then.
    pub blocked: Option<String>,
    pub active_address: Option<Address>,
    pub items: Vec<ItemRow>,
    pub owners: Vec<Address>,
    pub winners_declared: bool,
    pub contract_balance_ether: String,
    pub actions: AvailableActions,
}

impl LotteryView {
    pub fn build(session: &Session, controller: &SessionController, catalog: &ItemCatalog) -> Self {
        let snapshot = controller.snapshot();

        let blocked = match session.require_active() {
            Err(e @ SessionError::ProviderUnavailable) | Err(e @ SessionError::AccessDenied(_)) => {
                Some(e.to_string())
            }
            _ => None,
        };

        let actions = session
            .require_active()
            .map(|active| available_actions_for(active, &snapshot))
            .unwrap_or_default();

        Self {
            blocked,
            active_address: session.active_address,
            items: snapshot
                .items
                .iter()
                .enumerate()
                .map(|(position, item)| ItemRow {
                    id: item.id,
                    name: catalog.name(position),
                    bids: item.bid_count(),
                    winner: item.winner,
                })
                .collect(),
            owners: snapshot.owners.iter().copied().collect(),
            winners_declared: snapshot.status.winners_declared,
            contract_balance_ether: format_ether(snapshot.status.contract_balance),
            actions,
        }
    }
}

impl SessionController {
    /// Build a view of the current state.
    pub fn view(&self, catalog: &ItemCatalog) -> LotteryView {
        LotteryView::build(&self.session(), self, catalog)
    }
}

impl fmt::Display for LotteryView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(reason) = &self.blocked {
            return writeln!(f, "blocked: {} (restart to retry)", reason);
        }

        for (idx, item) in self.items.iter().enumerate() {
            write!(f, "{}. a brand new {}  total bids: {}", idx + 1, item.name, item.bids)?;
            if let Some(winner) = item.winner {
                write!(f, "  winner: {}", checksum(&winner))?;
            }
            writeln!(f)?;
        }

        match self.active_address {
            Some(active) => writeln!(f, "current address: {}", checksum(&active))?,
            None => writeln!(f, "current address: -")?,
        }
        writeln!(f, "contract balance: {}", self.contract_balance_ether)?;
        writeln!(f, "winners declared: {}", self.winners_declared)?;

        writeln!(f, "owners addresses:")?;
        for owner in &self.owners {
            writeln!(f, "  {}", checksum(owner))?;
        }

        let mut actions = Vec::new();
        if self.actions.bid {
            actions.push("bid");
        }
        if self.actions.check_winner {
            actions.push("check-winner");
        }
        if self.actions.owner_actions {
            actions.extend(["declare-winners", "withdraw", "reset", "transfer-ownership", "destroy"]);
        }
        writeln!(f, "available actions: {}", actions.join(", "))
    }
}
