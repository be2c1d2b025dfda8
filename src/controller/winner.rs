//! "Did I win?" evaluation over the current item projection.

use alloy::primitives::Address;
use serde::Serialize;

use crate::lottery::types::{Item, ItemCatalog};

/// Outcome for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ItemOutcome {
    pub item_id: u64,
    pub won: bool,
}

/// Per-item outcomes for the active address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WinnerReport {
    pub outcomes: Vec<ItemOutcome>,
}

impl WinnerReport {
    /// Ids of the items won, in projection order.
    pub fn won_items(&self) -> impl Iterator<Item = u64> + '_ {
        self.outcomes.iter().filter(|o| o.won).map(|o| o.item_id)
    }

    pub fn any_won(&self) -> bool {
        self.outcomes.iter().any(|o| o.won)
    }

    /// User-facing lines: one per item won, or a single consolation line.
    ///
    /// Names follow the item's position in the projection, as the list view does.
    pub fn messages(&self, catalog: &ItemCatalog) -> Vec<String> {
        let lines: Vec<String> = self
            .outcomes
            .iter()
            .enumerate()
            .filter(|(_, outcome)| outcome.won)
            .map(|(position, _)| {
                format!("congratulations, you have won a brand new {}", catalog.name(position))
            })
            .collect();

        if lines.is_empty() {
            vec!["unfortunately you didnt win anything this time...".to_string()]
        } else {
            lines
        }
    }
}

/// Compare each item's winner to `active`.
///
/// Both sides are typed addresses, so the comparison is independent of how
/// either was cased on the way in. No active address means nothing was won.
pub fn check_winners(items: &[Item], active: Option<Address>) -> WinnerReport {
    let outcomes = items
        .iter()
        .map(|item| ItemOutcome {
            item_id: item.id,
            won: active.is_some() && item.winner == active,
        })
        .collect();

    WinnerReport { outcomes }
}
