//! Read projections of the remote lottery state.
//!
//! Everything here is a copy of what the contract reported on the last
//! successful read. Nothing is computed locally that the contract could
//! disagree with.

use alloy::primitives::utils::format_units;
use alloy::primitives::{Address, TxHash, U256};
use serde::{Deserialize, Serialize};

/// One item up for bid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Contract-assigned item id.
    pub id: u64,
    /// Bidders in the order the contract recorded them (one entry per bid).
    pub bidders: Vec<Address>,
    /// Winner, once declared. The contract reports the zero address before that.
    pub winner: Option<Address>,
}

impl Item {
    /// Build an item from raw contract fields, mapping the zero winner to `None`.
    pub fn from_contract(id: u64, bidders: Vec<Address>, winner: Address) -> Self {
        Self {
            id,
            bidders,
            winner: (winner != Address::ZERO).then_some(winner),
        }
    }

    /// Total number of bids placed on this item.
    pub fn bid_count(&self) -> usize {
        self.bidders.len()
    }
}

/// Addresses allowed to administer the contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerSet(Vec<Address>);

impl OwnerSet {
    pub fn contains(&self, address: &Address) -> bool {
        self.0.contains(address)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.0.iter()
    }
}

impl From<Vec<Address>> for OwnerSet {
    fn from(owners: Vec<Address>) -> Self {
        Self(owners)
    }
}

/// Lottery-wide status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotteryStatus {
    pub winners_declared: bool,
    /// Contract balance in wei.
    pub contract_balance: U256,
}

impl LotteryStatus {
    /// Balance rendered in ether.
    pub fn balance_ether(&self) -> String {
        format_ether(self.contract_balance)
    }
}

/// Render a wei amount in ether.
pub fn format_ether(wei: U256) -> String {
    format_units(wei, "ether").unwrap_or_else(|_| wei.to_string())
}

/// Summary of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

/// Display names for items, indexed by position in the contract's item list.
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    names: Vec<String>,
}

impl ItemCatalog {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Display name for the item at `position`, falling back to the position.
    ///
    /// Lookup is by position, not by item id; the two only coincide while the
    /// contract numbers its items 0..n.
    pub fn name(&self, position: usize) -> String {
        self.names
            .get(position)
            .cloned()
            .unwrap_or_else(|| format!("item #{}", position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[test]
    fn test_zero_winner_maps_to_none() {
        let item = Item::from_contract(0, vec![], Address::ZERO);
        assert_eq!(item.winner, None);

        let winner = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
        let item = Item::from_contract(1, vec![winner, winner], winner);
        assert_eq!(item.winner, Some(winner));
        assert_eq!(item.bid_count(), 2);
    }

    #[test]
    fn test_balance_in_ether() {
        let status = LotteryStatus {
            winners_declared: false,
            contract_balance: U256::from(30_000_000_000_000_000u64),
        };
        assert_eq!(status.balance_ether(), "0.030000000000000000");
    }

    #[test]
    fn test_catalog_fallback() {
        let catalog = ItemCatalog::new(vec!["car".into(), "laptop".into()]);
        assert_eq!(catalog.name(1), "laptop");
        assert_eq!(catalog.name(7), "item #7");
    }

    #[test]
    fn test_owner_set_membership() {
        let owner = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");
        let owners = OwnerSet::from(vec![owner]);
        assert!(owners.contains(&owner));
        assert!(!owners.contains(&Address::ZERO));
        assert_eq!(owners.iter().count(), 1);
    }
}
