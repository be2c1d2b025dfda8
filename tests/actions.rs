//! User actions: writes, targeted refreshes, gating and winner checks.

mod common;

use alloy::primitives::{Address, U256};

use common::{controller, FakeLottery, FakeState, FakeWallet, BIDDER, OWNER};
use lottery_console::controller::{ActionError, AvailableActions, SessionError};
use lottery_console::lottery::address::normalize_address;
use lottery_console::lottery::types::{Item, ItemCatalog};

const NEW_OWNER: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

async fn connected_as(
    account: Address,
    lottery: &std::sync::Arc<FakeLottery>,
) -> std::sync::Arc<lottery_console::SessionController> {
    let controller = controller(Some(FakeWallet::new(vec![account])), lottery.clone());
    controller.connect().await.unwrap();
    controller
}

#[tokio::test]
async fn test_bid_refetches_items_and_balance_only() {
    let lottery = FakeLottery::new();
    let controller = connected_as(BIDDER, &lottery).await;
    assert_eq!(lottery.read_calls(), [1, 1, 1, 1]);

    let receipt = controller.submit_bid(2).await.unwrap();

    assert_eq!(receipt.gas_used, 21_000);
    assert_eq!(lottery.calls("bid"), 1);
    // items, owners, balance, winners_declared
    assert_eq!(lottery.read_calls(), [2, 1, 2, 1]);

    let snapshot = controller.snapshot();
    let item = snapshot.items.iter().find(|i| i.id == 2).unwrap();
    assert_eq!(item.bidders, vec![BIDDER]);
    assert_eq!(snapshot.status.contract_balance, U256::from(10_000_000_000_000_000u64));
    assert_eq!(snapshot.status.balance_ether(), "0.010000000000000000");
}

#[tokio::test]
async fn test_failed_write_is_returned_without_refresh() {
    let lottery = FakeLottery::new();
    let controller = connected_as(BIDDER, &lottery).await;
    lottery.fail("bid");

    let err = controller.submit_bid(0).await.unwrap_err();

    assert!(matches!(err, ActionError::Write { action: "bid", .. }));
    assert_eq!(lottery.calls("bid"), 1);
    assert_eq!(lottery.read_calls(), [1, 1, 1, 1]);
    // The controller keeps working after a failed write
    lottery.clear_failures();
    controller.submit_bid(0).await.unwrap();
    assert_eq!(lottery.calls("bid"), 2);
}

#[tokio::test]
async fn test_transfer_rejects_malformed_targets_offline() {
    let lottery = FakeLottery::new();
    let controller = connected_as(OWNER, &lottery).await;
    let calls = lottery.total_calls();

    for input in [
        "",
        "not an address",
        "0x123",
        "0xZZZeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
        // one letter of a valid checksum flipped
        "0x5AAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
    ] {
        let err = controller.submit_transfer_ownership(input).await.unwrap_err();
        assert!(matches!(err, ActionError::InvalidAddress(_)), "accepted {:?}", input);
        assert_eq!(err.to_string(), "this is not a valid address");
    }

    assert_eq!(lottery.total_calls(), calls);
}

#[tokio::test]
async fn test_transfer_validates_before_checking_the_session() {
    let lottery = FakeLottery::new();
    let controller = controller(None, lottery.clone());

    let err = controller.submit_transfer_ownership("0x123").await.unwrap_err();
    assert!(matches!(err, ActionError::InvalidAddress(_)));

    let err = controller.submit_transfer_ownership(NEW_OWNER).await.unwrap_err();
    assert!(matches!(err, ActionError::Session(SessionError::ProviderUnavailable)));
    assert_eq!(lottery.total_calls(), 0);
}

#[tokio::test]
async fn test_transfer_sends_write_and_refetches_owners() {
    let lottery = FakeLottery::new();
    let controller = connected_as(OWNER, &lottery).await;
    let target = normalize_address(NEW_OWNER).unwrap();

    controller.submit_transfer_ownership(NEW_OWNER).await.unwrap();

    assert_eq!(lottery.last_transfer(), Some(target));
    assert_eq!(lottery.read_calls(), [1, 2, 1, 1]);
    assert!(controller.snapshot().owners.contains(&target));
    // The old owner lost its actions once the owners projection came back
    assert!(!controller.available_actions().owner_actions);
}

#[tokio::test]
async fn test_transfer_accepts_all_lowercase_target() {
    let lottery = FakeLottery::new();
    let controller = connected_as(OWNER, &lottery).await;

    controller
        .submit_transfer_ownership(&NEW_OWNER.to_lowercase())
        .await
        .unwrap();

    assert_eq!(lottery.last_transfer(), normalize_address(NEW_OWNER));
}

#[tokio::test]
async fn test_owner_writes_refetch_their_projections() {
    let lottery = FakeLottery::new();
    let controller = connected_as(OWNER, &lottery).await;

    controller.submit_declare_winners().await.unwrap();
    assert_eq!(lottery.read_calls(), [2, 1, 1, 2]);
    assert!(controller.snapshot().status.winners_declared);

    controller.submit_withdraw().await.unwrap();
    assert_eq!(lottery.read_calls(), [2, 1, 2, 2]);

    controller.submit_reset().await.unwrap();
    assert_eq!(lottery.read_calls(), [3, 1, 2, 3]);
    assert!(!controller.snapshot().status.winners_declared);

    controller.submit_destroy().await.unwrap();
    assert_eq!(lottery.read_calls(), [3, 1, 2, 3]);
    assert_eq!(lottery.calls("self_destruct"), 1);
}

#[tokio::test]
async fn test_writes_after_teardown_are_refused() {
    let lottery = FakeLottery::new();
    let controller = connected_as(BIDDER, &lottery).await;
    controller.teardown();

    let err = controller.submit_bid(1).await.unwrap_err();
    assert!(matches!(err, ActionError::Session(SessionError::Closed)));
    assert_eq!(lottery.calls("bid"), 0);
}

#[tokio::test]
async fn test_owner_gating_follows_owner_set() {
    let lottery = FakeLottery::new();

    let owner = connected_as(OWNER, &lottery).await;
    assert_eq!(
        owner.available_actions(),
        AvailableActions {
            bid: false,
            check_winner: false,
            owner_actions: true,
        }
    );

    let bidder = connected_as(BIDDER, &lottery).await;
    assert_eq!(
        bidder.available_actions(),
        AvailableActions {
            bid: true,
            check_winner: false,
            owner_actions: false,
        }
    );

    lottery.update(|s| s.winners_declared = true);
    bidder.refresh_all().await;
    assert_eq!(
        bidder.available_actions(),
        AvailableActions {
            bid: false,
            check_winner: true,
            owner_actions: false,
        }
    );
}

#[tokio::test]
async fn test_no_actions_before_connect() {
    let controller = controller(Some(FakeWallet::new(vec![OWNER])), FakeLottery::new());
    assert_eq!(controller.available_actions(), AvailableActions::default());
}

#[tokio::test]
async fn test_check_if_winner_is_local_and_case_insensitive() {
    let upper = normalize_address("0x5AAEB6053F3E94C9B9A09F33669435E7EF1BEAED").unwrap();
    let lower = normalize_address("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
    let lottery = FakeLottery::with_state(FakeState {
        items: vec![
            Item::from_contract(0, vec![upper], upper),
            Item::from_contract(1, vec![upper, BIDDER], BIDDER),
        ],
        ..FakeState::default()
    });
    let controller = connected_as(lower, &lottery).await;
    let calls = lottery.total_calls();

    let first = controller.check_if_winner();
    let second = controller.check_if_winner();

    assert_eq!(first, second);
    assert_eq!(first.won_items().collect::<Vec<_>>(), vec![0]);
    assert_eq!(lottery.total_calls(), calls);

    let catalog = ItemCatalog::new(vec!["car".to_string(), "phone".to_string()]);
    assert_eq!(
        first.messages(&catalog),
        vec!["congratulations, you have won a brand new car".to_string()]
    );
}

#[tokio::test]
async fn test_declared_winners_reach_the_bidder() {
    let lottery = FakeLottery::new();
    let bidder = connected_as(BIDDER, &lottery).await;
    bidder.submit_bid(1).await.unwrap();

    let owner = connected_as(OWNER, &lottery).await;
    owner.submit_declare_winners().await.unwrap();

    assert!(!bidder.check_if_winner().any_won());
    bidder.refresh_all().await;

    let report = bidder.check_if_winner();
    assert_eq!(report.won_items().collect::<Vec<_>>(), vec![1]);
    assert!(!owner.check_if_winner().any_won());
}

#[tokio::test]
async fn test_view_names_items_by_list_position() {
    let lottery = FakeLottery::with_state(FakeState {
        items: vec![
            Item::from_contract(5, vec![], Address::ZERO),
            Item::from_contract(9, vec![BIDDER], Address::ZERO),
        ],
        ..FakeState::default()
    });
    let controller = connected_as(BIDDER, &lottery).await;
    let catalog = ItemCatalog::new(vec!["car".to_string(), "phone".to_string()]);

    let view = controller.view(&catalog);

    let rows: Vec<(u64, &str, usize)> = view
        .items
        .iter()
        .map(|row| (row.id, row.name.as_str(), row.bids))
        .collect();
    assert_eq!(rows, vec![(5, "car", 0), (9, "phone", 1)]);
}
