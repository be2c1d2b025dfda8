//! Shared fakes for controller integration tests.
//!
//! `FakeLottery` is an in-memory contract that counts every call and can be
//! told to fail or to hold a response until released. `FakeWallet` hands out
//! accounts and lets tests fire account-change notifications.

#![allow(dead_code)]

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, oneshot};

use lottery_console::blockchain::types::{BlockchainError, BlockchainResult};
use lottery_console::controller::{ControllerSettings, SessionController};
use lottery_console::lottery::service::{LotteryService, WalletProvider};
use lottery_console::lottery::types::{Item, TxReceipt};

pub const CONTRACT: Address = Address::repeat_byte(0xC0);
pub const OWNER: Address = Address::repeat_byte(0x01);
pub const BIDDER: Address = Address::repeat_byte(0x02);

pub const READS: [&str; 4] = ["get_items", "get_owners", "get_balance", "get_winners_declared"];

/// Remote state held by the fake contract.
#[derive(Debug, Clone)]
pub struct FakeState {
    pub items: Vec<Item>,
    pub owners: Vec<Address>,
    pub balance: U256,
    pub winners_declared: bool,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            items: (0..3).map(|id| Item::from_contract(id, vec![], Address::ZERO)).collect(),
            owners: vec![OWNER],
            balance: U256::ZERO,
            winners_declared: false,
        }
    }
}

/// In-memory lottery contract.
#[derive(Default)]
pub struct FakeLottery {
    state: Mutex<FakeState>,
    calls: Mutex<HashMap<&'static str, usize>>,
    failing: Mutex<HashSet<&'static str>>,
    gates: Mutex<HashMap<&'static str, VecDeque<oneshot::Receiver<()>>>>,
    last_transfer: Mutex<Option<Address>>,
}

impl FakeLottery {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_state(state: FakeState) -> Arc<Self> {
        let fake = Self::default();
        *fake.state.lock().unwrap() = state;
        Arc::new(fake)
    }

    /// Mutate the remote state.
    pub fn update(&self, f: impl FnOnce(&mut FakeState)) {
        f(&mut self.state.lock().unwrap());
    }

    /// Make every call named `call` fail until cleared.
    pub fn fail(&self, call: &'static str) {
        self.failing.lock().unwrap().insert(call);
    }

    pub fn clear_failures(&self) {
        self.failing.lock().unwrap().clear();
    }

    /// Hold the next `call` after it has read the state, until the sender fires.
    pub fn hold_next(&self, call: &'static str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().entry(call).or_default().push_back(rx);
        tx
    }

    pub fn calls(&self, call: &str) -> usize {
        self.calls.lock().unwrap().get(call).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    pub fn read_calls(&self) -> [usize; 4] {
        READS.map(|call| self.calls(call))
    }

    pub fn last_transfer(&self) -> Option<Address> {
        *self.last_transfer.lock().unwrap()
    }

    fn enter(&self, call: &'static str) -> BlockchainResult<Option<oneshot::Receiver<()>>> {
        *self.calls.lock().unwrap().entry(call).or_default() += 1;
        if self.failing.lock().unwrap().contains(call) {
            return Err(BlockchainError::Rpc(format!("{} unavailable", call)));
        }
        Ok(self
            .gates
            .lock()
            .unwrap()
            .get_mut(call)
            .and_then(|queue| queue.pop_front()))
    }

    async fn respond<T>(&self, call: &'static str, read: impl FnOnce(&FakeState) -> T) -> BlockchainResult<T> {
        let gate = self.enter(call)?;
        let value = read(&self.state.lock().unwrap());
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        Ok(value)
    }

    fn write(&self, call: &'static str, apply: impl FnOnce(&mut FakeState)) -> BlockchainResult<TxReceipt> {
        self.enter(call)?;
        apply(&mut self.state.lock().unwrap());
        let n = self.total_calls() as u8;
        Ok(TxReceipt {
            tx_hash: B256::repeat_byte(n),
            block_number: Some(n as u64),
            gas_used: 21_000,
        })
    }
}

#[async_trait]
impl LotteryService for FakeLottery {
    fn contract_address(&self) -> Address {
        CONTRACT
    }

    async fn get_items(&self) -> BlockchainResult<Vec<Item>> {
        self.respond("get_items", |s| s.items.clone()).await
    }

    async fn get_owners(&self) -> BlockchainResult<Vec<Address>> {
        self.respond("get_owners", |s| s.owners.clone()).await
    }

    async fn get_winners_declared(&self) -> BlockchainResult<bool> {
        self.respond("get_winners_declared", |s| s.winners_declared).await
    }

    async fn get_balance(&self, contract: Address) -> BlockchainResult<U256> {
        assert_eq!(contract, CONTRACT, "balance must be read for the lottery contract");
        self.respond("get_balance", |s| s.balance).await
    }

    async fn bid(
        &self,
        from: Address,
        item_id: u64,
        value: U256,
        gas_limit: u64,
    ) -> BlockchainResult<TxReceipt> {
        assert_eq!(gas_limit, 1_000_000);
        self.write("bid", |s| {
            if let Some(item) = s.items.iter_mut().find(|i| i.id == item_id) {
                item.bidders.push(from);
            }
            s.balance += value;
        })
    }

    async fn declare_winners(&self, _from: Address) -> BlockchainResult<TxReceipt> {
        self.write("declare_winners", |s| {
            s.winners_declared = true;
            for item in &mut s.items {
                item.winner = item.bidders.first().copied();
            }
        })
    }

    async fn withdraw(&self, _from: Address) -> BlockchainResult<TxReceipt> {
        self.write("withdraw", |s| s.balance = U256::ZERO)
    }

    async fn reset(&self, _from: Address) -> BlockchainResult<TxReceipt> {
        self.write("reset", |s| {
            s.winners_declared = false;
            for item in &mut s.items {
                item.bidders.clear();
                item.winner = None;
            }
        })
    }

    async fn transfer_ownership(
        &self,
        _from: Address,
        new_owner: Address,
    ) -> BlockchainResult<TxReceipt> {
        *self.last_transfer.lock().unwrap() = Some(new_owner);
        self.write("transfer_ownership", |s| s.owners = vec![new_owner])
    }

    async fn self_destruct(&self, _from: Address) -> BlockchainResult<TxReceipt> {
        self.write("self_destruct", |_| {})
    }
}

/// Scriptable wallet provider.
pub struct FakeWallet {
    accounts: Mutex<Vec<Address>>,
    deny: Mutex<Option<String>>,
    deny_once: Mutex<bool>,
    changes: broadcast::Sender<Vec<Address>>,
    requests: Mutex<usize>,
}

impl FakeWallet {
    pub fn new(accounts: Vec<Address>) -> Arc<Self> {
        let (changes, _) = broadcast::channel(8);
        Arc::new(Self {
            accounts: Mutex::new(accounts),
            deny: Mutex::new(None),
            deny_once: Mutex::new(false),
            changes,
            requests: Mutex::new(0),
        })
    }

    pub fn denying(reason: &str) -> Arc<Self> {
        let wallet = Self::new(vec![BIDDER]);
        *wallet.deny.lock().unwrap() = Some(reason.to_string());
        wallet
    }

    /// Refuse the first request only; later requests are granted.
    pub fn denying_once(reason: &str) -> Arc<Self> {
        let wallet = Self::denying(reason);
        *wallet.deny_once.lock().unwrap() = true;
        wallet
    }

    /// Switch the active account and notify subscribers.
    pub fn switch_to(&self, account: Address) {
        let mut accounts = self.accounts.lock().unwrap();
        accounts.retain(|a| *a != account);
        accounts.insert(0, account);
        let _ = self.changes.send(accounts.clone());
    }

    /// Send a raw account list, as a provider would on lock or disconnect.
    pub fn announce(&self, accounts: Vec<Address>) {
        let _ = self.changes.send(accounts);
    }

    pub fn requests(&self) -> usize {
        *self.requests.lock().unwrap()
    }

    pub fn listeners(&self) -> usize {
        self.changes.receiver_count()
    }
}

#[async_trait]
impl WalletProvider for FakeWallet {
    async fn request_accounts(&self) -> BlockchainResult<Vec<Address>> {
        *self.requests.lock().unwrap() += 1;
        let denied = {
            let mut deny = self.deny.lock().unwrap();
            if *self.deny_once.lock().unwrap() {
                deny.take()
            } else {
                deny.clone()
            }
        };
        if let Some(reason) = denied {
            return Err(BlockchainError::Wallet(reason));
        }
        Ok(self.accounts.lock().unwrap().clone())
    }

    fn account_changes(&self) -> broadcast::Receiver<Vec<Address>> {
        self.changes.subscribe()
    }
}

/// Controller over the fakes with reference settings.
pub fn controller(
    wallet: Option<Arc<FakeWallet>>,
    lottery: Arc<FakeLottery>,
) -> Arc<SessionController> {
    let wallet = wallet.map(|w| w as Arc<dyn WalletProvider>);
    Arc::new(SessionController::new(
        wallet,
        lottery as Arc<dyn LotteryService>,
        ControllerSettings::default(),
    ))
}

/// Yield until `condition` holds, failing the test after a second.
pub async fn wait_for(mut condition: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(1);
    while !condition() {
        assert!(tokio::time::Instant::now() < deadline, "condition not reached in time");
        tokio::task::yield_now().await;
    }
}
