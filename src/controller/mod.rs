//! Session & refresh controller.
//!
//! # Data Flow
//! ```text
//! connect():
//!     WalletProvider.request_accounts → Session.active_address
//!     → refresh_all() → ProjectionStore → ProjectionEvent to observers
//!
//! poller.rs (every poll interval, ticks may overlap):
//!     refresh_all() → four concurrent reads → ticketed apply per projection
//!
//! actions.rs (user intent):
//!     submit_* → LotteryService write → targeted refresh of affected projections
//!
//! account listener (registered once):
//!     WalletProvider.account_changes → Session.active_address only
//! ```
//!
//! # Design Decisions
//! - Collaborators are injected trait objects; no globals
//! - Every external failure is logged and contained; read failures heal on
//!   the next tick, write failures are returned to the caller
//! - Projections are derived only; a write's effect appears after a re-fetch
//! - Teardown aborts the poller and the listener and closes the store so late
//!   responses are discarded

pub mod actions;
pub mod poller;
pub mod projections;
pub mod session;
pub mod view;
pub mod winner;

use alloy::primitives::utils::{parse_ether, UnitsError};
use alloy::primitives::{Address, U256};
use arc_swap::ArcSwap;
use futures_util::future::join_all;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::config::LotteryContractConfig;
use crate::lottery::service::{LotteryService, WalletProvider};
use crate::lottery::types::OwnerSet;
use crate::observability::{metrics, spans};

pub use actions::{ActionError, AvailableActions};
pub use projections::{ProjectionEvent, ProjectionKind, ProjectionStore, ProjectionUpdate, Snapshot};
pub use session::{Session, SessionError};
pub use view::LotteryView;
pub use winner::{ItemOutcome, WinnerReport};

/// Tunables for polling and bidding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSettings {
    /// Interval between full refreshes.
    pub poll_interval: Duration,
    /// Payment attached to every bid, in wei.
    pub bid_value: U256,
    /// Gas allowance for a bid.
    pub bid_gas_limit: u64,
}

impl ControllerSettings {
    pub fn from_config(config: &LotteryContractConfig) -> Result<Self, UnitsError> {
        Ok(Self {
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            bid_value: parse_ether(&config.bid_amount_ether)?,
            bid_gas_limit: config.bid_gas_limit,
        })
    }
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(4000),
            // 0.01 ether
            bid_value: U256::from(10_000_000_000_000_000u64),
            bid_gas_limit: 1_000_000,
        }
    }
}

#[derive(Default)]
struct Tasks {
    poller: Option<JoinHandle<()>>,
    listener: Option<JoinHandle<()>>,
}

/// Owns the wallet session, the projection store and the poll loop.
pub struct SessionController {
    wallet: Option<Arc<dyn WalletProvider>>,
    service: Arc<dyn LotteryService>,
    settings: ControllerSettings,
    session: Arc<ArcSwap<Session>>,
    store: Arc<ProjectionStore>,
    listener_registered: AtomicBool,
    tasks: Mutex<Tasks>,
}

impl SessionController {
    /// Create a controller.
    ///
    /// # Arguments
    /// * `wallet` - Wallet provider, `None` when none is installed
    /// * `service` - Contract query service
    /// * `settings` - Poll interval and bid parameters
    pub fn new(
        wallet: Option<Arc<dyn WalletProvider>>,
        service: Arc<dyn LotteryService>,
        settings: ControllerSettings,
    ) -> Self {
        let session = Session::new(wallet.is_some());
        Self {
            wallet,
            service,
            settings,
            session: Arc::new(ArcSwap::from_pointee(session)),
            store: Arc::new(ProjectionStore::new()),
            listener_registered: AtomicBool::new(false),
            tasks: Mutex::new(Tasks::default()),
        }
    }

    /// Bind to the wallet and load every projection once.
    ///
    /// Without a provider, or when access is refused, the session ends in a
    /// blocked state that only a restart clears. Once blocked, later calls
    /// return the same error without asking the wallet again.
    pub async fn connect(&self) -> Result<Address, SessionError> {
        if self.store.is_closed() {
            return Err(SessionError::Closed);
        }
        if let Some(reason) = self.session().access_error.clone() {
            return Err(SessionError::AccessDenied(reason));
        }

        let Some(wallet) = self.wallet.clone() else {
            self.update_session(|s| s.provider_available = false);
            tracing::warn!("No wallet provider available; configure one and restart");
            return Err(SessionError::ProviderUnavailable);
        };

        self.register_account_listener(wallet.as_ref());

        let active = match wallet.request_accounts().await {
            Ok(accounts) => accounts.first().copied(),
            Err(e) => {
                return Err(self.deny_access(e.to_string()));
            }
        };

        let Some(active) = active else {
            return Err(self.deny_access("wallet returned no accounts".to_string()));
        };

        self.update_session(|s| {
            s.active_address = Some(active);
            s.access_granted = true;
        });
        tracing::info!(active = %active, "Wallet connected");

        self.refresh_all().await;
        Ok(active)
    }

    fn deny_access(&self, reason: String) -> SessionError {
        tracing::warn!(reason = %reason, "Wallet access denied");
        self.update_session(|s| {
            s.access_granted = false;
            s.access_error = Some(reason.clone());
        });
        SessionError::AccessDenied(reason)
    }

    /// Spawn the account-change listener. Only the first call has any effect.
    fn register_account_listener(&self, wallet: &dyn WalletProvider) {
        if self.listener_registered.swap(true, Ordering::SeqCst) {
            return;
        }

        let mut changes = wallet.account_changes();
        let session = Arc::clone(&self.session);
        let store = Arc::clone(&self.store);

        let handle = tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(accounts) => {
                        if store.is_closed() {
                            break;
                        }
                        let Some(active) = accounts.first().copied() else {
                            tracing::debug!("Account change without accounts ignored");
                            continue;
                        };
                        session.rcu(|current| {
                            let mut next = Session::clone(current);
                            next.active_address = Some(active);
                            next
                        });
                        tracing::info!(active = %active, "Active account changed");
                        store.notify(ProjectionEvent::SessionChanged);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped = skipped, "Account change notifications lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        self.tasks().listener = Some(handle);
    }

    /// Issue all four reads concurrently and apply whichever succeed.
    ///
    /// Does nothing unless the session is connected and not torn down.
    pub async fn refresh_all(&self) {
        if self.is_torn_down() {
            return;
        }
        if let Err(e) = self.session().require_active() {
            tracing::debug!(reason = %e, "Skipping refresh");
            return;
        }
        self.refresh(&ProjectionKind::ALL)
            .instrument(spans::refresh_span("poll"))
            .await;
    }

    /// Re-fetch the given projections concurrently.
    pub(crate) async fn refresh(&self, kinds: &[ProjectionKind]) {
        join_all(kinds.iter().map(|kind| self.refresh_one(*kind))).await;
    }

    async fn refresh_one(&self, kind: ProjectionKind) {
        let ticket = self.store.issue(kind);

        let result = match kind {
            ProjectionKind::Items => self.service.get_items().await.map(ProjectionUpdate::Items),
            ProjectionKind::Owners => self
                .service
                .get_owners()
                .await
                .map(|owners| ProjectionUpdate::Owners(OwnerSet::from(owners))),
            ProjectionKind::Balance => self
                .service
                .get_balance(self.service.contract_address())
                .await
                .map(ProjectionUpdate::Balance),
            ProjectionKind::WinnersDeclared => self
                .service
                .get_winners_declared()
                .await
                .map(ProjectionUpdate::WinnersDeclared),
        };

        match result {
            Ok(update) => {
                metrics::record_read(kind.as_str(), true);
                self.store.apply(ticket, update);
            }
            Err(e) => {
                metrics::record_read(kind.as_str(), false);
                tracing::warn!(
                    projection = %kind,
                    error = %e,
                    transient = e.is_transient(),
                    "Read failed; keeping previous projection"
                );
            }
        }
    }

    /// Compare each item's winner against the active address. No network.
    pub fn check_if_winner(&self) -> WinnerReport {
        winner::check_winners(&self.store.items(), self.session().active_address)
    }

    /// Current session.
    pub fn session(&self) -> Arc<Session> {
        self.session.load_full()
    }

    /// Current projections.
    pub fn snapshot(&self) -> Snapshot {
        self.store.snapshot()
    }

    /// Subscribe to projection and session change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<ProjectionEvent> {
        self.store.subscribe()
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    /// Stop polling and listening, and discard any response still in flight.
    pub fn teardown(&self) {
        self.store.close();
        let mut tasks = self.tasks();
        if let Some(poller) = tasks.poller.take() {
            poller.abort();
        }
        if let Some(listener) = tasks.listener.take() {
            listener.abort();
        }
        tracing::info!("Controller torn down");
    }

    pub fn is_torn_down(&self) -> bool {
        self.store.is_closed()
    }

    fn update_session(&self, f: impl Fn(&mut Session)) {
        self.session.rcu(|current| {
            let mut next = Session::clone(current);
            f(&mut next);
            next
        });
        self.store.notify(ProjectionEvent::SessionChanged);
    }

    fn tasks(&self) -> MutexGuard<'_, Tasks> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        let tasks = self.tasks.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(poller) = tasks.poller.take() {
            poller.abort();
        }
        if let Some(listener) = tasks.listener.take() {
            listener.abort();
        }
    }
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("session", &self.session())
            .field("settings", &self.settings)
            .field("torn_down", &self.is_torn_down())
            .finish()
    }
}
