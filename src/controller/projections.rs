//! Projection store.
//!
//! # Responsibilities
//! - Hold the latest snapshot of each remote projection
//! - Replace each projection wholesale, never merge
//! - Drop responses that a newer request for the same projection has superseded
//! - Notify observers once per applied replacement
//!
//! # Design Decisions
//! - One `ArcSwap` slot per projection; readers never block writers
//! - Every read request takes a ticket before it is sent. A response is applied
//!   only if its ticket is newer than the one already applied, so ordering is
//!   by request issue, not by response arrival
//! - After `close()` nothing is applied and nothing is emitted

use alloy::primitives::U256;
use arc_swap::ArcSwap;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::lottery::types::{Item, LotteryStatus, OwnerSet};
use crate::observability::metrics;

/// The four remote projections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ProjectionKind {
    Items,
    Owners,
    Balance,
    WinnersDeclared,
}

impl ProjectionKind {
    pub const ALL: [ProjectionKind; 4] = [
        ProjectionKind::Items,
        ProjectionKind::Owners,
        ProjectionKind::Balance,
        ProjectionKind::WinnersDeclared,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectionKind::Items => "items",
            ProjectionKind::Owners => "owners",
            ProjectionKind::Balance => "balance",
            ProjectionKind::WinnersDeclared => "winners_declared",
        }
    }
}

impl std::fmt::Display for ProjectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Notification sent to observers after state changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionEvent {
    /// A projection was replaced.
    Updated(ProjectionKind),
    /// The session (active account or connection state) changed.
    SessionChanged,
}

/// A fresh value for one projection.
#[derive(Debug, Clone)]
pub enum ProjectionUpdate {
    Items(Vec<Item>),
    Owners(OwnerSet),
    Balance(U256),
    WinnersDeclared(bool),
}

impl ProjectionUpdate {
    pub fn kind(&self) -> ProjectionKind {
        match self {
            ProjectionUpdate::Items(_) => ProjectionKind::Items,
            ProjectionUpdate::Owners(_) => ProjectionKind::Owners,
            ProjectionUpdate::Balance(_) => ProjectionKind::Balance,
            ProjectionUpdate::WinnersDeclared(_) => ProjectionKind::WinnersDeclared,
        }
    }
}

/// Issue order of one read request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    kind: ProjectionKind,
    seq: u64,
}

/// Point-in-time copy of every projection.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub items: Arc<Vec<Item>>,
    pub owners: Arc<OwnerSet>,
    pub status: LotteryStatus,
}

struct Versioned<T> {
    seq: u64,
    value: Arc<T>,
}

struct Slot<T> {
    current: ArcSwap<Versioned<T>>,
    next_seq: AtomicU64,
}

impl<T> Slot<T> {
    fn new(initial: T) -> Self {
        Self {
            current: ArcSwap::from_pointee(Versioned {
                seq: 0,
                value: Arc::new(initial),
            }),
            next_seq: AtomicU64::new(1),
        }
    }

    fn issue(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::SeqCst)
    }

    /// Replace the value unless a newer ticket already landed.
    fn apply(&self, seq: u64, value: T) -> bool {
        let value = Arc::new(value);
        let previous = self.current.rcu(|cur| {
            if cur.seq < seq {
                Arc::new(Versioned {
                    seq,
                    value: Arc::clone(&value),
                })
            } else {
                Arc::clone(cur)
            }
        });
        previous.seq < seq
    }

    fn load(&self) -> Arc<T> {
        Arc::clone(&self.current.load().value)
    }
}

/// Latest-known copy of the remote lottery state.
pub struct ProjectionStore {
    items: Slot<Vec<Item>>,
    owners: Slot<OwnerSet>,
    balance: Slot<U256>,
    winners_declared: Slot<bool>,
    closed: AtomicBool,
    events: broadcast::Sender<ProjectionEvent>,
}

impl ProjectionStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            items: Slot::new(Vec::new()),
            owners: Slot::new(OwnerSet::default()),
            balance: Slot::new(U256::ZERO),
            winners_declared: Slot::new(false),
            closed: AtomicBool::new(false),
            events,
        }
    }

    /// Take a ticket for a read that is about to be sent.
    pub fn issue(&self, kind: ProjectionKind) -> Ticket {
        let seq = match kind {
            ProjectionKind::Items => self.items.issue(),
            ProjectionKind::Owners => self.owners.issue(),
            ProjectionKind::Balance => self.balance.issue(),
            ProjectionKind::WinnersDeclared => self.winners_declared.issue(),
        };
        Ticket { kind, seq }
    }

    /// Apply a read response. Returns whether the projection was replaced.
    pub fn apply(&self, ticket: Ticket, update: ProjectionUpdate) -> bool {
        let kind = update.kind();
        if kind != ticket.kind {
            tracing::error!(ticket = %ticket.kind, update = %kind, "Projection update does not match its ticket");
            return false;
        }

        if self.is_closed() {
            tracing::debug!(projection = %kind, "Discarding response after teardown");
            metrics::record_stale_response(kind.as_str());
            return false;
        }

        let applied = match update {
            ProjectionUpdate::Items(items) => self.items.apply(ticket.seq, items),
            ProjectionUpdate::Owners(owners) => self.owners.apply(ticket.seq, owners),
            ProjectionUpdate::Balance(balance) => {
                let applied = self.balance.apply(ticket.seq, balance);
                if applied {
                    metrics::record_contract_balance(balance);
                }
                applied
            }
            ProjectionUpdate::WinnersDeclared(declared) => {
                self.winners_declared.apply(ticket.seq, declared)
            }
        };

        if applied {
            tracing::trace!(projection = %kind, seq = ticket.seq, "Projection replaced");
            self.notify(ProjectionEvent::Updated(kind));
        } else {
            tracing::debug!(projection = %kind, seq = ticket.seq, "Discarding superseded response");
            metrics::record_stale_response(kind.as_str());
        }
        applied
    }

    /// Broadcast an event to observers, if the store is still open.
    pub fn notify(&self, event: ProjectionEvent) {
        if self.is_closed() {
            return;
        }
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProjectionEvent> {
        self.events.subscribe()
    }

    pub fn items(&self) -> Arc<Vec<Item>> {
        self.items.load()
    }

    pub fn owners(&self) -> Arc<OwnerSet> {
        self.owners.load()
    }

    pub fn status(&self) -> LotteryStatus {
        LotteryStatus {
            winners_declared: *self.winners_declared.load(),
            contract_balance: *self.balance.load(),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            items: self.items(),
            owners: self.owners(),
            status: self.status(),
        }
    }

    /// Stop accepting responses. Idempotent.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Default for ProjectionStore {
    fn default() -> Self {
        Self::new()
    }
}
