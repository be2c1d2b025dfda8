//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Controller, client and wallet produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges)
//!     → spans.rs (one span per refresh cycle, tagged with a cycle ID)
//!
//! Consumers:
//!     → stdout (plain or JSON lines)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Structured fields (`projection`, `action`, `error`) over formatted strings
//! - Metrics are cheap (atomic increments) and no-ops without an exporter

pub mod logging;
pub mod metrics;
pub mod spans;
