//! Tracing spans for refresh cycles.

use uuid::Uuid;

/// Span covering one refresh cycle.
///
/// Every read issued inside it carries the same `cycle` ID, which is how
/// overlapping ticks are told apart in the logs.
pub fn refresh_span(trigger: &'static str) -> tracing::Span {
    tracing::debug_span!("refresh", cycle = %Uuid::new_v4(), trigger = trigger)
}
