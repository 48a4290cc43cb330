//! Arithmetic composition of independently fetched records into derived
//! metrics.
//!
//! Derivations are pure: they never fetch, never round-trip through the
//! schema layer, and never partially compute. Both upstream records must be
//! present; the fan-in is a join, not a race.

use crate::domain::{FuturesMarketOi, InstitutionalFuturesOi, RetailPosition};

/// Explicit fan-in primitive: both sides present, or nothing.
pub fn join_present<A, B>(left: Option<A>, right: Option<B>) -> Option<(A, B)> {
    Some((left?, right?))
}

/// Round to four decimal places with half-up ties (toward positive
/// infinity), for output comparability of ratio fields.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0 + 0.5).floor() / 10_000.0
}

/// Infer retail futures positioning from market open interest and the
/// institutional position aggregate for the same date.
///
/// Absent whenever any contributing field is absent, or market open
/// interest is zero (no book to take a share of).
pub fn retail_position(
    market: &FuturesMarketOi,
    institutional: &InstitutionalFuturesOi,
) -> Option<RetailPosition> {
    let market_oi = market.open_interest?;
    let institutional_long_oi = institutional.long_oi?;
    let institutional_short_oi = institutional.short_oi?;

    if market_oi == 0.0 {
        return None;
    }

    let retail_long_oi = market_oi - institutional_long_oi;
    let retail_short_oi = market_oi - institutional_short_oi;
    let retail_net_oi = retail_long_oi - retail_short_oi;

    Some(RetailPosition {
        date: market.date,
        retail_long_oi,
        retail_short_oi,
        retail_net_oi,
        retail_long_short_ratio: round4(retail_net_oi / market_oi),
    })
}
