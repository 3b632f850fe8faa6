use std::collections::HashMap;

use super::{destinations::Destinations, pool::DutyPool, registry::ResourceRegistry};
use crate::board::CardId;

/// Every visible counter on the board, derived from the current state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardBadges {
    /// Size of the free pool.
    pub free: usize,
    /// Size of the duty pool.
    pub duty: usize,
    /// Size of the blocked table.
    pub blocked: usize,
    /// Allocation badge per free-pool resource; entries exist only for
    /// counts above zero (the badge is hidden at zero).
    pub allocations: HashMap<i64, u32>,
    /// Member-count badge per destination card, in display order.
    pub members: Vec<(CardId, usize)>,
}

/// Recompute every visible counter from the current state.
///
/// Pure and idempotent; calling it twice with no intervening mutation
/// yields equal output. Writing the result to the screen is the caller's
/// concern.
pub fn reconcile(
    registry: &ResourceRegistry,
    duty: &DutyPool,
    destinations: &Destinations,
) -> BoardBadges {
    let allocations = registry
        .resources()
        .iter()
        .filter_map(|resource| {
            let count = registry.count_of(resource.id);
            (count > 0).then_some((resource.id, count))
        })
        .collect();

    BoardBadges {
        free: registry.resources().len(),
        duty: duty.len(),
        blocked: registry.blocked().len(),
        allocations,
        members: destinations
            .cards()
            .iter()
            .map(|card| (card.id(), card.member_count()))
            .collect(),
    }
}
