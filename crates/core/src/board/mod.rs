//! The owned board store: registry, pools, destinations and badges.
//!
//! All mutation entry points live on [`Board`]; each one runs to completion
//! and ends with exactly one reconciler pass, so the displayed counters
//! never lag the model past the current event.

mod destinations;
mod drag;
mod pool;
mod reconcile;
mod registry;

pub use destinations::{CardId, DestinationCard, Destinations};
pub use drag::{resolve_band, DragPayload, DragSession, RowBand};
pub use pool::DutyPool;
pub use reconcile::{reconcile, BoardBadges};
pub use registry::ResourceRegistry;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::{error::LoadError, models::DayRoster};

/// Load lifecycle of the board for the selected date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardPhase {
    /// No date loaded yet.
    Empty,
    /// A roster request is in flight for the date.
    Loading(NaiveDate),
    /// Roster loaded; the board is interactive.
    Ready(NaiveDate),
    /// The roster request failed; nothing is draggable.
    Failed {
        /// Date the failed request was issued for.
        date: NaiveDate,
        /// Human-readable failure description.
        message: String,
    },
}

/// Outcome of dropping a resource onto a destination card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// Chip inserted, allocation count bumped.
    Added,
    /// Already a member of this card: no state change, pulse the chip.
    Duplicate,
    /// The id is not part of the loaded roster, or the card is gone.
    Ignored,
}

/// Outcome of applying a finished roster load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The response matched the in-flight date and was applied.
    Applied,
    /// The response was for a superseded date and was discarded.
    Stale,
}

/// The board for one working day.
///
/// Exclusively owns the allocation counts and every destination membership
/// set for the lifetime of one loaded date; loading a new date discards and
/// rebuilds all of it.
pub struct Board {
    phase: BoardPhase,
    registry: ResourceRegistry,
    duty: DutyPool,
    destinations: Destinations,
    badges: BoardBadges,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Empty board, nothing loaded.
    pub fn new() -> Self {
        let registry = ResourceRegistry::default();
        let duty = DutyPool::default();
        let destinations = Destinations::default();
        let badges = reconcile(&registry, &duty, &destinations);
        Self {
            phase: BoardPhase::Empty,
            registry,
            duty,
            destinations,
            badges,
        }
    }

    /// Current load phase.
    pub fn phase(&self) -> &BoardPhase {
        &self.phase
    }

    /// Date of the current phase, when one applies.
    pub fn date(&self) -> Option<NaiveDate> {
        match self.phase {
            BoardPhase::Empty => None,
            BoardPhase::Loading(date) | BoardPhase::Ready(date) => Some(date),
            BoardPhase::Failed { date, .. } => Some(date),
        }
    }

    /// Whether the board accepts gestures.
    pub fn is_ready(&self) -> bool {
        matches!(self.phase, BoardPhase::Ready(_))
    }

    /// Discard all state and mark a load in flight for `date`.
    pub fn begin_load(&mut self, date: NaiveDate) {
        self.registry = ResourceRegistry::default();
        self.duty.clear();
        self.destinations = Destinations::default();
        self.phase = BoardPhase::Loading(date);
        self.reconcile_pass();
    }

    /// Apply a finished roster load for `date`.
    ///
    /// Responses are keyed by the date they were issued for; anything that
    /// does not match the in-flight load is discarded so a slow response can
    /// never clobber state a later date change already rebuilt.
    pub fn apply_roster(
        &mut self,
        date: NaiveDate,
        result: Result<DayRoster, LoadError>,
    ) -> LoadOutcome {
        if self.phase != BoardPhase::Loading(date) {
            debug!(%date, "discarding roster response for a superseded date");
            return LoadOutcome::Stale;
        }

        match result {
            Ok(roster) => {
                self.registry = ResourceRegistry::from_roster(roster);
                // Every resource starts in the duty pool.
                self.duty = DutyPool::from_ids(self.registry.resources().iter().map(|r| r.id));
                self.destinations = Destinations::default();
                self.phase = BoardPhase::Ready(date);
                info!(
                    %date,
                    available = self.registry.resources().len(),
                    blocked = self.registry.blocked().len(),
                    "roster loaded"
                );
            }
            Err(err) => {
                self.registry = ResourceRegistry::default();
                self.duty.clear();
                self.destinations = Destinations::default();
                self.phase = BoardPhase::Failed {
                    date,
                    message: err.to_string(),
                };
            }
        }
        self.reconcile_pass();
        LoadOutcome::Applied
    }

    /// Whether `id` may start a drag (loaded, non-blocked resources only).
    pub fn can_drag(&self, id: i64) -> bool {
        self.is_ready() && self.registry.contains(id)
    }

    /// Focus or create a destination card for a goal.
    ///
    /// Returns `None` while the board is not interactive.
    pub fn ensure_destination(
        &mut self,
        goal_id: i64,
        title: &str,
        force_new: bool,
    ) -> Option<CardId> {
        if !self.is_ready() {
            return None;
        }
        let card = self.destinations.ensure(goal_id, title, force_new);
        self.reconcile_pass();
        Some(card)
    }

    /// Drop `resource_id` onto a destination card.
    pub fn add_member(&mut self, card: CardId, resource_id: i64) -> DropOutcome {
        if !self.is_ready() || !self.registry.contains(resource_id) {
            return DropOutcome::Ignored;
        }
        match self.destinations.insert_member(card, resource_id) {
            None => DropOutcome::Ignored,
            Some(false) => DropOutcome::Duplicate,
            Some(true) => {
                let before = self.registry.count_of(resource_id);
                self.registry.increment(resource_id);
                // First allocation pulls the resource out of the duty pool.
                if before == 0 {
                    self.duty.remove_one(resource_id);
                }
                self.reconcile_pass();
                DropOutcome::Added
            }
        }
    }

    /// Remove one chip from a destination card.
    pub fn remove_member(&mut self, card: CardId, resource_id: i64) -> bool {
        if !self.destinations.remove_member(card, resource_id) {
            return false;
        }
        if self.registry.decrement(resource_id) == 0 {
            self.duty.append(resource_id);
        }
        self.reconcile_pass();
        true
    }

    /// Close a destination card, releasing every member (batched), then run
    /// a single reconciler pass.
    pub fn close_destination(&mut self, card: CardId) -> bool {
        let Some(closed) = self.destinations.close(card) else {
            return false;
        };
        for &member in closed.members() {
            if self.registry.decrement(member) == 0 {
                self.duty.append(member);
            }
        }
        self.reconcile_pass();
        true
    }

    /// Drop onto the duty-pool zone: equivalent to "no assignment".
    ///
    /// Idempotent, and a no-op for resources still allocated somewhere;
    /// releasing memberships goes through chip removal or card close only.
    pub fn drop_to_duty(&mut self, resource_id: i64) -> bool {
        if !self.is_ready() || !self.registry.contains(resource_id) {
            return false;
        }
        if self.registry.count_of(resource_id) != 0 {
            return false;
        }
        let appended = self.duty.append(resource_id);
        if appended {
            self.reconcile_pass();
        }
        appended
    }

    /// Latest reconciled counters.
    pub fn badges(&self) -> &BoardBadges {
        &self.badges
    }

    /// Loaded registry (resources, blocked list, counts).
    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    /// Duty-pool view.
    pub fn duty(&self) -> &DutyPool {
        &self.duty
    }

    /// Open destination cards.
    pub fn destinations(&self) -> &Destinations {
        &self.destinations
    }

    fn reconcile_pass(&mut self) {
        self.badges = reconcile(&self.registry, &self.duty, &self.destinations);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BlockedResource, Resource};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, day).unwrap()
    }

    fn roster(names: &[(i64, &str)]) -> DayRoster {
        DayRoster {
            available: names
                .iter()
                .map(|&(id, name)| Resource {
                    id,
                    name: name.to_string(),
                })
                .collect(),
            blocked: vec![BlockedResource {
                name: "Costa".to_string(),
                reason: None,
            }],
        }
    }

    fn ready_board() -> Board {
        let mut board = Board::new();
        board.begin_load(date(7));
        board.apply_roster(date(7), Ok(roster(&[(1, "Alves"), (2, "Braga")])));
        board
    }

    /// count(r) must equal the number of destinations holding r, and the
    /// duty pool must hold exactly the zero-count resources.
    fn assert_invariants(board: &Board) {
        for resource in board.registry().resources() {
            let held = board
                .destinations()
                .cards()
                .iter()
                .filter(|card| card.contains(resource.id))
                .count() as u32;
            assert_eq!(
                board.registry().count_of(resource.id),
                held,
                "allocation count out of sync for {}",
                resource.id
            );
            assert_eq!(
                board.duty().contains(resource.id),
                held == 0,
                "duty pool out of sync for {}",
                resource.id
            );
        }
        assert_eq!(board.badges(), &reconcile(
            board.registry(),
            board.duty(),
            board.destinations(),
        ));
    }

    #[test]
    fn everyone_starts_in_the_duty_pool() {
        let board = ready_board();
        assert!(board.is_ready());
        assert_eq!(board.duty().ids(), &[1, 2]);
        assert_eq!(board.badges().free, 2);
        assert_eq!(board.badges().duty, 2);
        assert_eq!(board.badges().blocked, 1);
        assert_invariants(&board);
    }

    #[test]
    fn first_drop_moves_a_resource_out_of_duty() {
        let mut board = ready_board();
        let card = board.ensure_destination(7, "Patrol-1", false).unwrap();

        assert_eq!(board.add_member(card, 1), DropOutcome::Added);
        assert_eq!(board.registry().count_of(1), 1);
        assert!(!board.duty().contains(1));
        assert_eq!(board.badges().members, vec![(card, 1)]);
        assert_eq!(board.badges().allocations.get(&1), Some(&1));
        assert_invariants(&board);
    }

    #[test]
    fn redropping_on_the_same_card_is_a_visible_noop() {
        let mut board = ready_board();
        let card = board.ensure_destination(7, "Patrol-1", false).unwrap();
        board.add_member(card, 1);

        assert_eq!(board.add_member(card, 1), DropOutcome::Duplicate);
        assert_eq!(board.registry().count_of(1), 1);
        assert_eq!(board.destinations().get(card).unwrap().members(), &[1]);
        assert_invariants(&board);
    }

    #[test]
    fn add_then_remove_restores_the_pre_add_state() {
        let mut board = ready_board();
        let card = board.ensure_destination(7, "Patrol-1", false).unwrap();
        board.add_member(card, 1);

        assert!(board.remove_member(card, 1));
        assert_eq!(board.registry().count_of(1), 0);
        assert!(board.duty().contains(1));
        assert!(board.badges().allocations.is_empty());
        assert_invariants(&board);
    }

    #[test]
    fn two_cards_for_one_goal_release_independently() {
        let mut board = ready_board();
        let patrol_1 = board.ensure_destination(7, "Patrol", false).unwrap();
        let patrol_2 = board.ensure_destination(7, "Patrol", true).unwrap();
        assert_ne!(patrol_1, patrol_2);

        board.add_member(patrol_1, 1);
        board.add_member(patrol_2, 1);
        assert_eq!(board.registry().count_of(1), 2);
        assert!(!board.duty().contains(1));
        assert_invariants(&board);

        assert!(board.close_destination(patrol_1));
        assert_eq!(board.registry().count_of(1), 1);
        assert!(!board.duty().contains(1));
        assert_invariants(&board);

        assert!(board.close_destination(patrol_2));
        assert_eq!(board.registry().count_of(1), 0);
        assert!(board.duty().contains(1));
        assert!(board.destinations().is_empty());
        assert_invariants(&board);
    }

    #[test]
    fn closing_a_card_releases_every_member_at_once() {
        let mut board = ready_board();
        let card = board.ensure_destination(7, "Patrol-1", false).unwrap();
        board.add_member(card, 1);
        board.add_member(card, 2);
        assert_eq!(board.badges().duty, 0);

        assert!(board.close_destination(card));
        assert_eq!(board.badges().duty, 2);
        assert_invariants(&board);
    }

    #[test]
    fn duty_drop_is_idempotent_and_never_touches_allocations() {
        let mut board = ready_board();
        // Already at zero: dropping back is a no-op.
        assert!(!board.drop_to_duty(1));

        let card = board.ensure_destination(7, "Patrol-1", false).unwrap();
        board.add_member(card, 1);
        // Allocated elsewhere: the duty zone does not un-assign.
        assert!(!board.drop_to_duty(1));
        assert_eq!(board.registry().count_of(1), 1);
        assert!(!board.duty().contains(1));
        assert_invariants(&board);
    }

    #[test]
    fn late_response_for_a_superseded_date_is_discarded() {
        let mut board = Board::new();
        board.begin_load(date(1));
        // The user switches dates before the first response lands.
        board.begin_load(date(2));
        assert_eq!(
            board.apply_roster(date(2), Ok(roster(&[(5, "Dias")]))),
            LoadOutcome::Applied
        );

        let late = board.apply_roster(date(1), Ok(roster(&[(9, "Elias")])));
        assert_eq!(late, LoadOutcome::Stale);
        assert_eq!(board.date(), Some(date(2)));
        assert_eq!(board.duty().ids(), &[5]);
        assert_invariants(&board);
    }

    #[test]
    fn failed_loads_leave_nothing_draggable() {
        let mut board = Board::new();
        board.begin_load(date(7));
        board.apply_roster(
            date(7),
            Err(LoadError::Status { status: 502 }),
        );

        assert!(matches!(board.phase(), BoardPhase::Failed { .. }));
        assert!(!board.can_drag(1));
        assert!(board.ensure_destination(7, "Patrol", false).is_none());
        assert_eq!(board.badges().free, 0);
    }

    #[test]
    fn loading_a_new_date_discards_the_previous_board() {
        let mut board = ready_board();
        let card = board.ensure_destination(7, "Patrol-1", false).unwrap();
        board.add_member(card, 1);

        board.begin_load(date(8));
        assert!(!board.is_ready());
        assert!(board.destinations().is_empty());
        assert_eq!(board.registry().resources().len(), 0);
        assert_eq!(board.badges().duty, 0);
    }

    #[test]
    fn blocked_resources_never_enter_the_allocation_model() {
        let board = ready_board();
        assert_eq!(board.registry().blocked().len(), 1);
        // Blocked entries have no id in the count map and cannot drag.
        assert!(!board.can_drag(999));
    }
}
