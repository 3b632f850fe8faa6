/// Identifier of one destination card, unique for the board's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CardId(u64);

/// One activity card: an independently closable membership container.
///
/// Several cards may share a `goal_id`; each keeps its own membership and a
/// recency ordinal so the user can tell simultaneous cards apart.
#[derive(Debug, Clone)]
pub struct DestinationCard {
    id: CardId,
    goal_id: i64,
    title: String,
    ordinal: usize,
    members: Vec<i64>,
}

impl DestinationCard {
    /// Card identifier.
    pub fn id(&self) -> CardId {
        self.id
    }

    /// Goal this card was opened for.
    pub fn goal_id(&self) -> i64 {
        self.goal_id
    }

    /// Display title (refreshed on every `ensure`).
    pub fn title(&self) -> &str {
        &self.title
    }

    /// 1..k recency number among cards of the same goal (1 = newest).
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Member resource ids in drop order.
    pub fn members(&self) -> &[i64] {
        &self.members
    }

    /// Number of members.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Whether `id` is already a member of this card.
    pub fn contains(&self, id: i64) -> bool {
        self.members.contains(&id)
    }
}

/// Creates, renumbers and destroys destination cards.
#[derive(Debug, Default)]
pub struct Destinations {
    // Most recent first; prepend on create.
    cards: Vec<DestinationCard>,
    next_id: u64,
}

impl Destinations {
    /// Return the existing card for `goal_id` (title refreshed), or create a
    /// new one. With `force_new`, always create an independent card; cards of
    /// the same goal are then renumbered 1..k by creation recency.
    pub fn ensure(&mut self, goal_id: i64, title: &str, force_new: bool) -> CardId {
        if !force_new {
            if let Some(card) = self.cards.iter_mut().find(|c| c.goal_id == goal_id) {
                card.title = title.to_string();
                return card.id;
            }
        }

        let id = CardId(self.next_id);
        self.next_id += 1;
        self.cards.insert(
            0,
            DestinationCard {
                id,
                goal_id,
                title: title.to_string(),
                ordinal: 1,
                members: Vec::new(),
            },
        );
        self.renumber(goal_id);
        id
    }

    fn renumber(&mut self, goal_id: i64) {
        let mut ordinal = 0;
        for card in self.cards.iter_mut().filter(|c| c.goal_id == goal_id) {
            ordinal += 1;
            card.ordinal = ordinal;
        }
    }

    /// Insert `resource_id` into the card's membership.
    ///
    /// Returns `None` for an unknown card, `Some(false)` when the resource is
    /// already a member (no state change), `Some(true)` on insertion.
    pub fn insert_member(&mut self, card: CardId, resource_id: i64) -> Option<bool> {
        let card = self.cards.iter_mut().find(|c| c.id == card)?;
        if card.members.contains(&resource_id) {
            return Some(false);
        }
        card.members.push(resource_id);
        Some(true)
    }

    /// Remove `resource_id` from the card's membership; `true` on removal.
    pub fn remove_member(&mut self, card: CardId, resource_id: i64) -> bool {
        let Some(card) = self.cards.iter_mut().find(|c| c.id == card) else {
            return false;
        };
        match card.members.iter().position(|&m| m == resource_id) {
            Some(pos) => {
                card.members.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Destroy a card, returning it (members intact) so the caller can
    /// release every allocation. Surviving cards of the goal are renumbered.
    pub fn close(&mut self, card: CardId) -> Option<DestinationCard> {
        let pos = self.cards.iter().position(|c| c.id == card)?;
        let removed = self.cards.remove(pos);
        self.renumber(removed.goal_id);
        Some(removed)
    }

    /// Look up a card by id.
    pub fn get(&self, card: CardId) -> Option<&DestinationCard> {
        self.cards.iter().find(|c| c.id == card)
    }

    /// All cards, most recent first.
    pub fn cards(&self) -> &[DestinationCard] {
        &self.cards
    }

    /// Number of open cards.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Whether no cards are open.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_is_idempotent_focus_and_refreshes_title() {
        let mut destinations = Destinations::default();
        let first = destinations.ensure(7, "Patrol", false);
        let again = destinations.ensure(7, "Patrol (renamed)", false);
        assert_eq!(first, again);
        assert_eq!(destinations.len(), 1);
        assert_eq!(destinations.get(first).unwrap().title(), "Patrol (renamed)");
    }

    #[test]
    fn force_new_creates_independent_cards_renumbered_by_recency() {
        let mut destinations = Destinations::default();
        let old = destinations.ensure(7, "Patrol", false);
        let new = destinations.ensure(7, "Patrol", true);
        assert_ne!(old, new);
        assert_eq!(destinations.len(), 2);

        // Newest card is listed and numbered first.
        assert_eq!(destinations.cards()[0].id(), new);
        assert_eq!(destinations.get(new).unwrap().ordinal(), 1);
        assert_eq!(destinations.get(old).unwrap().ordinal(), 2);
    }

    #[test]
    fn membership_rejects_duplicates_per_card() {
        let mut destinations = Destinations::default();
        let card = destinations.ensure(7, "Patrol", false);
        assert_eq!(destinations.insert_member(card, 1), Some(true));
        assert_eq!(destinations.insert_member(card, 1), Some(false));
        assert_eq!(destinations.get(card).unwrap().members(), &[1]);
    }

    #[test]
    fn close_renumbers_survivors() {
        let mut destinations = Destinations::default();
        let a = destinations.ensure(7, "Patrol", false);
        let b = destinations.ensure(7, "Patrol", true);
        destinations.insert_member(b, 1);

        let closed = destinations.close(b).unwrap();
        assert_eq!(closed.members(), &[1]);
        assert_eq!(destinations.get(a).unwrap().ordinal(), 1);
        assert!(destinations.close(b).is_none());
    }
}
