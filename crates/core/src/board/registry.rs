use std::collections::HashMap;

use tracing::error;

use crate::models::{BlockedResource, DayRoster, Resource};

/// Resources loaded for the current date plus per-resource allocation counts.
///
/// The resource list is immutable for the lifetime of one loaded date; only
/// the counts move. Blocked resources are carried for display but never
/// enter the count map.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    resources: Vec<Resource>,
    blocked: Vec<BlockedResource>,
    counts: HashMap<i64, u32>,
}

impl ResourceRegistry {
    /// Build a fresh registry from a day roster, all counts at zero.
    pub fn from_roster(roster: DayRoster) -> Self {
        let counts = roster.available.iter().map(|r| (r.id, 0)).collect();
        Self {
            resources: roster.available,
            blocked: roster.blocked,
            counts,
        }
    }

    /// Non-blocked resources in feed order.
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Blocked resources in feed order.
    pub fn blocked(&self) -> &[BlockedResource] {
        &self.blocked
    }

    /// Look up a resource by id.
    pub fn get(&self, id: i64) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id == id)
    }

    /// Whether `id` belongs to the loaded non-blocked set.
    pub fn contains(&self, id: i64) -> bool {
        self.counts.contains_key(&id)
    }

    /// Current allocation count for `id` (zero for unknown ids).
    pub fn count_of(&self, id: i64) -> u32 {
        self.counts.get(&id).copied().unwrap_or(0)
    }

    /// Bump the allocation count, returning the new value.
    pub(crate) fn increment(&mut self, id: i64) -> u32 {
        match self.counts.get_mut(&id) {
            Some(count) => {
                *count += 1;
                *count
            }
            None => {
                error!(id, "increment for a resource outside the loaded roster");
                0
            }
        }
    }

    /// Lower the allocation count, flooring at zero, returning the new value.
    ///
    /// Release paths pair every decrement with one earlier increment, so the
    /// floor is never expected to engage; when it does, the inconsistency is
    /// logged and the count stays at zero.
    pub(crate) fn decrement(&mut self, id: i64) -> u32 {
        match self.counts.get_mut(&id) {
            Some(count) => {
                if *count == 0 {
                    error!(id, "decrement of an already-zero allocation count");
                    0
                } else {
                    *count -= 1;
                    *count
                }
            }
            None => {
                error!(id, "decrement for a resource outside the loaded roster");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> DayRoster {
        DayRoster {
            available: vec![
                Resource {
                    id: 1,
                    name: "Alves".to_string(),
                },
                Resource {
                    id: 2,
                    name: "Braga".to_string(),
                },
            ],
            blocked: vec![BlockedResource {
                name: "Costa".to_string(),
                reason: Some("Leave".to_string()),
            }],
        }
    }

    #[test]
    fn fresh_registry_starts_at_zero() {
        let registry = ResourceRegistry::from_roster(roster());
        assert_eq!(registry.resources().len(), 2);
        assert_eq!(registry.blocked().len(), 1);
        assert_eq!(registry.count_of(1), 0);
        assert_eq!(registry.count_of(2), 0);
        assert!(registry.contains(1));
        assert!(!registry.contains(99));
    }

    #[test]
    fn counts_move_and_floor_at_zero() {
        let mut registry = ResourceRegistry::from_roster(roster());
        assert_eq!(registry.increment(1), 1);
        assert_eq!(registry.increment(1), 2);
        assert_eq!(registry.decrement(1), 1);
        assert_eq!(registry.decrement(1), 0);
        assert_eq!(registry.decrement(1), 0);
        assert_eq!(registry.count_of(1), 0);
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut registry = ResourceRegistry::from_roster(roster());
        assert_eq!(registry.increment(99), 0);
        assert_eq!(registry.decrement(99), 0);
        assert_eq!(registry.count_of(99), 0);
    }
}
