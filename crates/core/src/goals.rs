//! Shared cache of the goal feed.

use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::RwLock;

use crate::models::Goal;

/// Title used for cards whose goal id has no catalog entry.
const FALLBACK_TITLE: &str = "Activity";

/// Thread-safe cache of the goals loaded for the current date.
///
/// Written by the fetch task, read by the UI loop.
#[derive(Debug, Clone, Default)]
pub struct GoalCatalog {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    loaded_for: Option<NaiveDate>,
    goals: Vec<Goal>,
}

impl GoalCatalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cached feed with the goals loaded for `date`.
    pub fn replace(&self, date: NaiveDate, goals: Vec<Goal>) {
        let mut inner = self.inner.write();
        inner.loaded_for = Some(date);
        inner.goals = goals;
    }

    /// Drop the cache (a new date is loading).
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.loaded_for = None;
        inner.goals.clear();
    }

    /// Date the cached goals were loaded for.
    pub fn loaded_for(&self) -> Option<NaiveDate> {
        self.inner.read().loaded_for
    }

    /// All cached goals in feed order.
    pub fn goals(&self) -> Vec<Goal> {
        self.inner.read().goals.clone()
    }

    /// Case-insensitive substring filter over goal names.
    pub fn matching(&self, query: &str) -> Vec<Goal> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.goals();
        }
        self.inner
            .read()
            .goals
            .iter()
            .filter(|goal| goal.name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// Display title for a goal id, with a generic fallback.
    pub fn title_of(&self, goal_id: i64) -> String {
        self.inner
            .read()
            .goals
            .iter()
            .find(|goal| goal.id == goal_id)
            .map(|goal| goal.name.clone())
            .unwrap_or_else(|| FALLBACK_TITLE.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goal(id: i64, name: &str) -> Goal {
        Goal {
            id,
            name: name.to_string(),
            deadline: None,
            allocated: 0,
            executed: 0,
            target: None,
        }
    }

    #[test]
    fn replace_and_clear_track_the_loaded_date() {
        let catalog = GoalCatalog::new();
        let date = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        assert_eq!(catalog.loaded_for(), None);

        catalog.replace(date, vec![goal(1, "Inspections")]);
        assert_eq!(catalog.loaded_for(), Some(date));
        assert_eq!(catalog.goals().len(), 1);

        catalog.clear();
        assert_eq!(catalog.loaded_for(), None);
        assert!(catalog.goals().is_empty());
    }

    #[test]
    fn matching_filters_case_insensitively() {
        let catalog = GoalCatalog::new();
        let date = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        catalog.replace(
            date,
            vec![goal(1, "Night patrol"), goal(2, "Inspections")],
        );

        let hits = catalog.matching("PATROL");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 1);
        assert_eq!(catalog.matching("  ").len(), 2);
    }

    #[test]
    fn unknown_goal_ids_fall_back_to_a_generic_title() {
        let catalog = GoalCatalog::new();
        assert_eq!(catalog.title_of(99), "Activity");
    }
}
