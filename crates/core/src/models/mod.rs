//! Shared domain models and wire types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A person/unit assignable to activity destinations for a given date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Opaque stable identifier.
    pub id: i64,
    /// Display name.
    #[serde(rename = "nome")]
    pub name: String,
}

/// A resource reported unavailable for the date, shown read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedResource {
    /// Display name.
    #[serde(rename = "nome")]
    pub name: String,
    /// Reason for the block; the feed may omit it.
    #[serde(rename = "motivo", default)]
    pub reason: Option<String>,
}

impl BlockedResource {
    /// Reason text with a generic fallback for absent/empty reasons.
    pub fn reason_label(&self) -> &str {
        self.reason
            .as_deref()
            .filter(|reason| !reason.trim().is_empty())
            .unwrap_or("Unavailable")
    }
}

/// Availability roster returned by the resource endpoint for one date.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DayRoster {
    /// Resources available for assignment, in feed order.
    #[serde(rename = "livres", default)]
    pub available: Vec<Resource>,
    /// Resources unavailable for the date.
    #[serde(rename = "impedidos", default)]
    pub blocked: Vec<BlockedResource>,
}

/// A unit-level objective that destination cards are created for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    /// Stable goal identifier.
    pub id: i64,
    /// Goal title shown in the list and on cards.
    #[serde(rename = "nome")]
    pub name: String,
    /// Optional completion deadline.
    #[serde(rename = "data_limite", default)]
    pub deadline: Option<NaiveDate>,
    /// Quantity allocated to the current unit.
    #[serde(rename = "alocado_unidade", default)]
    pub allocated: u32,
    /// Quantity already executed by the current unit.
    #[serde(rename = "executado_unidade", default)]
    pub executed: u32,
    /// Overall target of the goal, when the feed provides one.
    #[serde(rename = "meta_total", default)]
    pub target: Option<u32>,
}

impl Goal {
    /// Unit execution progress as a percentage, clamped to 100.
    pub fn progress_percent(&self) -> u8 {
        if self.allocated == 0 {
            return 0;
        }
        let pct = (u64::from(self.executed) * 100) / u64::from(self.allocated);
        pct.min(100) as u8
    }
}

/// Envelope of the goal feed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoalFeed {
    /// Goals for the current unit, in feed order.
    #[serde(rename = "metas", default)]
    pub goals: Vec<Goal>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocked_reason_falls_back_when_absent_or_blank() {
        let absent = BlockedResource {
            name: "Alves".to_string(),
            reason: None,
        };
        let blank = BlockedResource {
            name: "Braga".to_string(),
            reason: Some("  ".to_string()),
        };
        let given = BlockedResource {
            name: "Costa".to_string(),
            reason: Some("Leave".to_string()),
        };
        assert_eq!(absent.reason_label(), "Unavailable");
        assert_eq!(blank.reason_label(), "Unavailable");
        assert_eq!(given.reason_label(), "Leave");
    }

    #[test]
    fn progress_clamps_and_handles_zero_allocation() {
        let mut goal = Goal {
            id: 1,
            name: "Inspections".to_string(),
            deadline: None,
            allocated: 0,
            executed: 5,
            target: None,
        };
        assert_eq!(goal.progress_percent(), 0);

        goal.allocated = 4;
        goal.executed = 3;
        assert_eq!(goal.progress_percent(), 75);

        goal.executed = 9;
        assert_eq!(goal.progress_percent(), 100);
    }
}
