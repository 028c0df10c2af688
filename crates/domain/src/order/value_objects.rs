//! Value objects for the transport order domain.

use common::LocationGroupId;
use serde::{Deserialize, Serialize};

/// Urgency of a transport order.
///
/// Among orders waiting on the same transport unit, higher priorities are
/// offered for starting first. Ordering follows declaration order, so
/// `Priority::Highest > Priority::Lowest`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Lowest,
    Low,
    #[default]
    Normal,
    High,
    Highest,
}

impl Priority {
    /// Returns the numeric rank used for persistence and sorting (0..=4).
    pub fn rank(&self) -> i16 {
        match self {
            Priority::Lowest => 0,
            Priority::Low => 1,
            Priority::Normal => 2,
            Priority::High => 3,
            Priority::Highest => 4,
        }
    }

    /// Restores a priority from its numeric rank.
    pub fn from_rank(rank: i16) -> Option<Self> {
        match rank {
            0 => Some(Priority::Lowest),
            1 => Some(Priority::Low),
            2 => Some(Priority::Normal),
            3 => Some(Priority::High),
            4 => Some(Priority::Highest),
            _ => None,
        }
    }
}

/// A group of destination locations a transport order may target.
///
/// Only the infeed flag matters for the lifecycle: while it is set, no
/// order targeting the group may start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetLocationGroup {
    pub id: LocationGroupId,
    pub name: String,
    pub infeed_blocked: bool,
}

impl TargetLocationGroup {
    /// Creates an unblocked location group.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: LocationGroupId::new(),
            name: name.into(),
            infeed_blocked: false,
        }
    }

    /// Returns a copy of this group with the infeed flag set as given.
    pub fn with_infeed_blocked(mut self, blocked: bool) -> Self {
        self.infeed_blocked = blocked;
        self
    }

    /// Returns true if new arrivals into the group are forbidden.
    pub fn is_infeed_blocked(&self) -> bool {
        self.infeed_blocked
    }
}
