//! Transport order state machine.

use serde::{Deserialize, Serialize};

/// The state of a transport order in its lifecycle.
///
/// State transitions:
/// ```text
/// Created ──► Initialized ──► Started ──┬──► Finished
///                                ▲      ├──► Failed
///                                │      └──► Interrupted
///                                └── resume ───┘
/// ```
///
/// Any non-terminal order may be canceled; initialized and interrupted
/// orders may also fail.
///
/// `Finished`, `Failed` and `Canceled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransportOrderState {
    /// Created by the upstream order-creation process, not yet validated.
    #[default]
    Created,

    /// Ready to be started, queued behind any active order on its unit.
    Initialized,

    /// Currently moving its transport unit.
    Started,

    /// Started earlier and paused; still owns the transport unit.
    Interrupted,

    /// Completed successfully (terminal state).
    Finished,

    /// Aborted because of an error (terminal state).
    Failed,

    /// Canceled on request (terminal state).
    Canceled,
}

impl TransportOrderState {
    /// States that own the transport unit. At most one order per unit may be
    /// in one of these at any time.
    pub const ACTIVE: [TransportOrderState; 2] = [Self::Started, Self::Interrupted];

    /// States from which a start attempt is allowed.
    pub const STARTABLE: [TransportOrderState; 2] = [Self::Initialized, Self::Interrupted];

    /// Every state, in lifecycle order.
    pub const ALL: [TransportOrderState; 7] = [
        Self::Created,
        Self::Initialized,
        Self::Started,
        Self::Interrupted,
        Self::Finished,
        Self::Failed,
        Self::Canceled,
    ];

    /// Returns true if the order can be initialized in this state.
    pub fn can_initialize(&self) -> bool {
        matches!(self, Self::Created)
    }

    /// Returns true if a start attempt is allowed in this state.
    pub fn can_start(&self) -> bool {
        Self::STARTABLE.contains(self)
    }

    /// Returns true if the order can be finished in this state.
    pub fn can_finish(&self) -> bool {
        matches!(self, Self::Started)
    }

    /// Returns true if the order can be interrupted in this state.
    pub fn can_interrupt(&self) -> bool {
        matches!(self, Self::Started)
    }

    /// Returns true if the order can be canceled in this state.
    pub fn can_cancel(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if the order can be marked as failed in this state.
    pub fn can_fail(&self) -> bool {
        matches!(self, Self::Initialized | Self::Started | Self::Interrupted)
    }

    /// Returns true if the order currently owns its transport unit.
    pub fn is_active(&self) -> bool {
        Self::ACTIVE.contains(self)
    }

    /// Returns true if this is a terminal state (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::Failed | Self::Canceled)
    }

    /// Returns the state name as stored and displayed.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Initialized => "INITIALIZED",
            Self::Started => "STARTED",
            Self::Interrupted => "INTERRUPTED",
            Self::Finished => "FINISHED",
            Self::Failed => "FAILED",
            Self::Canceled => "CANCELED",
        }
    }

    /// Parses a state from its stored name.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|state| state.as_str() == value)
    }
}

impl std::fmt::Display for TransportOrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
