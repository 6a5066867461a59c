//! Lifecycle states of the controller.

use std::fmt;

/// Where the controller is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LifecycleState {
    /// No engine handle yet.
    #[default]
    Uninitialized,
    /// Engine handle constructed, sink registered, not producing fixes.
    Initialized,
    /// Engine producing fixes; callbacks are emitted.
    Started,
    /// Resources released. Terminal.
    Destroyed,
}

impl LifecycleState {
    /// True while an engine handle is held.
    pub fn has_engine(self) -> bool {
        matches!(self, LifecycleState::Initialized | LifecycleState::Started)
    }

    pub fn is_terminal(self) -> bool {
        self == LifecycleState::Destroyed
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Uninitialized => "uninitialized",
            LifecycleState::Initialized => "initialized",
            LifecycleState::Started => "started",
            LifecycleState::Destroyed => "destroyed",
        };
        f.write_str(name)
    }
}
