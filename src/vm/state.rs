// VM Lifecycle States

use serde::{Deserialize, Serialize};

/// Lifecycle state of a single virtual machine.
///
/// `Paused` is reserved for future suspend/resume support; no current
/// operation transitions into or out of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VmState {
    /// VM is registered but not executing
    Stopped,
    /// VM is executing
    Running,
    /// VM execution is suspended (unreachable by current operations)
    Paused,
}

impl std::fmt::Display for VmState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VmState::Stopped => write!(f, "stopped"),
            VmState::Running => write!(f, "running"),
            VmState::Paused => write!(f, "paused"),
        }
    }
}
