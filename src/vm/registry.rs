// VM Registry
//
// Thread-safe storage for VM records keyed by name. One reader/writer lock
// is scoped to the whole registry: readers share, any writer excludes all
// other readers and writers. No guard is ever held across an external call
// and there is no nested acquisition.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, RwLockWriteGuard};
use uuid::Uuid;

use crate::vm::config::VmConfig;
use crate::vm::state::VmState;

/// A single VM tracked by the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VmRecord {
    /// Instance id assigned at creation
    pub id: Uuid,

    /// Creation-time configuration (immutable after insert)
    pub config: VmConfig,

    /// Current lifecycle state
    pub state: VmState,

    /// When the record was created
    pub created_at: DateTime<Utc>,

    /// When the VM last transitioned to `Running`
    pub started_at: Option<DateTime<Utc>>,
}

impl VmRecord {
    /// Create a record in the `Stopped` state.
    pub fn new(config: VmConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            config,
            state: VmState::Stopped,
            created_at: Utc::now(),
            started_at: None,
        }
    }
}

/// Guarded name → record map.
///
/// The registry exclusively owns all records: reads hand out clones, never
/// references that outlive the guard. Invariant: at most one record per
/// name, and `state` is always one of the defined `VmState` values.
#[derive(Debug, Default)]
pub struct VmRegistry {
    vms: RwLock<HashMap<String, VmRecord>>,
}

impl VmRegistry {
    pub fn new() -> Self {
        Self {
            vms: RwLock::new(HashMap::new()),
        }
    }

    /// Snapshot of a single record (shared lock).
    pub async fn get(&self, name: &str) -> Option<VmRecord> {
        self.vms.read().await.get(name).cloned()
    }

    /// Current state of a single VM (shared lock).
    pub async fn state(&self, name: &str) -> Option<VmState> {
        self.vms.read().await.get(name).map(|vm| vm.state)
    }

    /// Unordered snapshot of all VM names (shared lock).
    ///
    /// Consistent only for the instant the lock is held: a concurrent
    /// create or delete immediately after release is not reflected.
    pub async fn names(&self) -> Vec<String> {
        self.vms.read().await.keys().cloned().collect()
    }

    /// Number of registered VMs (shared lock).
    pub async fn count(&self) -> usize {
        self.vms.read().await.len()
    }

    /// Exclusive guard over the underlying map.
    ///
    /// Mutating operations take this once and run their whole
    /// check-then-act sequence under it, so operations on the same name
    /// are strictly serialized. Inserts and removals go through
    /// `HashMap::insert` / `HashMap::remove` on the guard.
    pub async fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, VmRecord>> {
        self.vms.write().await
    }

    /// Drop every record, returning how many were released (exclusive lock).
    pub async fn clear(&self) -> usize {
        let mut vms = self.vms.write().await;
        let released = vms.len();
        vms.clear();
        released
    }
}
