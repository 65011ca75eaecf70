//! VM Lifecycle Manager
//!
//! This module defines the `VmManager` capability trait and its in-memory
//! `MockVmManager` implementation. The mock keeps every record in a guarded
//! map and never touches a real virtualization backend; it exists to stand
//! in for one behind the same interface.
//!
//! State machine per VM:
//!
//! - `create`: (absent) → Stopped → auto-advanced to Running
//! - `start`:  Stopped → Running (idempotent if already running)
//! - `stop`:   Running → Stopped (idempotent if already stopped)
//! - `delete`: any state → removed (force-stopped first if running)
//!
//! Nothing transitions into or out of `Paused`.

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use crate::metrics;
use crate::vm::config::VmConfig;
use crate::vm::error::{VmError, VmResult};
use crate::vm::registry::{VmRecord, VmRegistry};
use crate::vm::state::VmState;

/// Unified VM management abstraction
///
/// This trait defines the interface a tool-invocation adapter calls into.
/// The in-memory mock is one implementation; a real hypervisor backend can
/// be substituted without changing callers.
#[async_trait]
pub trait VmManager: Send + Sync {
    /// Create a new VM from the given configuration and start it.
    ///
    /// Creation always yields a running VM; there is no
    /// create-without-start operation.
    async fn create_vm(&self, config: VmConfig) -> VmResult<VmRecord>;

    /// Names of all current VMs, in no particular order.
    async fn list_vms(&self) -> VmResult<Vec<String>>;

    /// Start a VM by name. Succeeds as a no-op if it is already running.
    async fn start_vm(&self, name: &str) -> VmResult<VmState>;

    /// Stop a VM by name. Succeeds as a no-op if it is already stopped.
    async fn stop_vm(&self, name: &str) -> VmResult<VmState>;

    /// Delete a VM by name, stopping it first if it is running.
    async fn delete_vm(&self, name: &str) -> VmResult<()>;

    /// Full record for a single VM.
    async fn vm_info(&self, name: &str) -> VmResult<VmRecord>;

    /// Current lifecycle state of a single VM.
    async fn vm_state(&self, name: &str) -> VmResult<VmState>;

    /// Graceful shutdown hook. The mock only releases in-memory state;
    /// kept for symmetry with real backends that hold host resources.
    async fn close(&self) -> VmResult<()>;
}

/// Mock VM manager
///
/// Stores all records in memory behind a single reader/writer lock. Each
/// caller owns its manager instance; there is no global singleton, so
/// independent managers can coexist (useful in tests).
#[derive(Debug, Default)]
pub struct MockVmManager {
    registry: VmRegistry,
}

impl MockVmManager {
    pub fn new() -> Self {
        info!("Mock VM manager initialized");
        Self {
            registry: VmRegistry::new(),
        }
    }
}

#[async_trait]
impl VmManager for MockVmManager {
    async fn create_vm(&self, config: VmConfig) -> VmResult<VmRecord> {
        // One exclusive acquisition covers the whole check-then-insert
        // sequence, so two concurrent creates of the same name serialize
        // and exactly one succeeds.
        let mut vms = self.registry.write().await;

        // Existence check first: a duplicate name reports AlreadyExists
        // even when the rest of the config is also malformed.
        if vms.contains_key(&config.name) {
            metrics::record_operation("create", "error");
            return Err(VmError::AlreadyExists(config.name));
        }

        if let Err(e) = config.validate() {
            metrics::record_operation("create", "error");
            return Err(e);
        }

        let mut record = VmRecord::new(config);
        info!(
            "Virtual machine '{}' created (memory: {} MB, vcpus: {})",
            record.config.name, record.config.memory_mb, record.config.vcpus
        );

        // Auto-start: in mock mode this is just a state change.
        record.state = VmState::Running;
        record.started_at = Some(Utc::now());
        info!("Virtual machine '{}' started", record.config.name);

        vms.insert(record.config.name.clone(), record.clone());
        drop(vms);

        metrics::VMS_CREATED_TOTAL.inc();
        metrics::ACTIVE_VMS.inc();
        metrics::record_operation("create", "ok");
        Ok(record)
    }

    async fn list_vms(&self) -> VmResult<Vec<String>> {
        let names = self.registry.names().await;
        info!("Listed {} virtual machine(s)", names.len());
        metrics::record_operation("list", "ok");
        Ok(names)
    }

    async fn start_vm(&self, name: &str) -> VmResult<VmState> {
        let mut vms = self.registry.write().await;
        let vm = match vms.get_mut(name) {
            Some(vm) => vm,
            None => {
                metrics::record_operation("start", "error");
                return Err(VmError::NotFound(name.to_string()));
            }
        };

        if vm.state == VmState::Running {
            info!("Virtual machine '{}' is already running", name);
            metrics::record_operation("start", "ok");
            return Ok(VmState::Running);
        }

        vm.state = VmState::Running;
        vm.started_at = Some(Utc::now());
        info!("Virtual machine '{}' started", name);
        metrics::record_operation("start", "ok");
        Ok(VmState::Running)
    }

    async fn stop_vm(&self, name: &str) -> VmResult<VmState> {
        let mut vms = self.registry.write().await;
        let vm = match vms.get_mut(name) {
            Some(vm) => vm,
            None => {
                metrics::record_operation("stop", "error");
                return Err(VmError::NotFound(name.to_string()));
            }
        };

        if vm.state == VmState::Stopped {
            info!("Virtual machine '{}' is already stopped", name);
            metrics::record_operation("stop", "ok");
            return Ok(VmState::Stopped);
        }

        vm.state = VmState::Stopped;
        info!("Virtual machine '{}' stopped", name);
        metrics::record_operation("stop", "ok");
        Ok(VmState::Stopped)
    }

    async fn delete_vm(&self, name: &str) -> VmResult<()> {
        let mut vms = self.registry.write().await;
        let vm = match vms.get_mut(name) {
            Some(vm) => vm,
            None => {
                metrics::record_operation("delete", "error");
                return Err(VmError::NotFound(name.to_string()));
            }
        };

        // Force-stop first so no record is ever removed while flagged
        // running.
        if vm.state == VmState::Running {
            vm.state = VmState::Stopped;
            info!("Stopped virtual machine '{}' before deletion", name);
        }

        vms.remove(name);
        drop(vms);

        info!("Virtual machine '{}' deleted", name);
        metrics::VMS_DELETED_TOTAL.inc();
        metrics::ACTIVE_VMS.dec();
        metrics::record_operation("delete", "ok");
        Ok(())
    }

    async fn vm_info(&self, name: &str) -> VmResult<VmRecord> {
        match self.registry.get(name).await {
            Some(record) => {
                metrics::record_operation("inspect", "ok");
                Ok(record)
            }
            None => {
                metrics::record_operation("inspect", "error");
                Err(VmError::NotFound(name.to_string()))
            }
        }
    }

    async fn vm_state(&self, name: &str) -> VmResult<VmState> {
        match self.registry.state(name).await {
            Some(state) => {
                metrics::record_operation("inspect", "ok");
                Ok(state)
            }
            None => {
                metrics::record_operation("inspect", "error");
                Err(VmError::NotFound(name.to_string()))
            }
        }
    }

    async fn close(&self) -> VmResult<()> {
        let released = self.registry.clear().await;
        metrics::ACTIVE_VMS.sub(released as i64);
        metrics::record_operation("close", "ok");
        info!("VM manager closed ({} record(s) released)", released);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_yields_running_vm() {
        let manager = MockVmManager::new();
        let record = manager.create_vm(VmConfig::new("web-vm")).await.unwrap();

        assert_eq!(record.state, VmState::Running);
        assert!(record.started_at.is_some());
        assert_eq!(manager.vm_state("web-vm").await.unwrap(), VmState::Running);
    }

    #[tokio::test]
    async fn test_create_duplicate_name_fails() {
        let manager = MockVmManager::new();
        let first = VmConfig {
            memory_mb: 1024,
            ..VmConfig::new("web-vm")
        };
        manager.create_vm(first).await.unwrap();

        let second = VmConfig {
            memory_mb: 4096,
            ..VmConfig::new("web-vm")
        };
        let err = manager.create_vm(second).await.unwrap_err();
        assert!(matches!(err, VmError::AlreadyExists(name) if name == "web-vm"));

        // The original configuration must be retained.
        let record = manager.vm_info("web-vm").await.unwrap();
        assert_eq!(record.config.memory_mb, 1024);
    }

    #[tokio::test]
    async fn test_duplicate_beats_invalid_resources() {
        let manager = MockVmManager::new();
        manager.create_vm(VmConfig::new("web-vm")).await.unwrap();

        // Existence is checked before resource validation, so a duplicate
        // with zero memory still reports AlreadyExists.
        let dup = VmConfig {
            memory_mb: 0,
            ..VmConfig::new("web-vm")
        };
        assert!(matches!(
            manager.create_vm(dup).await,
            Err(VmError::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn test_create_invalid_config_adds_nothing() {
        let manager = MockVmManager::new();

        for config in [
            VmConfig::new(""),
            VmConfig {
                memory_mb: 0,
                ..VmConfig::new("vm-a")
            },
            VmConfig {
                vcpus: 0,
                ..VmConfig::new("vm-b")
            },
        ] {
            assert!(matches!(
                manager.create_vm(config).await,
                Err(VmError::InvalidArgument { .. })
            ));
        }

        assert!(manager.list_vms().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let manager = MockVmManager::new();
        manager.create_vm(VmConfig::new("web-vm")).await.unwrap();

        assert_eq!(manager.start_vm("web-vm").await.unwrap(), VmState::Running);
        assert_eq!(manager.start_vm("web-vm").await.unwrap(), VmState::Running);
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let manager = MockVmManager::new();
        manager.create_vm(VmConfig::new("web-vm")).await.unwrap();

        assert_eq!(manager.stop_vm("web-vm").await.unwrap(), VmState::Stopped);
        assert_eq!(manager.stop_vm("web-vm").await.unwrap(), VmState::Stopped);
        assert_eq!(manager.vm_state("web-vm").await.unwrap(), VmState::Stopped);
    }

    #[tokio::test]
    async fn test_stopped_vm_can_be_restarted() {
        let manager = MockVmManager::new();
        manager.create_vm(VmConfig::new("web-vm")).await.unwrap();
        manager.stop_vm("web-vm").await.unwrap();

        assert_eq!(manager.start_vm("web-vm").await.unwrap(), VmState::Running);
        let record = manager.vm_info("web-vm").await.unwrap();
        assert!(record.started_at.unwrap() >= record.created_at);
    }

    #[tokio::test]
    async fn test_operations_on_unknown_name() {
        let manager = MockVmManager::new();
        manager.create_vm(VmConfig::new("web-vm")).await.unwrap();

        assert!(matches!(
            manager.start_vm("ghost").await,
            Err(VmError::NotFound(_))
        ));
        assert!(matches!(
            manager.stop_vm("ghost").await,
            Err(VmError::NotFound(_))
        ));
        assert!(matches!(
            manager.delete_vm("ghost").await,
            Err(VmError::NotFound(_))
        ));
        assert!(matches!(
            manager.vm_info("ghost").await,
            Err(VmError::NotFound(_))
        ));
        assert!(matches!(
            manager.vm_state("ghost").await,
            Err(VmError::NotFound(_))
        ));

        // A failed delete leaves the registry unchanged.
        assert_eq!(manager.list_vms().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_running_vm() {
        let manager = MockVmManager::new();
        let config = VmConfig {
            memory_mb: 2048,
            vcpus: 4,
            ..VmConfig::new("db-vm")
        };
        manager.create_vm(config).await.unwrap();
        assert_eq!(manager.vm_state("db-vm").await.unwrap(), VmState::Running);

        manager.delete_vm("db-vm").await.unwrap();
        assert!(manager.list_vms().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_close_releases_all_records() {
        let manager = MockVmManager::new();
        manager.create_vm(VmConfig::new("vm-a")).await.unwrap();
        manager.create_vm(VmConfig::new("vm-b")).await.unwrap();

        manager.close().await.unwrap();
        assert!(manager.list_vms().await.unwrap().is_empty());

        // Closing twice is harmless.
        manager.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_independent_managers_do_not_share_state() {
        let left = MockVmManager::new();
        let right = MockVmManager::new();

        left.create_vm(VmConfig::new("vm-a")).await.unwrap();
        assert!(right.list_vms().await.unwrap().is_empty());
    }
}
