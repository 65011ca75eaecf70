// Mock VM Configuration
//
// Creation-time configuration for a virtual machine. Stored verbatim in the
// registry and never mutated afterwards.

use serde::{Deserialize, Serialize};

use crate::vm::error::{VmError, VmResult};

/// VM configuration supplied at creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VmConfig {
    /// VM name (unique identifier, registry key)
    pub name: String,

    /// Memory size in MB (default: 512)
    pub memory_mb: u64,

    /// Number of vCPUs (default: 1)
    pub vcpus: u32,

    /// Backing disk image path. Descriptive only: the mock backend never
    /// opens it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_path: Option<String>,

    /// Disk size in GB
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_size_gb: Option<u64>,

    /// Attached ISO image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iso_image: Option<String>,

    /// Network name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            memory_mb: 512,
            vcpus: 1,
            disk_path: None,
            disk_size_gb: None,
            iso_image: None,
            network: None,
        }
    }
}

impl VmConfig {
    /// Create a config with the given name and defaults for everything else
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Validate the required fields: non-empty name, positive memory and
    /// vCPU counts.
    ///
    /// The disk, ISO and network fields are intentionally unchecked: the
    /// mock backend never touches real storage or network devices.
    pub fn validate(&self) -> VmResult<()> {
        if self.name.is_empty() {
            return Err(VmError::InvalidArgument {
                name: self.name.clone(),
                reason: "VM name cannot be empty".to_string(),
            });
        }
        if self.memory_mb == 0 {
            return Err(VmError::InvalidArgument {
                name: self.name.clone(),
                reason: "VM memory cannot be zero".to_string(),
            });
        }
        if self.vcpus == 0 {
            return Err(VmError::InvalidArgument {
                name: self.name.clone(),
                reason: "VM vCPUs cannot be zero".to_string(),
            });
        }
        Ok(())
    }
}
