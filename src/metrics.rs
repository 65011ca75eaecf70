// Prometheus metrics for mockvisor monitoring
//
// - Lifecycle counters (created/deleted totals)
// - Active VM gauge
// - Per-operation outcome counters

use lazy_static::lazy_static;
use prometheus::{CounterVec, Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use std::sync::Arc;

lazy_static! {
    pub static ref REGISTRY: Arc<Registry> = Arc::new(Registry::new());

    pub static ref ACTIVE_VMS: IntGauge = IntGauge::new(
        "active_vms_total",
        "Number of VMs currently present in the registry"
    ).expect("Failed to create active VMs metric");

    pub static ref VMS_CREATED_TOTAL: IntCounter = IntCounter::new(
        "vms_created_total",
        "Total number of VMs created since start"
    ).expect("Failed to create VMs created metric");

    pub static ref VMS_DELETED_TOTAL: IntCounter = IntCounter::new(
        "vms_deleted_total",
        "Total number of VMs deleted since start"
    ).expect("Failed to create VMs deleted metric");

    pub static ref VM_OPERATIONS_TOTAL: CounterVec = CounterVec::new(
        prometheus::Opts::new("vm_operations_total", "Total number of VM lifecycle operations"),
        &["operation", "status"]
    ).expect("Failed to create VM operations metric");
}

/// Record the outcome of a single lifecycle operation
pub fn record_operation(operation: &str, status: &str) {
    VM_OPERATIONS_TOTAL
        .with_label_values(&[operation, status])
        .inc();
}

/// Initialize metrics registry - must be called once at startup
pub fn init() -> prometheus::Result<()> {
    REGISTRY.register(Box::new(ACTIVE_VMS.clone()))?;
    REGISTRY.register(Box::new(VMS_CREATED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(VMS_DELETED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(VM_OPERATIONS_TOTAL.clone()))?;
    Ok(())
}

/// Gather all metrics in Prometheus text format
pub fn gather_metrics() -> anyhow::Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| anyhow::anyhow!("Failed to encode metrics: {}", e))?;
    String::from_utf8(buffer).map_err(|e| anyhow::anyhow!("Invalid UTF-8 in metrics: {}", e))
}
