// Mockvisor - Main Entry Point
//
// Thin CLI adapter over the in-memory VM manager. Manager state lives and
// dies with the process, so `demo` scripts a full lifecycle against a
// single manager instance while `create` exercises one validated call.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use mockvisor::vm::{MockVmManager, VmConfig, VmManager};

/// Mockvisor: in-memory virtual machine lifecycle manager
#[derive(Parser, Debug)]
#[command(name = "mockvisor")]
#[command(author = "Mockvisor Contributors")]
#[command(version = "0.1.0")]
#[command(about = "In-memory virtual machine lifecycle manager", long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a scripted lifecycle demo against one in-process manager
    Demo,
    /// Create a VM and print the stored record
    Create {
        /// VM name
        #[arg(long)]
        name: String,

        /// Memory size in MB
        #[arg(long, default_value_t = 512)]
        memory: u64,

        /// Number of vCPUs
        #[arg(long, default_value_t = 1)]
        vcpus: u32,

        /// Backing disk image path (descriptive only)
        #[arg(long)]
        disk_path: Option<String>,

        /// Disk size in GB
        #[arg(long)]
        disk_size: Option<u64>,

        /// Attached ISO image
        #[arg(long)]
        iso_image: Option<String>,

        /// Network name
        #[arg(long)]
        network: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(filter.into())
                .from_env_lossy(),
        )
        .init();

    if let Err(e) = mockvisor::metrics::init() {
        // Metrics are observability only; a registration clash must not
        // stop the adapter.
        tracing::warn!("Failed to register metrics: {}", e);
    }

    match args.command {
        Some(Commands::Create {
            name,
            memory,
            vcpus,
            disk_path,
            disk_size,
            iso_image,
            network,
        }) => {
            let config = VmConfig {
                name,
                memory_mb: memory,
                vcpus,
                disk_path,
                disk_size_gb: disk_size,
                iso_image,
                network,
            };
            create_once(config).await
        }
        Some(Commands::Demo) | None => run_demo().await,
    }
}

/// One-shot create + inspect round-trip.
async fn create_once(config: VmConfig) -> Result<()> {
    let manager = MockVmManager::new();
    let record = manager.create_vm(config).await?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    manager.close().await?;
    Ok(())
}

/// Scripted lifecycle: create two VMs, list, stop one, inspect, delete.
async fn run_demo() -> Result<()> {
    println!("Running mockvisor lifecycle demo...");
    let manager = MockVmManager::new();

    let web = VmConfig {
        memory_mb: 1024,
        vcpus: 2,
        disk_path: Some("/var/lib/vms/web.img".to_string()),
        disk_size_gb: Some(20),
        network: Some("default".to_string()),
        ..VmConfig::new("web-vm")
    };
    let db = VmConfig {
        memory_mb: 2048,
        vcpus: 4,
        ..VmConfig::new("db-vm")
    };

    manager.create_vm(web).await?;
    manager.create_vm(db).await?;

    let mut names = manager.list_vms().await?;
    names.sort();
    println!("VMs after create: {names:?}");

    manager.stop_vm("web-vm").await?;
    for name in &names {
        let record = manager.vm_info(name).await?;
        println!(
            "  {} -> {} ({} MB, {} vcpus)",
            record.config.name, record.state, record.config.memory_mb, record.config.vcpus
        );
    }

    manager.delete_vm("db-vm").await?;
    manager.delete_vm("web-vm").await?;
    println!("VMs after delete: {:?}", manager.list_vms().await?);

    manager.close().await?;
    info!("Demo finished");
    Ok(())
}
