//! Shells out to the local container CLI (default `lxc`), the Rust-async
//! successor to the original's `popen`/`pclose` command runner
//! (`lxc_manager.c: execute_command`).

use async_trait::async_trait;
use fleet_core::{ContainerSpec, ContainerState, ResourceSample};
use tokio::process::Command;
use tracing::{debug, warn};

use super::{RuntimeDriver, RuntimeError};

const DEFAULT_IMAGE: &str = "ubuntu:20.04";
const DEFAULT_MAX_CONTAINERS: u32 = 50;

/// Drives the host container runtime by shelling out to its CLI.
///
/// The binary name comes from `FLEET_RUNTIME_CLI` (default `"lxc"`),
/// overridable for hosts whose runtime CLI has a different name.
pub struct ShellRuntimeDriver {
    cli: String,
}

impl ShellRuntimeDriver {
    pub fn new() -> Self {
        let cli = std::env::var("FLEET_RUNTIME_CLI").unwrap_or_else(|_| "lxc".to_string());
        Self { cli }
    }

    /// Run `{cli} {args}`, capturing stdout as a UTF-8 string. Non-UTF-8
    /// output is treated as empty rather than failing the call — the
    /// runtime's output is diagnostic text, never binary.
    async fn run(&self, name: &str, args: &[&str]) -> Result<String, RuntimeError> {
        debug!(cli = %self.cli, ?args, "invoking runtime driver");
        let output = Command::new(&self.cli).args(args).output().await?;
        if !output.status.success() {
            return Err(RuntimeError::CommandFailed {
                name: name.to_string(),
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// `sh -c "<pipeline>"`, used for the `top`/`free`/`df` shell pipelines
    /// that have no single-binary equivalent.
    async fn run_pipeline(&self, pipeline: &str) -> Result<String, RuntimeError> {
        let output = Command::new("sh").arg("-c").arg(pipeline).output().await?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl Default for ShellRuntimeDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RuntimeDriver for ShellRuntimeDriver {
    async fn create(&self, spec: &ContainerSpec) -> Result<(), RuntimeError> {
        if self.exists(&spec.name).await? {
            return Ok(());
        }
        let image = spec.image.as_deref().unwrap_or(DEFAULT_IMAGE);
        self.run(&spec.name, &["launch", image, &spec.name]).await?;
        Ok(())
    }

    async fn start(&self, name: &str) -> Result<(), RuntimeError> {
        self.run(name, &["start", name]).await?;
        Ok(())
    }

    async fn stop(&self, name: &str) -> Result<(), RuntimeError> {
        self.run(name, &["stop", name]).await?;
        Ok(())
    }

    async fn destroy(&self, name: &str) -> Result<(), RuntimeError> {
        if !self.exists(name).await? {
            return Ok(());
        }
        // stop then destroy is the cleanup order (§4.8); ignore the stop's
        // own error since an already-stopped container is not a failure.
        self.stop(name).await.ok();
        self.run(name, &["delete", name]).await?;
        Ok(())
    }

    async fn exists(&self, name: &str) -> Result<bool, RuntimeError> {
        // `lxc info <name>` exits non-zero when the container is unknown;
        // that's a legitimate "false", not a command failure, so inspect
        // the exit status directly instead of going through `run`.
        let status = Command::new(&self.cli).args(["info", name]).output().await?.status;
        Ok(status.success())
    }

    async fn query_state(&self, name: &str) -> Result<ContainerState, RuntimeError> {
        let out = self.run(name, &["list", name, "--format", "csv", "-c", "s"]).await?;
        Ok(match out.trim().to_ascii_uppercase().as_str() {
            "STOPPED" => ContainerState::Stopped,
            "STARTING" => ContainerState::Starting,
            "RUNNING" => ContainerState::Running,
            "STOPPING" => ContainerState::Stopping,
            other => {
                warn!(name, output = other, "unrecognized runtime state, mapping to ERROR");
                ContainerState::Error
            }
        })
    }

    async fn sample_resources(&self) -> Result<ResourceSample, RuntimeError> {
        let cpu_out = self.run_pipeline("top -bn1 | grep 'Cpu(s)' | awk '{print $2}' | cut -d'%' -f1").await?;
        let mem_out = self.run_pipeline("free | grep Mem | awk '{printf \"%.1f\", $3/$2 * 100.0}'").await?;
        let disk_out = self.run_pipeline("df / | tail -1 | awk '{print $5}' | cut -d'%' -f1").await?;
        let count_out = self.run_pipeline(&format!("{} list --format csv | wc -l", self.cli)).await?;

        Ok(ResourceSample {
            cpu_used: cpu_out.parse().unwrap_or(0.0),
            mem_used: mem_out.parse().unwrap_or(0.0),
            disk_used: disk_out.parse().unwrap_or(0.0),
            container_count: count_out.trim().parse().unwrap_or(0),
            max_containers: DEFAULT_MAX_CONTAINERS,
        })
    }
}
