//! Container operations

use bollard::container::{
    InspectContainerOptions, KillContainerOptions, ListContainersOptions,
    RemoveContainerOptions, RenameContainerOptions, RestartContainerOptions,
    StopContainerOptions, TopOptions,
};
use tracing::{debug, info, warn};

use crate::core::{ContainerSummary, RuntimeError};
use crate::docker::runtime::{Change, ChangeKind, InspectRecord, RuntimeResult, TopResult};
use crate::docker::DockerClient;

impl DockerClient {
    /// List containers; stopped ones only when `all` is set
    pub async fn list_containers(&self, all: bool) -> RuntimeResult<Vec<ContainerSummary>> {
        debug!("Listing containers (all={})", all);

        let options = ListContainersOptions::<String> {
            all,
            ..Default::default()
        };

        let containers = self
            .inner()
            .list_containers(Some(options))
            .await
            .map_err(RuntimeError::from)?;

        debug!("Found {} containers", containers.len());

        Ok(containers.into_iter().map(|c| c.into()).collect())
    }

    /// Start a container
    pub async fn start_container(&self, id: &str) -> RuntimeResult<()> {
        info!("Starting container: {}", id);

        self.inner()
            .start_container::<String>(id, None)
            .await
            .map_err(RuntimeError::from)?;

        info!("Container {} started successfully", id);
        Ok(())
    }

    /// Stop a container
    pub async fn stop_container(&self, id: &str, timeout: Option<i64>) -> RuntimeResult<()> {
        let timeout = timeout.unwrap_or(10);
        info!("Stopping container: {} (timeout={}s)", id, timeout);

        let options = StopContainerOptions { t: timeout };

        self.inner()
            .stop_container(id, Some(options))
            .await
            .map_err(RuntimeError::from)?;

        info!("Container {} stopped successfully", id);
        Ok(())
    }

    /// Restart a container
    pub async fn restart_container(&self, id: &str, timeout: Option<isize>) -> RuntimeResult<()> {
        let timeout = timeout.unwrap_or(10);
        info!("Restarting container: {} (timeout={}s)", id, timeout);

        let options = RestartContainerOptions { t: timeout };

        self.inner()
            .restart_container(id, Some(options))
            .await
            .map_err(RuntimeError::from)?;

        info!("Container {} restarted successfully", id);
        Ok(())
    }

    /// Pause a container
    pub async fn pause_container(&self, id: &str) -> RuntimeResult<()> {
        info!("Pausing container: {}", id);

        self.inner()
            .pause_container(id)
            .await
            .map_err(RuntimeError::from)?;

        info!("Container {} paused successfully", id);
        Ok(())
    }

    /// Unpause a container
    pub async fn unpause_container(&self, id: &str) -> RuntimeResult<()> {
        info!("Unpausing container: {}", id);

        self.inner()
            .unpause_container(id)
            .await
            .map_err(RuntimeError::from)?;

        info!("Container {} unpaused successfully", id);
        Ok(())
    }

    /// Kill a container
    pub async fn kill_container(&self, id: &str, signal: Option<&str>) -> RuntimeResult<()> {
        let signal = signal.unwrap_or("SIGKILL");
        warn!("Killing container: {} (signal={})", id, signal);

        let options = KillContainerOptions { signal };

        self.inner()
            .kill_container(id, Some(options))
            .await
            .map_err(RuntimeError::from)?;

        info!("Container {} killed successfully", id);
        Ok(())
    }

    /// Remove a container
    pub async fn remove_container(&self, id: &str, force: bool) -> RuntimeResult<()> {
        warn!("Removing container: {} (force={})", id, force);

        let options = RemoveContainerOptions {
            v: false,
            force,
            link: false,
        };

        self.inner()
            .remove_container(id, Some(options))
            .await
            .map_err(RuntimeError::from)?;

        info!("Container {} removed successfully", id);
        Ok(())
    }

    /// Rename a container
    pub async fn rename_container(&self, id: &str, new_name: &str) -> RuntimeResult<()> {
        info!("Renaming container: {} -> {}", id, new_name);

        let options = RenameContainerOptions { name: new_name };

        self.inner()
            .rename_container(id, options)
            .await
            .map_err(RuntimeError::from)?;

        Ok(())
    }

    /// Commit a container's filesystem as `repo:tag`
    pub async fn commit_container(&self, id: &str, repo: &str, tag: &str) -> RuntimeResult<()> {
        info!("Committing container {} as {}:{}", id, repo, tag);

        let options = bollard::image::CommitContainerOptions {
            container: id,
            repo,
            tag,
            pause: true,
            ..Default::default()
        };

        let commit = self
            .inner()
            .commit_container(options, bollard::container::Config::<String>::default())
            .await
            .map_err(RuntimeError::from)?;

        debug!("Commit created image {:?}", commit.id);
        Ok(())
    }

    /// Inspect a container
    pub async fn inspect_container(&self, id: &str) -> RuntimeResult<InspectRecord> {
        debug!("Inspecting container {}", id);

        let inspect = self
            .inner()
            .inspect_container(id, None::<InspectContainerOptions>)
            .await
            .map_err(RuntimeError::from)?;

        let value = serde_json::to_value(&inspect)
            .map_err(|e| RuntimeError::Transport(format!("Failed to decode inspect: {}", e)))?;

        Ok(InspectRecord::from_json("Container Information", &value))
    }

    /// Filesystem changes of a container
    pub async fn container_changes(&self, id: &str) -> RuntimeResult<Vec<Change>> {
        debug!("Fetching changes for container {}", id);

        let changes = self
            .inner()
            .container_changes(id)
            .await
            .map_err(RuntimeError::from)?
            .unwrap_or_default();

        Ok(changes
            .into_iter()
            .map(|c| Change {
                kind: parse_change_kind(&serde_json::to_value(&c.kind).unwrap_or_default()),
                path: c.path,
            })
            .collect())
    }

    /// Process list of a running container
    pub async fn top_processes(&self, id: &str) -> RuntimeResult<TopResult> {
        debug!("Fetching processes for container {}", id);

        let options = TopOptions { ps_args: "aux" };

        let top = self
            .inner()
            .top_processes(id, Some(options))
            .await
            .map_err(RuntimeError::from)?;

        Ok(TopResult {
            titles: top.titles.unwrap_or_default(),
            processes: top.processes.unwrap_or_default(),
        })
    }
}

// Conversion implementations
impl From<bollard::models::ContainerSummary> for ContainerSummary {
    fn from(c: bollard::models::ContainerSummary) -> Self {
        Self {
            id: c.id.unwrap_or_default(),
            names: c.names.unwrap_or_default(),
            image: c.image.unwrap_or_default(),
            command: c.command.unwrap_or_default(),
            created: chrono::DateTime::from_timestamp(c.created.unwrap_or(0), 0)
                .unwrap_or_else(chrono::Utc::now),
            status: c.status.unwrap_or_default(),
        }
    }
}

/// Daemon change kinds serialize as 0 (modified), 1 (added), 2 (deleted)
fn parse_change_kind(value: &serde_json::Value) -> ChangeKind {
    match value.as_u64() {
        Some(1) => ChangeKind::Added,
        Some(2) => ChangeKind::Deleted,
        Some(_) => ChangeKind::Modified,
        None => match value.as_str() {
            Some("A") | Some("1") => ChangeKind::Added,
            Some("D") | Some("2") => ChangeKind::Deleted,
            _ => ChangeKind::Modified,
        },
    }
}
