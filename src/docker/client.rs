use std::sync::Arc;

use async_trait::async_trait;
use bollard::Docker;
use tracing::{debug, info};

use crate::core::{ConnectionInfo, ContainerSummary, ImageSummary, RuntimeError};
use crate::docker::runtime::{
    Change, HistoryEntry, InspectRecord, PushMessage, RuntimeClient, RuntimeResult, TopResult,
};

/// Seconds bollard waits on a single request
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Docker client wrapper
#[derive(Clone)]
pub struct DockerClient {
    inner: Arc<Docker>,
    connection_info: ConnectionInfo,
}

impl DockerClient {
    /// Create a new client from environment (DOCKER_HOST, etc.)
    pub async fn from_env() -> RuntimeResult<Self> {
        info!("Creating Docker client from environment");

        let docker = Docker::connect_with_local_defaults()
            .map_err(|e| RuntimeError::Transport(e.to_string()))?;

        Self::new(docker, "local").await
    }

    /// Create a new client with custom host
    pub async fn with_host(host: &str) -> RuntimeResult<Self> {
        info!("Creating Docker client with host: {}", host);

        let docker = if let Some(path) = host.strip_prefix("unix://") {
            Docker::connect_with_unix(path, REQUEST_TIMEOUT_SECS, bollard::API_DEFAULT_VERSION)
        } else {
            Docker::connect_with_http(host, REQUEST_TIMEOUT_SECS, bollard::API_DEFAULT_VERSION)
        }
        .map_err(|e| RuntimeError::Transport(e.to_string()))?;

        Self::new(docker, host).await
    }

    /// Internal constructor
    async fn new(docker: Docker, host: &str) -> RuntimeResult<Self> {
        debug!("Fetching Docker version information");

        let version = docker.version().await.map_err(RuntimeError::from)?;

        let info = ConnectionInfo {
            host: host.to_string(),
            version: version.version.unwrap_or_else(|| "unknown".to_string()),
            api_version: version.api_version.unwrap_or_else(|| "unknown".to_string()),
            os: version.os.unwrap_or_else(|| "unknown".to_string()),
            arch: version.arch.unwrap_or_else(|| "unknown".to_string()),
        };

        info!(
            "Docker client initialized: {} (API: {}) on {}/{}",
            info.version, info.api_version, info.os, info.arch
        );

        Ok(Self {
            inner: Arc::new(docker),
            connection_info: info,
        })
    }

    /// Get connection information
    pub fn connection_info(&self) -> &ConnectionInfo {
        &self.connection_info
    }

    /// Ping the Docker daemon
    pub async fn ping(&self) -> RuntimeResult<String> {
        debug!("Pinging Docker daemon");

        let response = self.inner.ping().await.map_err(RuntimeError::from)?;

        Ok(response)
    }

    /// Get the inner Docker client (for advanced usage)
    pub fn inner(&self) -> &Docker {
        &self.inner
    }
}

#[async_trait]
impl RuntimeClient for DockerClient {
    async fn list_containers(&self, all: bool) -> RuntimeResult<Vec<ContainerSummary>> {
        DockerClient::list_containers(self, all).await
    }

    async fn list_images(&self, all: bool) -> RuntimeResult<Vec<ImageSummary>> {
        DockerClient::list_images(self, all).await
    }

    async fn inspect_container(&self, id: &str) -> RuntimeResult<InspectRecord> {
        DockerClient::inspect_container(self, id).await
    }

    async fn inspect_image(&self, id: &str) -> RuntimeResult<InspectRecord> {
        DockerClient::inspect_image(self, id).await
    }

    async fn remove_container(&self, id: &str) -> RuntimeResult<()> {
        DockerClient::remove_container(self, id, false).await
    }

    async fn remove_image(&self, id: &str) -> RuntimeResult<()> {
        DockerClient::remove_image(self, id, false).await
    }

    async fn start(&self, id: &str) -> RuntimeResult<()> {
        self.start_container(id).await
    }

    async fn stop(&self, id: &str) -> RuntimeResult<()> {
        self.stop_container(id, None).await
    }

    async fn pause(&self, id: &str) -> RuntimeResult<()> {
        self.pause_container(id).await
    }

    async fn unpause(&self, id: &str) -> RuntimeResult<()> {
        self.unpause_container(id).await
    }

    async fn kill(&self, id: &str) -> RuntimeResult<()> {
        self.kill_container(id, None).await
    }

    async fn restart(&self, id: &str) -> RuntimeResult<()> {
        self.restart_container(id, None).await
    }

    async fn rename(&self, id: &str, new_name: &str) -> RuntimeResult<()> {
        self.rename_container(id, new_name).await
    }

    async fn commit(&self, id: &str, repo: &str, tag: &str) -> RuntimeResult<()> {
        self.commit_container(id, repo, tag).await
    }

    async fn tag_image(&self, id: &str, repo: &str, tag: &str) -> RuntimeResult<()> {
        DockerClient::tag_image(self, id, repo, tag).await
    }

    async fn diff(&self, id: &str) -> RuntimeResult<Vec<Change>> {
        self.container_changes(id).await
    }

    async fn top(&self, id: &str) -> RuntimeResult<TopResult> {
        self.top_processes(id).await
    }

    async fn history(&self, id: &str) -> RuntimeResult<Vec<HistoryEntry>> {
        self.image_history(id).await
    }

    async fn push(&self, repo: &str, tag: &str) -> RuntimeResult<Vec<PushMessage>> {
        self.push_image(repo, tag).await
    }
}
