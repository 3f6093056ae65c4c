//! Image operations

use bollard::image::{ListImagesOptions, PushImageOptions, RemoveImageOptions, TagImageOptions};
use futures::StreamExt;
use tracing::{debug, info, warn};

use crate::core::{ImageSummary, RuntimeError};
use crate::docker::runtime::{HistoryEntry, InspectRecord, PushMessage, RuntimeResult};
use crate::docker::DockerClient;

impl DockerClient {
    /// List images; intermediate layers only when `all` is set
    pub async fn list_images(&self, all: bool) -> RuntimeResult<Vec<ImageSummary>> {
        debug!("Listing images (all={})", all);

        let options = ListImagesOptions::<String> {
            all,
            ..Default::default()
        };

        let images = self
            .inner()
            .list_images(Some(options))
            .await
            .map_err(RuntimeError::from)?;

        debug!("Found {} images", images.len());

        Ok(images.into_iter().map(|i| i.into()).collect())
    }

    /// Remove an image by id or `repo:tag`
    pub async fn remove_image(&self, id: &str, force: bool) -> RuntimeResult<()> {
        warn!("Removing image: {} (force={})", id, force);

        let options = RemoveImageOptions {
            force,
            ..Default::default()
        };

        self.inner()
            .remove_image(id, Some(options), None)
            .await
            .map_err(RuntimeError::from)?;

        info!("Image {} removed successfully", id);
        Ok(())
    }

    /// Add `repo:tag` to an existing image
    pub async fn tag_image(&self, id: &str, repo: &str, tag: &str) -> RuntimeResult<()> {
        info!("Tagging image {} as {}:{}", id, repo, tag);

        let options = TagImageOptions { repo, tag };

        self.inner()
            .tag_image(id, Some(options))
            .await
            .map_err(RuntimeError::from)?;

        Ok(())
    }

    /// Inspect an image
    pub async fn inspect_image(&self, id: &str) -> RuntimeResult<InspectRecord> {
        debug!("Inspecting image {}", id);

        let inspect = self
            .inner()
            .inspect_image(id)
            .await
            .map_err(RuntimeError::from)?;

        let value = serde_json::to_value(&inspect)
            .map_err(|e| RuntimeError::Transport(format!("Failed to decode inspect: {}", e)))?;

        Ok(InspectRecord::from_json("Image Information", &value))
    }

    /// Layer history of an image, newest first
    pub async fn image_history(&self, id: &str) -> RuntimeResult<Vec<HistoryEntry>> {
        debug!("Fetching history for image {}", id);

        let history = self
            .inner()
            .image_history(id)
            .await
            .map_err(RuntimeError::from)?;

        Ok(history
            .into_iter()
            .map(|h| HistoryEntry {
                id: h.id,
                created_by: h.created_by,
            })
            .collect())
    }

    /// Push `repo:tag` to its registry, collecting the progress stream
    ///
    /// The call only fails on transport errors; registry-side failures
    /// arrive as [`PushMessage::Error`] lines.
    pub async fn push_image(&self, repo: &str, tag: &str) -> RuntimeResult<Vec<PushMessage>> {
        info!("Pushing image {}:{}", repo, tag);

        let options = PushImageOptions { tag };
        let mut stream = self.inner().push_image(repo, Some(options), None);

        let mut messages = Vec::new();
        while let Some(item) = stream.next().await {
            let info = item.map_err(RuntimeError::from)?;
            if let Some(error) = info.error {
                warn!("Push of {}:{} reported: {}", repo, tag, error);
                messages.push(PushMessage::Error(error));
            } else if let Some(status) = info.status {
                messages.push(PushMessage::Status(status));
            }
        }

        Ok(messages)
    }
}

impl From<bollard::models::ImageSummary> for ImageSummary {
    fn from(i: bollard::models::ImageSummary) -> Self {
        Self {
            id: i.id,
            repo_tags: i.repo_tags,
            created: chrono::DateTime::from_timestamp(i.created, 0).unwrap_or_else(chrono::Utc::now),
            size: i.size,
        }
    }
}
