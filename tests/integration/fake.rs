//! In-memory runtime used by the workflow tests

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use dockconsole::core::{ContainerSummary, ImageSummary, RuntimeError};
use dockconsole::docker::{
    Change, ChangeKind, HistoryEntry, InspectRecord, PushMessage, RuntimeClient, RuntimeResult,
    TopResult,
};

#[derive(Default)]
struct State {
    containers: Vec<ContainerSummary>,
    images: Vec<ImageSummary>,
    failures: HashMap<(String, String), RuntimeError>,
    calls: Vec<String>,
}

/// A runtime whose containers live in a `Vec`
#[derive(Default)]
pub struct FakeRuntime {
    state: Mutex<State>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a running container created at a fixed time
    pub fn with_container(self, id: &str, image: &str) -> Self {
        self.state.lock().unwrap().containers.push(ContainerSummary {
            id: id.to_string(),
            names: vec![format!("/{}", id)],
            image: image.to_string(),
            command: "sleep infinity".to_string(),
            created: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            status: "Up 5 minutes".to_string(),
        });
        self
    }

    pub fn with_image(self, id: &str, repo_tags: &[&str]) -> Self {
        self.state.lock().unwrap().images.push(ImageSummary {
            id: id.to_string(),
            repo_tags: repo_tags.iter().map(|t| t.to_string()).collect(),
            created: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            size: 1024,
        });
        self
    }

    /// Make `call` on `id` fail with `error`
    pub fn failing(self, call: &str, id: &str, error: RuntimeError) -> Self {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert((call.to_string(), id.to_string()), error);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn status_of(&self, id: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .containers
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.status.clone())
    }

    pub fn remove_externally(&self, id: &str) {
        self.state.lock().unwrap().containers.retain(|c| c.id != id);
    }

    fn record(&self, call: &str, id: &str) -> RuntimeResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("{} {}", call, id));
        match state.failures.get(&(call.to_string(), id.to_string())) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn set_status(&self, call: &str, id: &str, status: &str) -> RuntimeResult<()> {
        self.record(call, id)?;
        let mut state = self.state.lock().unwrap();
        match state.containers.iter_mut().find(|c| c.id == id) {
            Some(container) => {
                container.status = status.to_string();
                Ok(())
            }
            None => Err(not_found(id)),
        }
    }
}

fn not_found(id: &str) -> RuntimeError {
    RuntimeError::Api {
        status: 404,
        explanation: format!("No such container: {}", id),
    }
}

#[async_trait]
impl RuntimeClient for FakeRuntime {
    async fn list_containers(&self, all: bool) -> RuntimeResult<Vec<ContainerSummary>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .containers
            .iter()
            .filter(|c| all || c.status.starts_with("Up"))
            .cloned()
            .collect())
    }

    async fn list_images(&self, _all: bool) -> RuntimeResult<Vec<ImageSummary>> {
        Ok(self.state.lock().unwrap().images.clone())
    }

    async fn inspect_container(&self, id: &str) -> RuntimeResult<InspectRecord> {
        self.record("inspect", id)?;
        Ok(InspectRecord {
            title: "Container Information".to_string(),
            items: vec![("Id".to_string(), id.to_string())],
        })
    }

    async fn inspect_image(&self, id: &str) -> RuntimeResult<InspectRecord> {
        self.record("inspect", id)?;
        Ok(InspectRecord {
            title: "Image Information".to_string(),
            items: vec![("Id".to_string(), id.to_string())],
        })
    }

    async fn remove_container(&self, id: &str) -> RuntimeResult<()> {
        self.record("remove", id)?;
        self.remove_externally(id);
        Ok(())
    }

    async fn remove_image(&self, id: &str) -> RuntimeResult<()> {
        self.record("remove", id)?;
        self.state
            .lock()
            .unwrap()
            .images
            .retain(|i| !i.repo_tags.iter().any(|t| t == id) && i.id != id);
        Ok(())
    }

    async fn start(&self, id: &str) -> RuntimeResult<()> {
        self.set_status("start", id, "Up 1 second")
    }

    async fn stop(&self, id: &str) -> RuntimeResult<()> {
        self.set_status("stop", id, "Exited (0) 1 second ago")
    }

    async fn pause(&self, id: &str) -> RuntimeResult<()> {
        self.set_status("pause", id, "Up 5 minutes (Paused)")
    }

    async fn unpause(&self, id: &str) -> RuntimeResult<()> {
        self.set_status("unpause", id, "Up 5 minutes")
    }

    async fn kill(&self, id: &str) -> RuntimeResult<()> {
        self.set_status("kill", id, "Exited (137) 1 second ago")
    }

    async fn restart(&self, id: &str) -> RuntimeResult<()> {
        self.set_status("restart", id, "Up 1 second")
    }

    async fn rename(&self, id: &str, new_name: &str) -> RuntimeResult<()> {
        self.record("rename", id)?;
        let mut state = self.state.lock().unwrap();
        match state.containers.iter_mut().find(|c| c.id == id) {
            Some(container) => {
                container.names = vec![format!("/{}", new_name)];
                Ok(())
            }
            None => Err(not_found(id)),
        }
    }

    async fn commit(&self, id: &str, _repo: &str, _tag: &str) -> RuntimeResult<()> {
        self.record("commit", id)
    }

    async fn tag_image(&self, id: &str, _repo: &str, _tag: &str) -> RuntimeResult<()> {
        self.record("tag", id)
    }

    async fn diff(&self, id: &str) -> RuntimeResult<Vec<Change>> {
        self.record("diff", id)?;
        Ok(vec![Change {
            kind: ChangeKind::Added,
            path: "/tmp/out".to_string(),
        }])
    }

    async fn top(&self, id: &str) -> RuntimeResult<TopResult> {
        self.record("top", id)?;
        Ok(TopResult {
            titles: vec!["PID".to_string(), "CMD".to_string()],
            processes: vec![vec!["1".to_string(), "sleep infinity".to_string()]],
        })
    }

    async fn history(&self, id: &str) -> RuntimeResult<Vec<HistoryEntry>> {
        self.record("history", id)?;
        Ok(vec![])
    }

    async fn push(&self, repo: &str, tag: &str) -> RuntimeResult<Vec<PushMessage>> {
        self.record("push", &format!("{}:{}", repo, tag))?;
        Ok(vec![PushMessage::Status("Pushed".to_string())])
    }
}
