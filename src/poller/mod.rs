//! Background polling of the runtime listings
//!
//! One [`Poller`] runs per tab. Each cycle fetches the listing off the UI
//! task, normalizes it into a [`Snapshot`] and hands it to the main loop as a
//! [`PollCycle`]. The poller then waits for the main loop to acknowledge the
//! cycle before sleeping, so a slow fetch or a slow render never stacks up
//! overlapping cycles.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::core::{ContainerSummary, Entity, EntityKind, ImageSummary, RuntimeError, Snapshot};
use crate::docker::{RuntimeClient, RuntimeResult};

/// Raw listing returned by a single fetch
#[derive(Debug, Clone)]
pub enum RawListing {
    Containers(Vec<ContainerSummary>),
    Images(Vec<ImageSummary>),
}

/// One completed poll, waiting to be reconciled
#[derive(Debug)]
pub struct PollCycle {
    pub kind: EntityKind,
    pub result: Result<Snapshot, RuntimeError>,
    ack: oneshot::Sender<()>,
}

impl PollCycle {
    /// Tell the poller this cycle has been reconciled and rendered
    pub fn ack(self) {
        // The poller may already be gone during teardown
        let _ = self.ack.send(());
    }

    /// Split off the payload, returning the acknowledgement token
    pub fn into_parts(self) -> (EntityKind, Result<Snapshot, RuntimeError>, CycleAck) {
        (self.kind, self.result, CycleAck(self.ack))
    }
}

/// Acknowledgement token for a [`PollCycle`] whose payload was taken
#[derive(Debug)]
pub struct CycleAck(oneshot::Sender<()>);

impl CycleAck {
    pub fn send(self) {
        let _ = self.0.send(());
    }
}

/// Normalize a raw listing into a sorted snapshot
pub fn process(raw: RawListing, now: DateTime<Utc>) -> Snapshot {
    match raw {
        RawListing::Containers(containers) => Snapshot::new(
            EntityKind::Container,
            containers
                .iter()
                .map(|c| Entity::from_container(c, now))
                .collect(),
        ),
        RawListing::Images(images) => Snapshot::new(
            EntityKind::Image,
            images
                .iter()
                .flat_map(|i| Entity::from_image(i, now))
                .collect(),
        ),
    }
}

/// A self-rescheduling fetch loop for one entity kind
pub struct Poller {
    client: Arc<dyn RuntimeClient>,
    kind: EntityKind,
    frequency: Duration,
    show_all: Arc<AtomicBool>,
    wake: Arc<Notify>,
}

impl Poller {
    pub fn new(
        client: Arc<dyn RuntimeClient>,
        kind: EntityKind,
        frequency: Duration,
        show_all: bool,
    ) -> Self {
        Self {
            client,
            kind,
            frequency,
            show_all: Arc::new(AtomicBool::new(show_all)),
            wake: Arc::new(Notify::new()),
        }
    }

    /// Perform one list call
    pub async fn fetch(&self) -> RuntimeResult<RawListing> {
        let all = self.show_all.load(Ordering::Relaxed);
        match self.kind {
            EntityKind::Container => self
                .client
                .list_containers(all)
                .await
                .map(RawListing::Containers),
            EntityKind::Image => self.client.list_images(all).await.map(RawListing::Images),
        }
    }

    /// Spawn the loop, delivering cycles on `tx`
    pub fn start(self, tx: mpsc::Sender<PollCycle>) -> PollerHandle {
        info!(
            "Starting {} poller (every {}ms)",
            self.kind,
            self.frequency.as_millis()
        );

        let wake = Arc::clone(&self.wake);
        let show_all = Arc::clone(&self.show_all);
        let task = tokio::spawn(self.run(tx));

        PollerHandle {
            wake,
            show_all,
            task,
        }
    }

    async fn run(self, tx: mpsc::Sender<PollCycle>) {
        loop {
            let result = self.fetch().await.map(|raw| process(raw, Utc::now()));

            match &result {
                Ok(snapshot) => debug!("Polled {} {}s", snapshot.len(), self.kind),
                Err(e) => warn!("Failed to poll {}s: {}", self.kind, e),
            }

            let (ack_tx, ack_rx) = oneshot::channel();
            let cycle = PollCycle {
                kind: self.kind,
                result,
                ack: ack_tx,
            };

            if tx.send(cycle).await.is_err() {
                debug!("Poll receiver dropped, stopping {} poller", self.kind);
                break;
            }

            // A dropped ack means the main loop discarded the cycle; carry on
            let _ = ack_rx.await;

            tokio::select! {
                _ = tokio::time::sleep(self.frequency) => {}
                _ = self.wake.notified() => debug!("Early {} poll requested", self.kind),
            }
        }
    }
}

/// Control surface of a running [`Poller`]
#[derive(Debug)]
pub struct PollerHandle {
    wake: Arc<Notify>,
    show_all: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Skip the rest of the current sleep
    ///
    /// A request made while a fetch is in flight is remembered and honored
    /// as soon as that cycle is acknowledged.
    pub fn poll_now(&self) {
        self.wake.notify_one();
    }

    /// Flip between running-only and all entities, returning the new setting
    pub fn toggle_show_all(&self) -> bool {
        let now_all = !self.show_all.fetch_xor(true, Ordering::Relaxed);
        info!("Show all toggled: {}", now_all);
        self.poll_now();
        now_all
    }

    pub fn show_all(&self) -> bool {
        self.show_all.load(Ordering::Relaxed)
    }

    pub fn stop(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docker::MockRuntimeClient;
    use std::sync::atomic::AtomicUsize;

    fn summary(id: &str, status: &str) -> ContainerSummary {
        ContainerSummary {
            id: id.to_string(),
            names: vec![format!("/{}", id)],
            image: "nginx".to_string(),
            status: status.to_string(),
            ..Default::default()
        }
    }

    fn counting_client(calls: Arc<AtomicUsize>) -> Arc<dyn RuntimeClient> {
        let mut mock = MockRuntimeClient::new();
        mock.expect_list_containers().returning(move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![summary("a", "Up 1 minute")])
        });
        Arc::new(mock)
    }

    #[test]
    fn test_process_sorts_and_normalizes() {
        let now = Utc::now();
        let older = ContainerSummary {
            created: now - chrono::Duration::days(4),
            ..summary("old", "Up 1 minute")
        };
        let newer = ContainerSummary {
            created: now,
            ..summary("new", "Up 1 minute")
        };

        let snapshot = process(RawListing::Containers(vec![older, newer]), now);
        let ids: Vec<&str> = snapshot.entities().iter().map(|e| e.id.as_str()).collect();

        assert_eq!(ids, vec!["new", "old"]);
        assert_eq!(snapshot.entities()[1].age_days, 4);
    }

    #[test]
    fn test_process_images_expands_tags() {
        let now = Utc::now();
        let image = ImageSummary {
            id: "sha256:1".to_string(),
            repo_tags: vec!["a:1".to_string(), "a:2".to_string()],
            created: now,
            size: 0,
        };

        let snapshot = process(RawListing::Images(vec![image]), now);
        assert_eq!(snapshot.kind(), EntityKind::Image);
        assert_eq!(snapshot.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poller_waits_for_ack() {
        let calls = Arc::new(AtomicUsize::new(0));
        let poller = Poller::new(
            counting_client(Arc::clone(&calls)),
            EntityKind::Container,
            Duration::from_secs(1),
            false,
        );
        let (tx, mut rx) = mpsc::channel(4);
        let handle = poller.start(tx);

        let cycle = rx.recv().await.unwrap();
        assert_eq!(cycle.kind, EntityKind::Container);
        assert_eq!(cycle.result.as_ref().unwrap().len(), 1);

        // Without an ack, no further fetch happens however long we wait
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(rx.try_recv().is_err());

        cycle.ack();
        let next = rx.recv().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        next.ack();

        handle.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_now_skips_sleep() {
        let calls = Arc::new(AtomicUsize::new(0));
        let poller = Poller::new(
            counting_client(Arc::clone(&calls)),
            EntityKind::Container,
            Duration::from_secs(3600),
            false,
        );
        let (tx, mut rx) = mpsc::channel(4);
        let handle = poller.start(tx);

        rx.recv().await.unwrap().ack();
        handle.poll_now();

        let started = tokio::time::Instant::now();
        rx.recv().await.unwrap().ack();
        assert!(started.elapsed() < Duration::from_secs(3600));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_is_reported_and_rescheduled() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut mock = MockRuntimeClient::new();
        mock.expect_list_containers().returning(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(RuntimeError::Transport("connection refused".to_string()))
            } else {
                Ok(vec![])
            }
        });

        let poller = Poller::new(
            Arc::new(mock),
            EntityKind::Container,
            Duration::from_millis(500),
            false,
        );
        let (tx, mut rx) = mpsc::channel(4);
        let _handle = poller.start(tx);

        let first = rx.recv().await.unwrap();
        assert!(matches!(first.result, Err(RuntimeError::Transport(_))));
        first.ack();

        let second = rx.recv().await.unwrap();
        assert!(second.result.is_ok());
        second.ack();
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_show_all_changes_fetch() {
        let mut mock = MockRuntimeClient::new();
        mock.expect_list_containers().returning(|all| {
            if all {
                Ok(vec![summary("a", "Up 1 minute"), summary("b", "Exited (0)")])
            } else {
                Ok(vec![summary("a", "Up 1 minute")])
            }
        });

        let poller = Poller::new(
            Arc::new(mock),
            EntityKind::Container,
            Duration::from_secs(3600),
            false,
        );
        let (tx, mut rx) = mpsc::channel(4);
        let handle = poller.start(tx);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.result.as_ref().unwrap().len(), 1);
        first.ack();

        assert!(handle.toggle_show_all());
        let second = rx.recv().await.unwrap();
        assert_eq!(second.result.as_ref().unwrap().len(), 2);
        second.ack();
    }

    #[tokio::test(start_paused = true)]
    async fn test_poller_stops_when_receiver_dropped() {
        let calls = Arc::new(AtomicUsize::new(0));
        let poller = Poller::new(
            counting_client(calls),
            EntityKind::Container,
            Duration::from_millis(100),
            false,
        );
        let (tx, rx) = mpsc::channel(1);
        let handle = poller.start(tx);
        drop(rx);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(handle.is_finished());
    }
}
