pub mod client;
pub mod containers;
pub mod images;
pub mod runtime;

pub use client::DockerClient;
pub use runtime::{
    Change, ChangeKind, HistoryEntry, InspectRecord, PushMessage, RuntimeClient, RuntimeResult,
    TopResult,
};

#[cfg(test)]
pub use runtime::MockRuntimeClient;
