//! Running operation plans against the runtime
//!
//! Every target gets its own call; calls run concurrently and one target's
//! failure never aborts its siblings.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::actions::{Operation, OperationPlan};
use crate::core::{new_batch_id, BatchId, EntityId, EntityKind, RuntimeError};
use crate::docker::{Change, HistoryEntry, InspectRecord, PushMessage, RuntimeClient, TopResult};
use crate::state::Dialog;

/// What a successful call produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationOutput {
    Done,
    Inspect(InspectRecord),
    Diff(Vec<Change>),
    Top(TopResult),
    History(Vec<HistoryEntry>),
    Push(Vec<PushMessage>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetOutcome {
    pub id: EntityId,
    pub result: Result<OperationOutput, RuntimeError>,
}

/// Per-target results of one executed plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub batch: BatchId,
    pub kind: EntityKind,
    pub operation: Operation,
    pub outcomes: Vec<TargetOutcome>,
}

impl BatchReport {
    pub fn any_success(&self) -> bool {
        self.outcomes.iter().any(|o| o.result.is_ok())
    }

    /// True if at least one target was mutated, so listings are stale
    pub fn changed_runtime(&self) -> bool {
        self.operation.is_mutation() && self.any_success()
    }

    pub fn failures(&self) -> Vec<(EntityId, RuntimeError)> {
        self.outcomes
            .iter()
            .filter_map(|o| match &o.result {
                Err(e) => Some((o.id.clone(), e.clone())),
                Ok(_) => None,
            })
            .collect()
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &str> {
        self.outcomes
            .iter()
            .filter(|o| o.result.is_ok())
            .map(|o| o.id.as_str())
    }

    /// Dialog listing every failed target, if any failed
    pub fn failure_dialog(&self) -> Option<Dialog> {
        let failures = self.failures();
        if failures.is_empty() {
            None
        } else {
            Some(Dialog::runtime_failures(&failures))
        }
    }

    /// Dialog presenting the output of a query operation
    pub fn result_dialog(&self) -> Option<Dialog> {
        let outcome = self.outcomes.iter().find(|o| o.result.is_ok())?;
        let output = outcome.result.as_ref().ok()?;

        let dialog = match output {
            OperationOutput::Done => return None,
            OperationOutput::Inspect(record) => Dialog::inspect(record),
            OperationOutput::Diff(changes) => Dialog::table(
                format!("Changes: {}", outcome.id),
                &["Kind", "Path"],
                changes
                    .iter()
                    .map(|c| vec![c.kind.code().to_string(), c.path.clone()])
                    .collect(),
            ),
            OperationOutput::Top(top) => {
                let headers: Vec<&str> = top.titles.iter().map(String::as_str).collect();
                Dialog::table(
                    format!("Processes: {}", outcome.id),
                    &headers,
                    top.processes.clone(),
                )
            }
            OperationOutput::History(entries) => Dialog::table(
                format!("History: {}", outcome.id),
                &["Id", "Created By"],
                entries
                    .iter()
                    .map(|h| vec![crate::core::short_id(&h.id), h.created_by.clone()])
                    .collect(),
            ),
            OperationOutput::Push(messages) => Dialog::message(
                format!("Push: {}", outcome.id),
                messages.iter().map(|m| m.text().to_string()).collect(),
            ),
        };

        Some(dialog)
    }
}

/// Issue one runtime call for one target
pub async fn run_operation(
    client: &dyn RuntimeClient,
    kind: EntityKind,
    operation: &Operation,
    id: &str,
) -> Result<OperationOutput, RuntimeError> {
    use EntityKind::{Container, Image};

    let output = match (operation, kind) {
        (Operation::Remove, Container) => client.remove_container(id).await.map(done)?,
        (Operation::Remove, Image) => client.remove_image(id).await.map(done)?,
        (Operation::Start, _) => client.start(id).await.map(done)?,
        (Operation::Stop, _) => client.stop(id).await.map(done)?,
        (Operation::Pause, _) => client.pause(id).await.map(done)?,
        (Operation::Unpause, _) => client.unpause(id).await.map(done)?,
        (Operation::Kill, _) => client.kill(id).await.map(done)?,
        (Operation::Restart, _) => client.restart(id).await.map(done)?,
        (Operation::Rename { new_name }, _) => client.rename(id, new_name).await.map(done)?,
        (Operation::Commit { repo, tag }, _) => client.commit(id, repo, tag).await.map(done)?,
        (Operation::Tag { repo, tag }, _) => client.tag_image(id, repo, tag).await.map(done)?,
        (Operation::Inspect, Container) => {
            OperationOutput::Inspect(client.inspect_container(id).await?)
        }
        (Operation::Inspect, Image) => OperationOutput::Inspect(client.inspect_image(id).await?),
        (Operation::Diff, _) => OperationOutput::Diff(client.diff(id).await?),
        (Operation::Top, _) => OperationOutput::Top(client.top(id).await?),
        (Operation::History, _) => OperationOutput::History(client.history(id).await?),
        (Operation::Push { repo, tag }, _) => OperationOutput::Push(client.push(repo, tag).await?),
    };

    Ok(output)
}

fn done(_: ()) -> OperationOutput {
    OperationOutput::Done
}

/// Run a plan to completion, one concurrent call per target
pub async fn execute(client: Arc<dyn RuntimeClient>, plan: OperationPlan) -> BatchReport {
    let batch = new_batch_id();
    info!(
        "{} {} {}(s) [batch {}]",
        plan.operation.verb(),
        plan.targets.len(),
        plan.kind,
        batch
    );

    let kind = plan.kind;
    let operation = &plan.operation;
    let calls = plan.targets.iter().map(|id| {
        let client = Arc::clone(&client);
        async move {
            let result = run_operation(client.as_ref(), kind, operation, id).await;
            match &result {
                Ok(_) => debug!("{} {} succeeded", operation.verb(), id),
                Err(e) => warn!("{} {} failed: {}", operation.verb(), id, e),
            }
            TargetOutcome {
                id: id.clone(),
                result,
            }
        }
    });

    let outcomes = join_all(calls).await;

    BatchReport {
        batch,
        kind: plan.kind,
        operation: plan.operation,
        outcomes,
    }
}

/// Execute a plan off the UI task, delivering the report on `tx`
pub fn spawn_batch(
    client: Arc<dyn RuntimeClient>,
    plan: OperationPlan,
    tx: mpsc::Sender<BatchReport>,
) {
    tokio::spawn(async move {
        let report = execute(client, plan).await;
        if tx.send(report).await.is_err() {
            debug!("Batch report dropped, receiver closed");
        }
    });
}
