//! End-to-end flows: poll, reconcile, dispatch, execute, report

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use pretty_assertions::assert_eq;
use tokio::sync::mpsc;

use dockconsole::actions::{execute, Operation, OperationPlan};
use dockconsole::core::{EntityKind, HighlightStyle, RuntimeError, Tab};
use dockconsole::docker::RuntimeClient;
use dockconsole::keys::{Input, Keymap, UiEvent};
use dockconsole::poller::{process, Poller};
use dockconsole::state::{AppState, DialogBody, HighlightDurations, Pane, PaneOutcome};
use dockconsole::ui::{AppCommand, UiApp};

use crate::fake::FakeRuntime;

async fn poll_into(pane: &mut Pane, client: &Arc<FakeRuntime>) {
    let client: Arc<dyn RuntimeClient> = client.clone();
    let poller = Poller::new(client, EntityKind::Container, Duration::from_secs(1), true);
    let raw = poller.fetch().await.unwrap();
    pane.apply_snapshot(process(raw, Utc::now()), Instant::now());
}

fn row_ids(pane: &Pane) -> Vec<&str> {
    pane.rows().iter().map(|e| e.id.as_str()).collect()
}

fn pane() -> Pane {
    Pane::new(EntityKind::Container, HighlightDurations::default(), true)
}

#[tokio::test]
async fn test_delete_focused_container_disappears_on_next_poll() {
    let runtime = Arc::new(
        FakeRuntime::new()
            .with_container("a", "nginx")
            .with_container("b", "redis"),
    );
    let mut pane = pane();
    poll_into(&mut pane, &runtime).await;
    assert_eq!(row_ids(&pane), vec!["a", "b"]);

    let plan = match pane.handle(Input::Event(UiEvent::DeleteSelected), Instant::now()) {
        PaneOutcome::Execute(plan) => plan,
        other => panic!("expected a plan, got {:?}", other),
    };
    assert_eq!(plan.targets, vec!["a"]);
    assert_eq!(pane.highlight_of("a"), Some(HighlightStyle::Deleted));

    let report = execute(runtime.clone(), plan).await;
    assert!(report.any_success());
    pane.apply_report(&report);
    assert!(pane.dialog().is_none());

    poll_into(&mut pane, &runtime).await;
    assert_eq!(row_ids(&pane), vec!["b"]);
    assert_eq!(pane.focus(), Some(0));
    assert_eq!(pane.highlight_of("a"), None);
}

#[tokio::test]
async fn test_bulk_stop_reports_only_the_failed_target() {
    let runtime = Arc::new(
        FakeRuntime::new()
            .with_container("b1", "nginx")
            .with_container("b2", "nginx")
            .failing(
                "stop",
                "b2",
                RuntimeError::Api {
                    status: 409,
                    explanation: "container is restarting".to_string(),
                },
            ),
    );
    let mut pane = pane();
    poll_into(&mut pane, &runtime).await;

    let now = Instant::now();
    pane.handle(Input::Event(UiEvent::SetMark), now);
    pane.handle(Input::Event(UiEvent::SetMark), now);
    assert_eq!(pane.selection().active_identities(), vec!["b1", "b2"]);

    let plan = match pane.handle(Input::Event(UiEvent::StopSelected), now) {
        PaneOutcome::Execute(plan) => plan,
        other => panic!("expected a plan, got {:?}", other),
    };
    assert!(pane.selection().is_empty());

    let report = execute(runtime.clone(), plan).await;
    let mut calls = runtime.calls();
    calls.sort();
    assert_eq!(calls, vec!["stop b1", "stop b2"]);
    assert!(runtime.status_of("b1").unwrap().starts_with("Exited"));
    assert!(runtime.status_of("b2").unwrap().starts_with("Up"));

    pane.apply_report(&report);
    let dialog = pane.dialog().expect("failure dialog");
    assert_eq!(dialog.title(), "HTTP Error: 409");
    assert_eq!(
        dialog.body,
        DialogBody::Lines(vec![
            "b2: HTTP Error 409: container is restarting".to_string()
        ])
    );
}

#[tokio::test]
async fn test_rename_through_the_ui() {
    let runtime = Arc::new(FakeRuntime::new().with_container("c1", "nginx"));
    let mut pane = pane();
    poll_into(&mut pane, &runtime).await;

    let mut state = AppState::default();
    *state.pane_mut(Tab::Containers) = pane;
    let mut app = UiApp::new(state, Keymap::defaults());

    let now = Instant::now();
    let press = |code| Event::Key(KeyEvent::new(code, KeyModifiers::NONE));

    app.handle_event(
        Event::Key(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL)),
        now,
    );
    for _ in 0.."c1".len() {
        app.handle_event(press(KeyCode::Backspace), now);
    }
    for c in "web".chars() {
        app.handle_event(press(KeyCode::Char(c)), now);
    }
    let command = app.handle_event(press(KeyCode::Enter), now);

    let plan = OperationPlan {
        kind: EntityKind::Container,
        operation: Operation::Rename {
            new_name: "web".to_string(),
        },
        targets: vec!["c1".to_string()],
    };
    assert_eq!(command, Some(AppCommand::Execute(Tab::Containers, plan.clone())));

    let report = execute(runtime.clone(), plan).await;
    app.on_report(Tab::Containers, &report);
    assert!(app.state.active_pane().dialog().is_none());

    let client: Arc<dyn RuntimeClient> = runtime.clone();
    let listed = client.list_containers(true).await.unwrap();
    assert_eq!(listed[0].names, vec!["/web"]);
}

#[tokio::test]
async fn test_diff_opens_result_dialog() {
    let runtime = Arc::new(FakeRuntime::new().with_container("c1", "nginx"));
    let mut pane = pane();
    poll_into(&mut pane, &runtime).await;

    let plan = match pane.handle(Input::Event(UiEvent::ViewDiff), Instant::now()) {
        PaneOutcome::Execute(plan) => plan,
        other => panic!("expected a plan, got {:?}", other),
    };
    let report = execute(runtime.clone(), plan).await;
    pane.apply_report(&report);

    let dialog = pane.dialog().expect("diff dialog");
    assert_eq!(dialog.title(), "Changes: c1");
}

#[tokio::test(start_paused = true)]
async fn test_poller_delivers_external_changes() {
    let runtime = Arc::new(
        FakeRuntime::new()
            .with_container("a", "nginx")
            .with_container("b", "redis"),
    );
    let client: Arc<dyn RuntimeClient> = runtime.clone();
    let (tx, mut rx) = mpsc::channel(1);
    let handle = Poller::new(client, EntityKind::Container, Duration::from_secs(5), false).start(tx);

    let mut pane = pane();

    let cycle = rx.recv().await.unwrap();
    let (kind, result, ack) = cycle.into_parts();
    assert_eq!(kind, EntityKind::Container);
    pane.apply_snapshot(result.unwrap(), Instant::now());
    ack.send();
    assert_eq!(row_ids(&pane), vec!["a", "b"]);

    runtime.remove_externally("a");
    handle.poll_now();

    let cycle = rx.recv().await.unwrap();
    let (_, result, ack) = cycle.into_parts();
    assert!(pane.apply_snapshot(result.unwrap(), Instant::now()));
    ack.send();
    assert_eq!(row_ids(&pane), vec!["b"]);

    handle.stop();
}
