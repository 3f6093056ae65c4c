//! Main application coordinator

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture, EventStream};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::actions::{spawn_batch, BatchReport};
use crate::config::Config;
use crate::core::{ConnectionInfo, EntityKind, NotificationLevel};
use crate::docker::{DockerClient, RuntimeClient};
use crate::poller::{PollCycle, Poller, PollerHandle};
use crate::state::AppState;
use crate::ui::{AppCommand, UiApp};

/// How often highlights and notifications are expired
const TICK_RATE: Duration = Duration::from_millis(250);

/// Batches that may finish before the main loop picks them up
const REPORT_BUFFER: usize = 16;

/// Main application struct
pub struct App {
    config: Config,
    client: Arc<dyn RuntimeClient>,
    ui: UiApp,
}

impl App {
    /// Create a new application instance
    pub async fn new(config: Config) -> Result<Self> {
        info!("Creating new App instance");

        let client = Self::connect_docker(&config)
            .await
            .context("Could not connect to the Docker daemon")?;
        let info = client.connection_info().clone();

        Self::with_client(config, Arc::new(client), info)
    }

    /// Build the session around an already connected runtime client
    pub fn with_client(
        config: Config,
        client: Arc<dyn RuntimeClient>,
        info: ConnectionInfo,
    ) -> Result<Self> {
        let keymap = config.keymap()?;

        let mut state = AppState::new(&config);
        state.set_docker_connected(true, info);

        Ok(Self {
            config,
            client,
            ui: UiApp::new(state, keymap),
        })
    }

    /// Connect to Docker
    async fn connect_docker(config: &Config) -> Result<DockerClient> {
        let client = if let Some(host) = &config.docker.host {
            DockerClient::with_host(host).await?
        } else {
            DockerClient::from_env().await?
        };
        Ok(client)
    }

    /// Run the main application loop
    pub async fn run(&mut self) -> Result<()> {
        info!("Starting main application loop");

        let mouse = self.config.ui.mouse_enabled;
        let mut terminal = setup_terminal(mouse)?;

        let result = self.run_event_loop(&mut terminal).await;

        restore_terminal(&mut terminal, mouse)?;

        result
    }

    fn start_pollers(&self, tx: &mpsc::Sender<PollCycle>) -> Vec<PollerHandle> {
        let frequency = self.config.general.poll_interval();

        // Indexed by tab
        [EntityKind::Container, EntityKind::Image]
            .into_iter()
            .map(|kind| {
                let show_all = self.ui.state.show_all[kind.tab().index()];
                Poller::new(Arc::clone(&self.client), kind, frequency, show_all)
                    .start(tx.clone())
            })
            .collect()
    }

    /// Run the event loop
    async fn run_event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<()> {
        let (poll_tx, mut poll_rx) = mpsc::channel::<PollCycle>(2);
        let (report_tx, mut report_rx) = mpsc::channel::<BatchReport>(REPORT_BUFFER);

        let pollers = self.start_pollers(&poll_tx);
        drop(poll_tx);

        let mut events = EventStream::new();
        let mut tick = tokio::time::interval(TICK_RATE);

        terminal.draw(|f| self.ui.draw(f))?;

        loop {
            let mut dirty = false;

            tokio::select! {
                maybe_event = events.next() => match maybe_event {
                    Some(Ok(event)) => {
                        if let Some(command) = self.ui.handle_event(event, Instant::now()) {
                            self.run_command(command, &pollers, &report_tx);
                        }
                        dirty = true;
                    }
                    Some(Err(e)) => {
                        error!("Terminal event stream failed: {}", e);
                        return Err(e.into());
                    }
                    None => {
                        info!("Terminal event stream closed");
                        break;
                    }
                },
                Some(cycle) = poll_rx.recv() => {
                    let (kind, result, ack) = cycle.into_parts();
                    if self.ui.on_poll(kind, result, Instant::now()) {
                        terminal.draw(|f| self.ui.draw(f))?;
                    }
                    // The poller waits for this before sleeping
                    ack.send();
                }
                Some(report) = report_rx.recv() => {
                    let tab = report.kind.tab();
                    if report.changed_runtime() {
                        pollers[tab.index()].poll_now();
                    }
                    self.ui.on_report(tab, &report);
                    dirty = true;
                }
                _ = tick.tick() => {
                    dirty = self.ui.tick(Instant::now());
                }
            }

            if self.ui.should_quit {
                info!("Quit signal received, exiting event loop");
                break;
            }

            if dirty {
                terminal.draw(|f| self.ui.draw(f))?;
            }
        }

        for poller in &pollers {
            poller.stop();
        }

        Ok(())
    }

    fn run_command(
        &mut self,
        command: AppCommand,
        pollers: &[PollerHandle],
        report_tx: &mpsc::Sender<BatchReport>,
    ) {
        match command {
            AppCommand::Execute(tab, plan) => {
                debug!(
                    "Executing {:?} on {} target(s) from {}",
                    plan.operation,
                    plan.targets.len(),
                    tab
                );
                spawn_batch(Arc::clone(&self.client), plan, report_tx.clone());
            }
            AppCommand::ToggleShowAll(tab) => {
                let all = pollers[tab.index()].toggle_show_all();
                self.ui.state.show_all[tab.index()] = all;
                let message = if all {
                    format!("{}: showing all", tab)
                } else {
                    format!("{}: showing running only", tab)
                };
                self.ui
                    .state
                    .add_notification(message, NotificationLevel::Info);
            }
        }
    }
}

/// Setup the terminal for TUI
fn setup_terminal(mouse: bool) -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    info!("Setting up terminal");

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen)?;
    if mouse {
        crossterm::execute!(stdout, EnableMouseCapture)?;
    }

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;

    info!("Terminal setup complete");
    Ok(terminal)
}

/// Restore terminal to original state
fn restore_terminal(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mouse: bool,
) -> Result<()> {
    info!("Restoring terminal");

    terminal::disable_raw_mode()?;
    if mouse {
        crossterm::execute!(terminal.backend_mut(), DisableMouseCapture)?;
    }
    crossterm::execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("Terminal restored");
    Ok(())
}
