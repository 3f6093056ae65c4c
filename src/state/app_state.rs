//! Application state management

use chrono::Utc;

use crate::config::Config;
use crate::core::{ConnectionInfo, EntityKind, NotificationLevel, Tab};
use crate::state::Pane;

/// Main application state
#[derive(Debug, Clone)]
pub struct AppState {
    // Navigation
    pub current_tab: Tab,

    // Panes, indexed by `Tab::index`
    panes: Vec<Pane>,

    // Connection
    pub docker_connected: bool,
    pub connection_info: ConnectionInfo,

    // UI state
    pub notifications: Vec<Notification>,
    pub show_all: [bool; 2],
}

/// Notification message
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: uuid::Uuid,
    pub message: String,
    pub level: NotificationLevel,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    /// Create new app state
    pub fn new(config: &Config) -> Self {
        let durations = config.general.highlight_durations();
        let advance = config.ui.advance_on_mark;

        Self {
            current_tab: Tab::Containers,
            panes: vec![
                Pane::new(EntityKind::Container, durations, advance),
                Pane::new(EntityKind::Image, durations, advance),
            ],
            docker_connected: false,
            connection_info: ConnectionInfo::default(),
            notifications: vec![],
            show_all: [config.general.show_all; 2],
        }
    }

    pub fn pane(&self, tab: Tab) -> &Pane {
        &self.panes[tab.index()]
    }

    pub fn pane_mut(&mut self, tab: Tab) -> &mut Pane {
        &mut self.panes[tab.index()]
    }

    pub fn active_pane(&self) -> &Pane {
        self.pane(self.current_tab)
    }

    pub fn active_pane_mut(&mut self) -> &mut Pane {
        let tab = self.current_tab;
        self.pane_mut(tab)
    }

    pub fn panes_mut(&mut self) -> impl Iterator<Item = &mut Pane> {
        self.panes.iter_mut()
    }

    pub fn next_tab(&mut self) {
        let tabs = Tab::all();
        self.current_tab = tabs[(self.current_tab.index() + 1) % tabs.len()];
    }

    pub fn previous_tab(&mut self) {
        let tabs = Tab::all();
        self.current_tab = tabs[(self.current_tab.index() + tabs.len() - 1) % tabs.len()];
    }

    /// Add a notification
    pub fn add_notification(&mut self, message: impl Into<String>, level: NotificationLevel) {
        let notification = Notification {
            id: uuid::Uuid::new_v4(),
            message: message.into(),
            level,
            timestamp: Utc::now(),
        };
        self.notifications.push(notification);

        // Keep only last 10 notifications
        if self.notifications.len() > 10 {
            self.notifications.remove(0);
        }
    }

    pub fn latest_notification(&self) -> Option<&Notification> {
        self.notifications.last()
    }

    /// Clear old notifications (older than threshold)
    pub fn clear_old_notifications(&mut self, max_age_seconds: i64) {
        let cutoff = Utc::now() - chrono::Duration::seconds(max_age_seconds);
        self.notifications.retain(|n| n.timestamp > cutoff);
    }

    /// Set Docker connection status
    pub fn set_docker_connected(&mut self, connected: bool, info: ConnectionInfo) {
        self.docker_connected = connected;
        self.connection_info = info;
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}
