//! Core type definitions and shared types

/// Type alias for entity identities (container ids, image references)
pub type EntityId = String;

/// Type alias for batch ids
pub type BatchId = uuid::Uuid;

use uuid::Uuid;

/// Generate a new unique batch ID
pub fn new_batch_id() -> BatchId {
    Uuid::new_v4()
}

/// Notification level for status messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl std::fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationLevel::Info => write!(f, "INFO"),
            NotificationLevel::Success => write!(f, "SUCCESS"),
            NotificationLevel::Warning => write!(f, "WARNING"),
            NotificationLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// Application tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
    Containers,
    Images,
}

impl Tab {
    /// Get all available tabs
    pub fn all() -> &'static [Tab] {
        &[Tab::Containers, Tab::Images]
    }

    /// Get the display name for this tab
    pub fn name(&self) -> &'static str {
        match self {
            Tab::Containers => "Containers",
            Tab::Images => "Images",
        }
    }

    /// Name of the key binding mode active while this tab is focused
    pub fn mode(&self) -> &'static str {
        match self {
            Tab::Containers => "containers",
            Tab::Images => "images",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Tab::Containers => 0,
            Tab::Images => 1,
        }
    }
}

impl std::fmt::Display for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Temporary row styling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HighlightStyle {
    /// Row appeared since the previous poll
    Created,
    /// A remove call is in flight for this row
    Deleted,
    /// A push is in flight for this row
    Uploading,
}

/// Horizontal placement of a dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogAlign {
    Left,
    Center,
    Right,
}

/// Vertical sizing of a dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogHeight {
    /// Just tall enough for the content
    Pack,
    /// Percentage of the screen height
    Percent(u16),
}

/// Presentation settings handed to the modal host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogConfig {
    pub title: String,
    pub width_percent: u16,
    pub height: DialogHeight,
    pub align: DialogAlign,
}

impl DialogConfig {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            width_percent: 80,
            height: DialogHeight::Pack,
            align: DialogAlign::Center,
        }
    }

    pub fn with_width(mut self, percent: u16) -> Self {
        self.width_percent = percent.clamp(10, 100);
        self
    }

    pub fn with_height(mut self, height: DialogHeight) -> Self {
        self.height = height;
        self
    }
}
