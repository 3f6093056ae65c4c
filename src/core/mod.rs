use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod errors;
pub mod types;

pub use errors::*;
pub use types::{
    new_batch_id, BatchId, DialogAlign, DialogConfig, DialogHeight, EntityId, HighlightStyle,
    NotificationLevel, Tab,
};

/// Repo tag the daemon reports for untagged images
pub const UNTAGGED: &str = "<none>:<none>";

/// Docker connection information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionInfo {
    pub host: String,
    pub version: String,
    pub api_version: String,
    pub os: String,
    pub arch: String,
}

impl Default for ConnectionInfo {
    fn default() -> Self {
        Self {
            host: "unknown".to_string(),
            version: "unknown".to_string(),
            api_version: "unknown".to_string(),
            os: "unknown".to_string(),
            arch: "unknown".to_string(),
        }
    }
}

/// Container record as listed by the runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSummary {
    pub id: String,
    pub names: Vec<String>,
    pub image: String,
    pub command: String,
    pub created: DateTime<Utc>,
    pub status: String,
}

impl Default for ContainerSummary {
    fn default() -> Self {
        Self {
            id: String::new(),
            names: vec![],
            image: String::new(),
            command: String::new(),
            created: Utc::now(),
            status: String::new(),
        }
    }
}

/// Image record as listed by the runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSummary {
    pub id: String,
    pub repo_tags: Vec<String>,
    pub created: DateTime<Utc>,
    pub size: i64,
}

/// Which runtime listing an entity comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Container,
    Image,
}

impl EntityKind {
    /// Columns rendered for this kind, in display order
    pub fn columns(&self) -> &'static [Column] {
        match self {
            EntityKind::Container => &[
                Column::Id,
                Column::Image,
                Column::Command,
                Column::Status,
                Column::Names,
            ],
            EntityKind::Image => &[Column::Tag, Column::Id, Column::Created],
        }
    }

    pub fn tab(&self) -> Tab {
        match self {
            EntityKind::Container => Tab::Containers,
            EntityKind::Image => Tab::Images,
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Container => write!(f, "container"),
            EntityKind::Image => write!(f, "image"),
        }
    }
}

/// A rendered column of the entity tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Column {
    Id,
    Image,
    Command,
    Status,
    Names,
    Tag,
    Created,
}

impl Column {
    pub fn header(&self) -> &'static str {
        match self {
            Column::Id => "Id",
            Column::Image => "Image",
            Column::Command => "Command",
            Column::Status => "Status",
            Column::Names => "Names",
            Column::Tag => "Tag",
            Column::Created => "Created",
        }
    }

    /// Columns the filter looks at
    pub fn is_monitored(&self) -> bool {
        matches!(
            self,
            Column::Id | Column::Image | Column::Status | Column::Names | Column::Tag
        )
    }
}

/// Ordered column -> rendered value mapping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayFields(Vec<(Column, String)>);

impl DisplayFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: Column, value: impl Into<String>) -> Self {
        self.set(column, value);
        self
    }

    /// Set a column, keeping its original position if already present
    pub fn set(&mut self, column: Column, value: impl Into<String>) {
        let value = value.into();
        match self.0.iter_mut().find(|(c, _)| *c == column) {
            Some(slot) => slot.1 = value,
            None => self.0.push((column, value)),
        }
    }

    pub fn get(&self, column: Column) -> Option<&str> {
        self.0
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Column, &str)> {
        self.0.iter().map(|(c, v)| (*c, v.as_str()))
    }
}

/// Which tier of the two-tier render order an entity belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    /// Running containers, tagged images
    Primary,
    /// Exited containers, untagged images
    Secondary,
}

/// One container or image row at a point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Identity within a snapshot; also the reference handed to the runtime
    pub id: EntityId,
    /// Full container or image id as reported by the runtime
    pub runtime_id: String,
    pub kind: EntityKind,
    pub fields: DisplayFields,
    /// Container names, or the repo tag of an image row
    pub names: Vec<String>,
    pub age_days: i64,
    pub raw_status: String,
}

impl Entity {
    /// Build a container row
    pub fn from_container(c: &ContainerSummary, now: DateTime<Utc>) -> Self {
        let names: Vec<String> = c
            .names
            .iter()
            .map(|n| n.trim_start_matches('/').to_string())
            .collect();

        let fields = DisplayFields::new()
            .with(Column::Id, short_id(&c.id))
            .with(Column::Image, c.image.clone())
            .with(Column::Command, c.command.clone())
            .with(Column::Status, c.status.clone())
            .with(Column::Names, names.join(", "));

        Self {
            id: c.id.clone(),
            runtime_id: c.id.clone(),
            kind: EntityKind::Container,
            fields,
            names,
            age_days: age_days(c.created, now),
            raw_status: c.status.clone(),
        }
    }

    /// Build one row per repo tag of an image
    ///
    /// Tagged rows are identified by their `repo:tag`; an untagged image
    /// gets a single row identified by its image id.
    pub fn from_image(i: &ImageSummary, now: DateTime<Utc>) -> Vec<Self> {
        let days = age_days(i.created, now);
        let mut tags: Vec<&str> = i
            .repo_tags
            .iter()
            .map(String::as_str)
            .filter(|t| *t != UNTAGGED)
            .collect();
        tags.dedup();

        let row = |id: &str, tag: &str| {
            let fields = DisplayFields::new()
                .with(Column::Tag, tag)
                .with(Column::Id, short_id(&i.id))
                .with(Column::Created, format!("{} days ago", days));
            Self {
                id: id.to_string(),
                runtime_id: i.id.clone(),
                kind: EntityKind::Image,
                fields,
                names: vec![tag.to_string()],
                age_days: days,
                raw_status: String::new(),
            }
        };

        if tags.is_empty() {
            vec![row(&i.id, UNTAGGED)]
        } else {
            tags.into_iter().map(|t| row(t, t)).collect()
        }
    }

    pub fn field(&self, column: Column) -> &str {
        self.fields.get(column).unwrap_or("")
    }

    pub fn tier(&self) -> Tier {
        match self.kind {
            EntityKind::Container if self.raw_status.contains("Exited") => Tier::Secondary,
            EntityKind::Image if self.field(Column::Tag) == UNTAGGED => Tier::Secondary,
            _ => Tier::Primary,
        }
    }

    pub fn is_running(&self) -> bool {
        self.kind == EntityKind::Container && self.raw_status.starts_with("Up")
    }

    /// Values the filter is matched against
    pub fn monitored_fields(&self) -> impl Iterator<Item = &str> {
        let runtime_id = (self.runtime_id != self.id).then_some(self.runtime_id.as_str());
        std::iter::once(self.id.as_str())
            .chain(runtime_id)
            .chain(
                self.fields
                    .iter()
                    .filter(|(c, _)| c.is_monitored())
                    .map(|(_, v)| v),
            )
            .chain(self.names.iter().map(String::as_str))
    }

    /// Label used in dialogs and notifications
    pub fn label(&self) -> String {
        match self.kind {
            EntityKind::Container => self
                .names
                .first()
                .cloned()
                .unwrap_or_else(|| short_id(&self.id)),
            EntityKind::Image => self.id.clone(),
        }
    }

    fn sort_key(&self) -> (i64, &str, &str, &str) {
        match self.kind {
            EntityKind::Container => (
                self.age_days,
                self.field(Column::Image),
                self.raw_status.as_str(),
                self.id.as_str(),
            ),
            EntityKind::Image => (
                self.age_days,
                self.field(Column::Tag),
                self.field(Column::Id),
                self.id.as_str(),
            ),
        }
    }
}

/// An ordered, deterministic listing of entities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    kind: EntityKind,
    entities: Vec<Entity>,
}

impl Snapshot {
    /// Build a snapshot, applying the canonical sort
    pub fn new(kind: EntityKind, mut entities: Vec<Entity>) -> Self {
        let mut seen = HashSet::new();
        entities.retain(|e| seen.insert(e.id.clone()));
        entities.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        Self { kind, entities }
    }

    pub fn empty(kind: EntityKind) -> Self {
        Self {
            kind,
            entities: vec![],
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entities.iter().any(|e| e.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }
}

/// First twelve characters of an id, without any `sha256:` prefix
pub fn short_id(id: &str) -> String {
    id.trim_start_matches("sha256:").chars().take(12).collect()
}

fn age_days(created: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    now.signed_duration_since(created).num_days().max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn container(id: &str, image: &str, status: &str, days: i64, now: DateTime<Utc>) -> Entity {
        Entity::from_container(
            &ContainerSummary {
                id: id.to_string(),
                names: vec![format!("/{}", id)],
                image: image.to_string(),
                command: "sh".to_string(),
                created: now - Duration::days(days),
                status: status.to_string(),
            },
            now,
        )
    }

    #[test]
    fn test_container_entity_fields() {
        let now = Utc::now();
        let e = container("0123456789abcdef", "nginx", "Up 2 minutes", 3, now);

        assert_eq!(e.age_days, 3);
        assert_eq!(e.field(Column::Id), "0123456789ab");
        assert_eq!(e.names, vec!["0123456789abcdef".to_string()]);
        assert_eq!(e.tier(), Tier::Primary);
        assert!(e.is_running());

        let columns: Vec<Column> = e.fields.iter().map(|(c, _)| c).collect();
        assert_eq!(columns, EntityKind::Container.columns());
    }

    #[test]
    fn test_exited_container_is_secondary() {
        let now = Utc::now();
        let e = container("a", "nginx", "Exited (0) 2 hours ago", 0, now);
        assert_eq!(e.tier(), Tier::Secondary);
        assert!(!e.is_running());
    }

    #[test]
    fn test_image_rows_per_tag() {
        let now = Utc::now();
        let image = ImageSummary {
            id: "sha256:feedfacecafebeef0000".to_string(),
            repo_tags: vec!["web:latest".to_string(), "web:1.2".to_string()],
            created: now - Duration::days(10),
            size: 0,
        };

        let rows = Entity::from_image(&image, now);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "web:latest");
        assert_eq!(rows[1].field(Column::Id), "feedfacecafe");
        assert_eq!(rows[1].field(Column::Created), "10 days ago");
        assert_eq!(rows[0].tier(), Tier::Primary);
        assert_eq!(rows[0].runtime_id, "sha256:feedfacecafebeef0000");
    }

    #[test]
    fn test_tagged_image_monitors_full_id() {
        let now = Utc::now();
        let image = ImageSummary {
            id: "sha256:feedfacecafebeef0000".to_string(),
            repo_tags: vec!["web:latest".to_string()],
            created: now,
            size: 0,
        };

        let rows = Entity::from_image(&image, now);
        let fields: Vec<&str> = rows[0].monitored_fields().collect();
        assert!(fields.contains(&"sha256:feedfacecafebeef0000"));
    }

    #[test]
    fn test_untagged_image_uses_image_id() {
        let now = Utc::now();
        let image = ImageSummary {
            id: "sha256:0000".to_string(),
            repo_tags: vec![UNTAGGED.to_string()],
            created: now,
            size: 0,
        };

        let rows = Entity::from_image(&image, now);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "sha256:0000");
        assert_eq!(rows[0].tier(), Tier::Secondary);
    }

    #[test]
    fn test_snapshot_sort_is_deterministic() {
        let now = Utc::now();
        let a = container("a", "redis", "Up 1 minute", 1, now);
        let b = container("b", "nginx", "Up 1 minute", 1, now);
        let c = container("c", "nginx", "Up 1 minute", 0, now);
        let d = container("d", "nginx", "Up 1 minute", 1, now);

        let first = Snapshot::new(
            EntityKind::Container,
            vec![a.clone(), b.clone(), c.clone(), d.clone()],
        );
        let second = Snapshot::new(EntityKind::Container, vec![d, c, b, a]);

        let ids: Vec<&str> = first.entities().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "d", "a"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_display_fields_set_keeps_position() {
        let mut fields = DisplayFields::new()
            .with(Column::Id, "1")
            .with(Column::Status, "Up");
        fields.set(Column::Id, "2");

        assert_eq!(fields.get(Column::Id), Some("2"));
        assert_eq!(fields.iter().next(), Some((Column::Id, "2")));
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("sha256:abcdefabcdefabcdef"), "abcdefabcdef");
        assert_eq!(short_id("abc"), "abc");
    }
}
