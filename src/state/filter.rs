//! Row filter

use crate::core::Entity;

/// Case-insensitive substring filter over an entity's monitored fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    text: String,
    needle: String,
}

impl Filter {
    pub fn new(text: impl Into<String>) -> Self {
        let mut filter = Self::default();
        filter.set(text);
        filter
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.needle = self.text.to_lowercase();
    }

    pub fn push(&mut self, c: char) {
        self.text.push(c);
        self.needle = self.text.to_lowercase();
    }

    /// Remove the last character; false if the filter was already empty
    pub fn pop(&mut self) -> bool {
        let popped = self.text.pop().is_some();
        self.needle = self.text.to_lowercase();
        popped
    }

    /// Clear the filter; false if it was already empty
    pub fn clear(&mut self) -> bool {
        let had_text = !self.text.is_empty();
        self.text.clear();
        self.needle.clear();
        had_text
    }

    pub fn matches(&self, entity: &Entity) -> bool {
        if self.needle.is_empty() {
            return true;
        }
        entity
            .monitored_fields()
            .any(|value| value.to_lowercase().contains(&self.needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ContainerSummary, ImageSummary};
    use chrono::Utc;

    fn entity(image: &str) -> Entity {
        Entity::from_container(
            &ContainerSummary {
                id: "deadbeef".to_string(),
                names: vec!["/web".to_string()],
                image: image.to_string(),
                command: "nginx -g daemon".to_string(),
                status: "Up 3 hours".to_string(),
                ..Default::default()
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(Filter::default().matches(&entity("nginx")));
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        assert!(Filter::new("abc").matches(&entity("xABCy")));
        assert!(Filter::new("ABC").matches(&entity("xabcy")));
    }

    #[test]
    fn test_filter_checks_monitored_fields_only() {
        let e = entity("redis");
        assert!(Filter::new("web").matches(&e));
        assert!(Filter::new("up 3").matches(&e));
        assert!(Filter::new("beef").matches(&e));
        // command is displayed but not monitored
        assert!(!Filter::new("daemon").matches(&e));
    }

    #[test]
    fn test_filter_matches_full_image_id_of_tagged_row() {
        let image = ImageSummary {
            id: "sha256:0123456789abcdef99887766".to_string(),
            repo_tags: vec!["web:1.0".to_string()],
            created: Utc::now(),
            size: 0,
        };
        let rows = Entity::from_image(&image, Utc::now());

        // Past the short id shown in the table
        assert!(Filter::new("99887766").matches(&rows[0]));
        assert!(!Filter::new("ffff").matches(&rows[0]));
    }

    #[test]
    fn test_filter_editing() {
        let mut filter = Filter::default();
        filter.push('R');
        filter.push('e');
        assert_eq!(filter.text(), "Re");
        assert!(filter.matches(&entity("redis")));

        assert!(filter.pop());
        assert!(filter.clear());
        assert!(!filter.pop());
        assert!(filter.is_empty());
    }
}
