use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use super::types::{compare_top_level, Category};
use crate::config::CategoryConfig;

/// Source of the category tree used by list-categories jobs.
pub trait CategoryRegistry: Send + Sync {
    /// Top-level categories in their current order.
    fn categories(&self) -> Vec<Arc<Category>>;

    /// Look up a top-level category by ID, or a child by `parent/child`.
    fn lookup(&self, id: &str) -> Option<Arc<Category>>;

    /// Replace the top-level order.
    fn set_order(&self, categories: Vec<Arc<Category>>);
}

/// Holds the category tree for the lifetime of a catalog.
#[derive(Debug)]
pub struct CategoryManager {
    categories: RwLock<Vec<Arc<Category>>>,
}

impl CategoryManager {
    pub fn new(categories: Vec<Arc<Category>>) -> Self {
        Self {
            categories: RwLock::new(categories),
        }
    }

    /// Build the tree from configuration entries.
    pub fn from_config(entries: &[CategoryConfig]) -> Self {
        let categories = entries.iter().map(build_category).collect();
        Self::new(categories)
    }

    /// The built-in category table.
    pub fn with_defaults() -> Self {
        Self::from_config(&super::defaults::default_categories())
    }
}

impl CategoryRegistry for CategoryManager {
    fn categories(&self) -> Vec<Arc<Category>> {
        self.categories.read().clone()
    }

    fn lookup(&self, id: &str) -> Option<Arc<Category>> {
        let (parent_id, child_id) = match id.split_once('/') {
            Some((parent, child)) => (parent, Some(child)),
            None => (id, None),
        };

        let parent = self
            .categories
            .read()
            .iter()
            .find(|c| c.id() == parent_id)
            .cloned();

        match (parent, child_id) {
            (Some(parent), Some(child)) => parent.find_child(child),
            (parent, None) => parent,
            (None, Some(_)) => None,
        }
    }

    fn set_order(&self, categories: Vec<Arc<Category>>) {
        *self.categories.write() = categories;
    }
}

fn build_category(entry: &CategoryConfig) -> Arc<Category> {
    let parent = Arc::new(category_from_entry(entry));
    for child in &entry.children {
        parent.add_child(category_from_entry(child));
    }
    debug!(
        category = %entry.id,
        children = entry.children.len(),
        "registered category"
    );
    parent
}

fn category_from_entry(entry: &CategoryConfig) -> Category {
    let mut category = Category::new(&entry.id)
        .with_score(entry.score)
        .with_desktop_groups(entry.desktop_groups.iter().cloned());
    if let Some(name) = &entry.name {
        category = category.with_name(name);
    }
    if let Some(icon) = &entry.icon {
        category = category.with_icon(icon);
    }
    category
}

/// Sort top-level categories and every level of children in place.
pub(crate) fn sort_tree(registry: &dyn CategoryRegistry) {
    let mut categories = registry.categories();
    categories.sort_by(|a, b| compare_top_level(a, b));
    for category in &categories {
        category.sort_children();
    }
    registry.set_order(categories);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_populated() {
        let manager = CategoryManager::with_defaults();
        let categories = manager.categories();
        assert!(!categories.is_empty());
        for category in categories {
            assert!(category.find_child("all").is_some(), "{} lacks all", category.id());
        }
    }

    #[test]
    fn test_lookup_top_level_and_child() {
        let manager = CategoryManager::with_defaults();
        let create = manager.lookup("create").unwrap();
        assert_eq!(create.id(), "create");

        let child = manager.lookup("create/all").unwrap();
        assert_eq!(child.parent().unwrap().id(), "create");

        assert!(manager.lookup("create/nope").is_none());
        assert!(manager.lookup("nope/all").is_none());
    }

    #[test]
    fn test_sort_tree_orders_by_score_then_name() {
        let manager = CategoryManager::new(vec![
            Arc::new(Category::new("b").with_name("Bravo").with_score(1)),
            Arc::new(Category::new("a").with_name("Alpha").with_score(1)),
            Arc::new(Category::new("z").with_name("Zulu").with_score(5)),
        ]);

        sort_tree(&manager);

        let ids: Vec<String> = manager
            .categories()
            .iter()
            .map(|c| c.id().to_string())
            .collect();
        assert_eq!(ids, vec!["z", "a", "b"]);
    }
}
