use std::cmp::Ordering;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering as AtomicOrdering};
use std::sync::{Arc, OnceLock, Weak};

use parking_lot::RwLock;

/// A node in the category tree.
///
/// Top-level categories own their children; a child only holds a weak
/// reference back to its parent. The size counter is bumped concurrently by
/// backends while categories are being refined.
pub struct Category {
    id: String,
    name: Option<String>,
    icon: Option<String>,
    score: i32,
    desktop_groups: Vec<String>,
    size: AtomicU32,
    parent: OnceLock<Weak<Category>>,
    children: RwLock<Vec<Arc<Category>>>,
}

impl Category {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            icon: None,
            score: 0,
            desktop_groups: Vec::new(),
            size: AtomicU32::new(0),
            parent: OnceLock::new(),
            children: RwLock::new(Vec::new()),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_score(mut self, score: i32) -> Self {
        self.score = score;
        self
    }

    pub fn with_desktop_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.desktop_groups = groups.into_iter().map(Into::into).collect();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name. The special `all`, `featured` and `other` children
    /// have fixed names.
    pub fn name(&self) -> Option<&str> {
        match self.id.as_str() {
            "other" => Some("Other"),
            "all" => Some("All"),
            "featured" => Some("Featured"),
            _ => self.name.as_deref(),
        }
    }

    pub fn icon(&self) -> Option<&str> {
        match self.id.as_str() {
            "other" => Some("emblem-system-symbolic"),
            "all" => Some("emblem-default-symbolic"),
            "featured" => Some("emblem-favorite-symbolic"),
            _ => self.icon.as_deref(),
        }
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    /// Desktop-file categories matched by this node, e.g. `Graphics::Viewer`.
    pub fn desktop_groups(&self) -> &[String] {
        &self.desktop_groups
    }

    pub fn size(&self) -> u32 {
        self.size.load(AtomicOrdering::Relaxed)
    }

    pub fn set_size(&self, size: u32) {
        self.size.store(size, AtomicOrdering::Relaxed);
    }

    pub fn increment_size(&self) {
        self.size.fetch_add(1, AtomicOrdering::Relaxed);
    }

    /// Zero the size of this category and every descendant.
    pub fn reset_sizes(&self) {
        self.set_size(0);
        for child in self.children.read().iter() {
            child.reset_sizes();
        }
    }

    pub fn parent(&self) -> Option<Arc<Category>> {
        self.parent.get().and_then(Weak::upgrade)
    }

    pub fn children(&self) -> Vec<Arc<Category>> {
        self.children.read().clone()
    }

    pub fn find_child(&self, id: &str) -> Option<Arc<Category>> {
        self.children.read().iter().find(|c| c.id == id).cloned()
    }

    /// Attach `child` below this category and return the shared child.
    pub fn add_child(self: &Arc<Self>, child: Category) -> Arc<Category> {
        let child = Arc::new(child);
        let _ = child.parent.set(Arc::downgrade(self));
        self.children.write().push(Arc::clone(&child));
        child
    }

    /// Order children as featured, all, ordinary (by name), other; recurse.
    pub fn sort_children(&self) {
        let mut children = self.children.write();
        children.sort_by(|a, b| compare_children(a, b));
        for child in children.iter() {
            child.sort_children();
        }
    }

    fn child_rank(&self) -> u8 {
        match self.id.as_str() {
            "featured" => 0,
            "all" => 2,
            "other" => 9,
            _ => 5,
        }
    }

    fn sort_name(&self) -> String {
        self.name().unwrap_or(&self.id).to_lowercase()
    }
}

fn compare_children(a: &Category, b: &Category) -> Ordering {
    a.child_rank()
        .cmp(&b.child_rank())
        .then_with(|| a.sort_name().cmp(&b.sort_name()))
}

/// Order for top-level categories: higher score first, then by name.
pub fn compare_top_level(a: &Category, b: &Category) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.sort_name().cmp(&b.sort_name()))
}

impl fmt::Debug for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Category")
            .field("id", &self.id)
            .field("name", &self.name())
            .field("score", &self.score)
            .field("size", &self.size())
            .field("children", &self.children.read().len())
            .finish()
    }
}
