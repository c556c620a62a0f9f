use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;

use catalog_core::{app::AppSnapshot, AppList, Category};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

#[derive(Debug, Serialize)]
struct CategoryView {
    id: String,
    name: Option<String>,
    size: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<CategoryView>,
}

impl CategoryView {
    fn from_category(category: &Category) -> Self {
        Self {
            id: category.id().to_string(),
            name: category.name().map(str::to_string),
            size: category.size(),
            children: category
                .children()
                .iter()
                .map(|c| Self::from_category(c))
                .collect(),
        }
    }
}

pub fn print_apps(apps: &AppList, format: Format) -> Result<()> {
    let snapshots: Vec<AppSnapshot> = apps.iter().map(|a| a.snapshot()).collect();
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&snapshots)?),
        Format::Text => {
            for line in snapshots.iter().map(app_line) {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

pub fn print_categories(categories: &[Arc<Category>], format: Format) -> Result<()> {
    let views: Vec<CategoryView> = categories
        .iter()
        .map(|c| CategoryView::from_category(c))
        .collect();
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&views)?),
        Format::Text => {
            for view in &views {
                println!("{}", category_line(view, 0));
                for child in &view.children {
                    println!("{}", category_line(child, 1));
                }
            }
        }
    }
    Ok(())
}

fn app_line(app: &AppSnapshot) -> String {
    let mut line = format!("{:<40} {:<12}", app.id, app.state);
    if let Some(version) = &app.version {
        line.push_str(&format!(" {:<12}", version));
    }
    if let Some(name) = &app.name {
        line.push_str(&format!(" {}", name));
    }
    if let Some(backend) = &app.management_backend {
        line.push_str(&format!(" [{}]", backend));
    }
    line.trim_end().to_string()
}

fn category_line(view: &CategoryView, depth: usize) -> String {
    format!(
        "{}{} ({}) {}",
        "  ".repeat(depth),
        view.name.as_deref().unwrap_or(&view.id),
        view.size,
        view.id
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::testing::fixtures;

    #[test]
    fn test_app_line_includes_state_and_version() {
        let app = fixtures::updatable_app("org.example.Editor");
        let line = app_line(&app.snapshot());
        assert!(line.starts_with("org.example.Editor"));
        assert!(line.contains("updatable"));
        assert!(line.contains("1.0"));
    }

    #[test]
    fn test_category_view_nests_children() {
        let parent = Arc::new(Category::new("create").with_name("Create"));
        parent.add_child(Category::new("graphics").with_name("Graphics"));
        parent.increment_size();

        let view = CategoryView::from_category(&parent);
        assert_eq!(view.size, 1);
        assert_eq!(view.children.len(), 1);
        assert_eq!(category_line(&view.children[0], 1), "  Graphics (0) graphics");
    }
}
