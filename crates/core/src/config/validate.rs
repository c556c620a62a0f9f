use std::collections::HashSet;

use super::{
    types::{CategoryConfig, Config},
    ConfigError,
};

/// Validate configuration
/// Currently validates:
/// - Progress update period is not 0
/// - Backend names are non-empty and unique, and never order against themselves
/// - App IDs are non-empty
/// - Category IDs are unique per level and the tree is at most two levels deep
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.jobs.progress_update_period_ms == 0 {
        return Err(ConfigError::ValidationError(
            "jobs.progress_update_period_ms cannot be 0".to_string(),
        ));
    }

    let mut names = HashSet::new();
    for backend in &config.backends {
        if backend.name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "backends.name cannot be empty".to_string(),
            ));
        }
        if !names.insert(backend.name.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate backend name '{}'",
                backend.name
            )));
        }
        if backend
            .run_after
            .iter()
            .chain(backend.run_before.iter())
            .any(|other| other == &backend.name)
        {
            return Err(ConfigError::ValidationError(format!(
                "backend '{}' cannot be ordered relative to itself",
                backend.name
            )));
        }
        if let Some(app) = backend.apps.iter().find(|app| app.id.trim().is_empty()) {
            return Err(ConfigError::ValidationError(format!(
                "backend '{}' has an app with an empty id (name: {:?})",
                backend.name, app.name
            )));
        }
    }

    validate_categories(&config.categories, None)?;

    Ok(())
}

fn validate_categories(
    categories: &[CategoryConfig],
    parent: Option<&str>,
) -> Result<(), ConfigError> {
    let mut ids = HashSet::new();
    for category in categories {
        if category.id.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "categories.id cannot be empty".to_string(),
            ));
        }
        if !ids.insert(category.id.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate category id '{}'",
                category.id
            )));
        }
        match parent {
            Some(parent) if !category.children.is_empty() => {
                return Err(ConfigError::ValidationError(format!(
                    "category '{}/{}' cannot have children",
                    parent, category.id
                )));
            }
            Some(_) => {}
            None => validate_categories(&category.children, Some(category.id.as_str()))?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{load_config_from_str, JobsConfig};

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_zero_period_fails() {
        let config = Config {
            jobs: JobsConfig {
                progress_update_period_ms: 0,
            },
            ..Default::default()
        };
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_duplicate_backend_fails() {
        let config = load_config_from_str(
            r#"
[[backends]]
name = "flatpak"

[[backends]]
name = "flatpak"
"#,
        )
        .unwrap();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("duplicate backend name"));
    }

    #[test]
    fn test_validate_self_ordering_fails() {
        let config = load_config_from_str(
            r#"
[[backends]]
name = "flatpak"
run_after = ["flatpak"]
"#,
        )
        .unwrap();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_empty_app_id_fails() {
        let config = load_config_from_str(
            r#"
[[backends]]
name = "static"

[[backends.apps]]
id = ""
"#,
        )
        .unwrap();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_deep_category_tree_fails() {
        let config = load_config_from_str(
            r#"
[[categories]]
id = "create"

[[categories.children]]
id = "graphics"

[[categories.children.children]]
id = "too-deep"
"#,
        )
        .unwrap();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("create/graphics"));
    }

    #[test]
    fn test_validate_duplicate_child_ids_fail() {
        let config = load_config_from_str(
            r#"
[[categories]]
id = "create"

[[categories.children]]
id = "all"

[[categories.children]]
id = "all"
"#,
        )
        .unwrap();
        assert!(validate_config(&config).is_err());
    }
}
