use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Load configuration from file with environment variable overrides
///
/// Environment variables use the `CATALOG_` prefix and `__` between nested
/// keys, e.g. `CATALOG_JOBS__PROGRESS_UPDATE_PERIOD_MS=100`.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("CATALOG_").split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[jobs]
progress_update_period_ms = 50
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.jobs.progress_update_period_ms, 50);
    }

    #[test]
    fn test_load_config_from_str_bad_type() {
        let toml = r#"
[jobs]
progress_update_period_ms = "soon"
"#;
        let result = load_config_from_str(toml);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/catalog.toml"));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[[backends]]
name = "static"

[[backends.apps]]
id = "org.example.Maps"
name = "Maps"
summary = "Find places"
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.backends.len(), 1);
        assert_eq!(config.backends[0].apps[0].id, "org.example.Maps");
        assert_eq!(config.jobs.progress_update_period_ms, 300);
    }
}
