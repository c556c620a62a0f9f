//! The catalog: backends, categories and job settings in one place.

use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::backend::{Backend, BackendRegistry, RegistryError, StaticBackend};
use crate::category::{CategoryManager, CategoryRegistry};
use crate::config::{Config, JobsConfig};
use crate::job::{Job, JobError};

/// Entry point for running jobs.
pub struct Catalog {
    backends: Arc<BackendRegistry>,
    categories: Arc<dyn CategoryRegistry>,
    jobs: JobsConfig,
}

impl Catalog {
    pub fn new(backends: BackendRegistry, categories: Arc<dyn CategoryRegistry>) -> Self {
        Self {
            backends: Arc::new(backends),
            categories,
            jobs: JobsConfig::default(),
        }
    }

    pub fn with_jobs_config(mut self, jobs: JobsConfig) -> Self {
        self.jobs = jobs;
        self
    }

    /// Build a catalog with one static backend per `[[backends]]` entry.
    pub fn from_config(config: &Config) -> Result<Self, RegistryError> {
        let backends: Vec<Arc<dyn Backend>> = config
            .backends
            .iter()
            .map(|b| Arc::new(StaticBackend::from_config(b)) as Arc<dyn Backend>)
            .collect();

        let categories = if config.categories.is_empty() {
            CategoryManager::with_defaults()
        } else {
            CategoryManager::from_config(&config.categories)
        };

        Ok(Self::new(BackendRegistry::new(backends)?, Arc::new(categories))
            .with_jobs_config(config.jobs.clone()))
    }

    pub fn backends(&self) -> &BackendRegistry {
        &self.backends
    }

    pub fn categories(&self) -> &dyn CategoryRegistry {
        self.categories.as_ref()
    }

    pub fn jobs_config(&self) -> &JobsConfig {
        &self.jobs
    }

    /// Run `job`, logging its outcome and duration.
    pub async fn run<J: Job>(
        &self,
        job: J,
        cancellable: &CancellationToken,
    ) -> Result<J::Output, JobError> {
        let job_id = Uuid::new_v4();
        let name = job.name();
        let started = Instant::now();
        info!(job_id = %job_id, job = name, "job started");

        let result = job.run(self, cancellable).await;

        let duration_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => info!(job_id = %job_id, job = name, duration_ms, "job finished"),
            Err(e) => warn!(job_id = %job_id, job = name, duration_ms, error = %e, "job failed"),
        }
        result
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("backends", &self.backends)
            .field("jobs", &self.jobs)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;

    #[test]
    fn test_from_config_uses_default_categories() {
        let config = load_config_from_str(
            r#"
[jobs]
progress_update_period_ms = 100

[[backends]]
name = "static"
"#,
        )
        .unwrap();
        let catalog = Catalog::from_config(&config).unwrap();
        assert_eq!(catalog.backends().names(), vec!["static"]);
        assert!(catalog.categories().lookup("create").is_some());
        assert_eq!(catalog.jobs_config().progress_update_period_ms, 100);
    }

    #[test]
    fn test_from_config_rejects_cycles() {
        let config = load_config_from_str(
            r#"
[[backends]]
name = "a"
run_after = ["b"]

[[backends]]
name = "b"
run_after = ["a"]
"#,
        )
        .unwrap();
        assert!(matches!(
            Catalog::from_config(&config),
            Err(RegistryError::OrderingCycle(_))
        ));
    }
}
