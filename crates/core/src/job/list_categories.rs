use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use super::events::JobEventSender;
use super::fan_out::FanOut;
use super::{Job, JobError};
use crate::backend::{Capability, RefineCategoriesFlags};
use crate::catalog::Catalog;
use crate::category::{sort_tree, Category};

/// Recounts category sizes across all backends and returns the sorted tree.
///
/// Sizes are reset before dispatch, so running the job twice gives the same
/// counts.
#[derive(Debug, Default)]
pub struct ListCategoriesJob {
    flags: RefineCategoriesFlags,
    events: Option<JobEventSender>,
}

impl ListCategoriesJob {
    pub fn new(flags: RefineCategoriesFlags) -> Self {
        Self {
            flags,
            events: None,
        }
    }

    pub fn with_events(mut self, events: JobEventSender) -> Self {
        self.events = Some(events);
        self
    }
}

#[async_trait]
impl Job for ListCategoriesJob {
    type Output = Vec<Arc<Category>>;

    fn name(&self) -> &'static str {
        "list-categories"
    }

    async fn run(
        self,
        catalog: &Catalog,
        cancellable: &CancellationToken,
    ) -> Result<Vec<Arc<Category>>, JobError> {
        let registry = catalog.categories();
        let categories = registry.categories();
        for category in &categories {
            category.reset_sizes();
        }

        let flags = self.flags;
        let shared = Arc::new(categories);
        FanOut::new(Capability::RefineCategories)
            .with_events(self.events.as_ref())
            .run(
                catalog.backends(),
                cancellable,
                (),
                |backend, _reporter, token| {
                    let categories = Arc::clone(&shared);
                    async move {
                        backend
                            .refine_categories(&categories, flags, &token)
                            .await
                    }
                    .boxed()
                },
                |_, _, ()| {},
            )
            .await?;

        sort_tree(registry);
        Ok(registry.categories())
    }
}
