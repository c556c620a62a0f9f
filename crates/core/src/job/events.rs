use std::sync::Arc;

use tokio::sync::mpsc;

use crate::app::{App, Progress, UserAction};
use crate::backend::BackendEvent;

/// Something a running job tells its caller.
#[derive(Debug, Clone)]
pub enum JobEvent {
    /// Aggregated progress across all backends changed.
    Progress(Progress),
    /// A backend cannot continue without the user.
    NeedsUserAction {
        backend: String,
        app: Arc<App>,
        action: UserAction,
    },
    /// A backend hit a user-visible problem but carried on.
    Backend { backend: String, event: BackendEvent },
}

/// Channel the caller receives job events on.
pub type JobEventSender = mpsc::UnboundedSender<JobEvent>;
