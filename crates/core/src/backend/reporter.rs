use std::fmt;
use std::sync::Arc;

use super::error::BackendError;
use crate::app::{App, Progress, UserAction};

/// A user-visible problem raised by a backend while an operation continues.
#[derive(Debug, Clone)]
pub struct BackendEvent {
    /// The app the problem concerns, if any.
    pub app: Option<Arc<App>>,
    pub error: BackendError,
}

impl BackendEvent {
    pub fn new(error: BackendError) -> Self {
        Self { app: None, error }
    }

    pub fn for_app(app: Arc<App>, error: BackendError) -> Self {
        Self {
            app: Some(app),
            error,
        }
    }
}

/// Something a backend reports while an operation runs.
#[derive(Debug, Clone)]
pub enum Report {
    Progress(Progress),
    NeedsUserAction { app: Arc<App>, action: UserAction },
    Event(BackendEvent),
}

type ReportSink = Arc<dyn Fn(Report) + Send + Sync>;

/// Handle a backend uses to report back to the job running it.
///
/// Cheap to clone; reporting never blocks and never fails. Reports sent
/// after the job finished are dropped.
#[derive(Clone)]
pub struct OperationReporter {
    backend: Arc<str>,
    sink: ReportSink,
}

impl OperationReporter {
    pub fn new<F>(backend: &str, sink: F) -> Self
    where
        F: Fn(Report) + Send + Sync + 'static,
    {
        Self {
            backend: Arc::from(backend),
            sink: Arc::new(sink),
        }
    }

    /// A reporter that drops everything.
    pub fn discard(backend: &str) -> Self {
        Self::new(backend, |_| {})
    }

    pub fn backend(&self) -> &str {
        &self.backend
    }

    pub fn progress(&self, percent: u8) {
        (self.sink)(Report::Progress(Progress::percent(percent)));
    }

    pub fn progress_unknown(&self) {
        (self.sink)(Report::Progress(Progress::Unknown));
    }

    pub fn needs_user_action(&self, app: Arc<App>, action: UserAction) {
        (self.sink)(Report::NeedsUserAction { app, action });
    }

    pub fn event(&self, event: BackendEvent) {
        (self.sink)(Report::Event(event));
    }
}

impl fmt::Debug for OperationReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationReporter")
            .field("backend", &self.backend)
            .field("sink", &"<sink>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_reports_reach_sink() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let reporter = OperationReporter::new("static", move |report| sink.lock().push(report));

        reporter.progress(120);
        reporter.progress_unknown();
        reporter.event(BackendEvent::new(BackendError::NoNetwork));

        let seen = seen.lock();
        assert_eq!(seen.len(), 3);
        assert!(matches!(seen[0], Report::Progress(Progress::Percent(100))));
        assert!(matches!(seen[1], Report::Progress(Progress::Unknown)));
        assert!(matches!(&seen[2], Report::Event(e) if e.error == BackendError::NoNetwork));
        assert_eq!(reporter.backend(), "static");
    }
}
