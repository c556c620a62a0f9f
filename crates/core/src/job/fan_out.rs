//! Fan-out/fan-in over all capable backends.
//!
//! The coordinator runs in the caller's task. Backend operations are spawned
//! on the runtime and talk back over a single channel, so reports from one
//! backend always arrive before its completion. The dispatch phase holds one
//! pending slot of its own, released by a `DispatchDone` message once every
//! backend has been started.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::error::JobError;
use super::events::{JobEvent, JobEventSender};
use super::progress::ProgressAggregator;
use crate::backend::{
    Backend, BackendError, BackendRegistry, Capability, OperationReporter, Report,
};

enum Message<T> {
    Report { index: usize, report: Report },
    Finished {
        index: usize,
        result: Result<T, BackendError>,
    },
    DispatchDone { error: Option<JobError> },
}

/// Outstanding operations plus the first error seen.
struct Pending {
    operation: &'static str,
    remaining: usize,
    error: Option<JobError>,
}

impl Pending {
    fn new(operation: &'static str) -> Self {
        Self {
            operation,
            remaining: 1,
            error: None,
        }
    }

    /// Record one finished operation; returns true when none remain.
    fn finish(&mut self, error: Option<JobError>) -> bool {
        if let Some(error) = error {
            if self.error.is_none() {
                self.error = Some(error);
            } else {
                debug!(
                    operation = self.operation,
                    error = %error,
                    "additional error while running job"
                );
            }
        }

        debug_assert!(self.remaining > 0);
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining == 0
    }
}

/// One fan-out over the registry for a single capability.
pub(crate) struct FanOut<'a> {
    capability: Capability,
    require_backend: bool,
    progress_period: Option<Duration>,
    events: Option<&'a JobEventSender>,
}

impl<'a> FanOut<'a> {
    pub(crate) fn new(capability: Capability) -> Self {
        Self {
            capability,
            require_backend: true,
            progress_period: None,
            events: None,
        }
    }

    /// Succeed instead of failing with `NotSupported` when no backend
    /// implements the capability.
    pub(crate) fn allow_no_backends(mut self) -> Self {
        self.require_backend = false;
        self
    }

    /// Aggregate backend progress every `period`.
    pub(crate) fn with_progress(mut self, period: Duration) -> Self {
        self.progress_period = Some(period);
        self
    }

    pub(crate) fn with_events(mut self, events: Option<&'a JobEventSender>) -> Self {
        self.events = events;
        self
    }

    fn emit(&self, event: JobEvent) {
        if let Some(events) = self.events {
            let _ = events.send(event);
        }
    }

    /// Dispatch to every enabled backend supporting the capability and wait
    /// for all of them.
    ///
    /// `dispatch` starts one backend's operation; `merge` folds a successful
    /// partial result into `acc`. Failures other than cancellation are
    /// logged and dropped. The first recorded error wins and is returned
    /// instead of `acc`.
    pub(crate) async fn run<T, A, D, M>(
        self,
        registry: &BackendRegistry,
        cancellable: &CancellationToken,
        mut acc: A,
        mut dispatch: D,
        mut merge: M,
    ) -> Result<A, JobError>
    where
        T: Send + 'static,
        D: FnMut(
            Arc<dyn Backend>,
            OperationReporter,
            CancellationToken,
        ) -> BoxFuture<'static, Result<T, BackendError>>,
        M: FnMut(&mut A, &str, T),
    {
        let operation = self.capability.as_str();
        let (tx, mut rx) = mpsc::unbounded_channel::<Message<T>>();
        let mut pending = Pending::new(operation);
        let mut progress = ProgressAggregator::new();
        let mut names: Vec<String> = Vec::new();
        let mut anything_ran = false;
        let mut dispatch_error = None;

        for (backend, enabled) in registry.backends() {
            if !enabled || !backend.supports(self.capability) {
                continue;
            }
            anything_ran = true;

            if cancellable.is_cancelled() {
                debug!(operation, "cancelled before dispatching to all backends");
                dispatch_error = Some(JobError::Cancelled);
                break;
            }

            let index = names.len();
            let name = backend.name().to_string();
            progress.register(&name);

            let report_tx = tx.clone();
            let reporter = OperationReporter::new(&name, move |report| {
                let _ = report_tx.send(Message::Report { index, report });
            });

            debug!(backend = %name, operation, "dispatching");
            let op = dispatch(backend, reporter, cancellable.clone());
            let done_tx = tx.clone();
            tokio::spawn(async move {
                let result = match AssertUnwindSafe(op).catch_unwind().await {
                    Ok(result) => result,
                    Err(_) => Err(BackendError::failed("backend operation panicked")),
                };
                let _ = done_tx.send(Message::Finished { index, result });
            });

            names.push(name);
            pending.remaining += 1;
        }

        if !anything_ran && self.require_backend {
            dispatch_error = Some(JobError::NotSupported(format!(
                "no backend implements {}",
                operation
            )));
        }
        let _ = tx.send(Message::DispatchDone {
            error: dispatch_error,
        });
        drop(tx);

        let mut ticker = self.progress_period.map(|period| {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });

        loop {
            tokio::select! {
                message = rx.recv() => {
                    let done = match message {
                        Some(Message::Report { index, report }) => {
                            self.handle_report(&names[index], report, &mut progress);
                            false
                        }
                        Some(Message::Finished { index, result }) => {
                            let name = &names[index];
                            progress.finish(name);
                            let error = match result {
                                Ok(partial) => {
                                    debug!(backend = %name, operation, "backend finished");
                                    merge(&mut acc, name, partial);
                                    None
                                }
                                Err(source) if source.is_cancelled() => {
                                    debug!(backend = %name, operation, "backend cancelled");
                                    Some(JobError::Backend {
                                        backend: name.clone(),
                                        source,
                                    })
                                }
                                Err(source) => {
                                    warn!(
                                        backend = %name,
                                        operation,
                                        error = %source,
                                        "backend failed, continuing with the others"
                                    );
                                    None
                                }
                            };
                            pending.finish(error)
                        }
                        Some(Message::DispatchDone { error }) => pending.finish(error),
                        None => true,
                    };
                    if done {
                        break;
                    }
                }
                _ = tick(&mut ticker) => {
                    if let Some(value) = progress.poll() {
                        self.emit(JobEvent::Progress(value));
                    }
                }
            }
        }

        if ticker.is_some() && !progress.is_empty() {
            if let Some(value) = progress.poll() {
                self.emit(JobEvent::Progress(value));
            }
        }

        match pending.error {
            Some(error) => Err(error),
            None => Ok(acc),
        }
    }

    fn handle_report(&self, backend: &str, report: Report, progress: &mut ProgressAggregator) {
        match report {
            Report::Progress(value) => progress.update(backend, value),
            Report::NeedsUserAction { app, action } => {
                debug!(backend, app = %app.id(), action = %action, "backend needs user action");
                self.emit(JobEvent::NeedsUserAction {
                    backend: backend.to_string(),
                    app,
                    action,
                });
            }
            Report::Event(event) => {
                warn!(
                    backend,
                    app = ?event.app.as_ref().map(|a| a.id().to_string()),
                    error = %event.error,
                    "backend reported a problem"
                );
                self.emit(JobEvent::Backend {
                    backend: backend.to_string(),
                    event,
                });
            }
        }
    }
}

async fn tick(ticker: &mut Option<Interval>) -> Instant {
    match ticker {
        Some(ticker) => ticker.tick().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_first_error_wins() {
        let mut pending = Pending::new("list_apps");
        pending.remaining = 3;

        assert!(!pending.finish(Some(JobError::Cancelled)));
        assert!(!pending.finish(Some(JobError::NotSupported("x".into()))));
        assert!(pending.finish(None));

        assert!(matches!(pending.error, Some(JobError::Cancelled)));
    }

    #[test]
    fn test_pending_starts_with_dispatch_slot() {
        let mut pending = Pending::new("refine");
        assert!(pending.finish(None));
        assert!(pending.error.is_none());
    }
}
