use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use super::traits::Backend;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("backend '{0}' registered twice")]
    DuplicateBackend(String),

    #[error("backend ordering contains a cycle between: {}", .0.join(", "))]
    OrderingCycle(Vec<String>),

    #[error("unknown backend '{0}'")]
    UnknownBackend(String),
}

struct Entry {
    backend: Arc<dyn Backend>,
    enabled: AtomicBool,
}

/// The set of backends jobs dispatch to, in dispatch order.
///
/// The order honours every backend's `run_after` / `run_before` hints and
/// otherwise keeps registration order. Backends can be switched off at
/// runtime without unregistering them.
pub struct BackendRegistry {
    entries: Vec<Entry>,
}

impl BackendRegistry {
    /// Register `backends` and compute the dispatch order.
    pub fn new(backends: Vec<Arc<dyn Backend>>) -> Result<Self, RegistryError> {
        let ordered = order_backends(backends)?;
        info!(
            backends = ?ordered.iter().map(|b| b.name().to_string()).collect::<Vec<_>>(),
            "backend registry ready"
        );
        Ok(Self {
            entries: ordered
                .into_iter()
                .map(|backend| Entry {
                    backend,
                    enabled: AtomicBool::new(true),
                })
                .collect(),
        })
    }

    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Backend names in dispatch order.
    pub fn names(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| e.backend.name().to_string())
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Backend>> {
        self.entries
            .iter()
            .find(|e| e.backend.name() == name)
            .map(|e| Arc::clone(&e.backend))
    }

    /// Whether a backend is switched on here and reports itself usable.
    pub fn is_enabled(&self, name: &str) -> bool {
        self.entries
            .iter()
            .find(|e| e.backend.name() == name)
            .map(|e| e.enabled.load(Ordering::Relaxed) && e.backend.enabled())
            .unwrap_or(false)
    }

    pub fn set_enabled(&self, name: &str, enabled: bool) -> Result<(), RegistryError> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.backend.name() == name)
            .ok_or_else(|| RegistryError::UnknownBackend(name.to_string()))?;
        entry.enabled.store(enabled, Ordering::Relaxed);
        debug!(backend = %name, enabled, "backend toggled");
        Ok(())
    }

    /// All backends in dispatch order, with their enabled state.
    pub fn backends(&self) -> Vec<(Arc<dyn Backend>, bool)> {
        self.entries
            .iter()
            .map(|e| {
                let enabled = e.enabled.load(Ordering::Relaxed) && e.backend.enabled();
                (Arc::clone(&e.backend), enabled)
            })
            .collect()
    }
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("backends", &self.names())
            .finish()
    }
}

/// Stable topological sort over the ordering hints.
///
/// Among backends whose predecessors are all placed, the one registered
/// first goes next. Hints naming unknown backends are ignored.
fn order_backends(
    backends: Vec<Arc<dyn Backend>>,
) -> Result<Vec<Arc<dyn Backend>>, RegistryError> {
    let mut index_of: HashMap<String, usize> = HashMap::new();
    for (i, backend) in backends.iter().enumerate() {
        if index_of.insert(backend.name().to_string(), i).is_some() {
            return Err(RegistryError::DuplicateBackend(backend.name().to_string()));
        }
    }

    let n = backends.len();
    let mut successors: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); n];
    let mut add_edge = |from: usize, to: usize| {
        successors[from].insert(to);
    };

    for (i, backend) in backends.iter().enumerate() {
        for before in backend.run_after() {
            match index_of.get(&before) {
                Some(&j) => add_edge(j, i),
                None => debug!(backend = %backend.name(), other = %before, "ignoring run_after on unknown backend"),
            }
        }
        for after in backend.run_before() {
            match index_of.get(&after) {
                Some(&j) => add_edge(i, j),
                None => debug!(backend = %backend.name(), other = %after, "ignoring run_before on unknown backend"),
            }
        }
    }

    let mut in_degree = vec![0usize; n];
    for targets in &successors {
        for &t in targets {
            in_degree[t] += 1;
        }
    }

    let mut ready: BTreeSet<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
    let mut order: Vec<usize> = Vec::with_capacity(n);
    while let Some(next) = ready.pop_first() {
        order.push(next);
        for &t in &successors[next] {
            in_degree[t] -= 1;
            if in_degree[t] == 0 {
                ready.insert(t);
            }
        }
    }

    if order.len() != n {
        let placed: BTreeSet<usize> = order.iter().copied().collect();
        let stuck = (0..n)
            .filter(|i| !placed.contains(i))
            .map(|i| backends[i].name().to_string())
            .collect();
        return Err(RegistryError::OrderingCycle(stuck));
    }

    let mut slots: Vec<Option<Arc<dyn Backend>>> = backends.into_iter().map(Some).collect();
    Ok(order
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect())
}
