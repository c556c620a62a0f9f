use std::collections::BTreeMap;

use crate::app::Progress;

/// Combines per-backend progress into one job-wide value.
///
/// Each backend weighs `1/n` of the total. A backend in the unknown state
/// contributes nothing but still counts in `n`, so one silent backend caps
/// the reported value below 100 until it finishes.
#[derive(Debug, Default)]
pub struct ProgressAggregator {
    entries: BTreeMap<String, Progress>,
    last_reported: Progress,
}

impl ProgressAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a newly dispatched backend, starting at 0%.
    pub fn register(&mut self, backend: &str) {
        self.entries
            .insert(backend.to_string(), Progress::Percent(0));
    }

    pub fn update(&mut self, backend: &str, progress: Progress) {
        self.entries.insert(backend.to_string(), progress);
    }

    /// Mark a backend as done.
    pub fn finish(&mut self, backend: &str) {
        self.update(backend, Progress::Percent(100));
    }

    /// Whether no backend has been registered or updated yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current aggregate: unknown if every entry is unknown.
    pub fn aggregate(&self) -> Progress {
        let n = self.entries.len();
        if n == 0 {
            return Progress::Unknown;
        }

        let share = 100.0 / n as f64;
        let mut all_unknown = true;
        let mut total = 0.0;
        for progress in self.entries.values() {
            if let Progress::Percent(value) = progress {
                all_unknown = false;
                total += share * (*value as f64 / 100.0);
            }
        }

        if all_unknown {
            Progress::Unknown
        } else {
            Progress::percent(total.round().min(100.0) as u8)
        }
    }

    /// The aggregate, if it differs from the last value returned here.
    pub fn poll(&mut self) -> Option<Progress> {
        let current = self.aggregate();
        if current == self.last_reported {
            return None;
        }
        self.last_reported = current;
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_unknown() {
        let mut agg = ProgressAggregator::new();
        assert!(agg.is_empty());
        assert_eq!(agg.aggregate(), Progress::Unknown);
        agg.register("a");
        assert!(!agg.is_empty());
    }

    #[test]
    fn test_all_unknown_is_unknown() {
        let mut agg = ProgressAggregator::new();
        agg.update("a", Progress::Unknown);
        agg.update("b", Progress::Unknown);
        assert_eq!(agg.aggregate(), Progress::Unknown);
        assert_eq!(agg.poll(), None);
    }

    #[test]
    fn test_registered_backends_start_at_zero() {
        let mut agg = ProgressAggregator::new();
        agg.register("a");
        assert_eq!(agg.aggregate(), Progress::Percent(0));
        assert_eq!(agg.poll(), Some(Progress::Percent(0)));
    }

    #[test]
    fn test_unknown_counts_in_denominator() {
        let mut agg = ProgressAggregator::new();
        agg.update("a", Progress::Percent(100));
        agg.update("b", Progress::Unknown);
        assert_eq!(agg.aggregate(), Progress::Percent(50));
    }

    #[test]
    fn test_rounds_to_nearest() {
        let mut agg = ProgressAggregator::new();
        agg.update("a", Progress::Percent(50));
        agg.update("b", Progress::Percent(0));
        agg.update("c", Progress::Percent(1));
        // 16.67 + 0 + 0.33
        assert_eq!(agg.aggregate(), Progress::Percent(17));
    }

    #[test]
    fn test_all_finished_is_100() {
        let mut agg = ProgressAggregator::new();
        for name in ["a", "b", "c"] {
            agg.register(name);
        }
        for name in ["a", "b", "c"] {
            agg.finish(name);
        }
        assert_eq!(agg.aggregate(), Progress::Percent(100));
    }

    #[test]
    fn test_poll_emits_only_changes() {
        let mut agg = ProgressAggregator::new();
        agg.register("a");
        agg.register("b");

        assert_eq!(agg.poll(), Some(Progress::Percent(0)));
        assert_eq!(agg.poll(), None);

        agg.update("a", Progress::Percent(50));
        assert_eq!(agg.poll(), Some(Progress::Percent(25)));
        assert_eq!(agg.poll(), None);
    }

    #[test]
    fn test_value_always_in_range() {
        let mut agg = ProgressAggregator::new();
        for (i, value) in [0u8, 33, 66, 99, 100, 100, 100].iter().enumerate() {
            agg.update(&i.to_string(), Progress::Percent(*value));
            let p = agg.aggregate().as_percent().unwrap();
            assert!(p <= 100);
        }
    }
}
