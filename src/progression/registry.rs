use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use super::{ProgressionRecord, ProgressionRules, ProgressionTracker};

/// One tracker per user behind its own lock; holding the lock is the per-user
/// critical section.
pub type SharedTracker = Arc<Mutex<ProgressionTracker>>;

pub struct TrackerRegistry {
    rules: Arc<ProgressionRules>,
    trackers: RwLock<HashMap<String, SharedTracker>>,
}

impl Default for TrackerRegistry {
    fn default() -> Self {
        Self::new(Arc::new(ProgressionRules::default()))
    }
}

impl TrackerRegistry {
    pub fn new(rules: Arc<ProgressionRules>) -> Self {
        Self {
            rules,
            trackers: RwLock::new(HashMap::new()),
        }
    }

    pub fn rules(&self) -> &Arc<ProgressionRules> {
        &self.rules
    }

    pub fn get(&self, user_id: &str) -> Option<SharedTracker> {
        self.trackers.read().get(user_id).cloned()
    }

    pub fn get_or_create(&self, user_id: &str, display_name: &str) -> SharedTracker {
        if let Some(existing) = self.get(user_id) {
            return existing;
        }
        let mut trackers = self.trackers.write();
        trackers
            .entry(user_id.to_string())
            .or_insert_with(|| {
                tracing::debug!(user_id = %user_id, "tracker created");
                Arc::new(Mutex::new(ProgressionTracker::with_rules(
                    user_id,
                    display_name,
                    Arc::clone(&self.rules),
                )))
            })
            .clone()
    }

    /// Replaces any live tracker for the record's user.
    pub fn import(&self, record: ProgressionRecord) -> SharedTracker {
        let user_id = record.user_id.clone();
        let tracker = Arc::new(Mutex::new(ProgressionTracker::from_record(
            record,
            Arc::clone(&self.rules),
        )));
        let replaced = self
            .trackers
            .write()
            .insert(user_id.clone(), Arc::clone(&tracker))
            .is_some();
        if replaced {
            tracing::warn!(user_id = %user_id, "live tracker replaced by imported record");
        }
        tracker
    }

    pub fn export(&self, user_id: &str) -> Option<ProgressionRecord> {
        self.get(user_id).map(|tracker| tracker.lock().to_record())
    }

    pub fn export_all(&self) -> Vec<ProgressionRecord> {
        let trackers: Vec<SharedTracker> = self.trackers.read().values().cloned().collect();
        let mut records: Vec<ProgressionRecord> =
            trackers.iter().map(|t| t.lock().to_record()).collect();
        records.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        records
    }

    pub fn remove(&self, user_id: &str) -> Option<SharedTracker> {
        self.trackers.write().remove(user_id)
    }

    pub fn len(&self) -> usize {
        self.trackers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.trackers.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Complexity;
    use crate::progression::AnswerOutcome;

    #[test]
    fn test_same_user_same_tracker() {
        let registry = TrackerRegistry::default();
        let a = registry.get_or_create("u1", "One");
        let b = registry.get_or_create("u1", "Ignored");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(b.lock().state().display_name, "One");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_export_import() {
        let registry = TrackerRegistry::default();
        registry
            .get_or_create("u1", "One")
            .lock()
            .record_outcome(&AnswerOutcome::new("Mood", Complexity::Basic, true));

        let record = registry.export("u1").unwrap();
        assert_eq!(record.total_answers, 1);

        let other = TrackerRegistry::default();
        let imported = other.import(record.clone());
        assert_eq!(imported.lock().to_record(), record);
        assert_eq!(other.export_all().len(), 1);
    }

    #[test]
    fn test_concurrent_updates_serialize() {
        let registry = Arc::new(TrackerRegistry::default());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        let tracker = registry.get_or_create("u1", "One");
                        tracker
                            .lock()
                            .record_outcome(&AnswerOutcome::new("Mood", Complexity::Basic, false));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.export("u1").unwrap().total_answers, 100);
    }
}
