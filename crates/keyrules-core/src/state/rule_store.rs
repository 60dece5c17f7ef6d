// Keyrules Rule Store
// Publishes the live rule set; reloads replace it as a whole

use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::RuleSet;

/// Holder of the live rule set.
///
/// Readers take a snapshot with [`RuleStore::load`] and keep using it for as
/// long as they like. A reload builds a complete new set and swaps it in with
/// [`RuleStore::replace`], so readers see either the old set or the new one,
/// never a mix.
#[derive(Debug, Default)]
pub struct RuleStore {
    current: RwLock<Arc<RuleSet>>,
}

impl RuleStore {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            current: RwLock::new(Arc::new(rules)),
        }
    }

    /// Snapshot of the live rule set
    pub fn load(&self) -> Arc<RuleSet> {
        Arc::clone(&self.current.read())
    }

    /// Publish a new rule set, returning the one it replaced
    pub fn replace(&self, rules: RuleSet) -> Arc<RuleSet> {
        let count = rules.rules().len();
        let previous = std::mem::replace(&mut *self.current.write(), Arc::new(rules));
        log::debug!(
            "rule set replaced: {} rules -> {} rules",
            previous.rules().len(),
            count
        );
        previous
    }
}
