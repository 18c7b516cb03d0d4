use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use playhub::types::Value;
use tracing::debug;

use crate::contracts::{Contract, ContractCall, RefreshPolicy};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheEntry {
    pub value: Value,
    pub fetched_at: Duration,
    pub policy: RefreshPolicy,
    /// Set by invalidation. A stale entry is still served until replaced.
    pub stale: bool,
}

impl CacheEntry {
    pub fn is_fresh(&self, now: Duration) -> bool {
        !self.stale && now.saturating_sub(self.fetched_at) < self.policy.stale_after
    }
}

/// Last known value of every read, keyed by the resolved call.
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: HashMap<ContractCall, CacheEntry>,
}

/// Process-wide cache shared by the reader and the writer.
pub type CacheHandle = Rc<RefCell<QueryCache>>;

impl QueryCache {
    pub fn new_handle() -> CacheHandle {
        Rc::new(RefCell::new(QueryCache::default()))
    }

    pub fn get(&self, key: &ContractCall) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    pub fn insert(
        &mut self,
        key: ContractCall,
        value: Value,
        now: Duration,
        policy: RefreshPolicy,
    ) {
        self.entries.insert(
            key,
            CacheEntry {
                value,
                fetched_at: now,
                policy,
                stale: false,
            },
        );
    }

    fn mark_stale_where(
        &mut self,
        mut pred: impl FnMut(&ContractCall, &CacheEntry) -> bool,
    ) -> usize {
        let mut marked = 0;
        for (key, entry) in self.entries.iter_mut() {
            if pred(key, entry) {
                entry.stale = true;
                marked += 1;
            }
        }
        marked
    }

    /// Mark every read against `contracts` stale. Returns how many entries changed.
    pub fn invalidate_contracts(&mut self, contracts: &[Contract]) -> usize {
        let marked = self.mark_stale_where(|key, _| contracts.contains(&key.contract));
        debug!("invalidated {} cached reads for {:?}", marked, contracts);
        marked
    }

    pub fn invalidate_on_focus(&mut self) -> usize {
        self.mark_stale_where(|_, entry| entry.policy.refetch_on_focus)
    }

    pub fn invalidate_on_reconnect(&mut self) -> usize {
        self.mark_stale_where(|_, entry| entry.policy.refetch_on_reconnect)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
