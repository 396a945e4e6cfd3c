use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

use crate::binder::{CallSiteBinder, SendKind};
use log::debug;
use once_cell::sync::Lazy;
use opal_core::interner::Interned;
use parking_lot::RwLock;

/// The selectors that dominate call-site counts in typical programs:
/// arithmetic, comparison, and the core block/collection protocol. Their
/// binders are held permanently and never evicted.
pub static COMMON_SELECTORS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "+", "-", "*", "/", "%", "<", ">", "<=", ">=", "=", "~=", "==", //
        "value", "value:", "value:value:", //
        "at:", "at:put:", "size", "length", //
        "new", "class", "isNil", "notNil", "not", "and:", "or:", //
        "ifTrue:", "ifFalse:", "ifTrue:ifFalse:", "whileTrue:", "whileFalse:",
    ]
    .into_iter()
    .collect()
});

const NBR_SHARDS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct BinderKey {
    selector: Interned,
    kind: SendKind,
}

#[derive(Default)]
struct Shard {
    permanent: HashMap<BinderKey, Arc<CallSiteBinder>>,
    evictable: HashMap<BinderKey, Weak<CallSiteBinder>>,
}

/// The per-runtime registry of call-site binders: one binder per
/// (selector, send kind, argument shape), shared by every call site with
/// that shape.
///
/// Two tiers: binders for the fixed common-selector set are held strongly
/// and never evicted; all others are held weakly and reclaimed by `purge`
/// once no compiled code references them. Sharded so concurrent `get`/`add`
/// never contend on a single lock; concurrent `add` for one key may race,
/// in which case the loser adopts the winner's binder.
pub struct BinderCacheTable {
    shards: Vec<RwLock<Shard>>,
    permanent_selectors: HashSet<Interned>,
}

impl BinderCacheTable {
    /// Build a table whose permanent tier covers the given selectors.
    pub fn new(permanent_selectors: HashSet<Interned>) -> Self {
        Self {
            shards: (0..NBR_SHARDS).map(|_| RwLock::new(Shard::default())).collect(),
            permanent_selectors,
        }
    }

    fn shard(&self, key: &BinderKey) -> &RwLock<Shard> {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        &self.shards[hasher.finish() as usize % NBR_SHARDS]
    }

    /// Look up the binder for a key, if one is live.
    pub fn get(&self, selector: Interned, kind: SendKind) -> Option<Arc<CallSiteBinder>> {
        let key = BinderKey { selector, kind };
        let shard = self.shard(&key).read();
        shard
            .permanent
            .get(&key)
            .cloned()
            .or_else(|| shard.evictable.get(&key).and_then(Weak::upgrade))
    }

    /// Register a binder. Idempotent: if a live binder already exists for
    /// the key, the new one is discarded and the existing one returned, so
    /// a losing thread adopts the winner's instance.
    pub fn add(&self, binder: Arc<CallSiteBinder>) -> Arc<CallSiteBinder> {
        let key = BinderKey {
            selector: binder.selector,
            kind: binder.kind,
        };
        let mut shard = self.shard(&key).write();
        if self.permanent_selectors.contains(&key.selector) {
            return shard.permanent.entry(key).or_insert(binder).clone();
        }
        match shard.evictable.get(&key).and_then(Weak::upgrade) {
            Some(existing) => existing,
            None => {
                shard.evictable.insert(key, Arc::downgrade(&binder));
                binder
            }
        }
    }

    /// Get the binder for a key, creating it with `make` if absent.
    pub fn resolve_with(&self, selector: Interned, kind: SendKind, make: impl FnOnce() -> Arc<CallSiteBinder>) -> Arc<CallSiteBinder> {
        match self.get(selector, kind) {
            Some(binder) => binder,
            None => self.add(make()),
        }
    }

    /// The collection pass: drop evictable entries whose binder is no
    /// longer referenced by any compiled code. An entry re-registered
    /// since its predecessor died is live and must survive the pass.
    pub fn purge(&self) {
        let mut dropped = 0usize;
        for shard in &self.shards {
            let mut shard = shard.write();
            let before = shard.evictable.len();
            shard.evictable.retain(|_, binder| binder.strong_count() > 0);
            dropped += before - shard.evictable.len();
        }
        if dropped > 0 {
            debug!("binder cache purge dropped {} dead entries", dropped);
        }
    }

    /// The number of entries currently in the evictable tier, dead weak
    /// entries included until the next purge.
    pub fn evictable_len(&self) -> usize {
        self.shards.iter().map(|shard| shard.read().evictable.len()).sum()
    }

    /// The number of binders in the permanent tier.
    pub fn permanent_len(&self) -> usize {
        self.shards.iter().map(|shard| shard.read().permanent.len()).sum()
    }
}

impl std::fmt::Debug for BinderCacheTable {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("BinderCacheTable")
            .field("permanent", &self.permanent_len())
            .field("evictable", &self.evictable_len())
            .finish()
    }
}
