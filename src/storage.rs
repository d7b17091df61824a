//! Registration table for the DI container
//!
//! Uses DashMap for lock-free concurrent reads, with a sequence number per
//! entry so names can be listed in registration order.

use crate::Provider;
use ahash::RandomState;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A registered provider and its registration slot.
struct Slot {
    order: u64,
    provider: Provider,
}

/// Name-keyed provider storage with an optional parent link.
pub(crate) struct ProviderStorage {
    /// Map from dependency name to provider
    providers: DashMap<String, Slot, RandomState>,
    /// Next registration slot
    sequence: AtomicU64,
    /// Parent storage for hierarchical resolution
    parent: Option<Arc<ProviderStorage>>,
}

impl ProviderStorage {
    /// Create new empty storage.
    ///
    /// 8 shards: typical containers hold a few dozen names.
    #[inline]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create with pre-allocated capacity.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        let shard_amount = if capacity <= 16 {
            8
        } else if capacity <= 64 {
            16
        } else {
            32
        };
        Self {
            providers: DashMap::with_capacity_and_hasher_and_shard_amount(
                capacity,
                RandomState::new(),
                shard_amount,
            ),
            sequence: AtomicU64::new(0),
            parent: None,
        }
    }

    /// Create a child storage that falls back to this one.
    #[inline]
    pub fn child(self: &Arc<Self>) -> Self {
        Self {
            parent: Some(Arc::clone(self)),
            ..Self::new()
        }
    }

    /// Store a provider, returning `true` if it replaced an existing one.
    ///
    /// A replaced name keeps its original slot.
    pub fn insert(&self, name: String, provider: Provider) -> bool {
        match self.providers.entry(name) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().provider = provider;
                true
            }
            Entry::Vacant(entry) => {
                let order = self.sequence.fetch_add(1, Ordering::Relaxed);
                entry.insert(Slot { order, provider });
                false
            }
        }
    }

    /// Check if a name is registered here (parents not consulted)
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// Look up a provider registered here.
    ///
    /// Returns a clone so no shard lock is held while the getter runs.
    #[inline]
    pub fn get(&self, name: &str) -> Option<Provider> {
        self.providers.get(name).map(|slot| slot.provider.clone())
    }

    /// The parent storage, `None` at the root.
    #[inline]
    pub fn parent(&self) -> Option<&Arc<ProviderStorage>> {
        self.parent.as_ref()
    }

    /// Find the nearest storage in the chain (this one included) holding `name`.
    pub fn find_in_chain(self: &Arc<Self>, name: &str) -> Option<(Arc<Self>, Provider, u32)> {
        let mut current = self;
        let mut hops = 0;
        loop {
            if let Some(provider) = current.get(name) {
                return Some((Arc::clone(current), provider, hops));
            }
            current = current.parent()?;
            hops += 1;
        }
    }

    /// Registered names in registration order.
    pub fn names(&self) -> Vec<String> {
        let mut slots: Vec<(u64, String)> = self
            .providers
            .iter()
            .map(|entry| (entry.value().order, entry.key().clone()))
            .collect();
        slots.sort_unstable_by_key(|(order, _)| *order);
        slots.into_iter().map(|(_, name)| name).collect()
    }

    /// Get number of registered providers
    #[inline]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Check if empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Check if this storage has a parent
    #[inline]
    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }
}

impl Default for ProviderStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ProviderStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderStorage")
            .field("count", &self.len())
            .field("has_parent", &self.has_parent())
            .finish()
    }
}
