//! Bind-group caching keyed on resource identity.
//!
//! Reduce and copy dispatches bind the same (layout, source view, target
//! view) triples every frame while storage is stable. Caching on the
//! [`Tracked`](super::Tracked) ids means a steady-state frame creates zero
//! bind groups; any storage reallocation changes the ids and naturally
//! invalidates the stale entries.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Cache key: bind-group layout id plus the ordered resource ids bound.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct BindGroupKey {
    layout: u64,
    resources: SmallVec<[u64; 8]>,
}

impl BindGroupKey {
    #[must_use]
    pub fn new(layout_id: u64) -> Self {
        Self {
            layout: layout_id,
            resources: SmallVec::new(),
        }
    }

    /// Appends a resource id. Order matters and must match binding order.
    #[must_use]
    pub fn with_resource(mut self, id: u64) -> Self {
        self.resources.push(id);
        self
    }
}

/// Id-keyed bind-group cache.
#[derive(Default)]
pub struct BindGroupCache {
    groups: FxHashMap<BindGroupKey, wgpu::BindGroup>,
}

impl BindGroupCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached bind group for `key`, creating it on a miss.
    pub fn get_or_create<F>(&mut self, key: BindGroupKey, create: F) -> &wgpu::BindGroup
    where
        F: FnOnce() -> wgpu::BindGroup,
    {
        self.groups.entry(key).or_insert_with(create)
    }

    /// Drops entries that reference any of the given resource ids.
    ///
    /// Called after storage is released so the cache does not pin dead
    /// textures for the rest of the run.
    pub fn retire(&mut self, dead_ids: &[u64]) {
        if dead_ids.is_empty() {
            return;
        }
        self.groups
            .retain(|key, _| !key.resources.iter().any(|id| dead_ids.contains(id)));
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn clear(&mut self) {
        self.groups.clear();
    }
}
