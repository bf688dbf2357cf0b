use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global unique id generator.
static NEXT_RESOURCE_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    NEXT_RESOURCE_ID.fetch_add(1, Ordering::Relaxed)
}

/// Resource wrapper carrying a globally unique id.
///
/// Texture views published through the frame handle table are identified by
/// this id, so consumers and the bind-group cache can tell "same binding" from
/// "recreated binding" without comparing GPU objects. Ids start at 1; 0 never
/// names a live resource.
#[derive(Debug, Clone)]
pub struct Tracked<T> {
    inner: T,
    id: u64,
}

impl<T> Tracked<T> {
    /// Wraps a resource and assigns it a fresh id.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            id: next_id(),
        }
    }

    /// Unique id (bind-group cache key, frame-handle identity).
    #[inline]
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Unwraps the inner resource, discarding the id.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

// Direct access to inner methods (e.g. view.texture()).
impl<T> Deref for Tracked<T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_nonzero() {
        let a = Tracked::new(0u8);
        let b = Tracked::new(0u8);
        assert_ne!(a.id(), 0);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn deref_reaches_inner() {
        let v = Tracked::new(vec![1, 2, 3]);
        assert_eq!(v.len(), 3);
        assert_eq!(v.into_inner(), vec![1, 2, 3]);
    }
}
