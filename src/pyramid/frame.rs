//! Frame handle table
//!
//! What consumers actually look up each frame: a per-chain map from mip index
//! to the view published for it, valid for exactly one frame. The table is
//! wiped at frame begin and refilled after dispatch planning, so a stale
//! handle can never leak across a reallocation. `None` is the ordinary
//! "unavailable" answer, not an error.

use super::chain::PyramidChain;
use super::descriptor::MipDescriptor;

/// One published level: the id of the view to bind plus its metadata.
#[derive(Debug, Clone, Copy)]
pub struct FrameHandleEntry {
    pub view_id: u64,
    pub descriptor: MipDescriptor,
}

/// Per-frame publication table for both chains.
pub struct FrameHandleTable {
    chains: [Vec<Option<FrameHandleEntry>>; PyramidChain::COUNT],
    frame: u64,
}

impl Default for FrameHandleTable {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameHandleTable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            chains: [Vec::new(), Vec::new()],
            frame: 0,
        }
    }

    /// Invalidates every handle and stamps the table with the new frame.
    pub fn reset(&mut self, frame: u64) {
        for chain in &mut self.chains {
            chain.clear();
        }
        self.frame = frame;
    }

    /// Publishes `entry` for `(chain, mip)`. Gaps below `mip` stay
    /// unavailable.
    pub fn publish(&mut self, chain: PyramidChain, mip: u32, entry: FrameHandleEntry) {
        let slots = &mut self.chains[chain.index()];
        let index = mip as usize;
        if slots.len() <= index {
            slots.resize_with(index + 1, || None);
        }
        slots[index] = Some(entry);
    }

    /// Handle published this frame for `(chain, mip)`, or `None` when the
    /// level was not produced.
    #[inline]
    #[must_use]
    pub fn get(&self, chain: PyramidChain, mip: u32) -> Option<&FrameHandleEntry> {
        self.chains[chain.index()]
            .get(mip as usize)
            .and_then(Option::as_ref)
    }

    /// Frame the current contents belong to.
    #[inline]
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Number of levels actually published for `chain` this frame.
    #[must_use]
    pub fn published_count(&self, chain: PyramidChain) -> u32 {
        self.chains[chain.index()]
            .iter()
            .filter(|slot| slot.is_some())
            .count() as u32
    }
}

#[cfg(test)]
mod tests {
    use glam::UVec2;

    use super::*;

    fn entry(chain: PyramidChain, mip: u32) -> FrameHandleEntry {
        FrameHandleEntry {
            view_id: u64::from(mip) + 100,
            descriptor: MipDescriptor::new(chain, mip, UVec2::new(640, 480)),
        }
    }

    #[test]
    fn reset_invalidates_previous_frame() {
        let mut table = FrameHandleTable::new();
        table.reset(1);
        table.publish(PyramidChain::Near, 0, entry(PyramidChain::Near, 0));
        assert!(table.get(PyramidChain::Near, 0).is_some());

        table.reset(2);
        assert!(table.get(PyramidChain::Near, 0).is_none());
        assert_eq!(table.frame(), 2);
    }

    #[test]
    fn unpublished_levels_read_as_unavailable() {
        let mut table = FrameHandleTable::new();
        table.reset(1);
        table.publish(PyramidChain::Far, 2, entry(PyramidChain::Far, 2));

        // The gap below a published level stays None, as does anything past
        // the end and the untouched chain.
        assert!(table.get(PyramidChain::Far, 0).is_none());
        assert!(table.get(PyramidChain::Far, 1).is_none());
        assert!(table.get(PyramidChain::Far, 2).is_some());
        assert!(table.get(PyramidChain::Far, 3).is_none());
        assert!(table.get(PyramidChain::Near, 2).is_none());
        assert_eq!(table.published_count(PyramidChain::Far), 1);
    }
}
