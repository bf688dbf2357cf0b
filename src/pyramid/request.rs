//! Request aggregation
//!
//! Consumers declare what they need (a minimum mip count, history access)
//! before the frame is prepared; this module folds those declarations into
//! one target per chain. Counts ratchet upward across calls unless a caller
//! explicitly forces a reduction, so unordered registration within a frame
//! converges on the same target. Every accepted change raises a dirty flag
//! that the generator consumes during descriptor check.

use bitflags::bitflags;

use super::chain::PyramidChain;
use super::policy;

bitflags! {
    /// Why a chain needs its descriptors re-examined this frame.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DirtyReasons: u8 {
        /// Target mip count grew (or shrank under force).
        const COUNT = 1 << 0;
        /// A forced request overrode the ratchet.
        const FORCED = 1 << 1;
        /// History interest was gained or dropped.
        const HISTORY = 1 << 2;
        /// Base resolution changed since the last prepared frame.
        const RESOLUTION = 1 << 3;
    }
}

#[derive(Debug, Clone, Copy)]
struct ChainRequest {
    target_count: u32,
    dirty: DirtyReasons,
}

impl Default for ChainRequest {
    fn default() -> Self {
        Self {
            target_count: 0,
            dirty: DirtyReasons::empty(),
        }
    }
}

/// Per-chain request state, shared by all consumers of the pyramid.
#[derive(Debug, Default)]
pub struct RequestAggregator {
    chains: [ChainRequest; PyramidChain::COUNT],
    history_interest: u32,
}

impl RequestAggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a mip-count requirement for `chain`.
    ///
    /// Without `force`, the stored target only ratchets upward; a smaller
    /// `count` is absorbed silently. With `force`, the target is set exactly,
    /// which is how a chain is shrunk or released (`count == 0`). Values above
    /// the supported maximum are clamped, not rejected.
    pub fn ensure_count(&mut self, chain: PyramidChain, count: u32, force: bool) {
        let count = policy::clamp_mip_count(count);
        let req = &mut self.chains[chain.index()];

        if force {
            if req.target_count != count {
                req.target_count = count;
                req.dirty |= DirtyReasons::COUNT;
            }
            req.dirty |= DirtyReasons::FORCED;
        } else if count > req.target_count {
            req.target_count = count;
            req.dirty |= DirtyReasons::COUNT;
        }
    }

    /// Current aggregated target for `chain`.
    #[inline]
    #[must_use]
    pub fn target_count(&self, chain: PyramidChain) -> u32 {
        self.chains[chain.index()].target_count
    }

    /// Declares interest in previous-frame depth. Counted, so independent
    /// consumers can overlap.
    pub fn request_history(&mut self) {
        self.history_interest += 1;
        if self.history_interest == 1 {
            for req in &mut self.chains {
                req.dirty |= DirtyReasons::HISTORY;
            }
        }
    }

    /// Drops one unit of history interest. Releasing below zero is a caller
    /// bug; it saturates rather than wrapping.
    pub fn release_history(&mut self) {
        if self.history_interest == 0 {
            log::warn!("history interest released more times than requested");
            return;
        }
        self.history_interest -= 1;
        if self.history_interest == 0 {
            for req in &mut self.chains {
                req.dirty |= DirtyReasons::HISTORY;
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn wants_history(&self) -> bool {
        self.history_interest > 0
    }

    /// Marks `chain` dirty for an externally detected reason (base resolution
    /// change, debug override).
    pub fn mark_dirty(&mut self, chain: PyramidChain, reasons: DirtyReasons) {
        self.chains[chain.index()].dirty |= reasons;
    }

    #[inline]
    #[must_use]
    pub fn is_dirty(&self, chain: PyramidChain) -> bool {
        !self.chains[chain.index()].dirty.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn dirty_reasons(&self, chain: PyramidChain) -> DirtyReasons {
        self.chains[chain.index()].dirty
    }

    #[inline]
    #[must_use]
    pub fn any_dirty(&self) -> bool {
        PyramidChain::ALL.iter().any(|&c| self.is_dirty(c))
    }

    /// Consumes the dirty flags once the frame has acted on them.
    pub fn clear_dirty(&mut self, chain: PyramidChain) {
        self.chains[chain.index()].dirty = DirtyReasons::empty();
    }
}
