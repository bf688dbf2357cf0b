//! Per-mip metadata
//!
//! A [`MipDescriptor`] is everything a consumer needs to sample one published
//! level correctly: its stable binding slot, its resolution, and the texel
//! size vector shaders use for UV stepping. Descriptors are plain `Copy` data,
//! recomputed wholesale whenever the base resolution or the chain length
//! changes — the table never patches entries in place. A count past the
//! natural chain end yields a degenerate 1×1 descriptor for every tail index,
//! so oversubscribed consumers still read valid metadata.

use std::fmt;

use glam::{UVec2, Vec4};

use super::chain::PyramidChain;
use super::policy;

// ─── Binding Slot ─────────────────────────────────────────────────────────────

/// Stable identifier of a (chain, mip) binding.
///
/// Unlike the frame-scoped view handles, a slot never varies across frames or
/// reallocations; consumers and debug tooling key uniforms on it. The packed
/// form is `chain << 8 | mip`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingSlot(u32);

impl BindingSlot {
    #[inline]
    #[must_use]
    pub const fn new(chain: PyramidChain, mip: u32) -> Self {
        Self(((chain as u32) << 8) | (mip & 0xFF))
    }

    /// Chain this slot belongs to.
    #[inline]
    #[must_use]
    pub const fn chain(self) -> PyramidChain {
        match self.0 >> 8 {
            0 => PyramidChain::Near,
            _ => PyramidChain::Far,
        }
    }

    /// Mip level within the chain.
    #[inline]
    #[must_use]
    pub const fn mip(self) -> u32 {
        self.0 & 0xFF
    }

    /// Packed form, for hashing into composite keys.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for BindingSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.chain().name(), self.mip())
    }
}

// ─── Mip Descriptor ───────────────────────────────────────────────────────────

/// Metadata of one generated mip level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MipDescriptor {
    /// Stable binding identity of this level.
    pub slot: BindingSlot,
    /// Level resolution in texels.
    pub extent: UVec2,
    /// `(1/w, 1/h, w, h)` — the UV step vector consumers upload verbatim.
    pub texel_size: Vec4,
}

impl MipDescriptor {
    #[must_use]
    pub fn new(chain: PyramidChain, mip: u32, base: UVec2) -> Self {
        let extent = policy::mip_extent(base, mip);
        Self {
            slot: BindingSlot::new(chain, mip),
            extent,
            texel_size: policy::texel_size(extent),
        }
    }
}

impl fmt::Display for MipDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}x{})", self.slot, self.extent.x, self.extent.y)
    }
}

/// Upload form of a descriptor, matching a WGSL `array<MipInfo>` element
/// (stride 32).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuMipDescriptor {
    pub texel_size: Vec4,
    pub extent: UVec2,
    pub slot: u32,
    pub _pad: u32,
}

impl From<MipDescriptor> for GpuMipDescriptor {
    fn from(descriptor: MipDescriptor) -> Self {
        Self {
            texel_size: descriptor.texel_size,
            extent: descriptor.extent,
            slot: descriptor.slot.raw(),
            _pad: 0,
        }
    }
}

// ─── Mip Table ────────────────────────────────────────────────────────────────

/// Ordered descriptor sequence for one chain.
pub struct MipTable {
    chain: PyramidChain,
    base: UVec2,
    descriptors: Vec<MipDescriptor>,
}

impl MipTable {
    #[must_use]
    pub fn new(chain: PyramidChain) -> Self {
        Self {
            chain,
            base: UVec2::ZERO,
            descriptors: Vec::new(),
        }
    }

    /// Rebuilds the table for `base` and `count`.
    ///
    /// No-op (returns `false`) when both are unchanged — repeated calls leave
    /// the descriptors bit-identical. Otherwise, the whole sequence is
    /// regenerated. A zero base coerces the table to empty regardless of
    /// `count`.
    pub fn generate(&mut self, base: UVec2, count: u32) -> bool {
        let count = if base.x == 0 || base.y == 0 {
            0
        } else {
            policy::clamp_mip_count(count)
        };

        if base == self.base && count as usize == self.descriptors.len() {
            return false;
        }

        self.base = base;
        self.descriptors.clear();
        self.descriptors
            .extend((0..count).map(|mip| MipDescriptor::new(self.chain, mip, base)));
        true
    }

    /// Descriptor at `index`, or `None` when out of range.
    ///
    /// Speculative probes (debug viewers walking indices past the end) are
    /// expected; they get the sentinel, never a panic.
    #[inline]
    #[must_use]
    pub fn mip(&self, index: u32) -> Option<&MipDescriptor> {
        self.descriptors.get(index as usize)
    }

    /// The full descriptor sequence, in mip order.
    #[inline]
    #[must_use]
    pub fn descriptors(&self) -> &[MipDescriptor] {
        &self.descriptors
    }

    /// Descriptors in upload form, ready for `queue.write_buffer`.
    #[must_use]
    pub fn gpu_descriptors(&self) -> Vec<GpuMipDescriptor> {
        self.descriptors.iter().copied().map(Into::into).collect()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> u32 {
        self.descriptors.len() as u32
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Base resolution of the last rebuild.
    #[inline]
    #[must_use]
    pub fn base(&self) -> UVec2 {
        self.base
    }

    #[inline]
    #[must_use]
    pub fn chain(&self) -> PyramidChain {
        self.chain
    }
}
