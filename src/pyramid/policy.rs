//! Mip resolution policy
//!
//! The single rounding rule for the whole subsystem: the resolution of mip
//! `i` is `max(1, base >> i)` per axis (floor halving, clamped to 1). CPU
//! metadata, storage allocation and the GPU kernels all derive their sizes
//! from these functions — if the rule ever diverges between them, reduction
//! output misaligns with consumer sampling.

use glam::{UVec2, Vec4};

/// Hard upper bound on mips per chain.
pub const MIP_COUNT_MAX: u32 = 16;

/// Thread-group edge length of the reduction kernels (see `depth_reduce.wgsl`).
pub const REDUCE_WORKGROUP_SIZE: u32 = 8;

/// Resolution of mip `mip` for the given base resolution.
///
/// `max(1, base >> mip)` per axis. Shifts past the bit width collapse to 1.
#[inline]
#[must_use]
pub fn mip_extent(base: UVec2, mip: u32) -> UVec2 {
    UVec2::new(
        base.x.checked_shr(mip).unwrap_or(0).max(1),
        base.y.checked_shr(mip).unwrap_or(0).max(1),
    )
}

/// Number of levels in a full chain down to 1×1 along the longer axis.
///
/// Returns 0 for a zero-sized base; otherwise clamped to [`MIP_COUNT_MAX`].
#[inline]
#[must_use]
pub fn full_chain_len(base: UVec2) -> u32 {
    let longest = base.max_element();
    if longest == 0 {
        return 0;
    }
    (32 - longest.leading_zeros()).min(MIP_COUNT_MAX)
}

/// Clamps a requested mip count into `[0, MIP_COUNT_MAX]`.
#[inline]
#[must_use]
pub fn clamp_mip_count(count: u32) -> u32 {
    count.min(MIP_COUNT_MAX)
}

/// Texel-size vector `(1/w, 1/h, w, h)` for a mip resolution.
#[inline]
#[must_use]
pub fn texel_size(extent: UVec2) -> Vec4 {
    let w = extent.x.max(1) as f32;
    let h = extent.y.max(1) as f32;
    Vec4::new(1.0 / w, 1.0 / h, w, h)
}

/// Thread-group counts covering `extent` with the reduction workgroup size,
/// rounded up.
#[inline]
#[must_use]
pub fn workgroup_count(extent: UVec2) -> UVec2 {
    UVec2::new(
        extent.x.div_ceil(REDUCE_WORKGROUP_SIZE),
        extent.y.div_ceil(REDUCE_WORKGROUP_SIZE),
    )
}
