//! Reduction Semantics Tests
//!
//! Tests for:
//! - The 2x2 clamped fold both reduce kernels implement, mirrored on the CPU
//! - Min/max selection per chain and depth convention
//! - Full-chain folds down to 1x1 on even and odd extents
//!
//! The CPU fold here reads the same clamped footprint as the shader, so the
//! expected values below are exactly what a readback of the GPU levels
//! produces.

use glam::UVec2;

use strata::pyramid::{PyramidChain, ReduceOp, policy, resolve_reduce_op};
use strata::settings::DepthConvention;

// ============================================================================
// CPU Reference Fold
// ============================================================================

struct CpuLevel {
    extent: UVec2,
    texels: Vec<f32>,
}

impl CpuLevel {
    fn from_fn(extent: UVec2, f: impl Fn(u32, u32) -> f32) -> Self {
        let mut texels = Vec::with_capacity((extent.x * extent.y) as usize);
        for y in 0..extent.y {
            for x in 0..extent.x {
                texels.push(f(x, y));
            }
        }
        Self { extent, texels }
    }

    fn at(&self, x: u32, y: u32) -> f32 {
        self.texels[(y * self.extent.x + x) as usize]
    }
}

fn apply(op: ReduceOp, a: f32, b: f32) -> f32 {
    match op {
        ReduceOp::Min => a.min(b),
        ReduceOp::Max => a.max(b),
    }
}

/// One fold step with the kernel's edge clamp.
fn reduce_level(src: &CpuLevel, op: ReduceOp) -> CpuLevel {
    let extent = policy::mip_extent(src.extent, 1);
    CpuLevel::from_fn(extent, |x, y| {
        let cx = |v: u32| v.min(src.extent.x - 1);
        let cy = |v: u32| v.min(src.extent.y - 1);
        let (bx, by) = (x * 2, y * 2);
        apply(
            op,
            apply(op, src.at(cx(bx), cy(by)), src.at(cx(bx + 1), cy(by))),
            apply(op, src.at(cx(bx), cy(by + 1)), src.at(cx(bx + 1), cy(by + 1))),
        )
    })
}

fn pattern(x: u32, y: u32) -> f32 {
    ((x * 31 + y * 17) % 97) as f32 / 96.0
}

// ============================================================================
// Single Fold Tests
// ============================================================================

#[test]
fn four_by_four_fold_keeps_the_right_extremum() {
    #[rustfmt::skip]
    let texels = vec![
        9.0, 8.0, 1.0, 2.0,
        7.0, 6.0, 3.0, 4.0,
        5.0, 5.0, 9.0, 9.0,
        5.0, 2.0, 9.0, 10.0,
    ];
    let src = CpuLevel {
        extent: UVec2::new(4, 4),
        texels,
    };

    let min = reduce_level(&src, ReduceOp::Min);
    assert_eq!(min.extent, UVec2::new(2, 2));
    assert_eq!(min.at(0, 0), 6.0);
    assert_eq!(min.at(1, 0), 1.0);
    assert_eq!(min.at(0, 1), 2.0);
    assert_eq!(min.at(1, 1), 9.0);

    let max = reduce_level(&src, ReduceOp::Max);
    assert_eq!(max.at(0, 0), 9.0);
    assert_eq!(max.at(1, 0), 4.0);
    assert_eq!(max.at(0, 1), 5.0);
    assert_eq!(max.at(1, 1), 10.0);
}

#[test]
fn one_wide_levels_clamp_instead_of_reading_out_of_bounds() {
    let src = CpuLevel::from_fn(UVec2::new(1, 8), |_, y| y as f32);
    let out = reduce_level(&src, ReduceOp::Max);

    assert_eq!(out.extent, UVec2::new(1, 4));
    // Each target texel folds rows 2y and 2y+1; x+1 clamps back onto x=0.
    for y in 0..4 {
        assert_eq!(
            out.at(0, y),
            (y * 2 + 1) as f32,
            "row pair ({}, {}) should keep its larger member",
            y * 2,
            y * 2 + 1
        );
    }
}

#[test]
fn odd_extent_fold_drops_the_remainder_column() {
    // 5x3 folds to 2x1: source column 4 and row 2 fall outside every
    // footprint, matching the floor-divide resolution rule.
    let src = CpuLevel::from_fn(UVec2::new(5, 3), |x, y| (y * 5 + x) as f32);
    let out = reduce_level(&src, ReduceOp::Max);

    assert_eq!(out.extent, UVec2::new(2, 1));
    assert_eq!(out.at(0, 0), 6.0, "covers (0,0),(1,0),(0,1),(1,1)");
    assert_eq!(out.at(1, 0), 8.0, "covers (2,0),(3,0),(2,1),(3,1)");
}

// ============================================================================
// Full Chain Tests
// ============================================================================

#[test]
fn power_of_two_chain_ends_at_the_global_extremum() {
    let base = CpuLevel::from_fn(UVec2::new(16, 16), pattern);
    let global_min = base.texels.iter().copied().fold(f32::INFINITY, f32::min);
    let global_max = base.texels.iter().copied().fold(f32::NEG_INFINITY, f32::max);

    let mut level = CpuLevel {
        extent: base.extent,
        texels: base.texels.clone(),
    };
    while level.extent != UVec2::ONE {
        level = reduce_level(&level, ReduceOp::Min);
    }
    assert_eq!(
        level.at(0, 0),
        global_min,
        "every base texel participates when dimensions are powers of two"
    );

    let mut level = base;
    while level.extent != UVec2::ONE {
        level = reduce_level(&level, ReduceOp::Max);
    }
    assert_eq!(level.at(0, 0), global_max);
}

#[test]
fn chain_extents_match_the_descriptor_rule() {
    let mut level = CpuLevel::from_fn(UVec2::new(1920, 1080), pattern);
    let base = level.extent;
    let mut mip = 0;
    while level.extent != UVec2::ONE {
        assert_eq!(level.extent, policy::mip_extent(base, mip));
        level = reduce_level(&level, ReduceOp::Min);
        mip += 1;
    }
    assert_eq!(mip + 1, policy::full_chain_len(base));
}

// ============================================================================
// Kernel Selection Tests
// ============================================================================

#[test]
fn nearest_wins_uses_min_under_standard_depth() {
    assert_eq!(
        resolve_reduce_op(PyramidChain::Near, DepthConvention::Standard),
        ReduceOp::Min
    );
    assert_eq!(
        resolve_reduce_op(PyramidChain::Far, DepthConvention::Standard),
        ReduceOp::Max
    );
}

#[test]
fn reversed_depth_swaps_both_kernels() {
    assert!(DepthConvention::Reversed.is_reversed());
    assert!(!DepthConvention::Standard.is_reversed());
    assert_eq!(
        resolve_reduce_op(PyramidChain::Near, DepthConvention::Reversed),
        ReduceOp::Max
    );
    assert_eq!(
        resolve_reduce_op(PyramidChain::Far, DepthConvention::Reversed),
        ReduceOp::Min
    );
    assert_eq!(ReduceOp::Min.entry_point(), "reduce_min");
    assert_eq!(ReduceOp::Max.entry_point(), "reduce_max");
}
