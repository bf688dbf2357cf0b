//! Mip Metadata Tests
//!
//! Tests for:
//! - Resolution rule for derived levels (shift with floor-at-one)
//! - Texel size vector layout and reciprocal consistency
//! - Binding slot packing, stability, and naming
//! - Wholesale descriptor table rebuilds and no-op detection
//! - Degenerate 1×1 tail past the natural chain end
//! - Upload layout of the GPU descriptor form

use glam::UVec2;

use strata::pyramid::{BindingSlot, GpuMipDescriptor, MipDescriptor, MipTable, PyramidChain, policy};

const EPSILON: f32 = 1e-6;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

// ============================================================================
// Resolution Rule Tests
// ============================================================================

#[test]
fn full_hd_mip_series_follows_shift_rule() {
    let base = UVec2::new(1920, 1080);
    let expected = [
        (1920, 1080),
        (960, 540),
        (480, 270),
        (240, 135),
        (120, 67),
        (60, 33),
        (30, 16),
        (15, 8),
        (7, 4),
        (3, 2),
        (1, 1),
    ];
    for (mip, &(w, h)) in expected.iter().enumerate() {
        let extent = policy::mip_extent(base, mip as u32);
        assert_eq!(
            extent,
            UVec2::new(w, h),
            "mip {mip} of 1920x1080 should be {w}x{h}, got {extent:?}"
        );
    }
    assert_eq!(
        policy::full_chain_len(base),
        11,
        "1920x1080 should support exactly 11 levels"
    );
}

#[test]
fn narrow_extents_floor_at_one() {
    let base = UVec2::new(1024, 4);
    // The short axis bottoms out at 1 while the long axis keeps halving.
    assert_eq!(policy::mip_extent(base, 2), UVec2::new(256, 1));
    assert_eq!(policy::mip_extent(base, 9), UVec2::new(2, 1));
    assert_eq!(policy::mip_extent(base, 10), UVec2::ONE);
    // Shifting past either axis never reaches zero.
    assert_eq!(policy::mip_extent(base, 30), UVec2::ONE);
}

// ============================================================================
// Descriptor Content Tests
// ============================================================================

#[test]
fn texel_size_packs_reciprocals_then_extent() {
    let desc = MipDescriptor::new(PyramidChain::Near, 4, UVec2::new(1920, 1080));

    assert_eq!(desc.extent, UVec2::new(120, 67));
    assert!(
        approx(desc.texel_size.x, 1.0 / 120.0),
        "x should be 1/width, got {}",
        desc.texel_size.x
    );
    assert!(
        approx(desc.texel_size.y, 1.0 / 67.0),
        "y should be 1/height, got {}",
        desc.texel_size.y
    );
    assert!(approx(desc.texel_size.z, 120.0));
    assert!(approx(desc.texel_size.w, 67.0));
}

#[test]
fn binding_slot_round_trips_chain_and_mip() {
    let slot = BindingSlot::new(PyramidChain::Far, 9);
    assert_eq!(slot.chain(), PyramidChain::Far);
    assert_eq!(slot.mip(), 9);
    assert_eq!(slot.to_string(), "far/9");

    let near = BindingSlot::new(PyramidChain::Near, 0);
    assert_eq!(near.to_string(), "near/0");
    assert_ne!(
        near.raw(),
        BindingSlot::new(PyramidChain::Far, 0).raw(),
        "the same mip on different chains must pack differently"
    );
}

// ============================================================================
// Mip Table Tests
// ============================================================================

#[test]
fn generate_is_a_noop_for_unchanged_inputs() {
    let mut table = MipTable::new(PyramidChain::Near);
    assert!(table.generate(UVec2::new(800, 600), 5), "first build");
    let snapshot: Vec<_> = table.descriptors().to_vec();

    assert!(
        !table.generate(UVec2::new(800, 600), 5),
        "same base and count should not rebuild"
    );
    assert_eq!(
        table.descriptors(),
        snapshot.as_slice(),
        "descriptors must be bit-identical after a no-op call"
    );
}

#[test]
fn generate_rebuilds_wholesale_on_base_change() {
    let mut table = MipTable::new(PyramidChain::Near);
    table.generate(UVec2::new(800, 600), 4);
    let old_mip2 = *table.mip(2).unwrap();

    assert!(table.generate(UVec2::new(1920, 1080), 4));
    let new_mip2 = table.mip(2).unwrap();
    assert_eq!(new_mip2.extent, UVec2::new(480, 270));
    assert_ne!(new_mip2.extent, old_mip2.extent);
    // Slots stay stable across rebuilds even though extents moved.
    assert_eq!(new_mip2.slot, old_mip2.slot);
}

#[test]
fn out_of_range_lookups_return_none() {
    let mut table = MipTable::new(PyramidChain::Far);
    table.generate(UVec2::new(256, 256), 3);

    assert!(table.mip(2).is_some());
    assert!(table.mip(3).is_none(), "index past the end is unavailable");
    assert!(table.mip(200).is_none());
}

#[test]
fn count_clamps_to_supported_maximum() {
    let mut table = MipTable::new(PyramidChain::Near);
    table.generate(UVec2::new(1 << 20, 1 << 20), 99);
    assert_eq!(
        table.len(),
        strata::MIP_COUNT_MAX,
        "oversized requests clamp instead of failing"
    );
}

#[test]
fn counts_past_the_natural_end_fill_a_degenerate_tail() {
    let mut table = MipTable::new(PyramidChain::Near);
    let base = UVec2::new(8, 4);
    assert_eq!(policy::full_chain_len(base), 4);

    assert!(table.generate(base, 7));
    assert_eq!(table.len(), 7, "the table covers the full requested count");
    for mip in 4..7 {
        let desc = table.mip(mip).expect("tail entry present");
        assert_eq!(desc.extent, UVec2::ONE, "tail mip {mip} stays 1x1");
        assert_eq!(desc.texel_size, policy::texel_size(UVec2::ONE));
        assert_eq!(desc.slot, BindingSlot::new(PyramidChain::Near, mip));
    }
    assert!(
        !table.generate(base, 7),
        "an unchanged tail count is still a no-op"
    );
}

#[test]
fn zero_base_coerces_to_empty() {
    let mut table = MipTable::new(PyramidChain::Near);
    table.generate(UVec2::new(512, 512), 4);
    assert!(table.generate(UVec2::ZERO, 4), "shape changed");
    assert!(table.is_empty());
    assert!(table.mip(0).is_none());
}

#[test]
fn descriptors_are_ordered_and_named_by_mip() {
    let mut table = MipTable::new(PyramidChain::Far);
    table.generate(UVec2::new(320, 240), 4);

    for (i, desc) in table.descriptors().iter().enumerate() {
        assert_eq!(desc.slot.mip(), i as u32);
        assert_eq!(desc.slot.chain(), PyramidChain::Far);
        assert_eq!(desc.to_string(), format!("far/{} ({}x{})", i, desc.extent.x, desc.extent.y));
    }
}

// ============================================================================
// GPU Layout Tests
// ============================================================================

#[test]
fn gpu_descriptor_matches_wgsl_stride() {
    assert_eq!(
        std::mem::size_of::<GpuMipDescriptor>(),
        32,
        "array<MipInfo> stride in shaders"
    );

    let descriptor = MipDescriptor::new(PyramidChain::Far, 3, UVec2::new(1920, 1080));
    let gpu = GpuMipDescriptor::from(descriptor);
    assert_eq!(gpu.slot, descriptor.slot.raw());
    assert_eq!(gpu.extent, descriptor.extent);
    assert_eq!(gpu.texel_size, descriptor.texel_size);
    assert_eq!(bytemuck::bytes_of(&gpu).len(), 32);
}

#[test]
fn gpu_descriptors_cover_the_whole_table() {
    let mut table = MipTable::new(PyramidChain::Near);
    table.generate(UVec2::new(640, 480), 5);

    let uploads = table.gpu_descriptors();
    assert_eq!(uploads.len(), 5);
    for (desc, gpu) in table.descriptors().iter().zip(&uploads) {
        assert_eq!(gpu.slot, desc.slot.raw());
        assert_eq!(gpu.extent, desc.extent);
    }
}
