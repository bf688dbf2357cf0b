//! Hierarchical depth pyramid generation on wgpu.
//!
//! Builds two reduced-depth mip chains from a frame's depth buffer: a near
//! chain where every texel keeps the closest sample of its footprint, and a
//! far chain keeping the farthest. Occlusion culling, screen-space ray
//! marching, and soft-particle fading sample these chains at whatever level
//! matches their query footprint.
//!
//! [`PyramidGenerator`] is the entry point. Hosts drive it per frame with
//! `begin_frame`, `prepare`, `record`, either directly or by dropping a
//! [`DepthPyramidNode`] into the linear [`RenderGraph`]. Consumers register
//! their needs up front ([`PyramidGenerator::ensure_mip_count`]) and look up
//! frame-scoped handles after preparation
//! ([`PyramidGenerator::frame_handle`]).

pub mod core;
pub mod errors;
pub mod graph;
pub mod passes;
pub mod pyramid;
pub mod settings;

pub use self::core::{BindGroupCache, BindGroupKey, GpuContext, Tracked};
pub use errors::{Result, StrataError};
pub use graph::{ExecuteContext, PrepareContext, RenderGraph, RenderNode};
pub use passes::{DepthPyramidNode, PyramidDebugNode};
pub use pyramid::{
    BindingSlot, DepthHistory, DepthSource, FrameSummary, GpuMipDescriptor, MIP_COUNT_MAX,
    MipDescriptor, PublishedMip, PyramidChain, PyramidGenerator, ReduceOp, SkipReason,
    StorageEvent,
};
pub use settings::{ChainOptions, DebugView, DepthConvention, PyramidSettings};
