//! Graph execution contexts
//!
//! Split the frame into the two phases nodes see: a mutable preparation pass
//! where every allocation happens, then a read-only execution pass that only
//! records commands. Keeping allocation out of `run` is what lets the whole
//! graph share one command encoder.

use crate::core::GpuContext;
use crate::pyramid::{DepthSource, PyramidGenerator};

/// Mutable frame state handed to [`RenderNode::prepare`](super::RenderNode).
pub struct PrepareContext<'a> {
    pub gpu: &'a GpuContext,
    pub pyramid: &'a mut PyramidGenerator,
    /// This frame's resolved depth, when the host rendered one.
    pub depth_source: Option<DepthSource<'a>>,
    /// Format of the frame's color target, for nodes that draw into it.
    pub target_format: wgpu::TextureFormat,
}

/// Read-only frame state handed to [`RenderNode::run`](super::RenderNode).
pub struct ExecuteContext<'a> {
    pub gpu: &'a GpuContext,
    pub pyramid: &'a PyramidGenerator,
    /// The frame's color target, when one exists to draw into.
    pub target_view: Option<&'a wgpu::TextureView>,
}
