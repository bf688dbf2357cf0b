//! Depth pyramid node
//!
//! Thin graph adapter over [`PyramidGenerator`]: opens the frame and prepares
//! allocations during the graph's prepare phase, records the planned passes
//! during execution. Place it after whatever node produces the depth source
//! and before any node that consumes published levels.

use crate::errors::Result;
use crate::graph::{ExecuteContext, PrepareContext, RenderNode};
use crate::pyramid::PyramidGenerator;

#[derive(Default)]
pub struct DepthPyramidNode;

impl DepthPyramidNode {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl RenderNode for DepthPyramidNode {
    fn name(&self) -> &str {
        "depth_pyramid"
    }

    fn prepare(&mut self, ctx: &mut PrepareContext<'_>) -> Result<()> {
        ctx.pyramid.begin_frame()?;
        let summary = ctx.pyramid.prepare(&ctx.gpu.device, ctx.depth_source.as_ref())?;
        if let Some(reason) = summary.skipped {
            log::debug!("depth pyramid skipped: {reason:?}");
        }
        Ok(())
    }

    fn run(&self, ctx: &ExecuteContext<'_>, encoder: &mut wgpu::CommandEncoder) -> Result<()> {
        ctx.pyramid.record(encoder)
    }
}

/// Standalone driver for hosts that record frames without a graph.
///
/// Equivalent to adding a [`DepthPyramidNode`] as the only node: one
/// `begin_frame`/`prepare`/`record` cycle into the given encoder.
pub fn generate_into(
    pyramid: &mut PyramidGenerator,
    device: &wgpu::Device,
    source: Option<&crate::pyramid::DepthSource<'_>>,
    encoder: &mut wgpu::CommandEncoder,
) -> Result<crate::pyramid::FrameSummary> {
    pyramid.begin_frame()?;
    let summary = pyramid.prepare(device, source)?;
    pyramid.record(encoder)?;
    Ok(summary)
}
