//! Linear graph executor

use crate::core::GpuContext;
use crate::errors::Result;
use crate::pyramid::{DepthSource, PyramidGenerator};

use super::context::{ExecuteContext, PrepareContext};
use super::node::RenderNode;

/// Executes its nodes in insertion order: every `prepare` first, then every
/// `run` into a single command encoder, then one submit.
#[derive(Default)]
pub struct RenderGraph {
    nodes: Vec<Box<dyn RenderNode>>,
}

impl RenderGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<N: RenderNode + 'static>(&mut self, node: N) -> &mut Self {
        self.nodes.push(Box::new(node));
        self
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn execute(
        &mut self,
        gpu: &GpuContext,
        pyramid: &mut PyramidGenerator,
        depth_source: Option<DepthSource<'_>>,
        target_view: Option<&wgpu::TextureView>,
        target_format: wgpu::TextureFormat,
    ) -> Result<()> {
        {
            let mut ctx = PrepareContext {
                gpu,
                pyramid: &mut *pyramid,
                depth_source,
                target_format,
            };
            for node in &mut self.nodes {
                if let Err(err) = node.prepare(&mut ctx) {
                    log::error!("node '{}' failed to prepare: {err}", node.name());
                    return Err(err);
                }
            }
        }

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render_graph"),
            });
        let ctx = ExecuteContext {
            gpu,
            pyramid,
            target_view,
        };
        for node in &self.nodes {
            encoder.push_debug_group(node.name());
            if let Err(err) = node.run(&ctx, &mut encoder) {
                log::error!("node '{}' failed to record: {err}", node.name());
                return Err(err);
            }
            encoder.pop_debug_group();
        }

        gpu.queue.submit(Some(encoder.finish()));
        Ok(())
    }
}
