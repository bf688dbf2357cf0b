//! Pyramid debug view
//!
//! Fullscreen blit of one published level as grayscale, driven by
//! [`DebugView`](crate::settings::DebugView) in the settings. The requested
//! mip is clamped to what the chain actually holds, so scrubbing past the top
//! of the chain shows the coarsest level instead of nothing.
//!
//! Must sit after [`DepthPyramidNode`](super::DepthPyramidNode) in the graph;
//! it reads handles published for the current frame.

use rustc_hash::FxHashMap;

use crate::core::Tracked;
use crate::errors::Result;
use crate::graph::{ExecuteContext, PrepareContext, RenderNode};

pub struct PyramidDebugNode {
    /// Single binding: the level to visualize, read with `textureLoad`.
    layout: Tracked<wgpu::BindGroupLayout>,
    shader: wgpu::ShaderModule,
    /// One pipeline per color target format, kept across frames.
    pipelines: FxHashMap<wgpu::TextureFormat, wgpu::RenderPipeline>,
    current_bind_group: Option<wgpu::BindGroup>,
    current_format: Option<wgpu::TextureFormat>,
}

impl PyramidDebugNode {
    #[must_use]
    pub fn new(device: &wgpu::Device) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("pyramid_debug_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: false },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            }],
        });
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("pyramid_debug_blit"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/debug_blit.wgsl").into()),
        });
        Self {
            layout: Tracked::new(layout),
            shader,
            pipelines: FxHashMap::default(),
            current_bind_group: None,
            current_format: None,
        }
    }

    fn ensure_pipeline(&mut self, device: &wgpu::Device, format: wgpu::TextureFormat) {
        if self.pipelines.contains_key(&format) {
            return;
        }
        log::debug!("compiling pyramid debug pipeline for {format:?}");
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pyramid_debug_pipeline_layout"),
            bind_group_layouts: &[Some(&self.layout)],
            immediate_size: 0,
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("pyramid_debug_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &self.shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &self.shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });
        self.pipelines.insert(format, pipeline);
    }
}

impl RenderNode for PyramidDebugNode {
    fn name(&self) -> &str {
        "pyramid_debug"
    }

    fn prepare(&mut self, ctx: &mut PrepareContext<'_>) -> Result<()> {
        self.current_bind_group = None;
        self.current_format = None;

        let Some(debug) = ctx.pyramid.settings().debug_view else {
            return Ok(());
        };
        let available = ctx.pyramid.allocated_count(debug.chain);
        if available == 0 {
            return Ok(());
        }
        let mip = debug.mip.min(available - 1);
        let Some(published) = ctx.pyramid.frame_handle(debug.chain, mip)? else {
            // Frame was skipped; keep last frame's pixels rather than flash.
            return Ok(());
        };

        self.current_bind_group = Some(ctx.gpu.device.create_bind_group(
            &wgpu::BindGroupDescriptor {
                label: Some("pyramid_debug_bind_group"),
                layout: &self.layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(published.view),
                }],
            },
        ));
        self.ensure_pipeline(&ctx.gpu.device, ctx.target_format);
        self.current_format = Some(ctx.target_format);
        Ok(())
    }

    fn run(&self, ctx: &ExecuteContext<'_>, encoder: &mut wgpu::CommandEncoder) -> Result<()> {
        let Some(bind_group) = &self.current_bind_group else {
            return Ok(());
        };
        let Some(format) = self.current_format else {
            return Ok(());
        };
        let Some(target) = ctx.target_view else {
            return Ok(());
        };
        let Some(pipeline) = self.pipelines.get(&format) else {
            return Ok(());
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("pyramid_debug"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            ..Default::default()
        });
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.draw(0..3, 0..1);
        Ok(())
    }
}
