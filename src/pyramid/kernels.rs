//! Reduction kernels
//!
//! Three compute pipelines shared by both chains, created once at generator
//! construction and never rebuilt: a depth copy that resolves the bound depth
//! attachment into mip 0, and a min/max pair that folds each level into the
//! next. Kernel selection happens at dispatch time, so switching depth
//! convention costs nothing.
//!
//! All kernels run on an 8x8 grid; dispatch sizes come from
//! [`policy::workgroup_count`](super::policy::workgroup_count).

use glam::UVec2;

use crate::core::Tracked;

use super::chain::ReduceOp;
use super::storage::PYRAMID_FORMAT;

pub struct ReducePipelines {
    copy_layout: Tracked<wgpu::BindGroupLayout>,
    reduce_layout: Tracked<wgpu::BindGroupLayout>,
    copy: wgpu::ComputePipeline,
    reduce_min: wgpu::ComputePipeline,
    reduce_max: wgpu::ComputePipeline,
}

impl ReducePipelines {
    #[must_use]
    pub fn new(device: &wgpu::Device) -> Self {
        let copy_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("depth_copy"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/depth_copy.wgsl").into()),
        });
        let reduce_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("depth_reduce"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/depth_reduce.wgsl").into()),
        });

        let copy_layout = Tracked::new(device.create_bind_group_layout(
            &wgpu::BindGroupLayoutDescriptor {
                label: Some("depth_copy_layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Depth,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::StorageTexture {
                            access: wgpu::StorageTextureAccess::WriteOnly,
                            format: PYRAMID_FORMAT,
                            view_dimension: wgpu::TextureViewDimension::D2,
                        },
                        count: None,
                    },
                ],
            },
        ));

        let reduce_layout = Tracked::new(device.create_bind_group_layout(
            &wgpu::BindGroupLayoutDescriptor {
                label: Some("depth_reduce_layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: false },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::StorageTexture {
                            access: wgpu::StorageTextureAccess::WriteOnly,
                            format: PYRAMID_FORMAT,
                            view_dimension: wgpu::TextureViewDimension::D2,
                        },
                        count: None,
                    },
                ],
            },
        ));

        let copy_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("depth_copy_pipeline_layout"),
                bind_group_layouts: &[Some(&copy_layout)],
                immediate_size: 0,
            });
        let reduce_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("depth_reduce_pipeline_layout"),
                bind_group_layouts: &[Some(&reduce_layout)],
                immediate_size: 0,
            });

        let copy = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("depth_copy_pipeline"),
            layout: Some(&copy_pipeline_layout),
            module: &copy_module,
            entry_point: Some("copy_depth"),
            compilation_options: Default::default(),
            cache: None,
        });
        let reduce_min = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("depth_reduce_min_pipeline"),
            layout: Some(&reduce_pipeline_layout),
            module: &reduce_module,
            entry_point: Some(ReduceOp::Min.entry_point()),
            compilation_options: Default::default(),
            cache: None,
        });
        let reduce_max = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("depth_reduce_max_pipeline"),
            layout: Some(&reduce_pipeline_layout),
            module: &reduce_module,
            entry_point: Some(ReduceOp::Max.entry_point()),
            compilation_options: Default::default(),
            cache: None,
        });

        Self {
            copy_layout,
            reduce_layout,
            copy,
            reduce_min,
            reduce_max,
        }
    }

    #[inline]
    #[must_use]
    pub fn copy_layout(&self) -> &Tracked<wgpu::BindGroupLayout> {
        &self.copy_layout
    }

    #[inline]
    #[must_use]
    pub fn reduce_layout(&self) -> &Tracked<wgpu::BindGroupLayout> {
        &self.reduce_layout
    }

    /// Binds a depth attachment view as source and a pyramid mip as target.
    #[must_use]
    pub fn copy_bind_group(
        &self,
        device: &wgpu::Device,
        depth: &wgpu::TextureView,
        target: &wgpu::TextureView,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("depth_copy_bind_group"),
            layout: &self.copy_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(depth),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(target),
                },
            ],
        })
    }

    /// Binds level `i` as source and level `i + 1` as target.
    #[must_use]
    pub fn reduce_bind_group(
        &self,
        device: &wgpu::Device,
        source: &wgpu::TextureView,
        target: &wgpu::TextureView,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("depth_reduce_bind_group"),
            layout: &self.reduce_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(source),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(target),
                },
            ],
        })
    }

    pub fn record_copy(
        &self,
        pass: &mut wgpu::ComputePass<'_>,
        bind_group: &wgpu::BindGroup,
        workgroups: UVec2,
    ) {
        pass.set_pipeline(&self.copy);
        pass.set_bind_group(0, bind_group, &[]);
        pass.dispatch_workgroups(workgroups.x, workgroups.y, 1);
    }

    pub fn record_reduce(
        &self,
        pass: &mut wgpu::ComputePass<'_>,
        op: ReduceOp,
        bind_group: &wgpu::BindGroup,
        workgroups: UVec2,
    ) {
        let pipeline = match op {
            ReduceOp::Min => &self.reduce_min,
            ReduceOp::Max => &self.reduce_max,
        };
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.dispatch_workgroups(workgroups.x, workgroups.y, 1);
    }
}
