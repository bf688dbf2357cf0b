//! wgpu context
//!
//! [`GpuContext`] holds the core GPU handles: device and queue. The pyramid
//! subsystem is headless — it never owns a surface; hosts that present frames
//! keep their own swap chain and hand the depth attachment in per frame.

use crate::errors::{Result, StrataError};

/// Core wgpu context holding GPU handles.
pub struct GpuContext {
    /// The wgpu device for GPU resource creation
    pub device: wgpu::Device,
    /// The command queue for submitting work
    pub queue: wgpu::Queue,
}

impl GpuContext {
    /// Brings up an adapter and device with default options.
    ///
    /// Fails with [`StrataError::AdapterRequestFailed`] when no suitable
    /// adapter exists (headless CI machines, typically).
    pub async fn new() -> Result<Self> {
        let instance = wgpu::Instance::default();

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| StrataError::AdapterRequestFailed(e.to_string()))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Strata Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::Performance,
                ..Default::default()
            })
            .await?;

        Ok(Self { device, queue })
    }

    /// Wraps an existing device/queue pair.
    ///
    /// Hosts that already own a wgpu device (an engine embedding the pyramid)
    /// use this instead of [`new`](Self::new); both handles are internally
    /// reference counted, so cloning them here is cheap.
    #[must_use]
    pub fn from_raw(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self { device, queue }
    }
}
