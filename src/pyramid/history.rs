//! Depth history
//!
//! Two single-mip `R32Float` slots ping-pong across frames: the current slot
//! receives a copy of this frame's base depth once the pyramid has resolved
//! it, the previous slot is what last frame wrote and what reprojection-style
//! consumers read. The swap is a plain parity toggle; the generator performs
//! it exactly once per frame, so slot indices alternate deterministically.
//!
//! Disposal is partial: a slot whose extent no longer matches the frame is
//! dropped rather than resized, and the other slot survives when it still
//! fits.

use glam::UVec2;

use crate::core::Tracked;

const HISTORY_USAGES: wgpu::TextureUsages = wgpu::TextureUsages::TEXTURE_BINDING
    .union(wgpu::TextureUsages::COPY_SRC)
    .union(wgpu::TextureUsages::COPY_DST);

const SLOT_LABELS: [&str; 2] = ["depth_history_0", "depth_history_1"];

/// One history buffer and its full-texture view.
pub struct HistorySlot {
    pub texture: Tracked<wgpu::Texture>,
    pub view: Tracked<wgpu::TextureView>,
    pub extent: UVec2,
}

impl HistorySlot {
    fn new(device: &wgpu::Device, extent: UVec2, index: usize) -> Self {
        let texture = Tracked::new(device.create_texture(&wgpu::TextureDescriptor {
            label: Some(SLOT_LABELS[index]),
            size: wgpu::Extent3d {
                width: extent.x,
                height: extent.y,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: super::storage::PYRAMID_FORMAT,
            usage: HISTORY_USAGES,
            view_formats: &[],
        }));
        let view = Tracked::new(texture.create_view(&wgpu::TextureViewDescriptor::default()));
        Self {
            texture,
            view,
            extent,
        }
    }
}

/// Double-buffered depth history.
pub struct DepthHistory {
    slots: [Option<HistorySlot>; 2],
    current: usize,
}

impl Default for DepthHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl DepthHistory {
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: [None, None],
            current: 0,
        }
    }

    /// Advances the parity. Call once per frame, before reconciling.
    pub fn swap(&mut self) {
        self.current = 1 - self.current;
    }

    /// Ensures the current slot exists at `extent`, disposing whatever no
    /// longer fits. Returns `true` when the current slot was (re)created.
    ///
    /// A mismatched previous slot is dropped here too: its contents describe
    /// another resolution and nothing downstream can consume them.
    pub fn reconcile(&mut self, device: &wgpu::Device, extent: UVec2) -> bool {
        if extent.x == 0 || extent.y == 0 {
            self.release();
            return false;
        }

        if self.slots[self.previous_index()]
            .as_ref()
            .is_some_and(|s| s.extent != extent)
        {
            self.dispose_previous();
        }

        let stale = self.slots[self.current]
            .as_ref()
            .is_none_or(|s| s.extent != extent);
        if stale {
            log::info!(
                "depth history slot {} allocated {}x{}",
                self.current,
                extent.x,
                extent.y
            );
            self.slots[self.current] = Some(HistorySlot::new(device, extent, self.current));
        }
        stale
    }

    /// Slot written this frame.
    #[inline]
    #[must_use]
    pub fn current(&self) -> Option<&HistorySlot> {
        self.slots[self.current].as_ref()
    }

    /// Slot written last frame.
    #[inline]
    #[must_use]
    pub fn previous(&self) -> Option<&HistorySlot> {
        self.slots[self.previous_index()].as_ref()
    }

    #[inline]
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[inline]
    #[must_use]
    pub fn previous_index(&self) -> usize {
        1 - self.current
    }

    /// Drops only the slot being written this frame.
    pub fn dispose_current(&mut self) {
        self.slots[self.current] = None;
    }

    /// Drops only last frame's slot.
    pub fn dispose_previous(&mut self) {
        let index = self.previous_index();
        self.slots[index] = None;
    }

    /// Drops both slots.
    pub fn release(&mut self) {
        if self.slots.iter().any(Option::is_some) {
            log::debug!("depth history released");
        }
        self.slots = [None, None];
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}
