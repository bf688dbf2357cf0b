//! Chain storage
//!
//! Each chain owns at most one `R32Float` texture holding every generated
//! level, with one tracked per-mip view used both as the sampled source of
//! the next reduction and as its storage target. Allocation is lazy:
//! [`ChainStorage::reconcile`] compares the live allocation against the
//! frame's request and only touches the device when they diverge.
//!
//! When mip 0 aliases an external source the owned texture starts at chain
//! mip 1, so `mip_view(0)` is `None` and the caller binds the external view
//! for that slot.

use glam::UVec2;

use crate::core::Tracked;

use super::chain::PyramidChain;
use super::policy;

/// Storage format of every pyramid level and history slot.
pub const PYRAMID_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R32Float;

const PYRAMID_USAGES: wgpu::TextureUsages = wgpu::TextureUsages::TEXTURE_BINDING
    .union(wgpu::TextureUsages::STORAGE_BINDING)
    .union(wgpu::TextureUsages::COPY_SRC)
    .union(wgpu::TextureUsages::COPY_DST);

/// Outcome of a reconcile, reported for logging and dispatch planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageEvent {
    /// Allocation already matches the request.
    Unchanged,
    /// First allocation for this chain.
    Created,
    /// Layout changed (base resolution, alias mode, or growth); the texture
    /// was recreated and every prior view retired.
    Recreated,
    /// Request shrank; the texture is kept and trailing views dropped.
    Shrunk,
    /// Request dropped to zero; everything was released immediately.
    Released,
}

pub struct ChainStorage {
    chain: PyramidChain,
    texture: Option<Tracked<wgpu::Texture>>,
    /// Views for chain mips `offset..count`, in mip order.
    mip_views: Vec<Tracked<wgpu::TextureView>>,
    base: UVec2,
    count: u32,
    /// 1 when mip 0 aliases an external view, else 0.
    offset: u32,
}

impl ChainStorage {
    #[must_use]
    pub fn new(chain: PyramidChain) -> Self {
        Self {
            chain,
            texture: None,
            mip_views: Vec::new(),
            base: UVec2::ZERO,
            count: 0,
            offset: 0,
        }
    }

    /// Brings the allocation in line with the requested shape.
    ///
    /// Growth and layout changes recreate the texture wholesale; a pure count
    /// reduction truncates views in place and keeps the texture, since the
    /// next growth would recreate it anyway. A zero request releases storage
    /// immediately.
    pub fn reconcile(
        &mut self,
        device: &wgpu::Device,
        base: UVec2,
        count: u32,
        alias_mip0: bool,
    ) -> StorageEvent {
        if count == 0 || base.x == 0 || base.y == 0 {
            if self.count == 0 {
                return StorageEvent::Unchanged;
            }
            self.release();
            return StorageEvent::Released;
        }

        let offset = u32::from(alias_mip0);
        let owned = count.saturating_sub(offset);
        let same_layout = base == self.base && offset == self.offset;

        if same_layout && count == self.count {
            return StorageEvent::Unchanged;
        }

        if same_layout && count < self.count {
            self.mip_views.truncate(owned as usize);
            if owned == 0 {
                self.texture = None;
            }
            log::debug!(
                "{} pyramid shrunk {} -> {} mips",
                self.chain.name(),
                self.count,
                count
            );
            self.count = count;
            return StorageEvent::Shrunk;
        }

        let was_empty = self.count == 0;
        self.texture = None;
        self.mip_views.clear();
        self.base = base;
        self.offset = offset;
        self.count = count;

        if owned > 0 {
            let top = policy::mip_extent(base, offset);
            let label = match self.chain {
                PyramidChain::Near => "depth_pyramid_near",
                PyramidChain::Far => "depth_pyramid_far",
            };
            let texture = Tracked::new(device.create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: top.x,
                    height: top.y,
                    depth_or_array_layers: 1,
                },
                mip_level_count: owned,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: PYRAMID_FORMAT,
                usage: PYRAMID_USAGES,
                view_formats: &[],
            }));
            self.mip_views = (0..owned)
                .map(|mip| {
                    Tracked::new(texture.create_view(&wgpu::TextureViewDescriptor {
                        label: None,
                        format: Some(PYRAMID_FORMAT),
                        dimension: Some(wgpu::TextureViewDimension::D2),
                        usage: None,
                        aspect: wgpu::TextureAspect::All,
                        base_mip_level: mip,
                        mip_level_count: Some(1),
                        base_array_layer: 0,
                        array_layer_count: None,
                    }))
                })
                .collect();
            self.texture = Some(texture);
        }

        log::info!(
            "{} pyramid storage {}x{}, {} mips{}",
            self.chain.name(),
            base.x,
            base.y,
            count,
            if alias_mip0 { " (mip 0 aliased)" } else { "" }
        );
        if was_empty {
            StorageEvent::Created
        } else {
            StorageEvent::Recreated
        }
    }

    /// Releases the texture and every view now.
    pub fn release(&mut self) {
        if self.count > 0 {
            log::debug!("{} pyramid storage released", self.chain.name());
        }
        self.texture = None;
        self.mip_views.clear();
        self.base = UVec2::ZERO;
        self.count = 0;
        self.offset = 0;
    }

    /// View of chain mip `mip`, or `None` when the level is unallocated or
    /// aliased externally.
    #[inline]
    #[must_use]
    pub fn mip_view(&self, mip: u32) -> Option<&Tracked<wgpu::TextureView>> {
        let index = mip.checked_sub(self.offset)?;
        self.mip_views.get(index as usize)
    }

    #[inline]
    #[must_use]
    pub fn texture(&self) -> Option<&Tracked<wgpu::Texture>> {
        self.texture.as_ref()
    }

    /// Chain mips currently backed, the aliased slot included.
    #[inline]
    #[must_use]
    pub fn allocated_count(&self) -> u32 {
        self.count
    }

    #[inline]
    #[must_use]
    pub fn base(&self) -> UVec2 {
        self.base
    }

    #[inline]
    #[must_use]
    pub fn is_aliased(&self) -> bool {
        self.offset == 1
    }

    /// Resource ids of every live owned view, oldest first. Used to retire
    /// cached bind groups after a reconcile.
    #[must_use]
    pub fn view_ids(&self) -> Vec<u64> {
        self.mip_views.iter().map(|v| v.id()).collect()
    }
}
