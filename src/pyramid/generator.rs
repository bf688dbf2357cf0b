//! Pyramid generator
//!
//! The per-frame service the rest of the renderer talks to. One instance owns
//! both chains, the depth history, the reduction kernels, and the frame handle
//! table; hosts drive it through three calls in strict order:
//!
//! 1. [`begin_frame`](PyramidGenerator::begin_frame) — advance the frame,
//!    invalidate last frame's handles, swap history parity.
//! 2. [`prepare`](PyramidGenerator::prepare) — reconcile allocations against
//!    the aggregated requests, plan this frame's dispatches, publish handles.
//!    All device allocation happens here.
//! 3. [`record`](PyramidGenerator::record) — write the planned passes into a
//!    command encoder. Read-only; callable exactly once per frame.
//!
//! Recoverable conditions (no depth source, zero extent, nothing requested)
//! skip the frame and report why in the [`FrameSummary`]; only internal
//! bookkeeping desync and phase misuse surface as errors.

use std::cell::Cell;

use glam::UVec2;

use crate::core::{BindGroupCache, BindGroupKey, Tracked};
use crate::errors::{Result, StrataError};
use crate::settings::{DebugView, PyramidSettings};

use super::chain::{PyramidChain, resolve_reduce_op};
use super::descriptor::{MipDescriptor, MipTable};
use super::frame::{FrameHandleEntry, FrameHandleTable};
use super::history::DepthHistory;
use super::kernels::ReducePipelines;
use super::policy;
use super::request::{DirtyReasons, RequestAggregator};
use super::storage::{ChainStorage, StorageEvent};

// ─── Frame Inputs & Outputs ───────────────────────────────────────────────────

/// This frame's resolved depth, borrowed from the host for the duration of
/// `prepare`.
///
/// In the normal path `view` is the depth attachment itself and is read by the
/// copy kernel as a depth texture. When a chain aliases mip 0
/// ([`ChainOptions::alias_mip0`](crate::settings::ChainOptions)), the view is
/// instead bound directly as a float texture, so it must be a single-sampled
/// color-class view such as `R32Float`.
#[derive(Clone, Copy)]
pub struct DepthSource<'a> {
    pub view: &'a wgpu::TextureView,
    pub extent: UVec2,
}

/// Why a frame produced no dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No chain has a nonzero target and history is off.
    NoRequests,
    /// The frame's base extent is zero on at least one axis.
    ZeroExtent,
    /// Levels were requested but neither a depth source nor usable history
    /// exists to seed mip 0.
    NoSource,
}

/// Per-frame report returned by [`PyramidGenerator::prepare`].
#[derive(Debug, Clone, Copy)]
pub struct FrameSummary {
    pub frame: u64,
    pub skipped: Option<SkipReason>,
    /// Levels published per chain, indexed by [`PyramidChain::index`].
    pub published: [u32; PyramidChain::COUNT],
    pub storage_events: [StorageEvent; PyramidChain::COUNT],
}

/// A published level resolved back to a bindable view.
#[derive(Clone, Copy)]
pub struct PublishedMip<'a> {
    pub view: &'a wgpu::TextureView,
    pub descriptor: MipDescriptor,
}

// ─── Dispatch Plan ────────────────────────────────────────────────────────────

enum Mip0Fill {
    /// Nothing to write: level unallocated, or aliased to the external view.
    None,
    /// Compute copy from the frame's depth source.
    Copy {
        bind_group: wgpu::BindGroup,
        workgroups: UVec2,
    },
    /// Texture copy from last frame's history slot.
    History,
}

struct MipDispatch {
    bind_group: wgpu::BindGroup,
    workgroups: UVec2,
    target_mip: u32,
}

struct ChainPlan {
    mip0: Mip0Fill,
    reduces: Vec<MipDispatch>,
    /// True when mip 0 holds valid data this frame, by write or by alias.
    generated: bool,
}

impl Default for ChainPlan {
    fn default() -> Self {
        Self {
            mip0: Mip0Fill::None,
            reduces: Vec::new(),
            generated: false,
        }
    }
}

struct ChainSlot {
    table: MipTable,
    storage: ChainStorage,
    /// Frame-scoped clone of the external view when mip 0 is aliased.
    alias_view: Option<Tracked<wgpu::TextureView>>,
    plan: ChainPlan,
}

impl ChainSlot {
    fn new(chain: PyramidChain) -> Self {
        Self {
            table: MipTable::new(chain),
            storage: ChainStorage::new(chain),
            alias_view: None,
            plan: ChainPlan::default(),
        }
    }
}

const CHAIN_LABELS: [&str; PyramidChain::COUNT] = ["near_pyramid", "far_pyramid"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FramePhase {
    Idle,
    Begun,
    Prepared,
}

impl FramePhase {
    const fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Begun => "begun",
            Self::Prepared => "prepared",
        }
    }
}

// ─── Generator ────────────────────────────────────────────────────────────────

pub struct PyramidGenerator {
    settings: PyramidSettings,
    requests: RequestAggregator,
    chains: [ChainSlot; PyramidChain::COUNT],
    history: DepthHistory,
    frame_table: FrameHandleTable,
    kernels: ReducePipelines,
    bind_cache: BindGroupCache,
    frame_index: u64,
    phase: FramePhase,
    recorded: Cell<bool>,
    history_capture: Option<PyramidChain>,
    last_base: UVec2,
}

impl PyramidGenerator {
    #[must_use]
    pub fn new(device: &wgpu::Device, settings: PyramidSettings) -> Self {
        Self {
            settings,
            requests: RequestAggregator::new(),
            chains: [
                ChainSlot::new(PyramidChain::Near),
                ChainSlot::new(PyramidChain::Far),
            ],
            history: DepthHistory::new(),
            frame_table: FrameHandleTable::new(),
            kernels: ReducePipelines::new(device),
            bind_cache: BindGroupCache::new(),
            frame_index: 0,
            phase: FramePhase::Idle,
            recorded: Cell::new(false),
            history_capture: None,
            last_base: UVec2::ZERO,
        }
    }

    // ─── Requests ─────────────────────────────────────────────────────────

    /// Registers a mip-count requirement; see
    /// [`RequestAggregator::ensure_count`].
    pub fn ensure_mip_count(&mut self, chain: PyramidChain, count: u32, force: bool) {
        self.requests.ensure_count(chain, count, force);
    }

    /// Declares interest in previous-frame depth. While any interest is held,
    /// the near chain keeps at least one level alive to feed the history copy.
    pub fn request_history(&mut self) {
        self.requests.request_history();
    }

    pub fn release_history(&mut self) {
        self.requests.release_history();
    }

    /// Drops both history slots now. Use after a camera cut, when reprojecting
    /// from the old depth would smear.
    pub fn discard_history(&mut self) {
        self.history.release();
    }

    // ─── Frame Lifecycle ──────────────────────────────────────────────────

    /// Opens a new frame: bumps the frame index, invalidates every published
    /// handle, and advances history parity.
    pub fn begin_frame(&mut self) -> Result<()> {
        if self.phase == FramePhase::Begun {
            return Err(StrataError::PhaseOrder {
                frame: self.frame_index,
                requested: "begin_frame",
                current: self.phase.name(),
            });
        }
        if self.phase == FramePhase::Prepared && !self.recorded.get() {
            log::debug!("frame {} was prepared but never recorded", self.frame_index);
        }

        self.frame_index += 1;
        self.phase = FramePhase::Begun;
        self.recorded.set(false);
        self.history_capture = None;
        self.frame_table.reset(self.frame_index);
        for slot in &mut self.chains {
            slot.alias_view = None;
            slot.plan = ChainPlan::default();
        }
        if self.requests.wants_history() {
            self.history.swap();
        }
        Ok(())
    }

    /// Reconciles allocations with the aggregated requests and plans this
    /// frame's dispatches.
    ///
    /// `source` is this frame's resolved depth; pass `None` when the host has
    /// nothing new (occluded viewport, paused renderer), in which case mip 0
    /// falls back to last frame's history where possible.
    ///
    /// An `Err` aborts the frame: nothing stays published and `record`
    /// refuses to run until the next `begin_frame`.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        source: Option<&DepthSource<'_>>,
    ) -> Result<FrameSummary> {
        if self.phase != FramePhase::Begun {
            return Err(StrataError::PhaseOrder {
                frame: self.frame_index,
                requested: "prepare",
                current: self.phase.name(),
            });
        }
        match self.prepare_frame(device, source) {
            Ok(summary) => {
                self.phase = FramePhase::Prepared;
                Ok(summary)
            }
            Err(err) => {
                self.abort_frame();
                Err(err)
            }
        }
    }

    /// Unwinds a half-prepared frame so no partial publication survives the
    /// error return.
    fn abort_frame(&mut self) {
        self.frame_table.reset(self.frame_index);
        for slot in &mut self.chains {
            slot.alias_view = None;
            slot.plan = ChainPlan::default();
        }
        self.history_capture = None;
        self.phase = FramePhase::Idle;
    }

    fn prepare_frame(
        &mut self,
        device: &wgpu::Device,
        source: Option<&DepthSource<'_>>,
    ) -> Result<FrameSummary> {
        let mut summary = FrameSummary {
            frame: self.frame_index,
            skipped: None,
            published: [0; PyramidChain::COUNT],
            storage_events: [StorageEvent::Unchanged; PyramidChain::COUNT],
        };

        let wants_history = self.requests.wants_history();
        let mut targets = [
            self.requests.target_count(PyramidChain::Near),
            self.requests.target_count(PyramidChain::Far),
        ];
        // History rides on the near chain's base level.
        if wants_history {
            targets[PyramidChain::Near.index()] = targets[PyramidChain::Near.index()].max(1);
        }

        if targets.iter().all(|&t| t == 0) && !wants_history {
            for (i, &chain) in PyramidChain::ALL.iter().enumerate() {
                let slot = &mut self.chains[i];
                let retired = slot.storage.view_ids();
                if slot.storage.allocated_count() > 0 {
                    slot.storage.release();
                    summary.storage_events[i] = StorageEvent::Released;
                }
                slot.table.generate(UVec2::ZERO, 0);
                self.bind_cache.retire(&retired);
                self.requests.clear_dirty(chain);
            }
            self.history.release();
            summary.skipped = Some(SkipReason::NoRequests);
            return Ok(summary);
        }

        let base = source.map_or(self.last_base, |s| s.extent);
        if base.x == 0 || base.y == 0 {
            // Keep allocations and dirty flags; the viewport may come back.
            summary.skipped = Some(SkipReason::ZeroExtent);
            return Ok(summary);
        }
        if let Some(s) = source {
            if self.last_base != UVec2::ZERO && s.extent != self.last_base {
                for &chain in &PyramidChain::ALL {
                    self.requests.mark_dirty(chain, DirtyReasons::RESOLUTION);
                }
            }
            self.last_base = s.extent;
        }

        // History first: a previous slot at the wrong extent must be disposed
        // before the chains decide whether it can seed mip 0.
        if wants_history {
            self.history.reconcile(device, base);
        } else if !self.history.is_empty() {
            self.history.release();
        }

        for &chain in &PyramidChain::ALL {
            let i = chain.index();
            let alias = self.settings.chain(chain).alias_mip0 && source.is_some();
            let requested = targets[i];
            // Every level past the natural chain end is 1×1, so storage only
            // materializes the natural prefix; tail indices republish the
            // last owned level.
            let owned = requested.min(policy::full_chain_len(base));

            let reasons = self.requests.dirty_reasons(chain);
            if !reasons.is_empty() {
                log::debug!("{} chain dirty: {:?}", chain.name(), reasons);
            }

            let (event, retired) = {
                let slot = &mut self.chains[i];
                let before = slot.storage.view_ids();
                let event = slot.storage.reconcile(device, base, owned, alias);
                slot.table.generate(base, requested);
                let after = slot.storage.view_ids();
                let retired: Vec<u64> =
                    before.into_iter().filter(|id| !after.contains(id)).collect();
                (event, retired)
            };
            self.bind_cache.retire(&retired);
            summary.storage_events[i] = event;
            self.requests.clear_dirty(chain);

            {
                let slot = &self.chains[i];
                if slot.storage.allocated_count() != slot.table.len().min(owned) {
                    return Err(StrataError::TableDesync {
                        chain: chain.name(),
                        descriptors: slot.table.len() as usize,
                        allocated: slot.storage.allocated_count() as usize,
                    });
                }
            }

            if requested == 0 {
                continue;
            }

            let alias_view = match (alias, source) {
                (true, Some(s)) => Some(Tracked::new(s.view.clone())),
                _ => None,
            };

            let mut plan = ChainPlan::default();
            if alias {
                plan.generated = true;
            } else if let Some(s) = source {
                let Some(target) = self.chains[i].storage.mip_view(0) else {
                    return Err(StrataError::TableDesync {
                        chain: chain.name(),
                        descriptors: self.chains[i].table.len() as usize,
                        allocated: 0,
                    });
                };
                plan.mip0 = Mip0Fill::Copy {
                    bind_group: self.kernels.copy_bind_group(device, s.view, target),
                    workgroups: policy::workgroup_count(base),
                };
                plan.generated = true;
            } else if self.history.previous().is_some_and(|p| p.extent == base) {
                plan.mip0 = Mip0Fill::History;
                plan.generated = true;
            } else {
                log::debug!("{} chain has no mip 0 source this frame", chain.name());
                continue;
            }

            for target_mip in 1..owned {
                let Some(dst) = self.chains[i].storage.mip_view(target_mip) else {
                    return Err(StrataError::TableDesync {
                        chain: chain.name(),
                        descriptors: self.chains[i].table.len() as usize,
                        allocated: target_mip as usize,
                    });
                };
                let workgroups = policy::workgroup_count(policy::mip_extent(base, target_mip));
                let bind_group = match (&alias_view, target_mip) {
                    // The alias view gets a fresh id per frame; caching on it
                    // would only grow the cache.
                    (Some(av), 1) => self.kernels.reduce_bind_group(device, av, dst),
                    _ => {
                        let Some(src) = self.chains[i].storage.mip_view(target_mip - 1) else {
                            return Err(StrataError::TableDesync {
                                chain: chain.name(),
                                descriptors: self.chains[i].table.len() as usize,
                                allocated: target_mip as usize,
                            });
                        };
                        let key = BindGroupKey::new(self.kernels.reduce_layout().id())
                            .with_resource(src.id())
                            .with_resource(dst.id());
                        self.bind_cache
                            .get_or_create(key, || {
                                self.kernels.reduce_bind_group(device, src, dst)
                            })
                            .clone()
                    }
                };
                plan.reduces.push(MipDispatch {
                    bind_group,
                    workgroups,
                    target_mip,
                });
            }

            // A min/max over one texel is itself, so the 1×1 tail publishes
            // the last owned view instead of dispatching further levels.
            let owned_top = owned.saturating_sub(1);
            for mip in 0..requested {
                let slot = &self.chains[i];
                let Some(descriptor) = slot.table.mip(mip) else {
                    break;
                };
                let stored = mip.min(owned_top);
                let view_id = match (stored, &alias_view) {
                    (0, Some(av)) => av.id(),
                    _ => match slot.storage.mip_view(stored) {
                        Some(v) => v.id(),
                        None => continue,
                    },
                };
                self.frame_table.publish(
                    chain,
                    mip,
                    FrameHandleEntry {
                        view_id,
                        descriptor: *descriptor,
                    },
                );
            }
            summary.published[i] = requested;

            let slot = &mut self.chains[i];
            slot.plan = plan;
            slot.alias_view = alias_view;
        }

        // Pick the chain whose fresh base level feeds the history copy.
        if wants_history && self.history.current().is_some() {
            self.history_capture = PyramidChain::ALL.into_iter().find(|&chain| {
                let slot = &self.chains[chain.index()];
                slot.plan.generated
                    && !slot.storage.is_aliased()
                    && slot.storage.allocated_count() > 0
                    && slot.storage.base() == base
            });
            if self.history_capture.is_none() {
                log::debug!("history capture skipped: no owned base level this frame");
            }
        }

        if summary.published.iter().all(|&p| p == 0) && targets.iter().any(|&t| t > 0) {
            summary.skipped = Some(SkipReason::NoSource);
        }
        Ok(summary)
    }

    /// Writes the planned passes into `encoder`. Must follow `prepare` and
    /// runs at most once per frame.
    pub fn record(&self, encoder: &mut wgpu::CommandEncoder) -> Result<()> {
        if self.phase != FramePhase::Prepared {
            return Err(StrataError::PhaseOrder {
                frame: self.frame_index,
                requested: "record",
                current: self.phase.name(),
            });
        }
        if self.recorded.get() {
            return Err(StrataError::PhaseOrder {
                frame: self.frame_index,
                requested: "record",
                current: "recorded",
            });
        }

        for (i, slot) in self.chains.iter().enumerate() {
            if !slot.plan.generated {
                continue;
            }
            encoder.push_debug_group(CHAIN_LABELS[i]);

            if let Mip0Fill::History = slot.plan.mip0 {
                if let (Some(prev), Some(texture)) =
                    (self.history.previous(), slot.storage.texture())
                {
                    encoder.copy_texture_to_texture(
                        wgpu::TexelCopyTextureInfo {
                            texture: &prev.texture,
                            mip_level: 0,
                            origin: wgpu::Origin3d::ZERO,
                            aspect: wgpu::TextureAspect::All,
                        },
                        wgpu::TexelCopyTextureInfo {
                            texture,
                            mip_level: 0,
                            origin: wgpu::Origin3d::ZERO,
                            aspect: wgpu::TextureAspect::All,
                        },
                        wgpu::Extent3d {
                            width: prev.extent.x,
                            height: prev.extent.y,
                            depth_or_array_layers: 1,
                        },
                    );
                }
            }

            let has_dispatches =
                matches!(slot.plan.mip0, Mip0Fill::Copy { .. }) || !slot.plan.reduces.is_empty();
            if has_dispatches {
                let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                    label: Some(CHAIN_LABELS[i]),
                    timestamp_writes: None,
                });
                if let Mip0Fill::Copy {
                    bind_group,
                    workgroups,
                } = &slot.plan.mip0
                {
                    self.kernels.record_copy(&mut pass, bind_group, *workgroups);
                }
                for dispatch in &slot.plan.reduces {
                    self.kernels.record_reduce(
                        &mut pass,
                        resolve_reduce_op(
                            PyramidChain::ALL[i],
                            self.settings.depth_convention,
                        ),
                        &dispatch.bind_group,
                        dispatch.workgroups,
                    );
                }
            }

            encoder.pop_debug_group();
        }

        if let Some(chain) = self.history_capture {
            let slot = &self.chains[chain.index()];
            if let (Some(texture), Some(current)) =
                (slot.storage.texture(), self.history.current())
            {
                encoder.copy_texture_to_texture(
                    wgpu::TexelCopyTextureInfo {
                        texture,
                        mip_level: 0,
                        origin: wgpu::Origin3d::ZERO,
                        aspect: wgpu::TextureAspect::All,
                    },
                    wgpu::TexelCopyTextureInfo {
                        texture: &current.texture,
                        mip_level: 0,
                        origin: wgpu::Origin3d::ZERO,
                        aspect: wgpu::TextureAspect::All,
                    },
                    wgpu::Extent3d {
                        width: current.extent.x,
                        height: current.extent.y,
                        depth_or_array_layers: 1,
                    },
                );
            }
        }

        self.recorded.set(true);
        Ok(())
    }

    // ─── Lookups ──────────────────────────────────────────────────────────

    /// Descriptor of `(chain, mip)` as of the last rebuild. Metadata only;
    /// for a bindable view use [`frame_handle`](Self::frame_handle).
    #[inline]
    #[must_use]
    pub fn mip_descriptor(&self, chain: PyramidChain, mip: u32) -> Option<&MipDescriptor> {
        self.chains[chain.index()].table.mip(mip)
    }

    /// All descriptors of `chain`, in mip order.
    #[inline]
    #[must_use]
    pub fn descriptors(&self, chain: PyramidChain) -> &[MipDescriptor] {
        self.chains[chain.index()].table.descriptors()
    }

    /// Resolves the handle published this frame for `(chain, mip)`.
    ///
    /// `Ok(None)` means the level is unavailable this frame, which consumers
    /// handle by falling back. An `Err` means the published id no longer names
    /// the live view, which is a bookkeeping bug, not a degradation.
    pub fn frame_handle(
        &self,
        chain: PyramidChain,
        mip: u32,
    ) -> Result<Option<PublishedMip<'_>>> {
        let Some(entry) = self.frame_table.get(chain, mip) else {
            return Ok(None);
        };
        let slot = &self.chains[chain.index()];
        // Tail entries ride the last owned level; see the publish loop.
        let stored = mip.min(slot.storage.allocated_count().saturating_sub(1));

        let (view, actual): (&wgpu::TextureView, u64) =
            if stored == 0 && slot.storage.is_aliased() {
                let Some(av) = &slot.alias_view else {
                    // A published alias with no retained view cannot be
                    // resolved; that is a desync, not a degradation.
                    return Err(StrataError::HandleDesync {
                        chain: chain.name(),
                        mip,
                        published: entry.view_id,
                        actual: 0,
                    });
                };
                (av, av.id())
            } else {
                let Some(v) = slot.storage.mip_view(stored) else {
                    return Err(StrataError::HandleDesync {
                        chain: chain.name(),
                        mip,
                        published: entry.view_id,
                        actual: 0,
                    });
                };
                (v, v.id())
            };

        if actual != entry.view_id {
            return Err(StrataError::HandleDesync {
                chain: chain.name(),
                mip,
                published: entry.view_id,
                actual,
            });
        }
        Ok(Some(PublishedMip {
            view,
            descriptor: entry.descriptor,
        }))
    }

    /// Aggregated target for `chain`.
    #[inline]
    #[must_use]
    pub fn target_count(&self, chain: PyramidChain) -> u32 {
        self.requests.target_count(chain)
    }

    /// Levels currently backed by storage for `chain`.
    #[inline]
    #[must_use]
    pub fn allocated_count(&self, chain: PyramidChain) -> u32 {
        self.chains[chain.index()].storage.allocated_count()
    }

    /// Storage texture backing `chain`, for hosts that copy levels out
    /// themselves. With mip 0 aliased, texture mip `n` holds chain mip
    /// `n + 1`.
    #[must_use]
    pub fn chain_texture(&self, chain: PyramidChain) -> Option<&wgpu::Texture> {
        self.chains[chain.index()].storage.texture().map(|t| &**t)
    }

    #[inline]
    #[must_use]
    pub fn history(&self) -> &DepthHistory {
        &self.history
    }

    #[inline]
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &PyramidSettings {
        &self.settings
    }

    /// Replaces the settings wholesale. Layout-affecting changes (aliasing)
    /// take effect at the next `prepare`.
    pub fn set_settings(&mut self, settings: PyramidSettings) {
        self.settings = settings;
    }

    /// Selects a (chain, mip) for the debug blit pass, or clears the
    /// selection. Safe to scrub at runtime.
    pub fn set_debug_view(&mut self, view: Option<DebugView>) {
        self.settings.debug_view = view;
    }
}
