//! Pyramid Settings & Depth Convention Configuration
//!
//! This module defines the configuration consumed by
//! [`PyramidGenerator`](crate::pyramid::PyramidGenerator) at construction
//! time, plus the small runtime-adjustable debug surface.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use strata::{PyramidSettings, DepthConvention, PyramidChain};
//!
//! // Default: reversed depth, both chains own their mip 0
//! let settings = PyramidSettings::default();
//!
//! // Conventional depth range, near chain aliasing the source buffer
//! let settings = PyramidSettings::default()
//!     .with_convention(DepthConvention::Standard)
//!     .with_alias_mip0(PyramidChain::Near, true);
//! ```

use crate::pyramid::PyramidChain;

// ---------------------------------------------------------------------------
// DepthConvention
// ---------------------------------------------------------------------------

/// Encoding convention of the source depth buffer.
///
/// The convention decides which concrete reduction kernel each chain runs,
/// because "nearest point wins" flips its numeric meaning when depth is
/// reversed:
///
/// | Chain  | `Standard` | `Reversed` |
/// |--------|------------|------------|
/// | `Near` | min        | max        |
/// | `Far`  | max        | min        |
///
/// # Design Rationale
///
/// Reversed depth (near plane at 1.0, far at 0.0, `Greater` comparison)
/// distributes float precision far better across the view range and is what
/// modern pipelines clear to 0.0 and render with. The kernel swap is resolved
/// once per chain configuration, never per mip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthConvention {
    /// Conventional mapping: 0.0 at the near plane, 1.0 at the far plane.
    Standard,
    /// Reversed mapping: larger stored values are closer to the camera.
    Reversed,
}

impl Default for DepthConvention {
    #[inline]
    fn default() -> Self {
        // Reverse-Z is the house convention for depth precision.
        Self::Reversed
    }
}

impl DepthConvention {
    /// Returns `true` when larger depth values mean closer geometry.
    #[inline]
    #[must_use]
    pub fn is_reversed(self) -> bool {
        matches!(self, Self::Reversed)
    }
}

// ---------------------------------------------------------------------------
// ChainOptions
// ---------------------------------------------------------------------------

/// Per-chain storage options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChainOptions {
    /// Publish the external depth source itself as mip 0 instead of copying
    /// into chain-owned storage.
    ///
    /// Saves one full-resolution allocation and the mip-0 copy dispatch. The
    /// aliased level is strictly read-only for this subsystem, and consumers
    /// receive the source's own view at index 0. The source must then be a
    /// single-sampled `R32Float`-class view rather than a raw depth-format
    /// one, because the mip 1 reduction samples it as a plain float texture
    /// (see [`DepthSource`](crate::pyramid::DepthSource)). Leave off when
    /// history is in use; the capture copy needs an owned base level.
    pub alias_mip0: bool,
}

// ---------------------------------------------------------------------------
// DebugView
// ---------------------------------------------------------------------------

/// Selects one generated mip for on-screen inspection.
///
/// Consumed by [`PyramidDebugNode`](crate::passes::PyramidDebugNode), which
/// blits the selected level grayscale onto the current color target. Selecting
/// an index that was not generated this frame simply draws nothing — the probe
/// is allowed to be speculative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugView {
    /// Chain to inspect.
    pub chain: PyramidChain,
    /// Mip level to inspect.
    pub mip: u32,
}

// ---------------------------------------------------------------------------
// PyramidSettings
// ---------------------------------------------------------------------------

/// Configuration for one pyramid generator instance.
///
/// # Fields
///
/// | Field              | Description                               | Default    |
/// |--------------------|-------------------------------------------|------------|
/// | `depth_convention` | Source depth encoding                     | `Reversed` |
/// | `near`             | Options for the nearest-depth chain       | owned mip 0|
/// | `far`              | Options for the farthest-depth chain      | owned mip 0|
/// | `debug_view`       | Mip selected for debug display            | `None`     |
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PyramidSettings {
    /// Encoding convention of the depth source this generator reduces.
    pub depth_convention: DepthConvention,

    /// Options for [`PyramidChain::Near`].
    pub near: ChainOptions,

    /// Options for [`PyramidChain::Far`].
    pub far: ChainOptions,

    /// Debug-only mip visualization request.
    pub debug_view: Option<DebugView>,
}

impl PyramidSettings {
    /// Options for the given chain.
    #[inline]
    #[must_use]
    pub fn chain(&self, chain: PyramidChain) -> &ChainOptions {
        match chain {
            PyramidChain::Near => &self.near,
            PyramidChain::Far => &self.far,
        }
    }

    /// Sets the depth convention.
    #[must_use]
    pub fn with_convention(mut self, convention: DepthConvention) -> Self {
        self.depth_convention = convention;
        self
    }

    /// Enables or disables mip-0 aliasing for one chain.
    #[must_use]
    pub fn with_alias_mip0(mut self, chain: PyramidChain, alias: bool) -> Self {
        match chain {
            PyramidChain::Near => self.near.alias_mip0 = alias,
            PyramidChain::Far => self.far.alias_mip0 = alias,
        }
        self
    }

    /// Selects a mip for debug display.
    #[must_use]
    pub fn with_debug_view(mut self, view: Option<DebugView>) -> Self {
        self.debug_view = view;
        self
    }
}
