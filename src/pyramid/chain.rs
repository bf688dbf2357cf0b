//! Logical chains and reduction operator selection
//!
//! Two chains exist, distinguished by which surviving texel "wins" a 2×2
//! reduction: the nearest one or the farthest one. The concrete kernel each
//! chain runs additionally depends on the depth convention — under reversed
//! depth, "nearest" is the numerically larger value, so the operators swap.

use crate::settings::DepthConvention;

/// Logical pyramid chain identity.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PyramidChain {
    /// Nearest-depth-wins semantics (occlusion culling, SSAO).
    Near = 0,
    /// Farthest-depth-wins semantics (thickness estimation, empty-space skip).
    Far = 1,
}

impl PyramidChain {
    /// Number of chains.
    pub const COUNT: usize = 2;

    /// All chains in index order.
    pub const ALL: [Self; Self::COUNT] = [Self::Near, Self::Far];

    /// Dense array index of this chain.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Short name for labels and log lines.
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Near => "near",
            Self::Far => "far",
        }
    }
}

/// Concrete reduction operator a chain dispatches per mip transition.
///
/// Resolved once per chain configuration via [`resolve_reduce_op`], never per
/// mip and never through dynamic dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReduceOp {
    /// Each output texel keeps the minimum of its 2×2 source neighborhood.
    Min,
    /// Each output texel keeps the maximum of its 2×2 source neighborhood.
    Max,
}

impl ReduceOp {
    /// WGSL entry point implementing this operator (see `depth_reduce.wgsl`).
    #[inline]
    #[must_use]
    pub const fn entry_point(self) -> &'static str {
        match self {
            Self::Min => "reduce_min",
            Self::Max => "reduce_max",
        }
    }
}

/// Maps a chain's semantics onto the concrete operator for a convention.
///
/// | Chain  | `Standard` | `Reversed` |
/// |--------|------------|------------|
/// | `Near` | `Min`      | `Max`      |
/// | `Far`  | `Max`      | `Min`      |
#[inline]
#[must_use]
pub const fn resolve_reduce_op(chain: PyramidChain, convention: DepthConvention) -> ReduceOp {
    match (chain, convention) {
        (PyramidChain::Near, DepthConvention::Standard)
        | (PyramidChain::Far, DepthConvention::Reversed) => ReduceOp::Min,
        (PyramidChain::Near, DepthConvention::Reversed)
        | (PyramidChain::Far, DepthConvention::Standard) => ReduceOp::Max,
    }
}
