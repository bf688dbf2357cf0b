//! Depth pyramid generation
//!
//! Two reduced-depth chains ("near" keeps the closest sample per footprint,
//! "far" the farthest) built from the frame's depth buffer, published as
//! frame-scoped handles with per-mip metadata. [`PyramidGenerator`] is the
//! entry point; everything else in this module is its machinery.

pub mod chain;
pub mod descriptor;
pub mod frame;
pub mod generator;
pub mod history;
pub mod kernels;
pub mod policy;
pub mod request;
pub mod storage;

pub use chain::{PyramidChain, ReduceOp, resolve_reduce_op};
pub use descriptor::{BindingSlot, GpuMipDescriptor, MipDescriptor, MipTable};
pub use frame::{FrameHandleEntry, FrameHandleTable};
pub use generator::{DepthSource, FrameSummary, PublishedMip, PyramidGenerator, SkipReason};
pub use history::{DepthHistory, HistorySlot};
pub use kernels::ReducePipelines;
pub use policy::{MIP_COUNT_MAX, REDUCE_WORKGROUP_SIZE};
pub use request::{DirtyReasons, RequestAggregator};
pub use storage::{ChainStorage, PYRAMID_FORMAT, StorageEvent};
