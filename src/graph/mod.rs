//! Frame graph
//!
//! A deliberately linear executor: nodes run in insertion order, all
//! allocation in a prepare pass, all recording into one encoder. Enough for a
//! depth pre-pass pipeline without dependency tracking.

pub mod context;
#[allow(clippy::module_inception)]
pub mod graph;
pub mod node;

pub use context::{ExecuteContext, PrepareContext};
pub use graph::RenderGraph;
pub use node::RenderNode;
