//! Graph nodes

pub mod debug_blit;
pub mod pyramid;

pub use debug_blit::PyramidDebugNode;
pub use pyramid::{DepthPyramidNode, generate_into};
