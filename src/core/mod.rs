pub mod binding;
pub mod context;
pub mod tracked;

pub use binding::{BindGroupCache, BindGroupKey};
pub use context::GpuContext;
pub use tracked::Tracked;
