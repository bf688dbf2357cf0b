//! Render node trait

use crate::errors::Result;

use super::context::{ExecuteContext, PrepareContext};

/// One stage of the frame.
///
/// `prepare` runs first for every node with mutable access to the frame
/// state and is where all allocation belongs; `run` then records into the
/// shared encoder and must not allocate.
pub trait RenderNode {
    fn name(&self) -> &str;

    fn prepare(&mut self, _ctx: &mut PrepareContext<'_>) -> Result<()> {
        Ok(())
    }

    fn run(&self, ctx: &ExecuteContext<'_>, encoder: &mut wgpu::CommandEncoder) -> Result<()>;
}
