use crate::shader::{LinkedProgram, Visibility};

use super::{AttribLayout, BufferId, BufferUsage, Color, DepthFunc, GfxError, Topology, UniformLocation};

/// Clears requested since the previous draw.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct PendingClear {
    pub color: Option<Color>,
    pub depth: Option<f32>,
}

impl PendingClear {
    pub fn is_empty(&self) -> bool {
        self.color.is_none() && self.depth.is_none()
    }
}

/// One vertex shader input resolved to its buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexInput {
    pub name: String,
    pub location: u32,
    pub buffer: BufferId,
    pub layout: AttribLayout,
}

/// One uniform's current value, already laid out as std140 bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformUpload {
    pub name: String,
    pub location: UniformLocation,
    pub visibility: Visibility,
    pub bytes: Vec<u8>,
}

/// Everything a backend needs to execute one `draw_arrays`.
///
/// Validation has already happened in the context: every vertex input is
/// backed by a live buffer large enough for the draw, and every uniform the
/// program reads has a value (zeros when never set).
#[derive(Debug)]
pub struct DrawSubmission<'a> {
    pub program: &'a LinkedProgram,
    pub vertex_inputs: Vec<VertexInput>,
    pub uniforms: Vec<UniformUpload>,
    pub clear: PendingClear,
    /// `Some` when depth testing is enabled.
    pub depth: Option<DepthFunc>,
    pub topology: Topology,
    pub first: u32,
    pub count: u32,
}

/// GPU-side half of the binding layer.
pub trait Backend {
    /// Drawable size in physical pixels.
    fn surface_size(&self) -> (u32, u32);

    /// Replaces the contents of `buffer` with `contents`.
    fn upload_buffer(
        &mut self,
        buffer: BufferId,
        contents: &[u8],
        usage: BufferUsage,
    ) -> Result<(), GfxError>;

    /// Executes one draw, consuming the pending clear.
    fn draw(&mut self, draw: &DrawSubmission<'_>) -> Result<(), GfxError>;
}
