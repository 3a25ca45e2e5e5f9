use std::collections::HashMap;

use super::{
    Backend, BufferId, BufferUsage, DepthFunc, DrawSubmission, GfxError, PendingClear, Topology,
    UniformUpload, VertexInput,
};

/// A buffer upload as the backend received it.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferUpload {
    pub buffer: BufferId,
    pub usage: BufferUsage,
    pub contents: Vec<u8>,
}

/// Owned copy of a [`DrawSubmission`].
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    pub vertex_entry: String,
    pub fragment_entry: String,
    pub vertex_inputs: Vec<VertexInput>,
    pub uniforms: Vec<UniformUpload>,
    pub clear: PendingClear,
    pub depth: Option<DepthFunc>,
    pub topology: Topology,
    pub first: u32,
    pub count: u32,
}

impl DrawRecord {
    /// Current value of a uniform as `f32`s, by name.
    pub fn uniform_f32s(&self, name: &str) -> Option<Vec<f32>> {
        self.uniforms
            .iter()
            .find(|u| u.name == name)
            .map(|u| bytemuck::pod_collect_to_vec(u.bytes.as_slice()))
    }
}

/// Backend that performs no GPU work and remembers everything it was asked
/// to do.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    size: (u32, u32),
    uploads: Vec<BufferUpload>,
    buffers: HashMap<BufferId, Vec<u8>>,
    draws: Vec<DrawRecord>,
}

impl RecordingBackend {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            ..Self::default()
        }
    }

    /// Every upload in submission order.
    pub fn uploads(&self) -> &[BufferUpload] {
        &self.uploads
    }

    pub fn draws(&self) -> &[DrawRecord] {
        &self.draws
    }

    /// Latest contents of `buffer` read back as `f32`s.
    pub fn buffer_f32s(&self, buffer: BufferId) -> Option<Vec<f32>> {
        self.buffers
            .get(&buffer)
            .map(|bytes| bytemuck::pod_collect_to_vec(bytes.as_slice()))
    }
}

impl Backend for RecordingBackend {
    fn surface_size(&self) -> (u32, u32) {
        self.size
    }

    fn upload_buffer(
        &mut self,
        buffer: BufferId,
        contents: &[u8],
        usage: BufferUsage,
    ) -> Result<(), GfxError> {
        self.uploads.push(BufferUpload {
            buffer,
            usage,
            contents: contents.to_vec(),
        });
        self.buffers.insert(buffer, contents.to_vec());
        Ok(())
    }

    fn draw(&mut self, draw: &DrawSubmission<'_>) -> Result<(), GfxError> {
        for input in &draw.vertex_inputs {
            if !self.buffers.contains_key(&input.buffer) {
                return Err(GfxError::UnknownBuffer(input.buffer));
            }
        }

        self.draws.push(DrawRecord {
            vertex_entry: draw.program.vertex().entry_point().to_string(),
            fragment_entry: draw.program.fragment().entry_point().to_string(),
            vertex_inputs: draw.vertex_inputs.clone(),
            uniforms: draw.uniforms.clone(),
            clear: draw.clear,
            depth: draw.depth,
            topology: draw.topology,
            first: draw.first,
            count: draw.count,
        });
        Ok(())
    }
}
