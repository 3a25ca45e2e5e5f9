use std::collections::{BTreeMap, HashMap};

use bytemuck::Pod;
use glam::Mat4;

use crate::shader::{
    self, CompiledShader, LinkedProgram, ShaderCompileError, ShaderSource, ShaderStage,
};

use super::{
    AttribLayout, AttribLocation, Backend, BufferId, BufferTarget, BufferUsage, Capability,
    ClearMask, Color, DepthFunc, DrawSubmission, GfxError, PendingClear, ProgramId, ShaderId,
    Topology, UniformLocation, UniformUpload, VertexInput,
};

#[derive(Default)]
struct ProgramEntry {
    vertex: Option<ShaderId>,
    fragment: Option<ShaderId>,
    linked: Option<LinkedProgram>,
    info_log: String,
    /// Uniform values set while this program was in use.
    uniforms: HashMap<UniformLocation, Vec<u8>>,
}

#[derive(Debug, Copy, Clone)]
struct AttribState {
    /// Buffer captured from the array binding at `vertex_attrib_pointer` time.
    source: Option<(BufferId, AttribLayout)>,
    enabled: bool,
}

/// GL-style state tracker in front of a [`Backend`].
///
/// Handles are only meaningful for the context that issued them.
pub struct GfxContext<B> {
    backend: B,
    next_id: u32,

    shaders: HashMap<ShaderId, CompiledShader>,
    programs: HashMap<ProgramId, ProgramEntry>,
    /// Buffer sizes in bytes; `None` until data is uploaded.
    buffers: HashMap<BufferId, Option<u64>>,

    array_buffer: Option<BufferId>,
    attribs: BTreeMap<AttribLocation, AttribState>,
    current_program: Option<ProgramId>,

    clear_color: Color,
    clear_depth: f32,
    depth_test: bool,
    depth_func: DepthFunc,
    pending_clear: PendingClear,
}

impl<B: Backend> GfxContext<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            next_id: 1,
            shaders: HashMap::new(),
            programs: HashMap::new(),
            buffers: HashMap::new(),
            array_buffer: None,
            attribs: BTreeMap::new(),
            current_program: None,
            clear_color: Color::rgba(0.0, 0.0, 0.0, 0.0),
            clear_depth: 1.0,
            depth_test: false,
            depth_func: DepthFunc::Less,
            pending_clear: PendingClear::default(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Drawable size in physical pixels.
    pub fn surface_size(&self) -> (u32, u32) {
        self.backend.surface_size()
    }

    fn alloc_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    // ── shaders & programs ───────────────────────────────────────────────

    /// Compiles a shader. On failure no handle is allocated.
    pub fn compile_shader(
        &mut self,
        stage: ShaderStage,
        source: &ShaderSource,
    ) -> Result<ShaderId, ShaderCompileError> {
        let compiled = shader::compile(stage, source)?;
        let id = ShaderId(self.alloc_id());
        self.shaders.insert(id, compiled);
        Ok(id)
    }

    pub fn create_program(&mut self) -> ProgramId {
        let id = ProgramId(self.alloc_id());
        self.programs.insert(id, ProgramEntry::default());
        id
    }

    pub fn attach_shader(&mut self, program: ProgramId, shader: ShaderId) -> Result<(), GfxError> {
        let stage = self
            .shaders
            .get(&shader)
            .ok_or(GfxError::UnknownShader(shader))?
            .stage();
        let entry = self
            .programs
            .get_mut(&program)
            .ok_or(GfxError::UnknownProgram(program))?;

        let slot = match stage {
            ShaderStage::Vertex => &mut entry.vertex,
            ShaderStage::Fragment => &mut entry.fragment,
        };
        if slot.is_some() {
            return Err(GfxError::StageAlreadyAttached { program, stage });
        }
        *slot = Some(shader);
        Ok(())
    }

    /// Links the attached shaders.
    ///
    /// A failed link leaves the program unlinked with the linker output in
    /// its info log, and is returned as [`GfxError::Link`].
    pub fn link_program(&mut self, program: ProgramId) -> Result<(), GfxError> {
        let entry = self
            .programs
            .get_mut(&program)
            .ok_or(GfxError::UnknownProgram(program))?;

        let vertex = entry.vertex.and_then(|id| self.shaders.get(&id));
        let fragment = entry.fragment.and_then(|id| self.shaders.get(&id));

        let result = match (vertex, fragment) {
            (Some(v), Some(f)) => shader::link(v.clone(), f.clone()),
            (None, _) => Err(shader::ProgramLinkError::new("no vertex shader attached")),
            (_, None) => Err(shader::ProgramLinkError::new("no fragment shader attached")),
        };

        entry.uniforms.clear();
        match result {
            Ok(linked) => {
                entry.linked = Some(linked);
                entry.info_log.clear();
                Ok(())
            }
            Err(err) => {
                entry.linked = None;
                entry.info_log = err.log.clone();
                Err(err.into())
            }
        }
    }

    /// Whether the last `link_program` on `program` succeeded.
    pub fn link_status(&self, program: ProgramId) -> bool {
        self.programs
            .get(&program)
            .is_some_and(|p| p.linked.is_some())
    }

    /// Linker output from the last failed link, empty after a success.
    pub fn program_info_log(&self, program: ProgramId) -> Option<&str> {
        self.programs.get(&program).map(|p| p.info_log.as_str())
    }

    pub fn linked_program(&self, program: ProgramId) -> Option<&LinkedProgram> {
        self.programs.get(&program)?.linked.as_ref()
    }

    /// Location of a vertex input by name; `None` for unknown names and
    /// unlinked programs.
    pub fn attrib_location(&self, program: ProgramId, name: &str) -> Option<AttribLocation> {
        self.linked_program(program)?
            .attribute(name)
            .map(|a| AttribLocation(a.location))
    }

    /// Location of a uniform the program reads; `None` otherwise.
    pub fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        self.linked_program(program)?
            .uniform(name)
            .map(|u| UniformLocation {
                group: u.group,
                binding: u.binding,
            })
    }

    pub fn use_program(&mut self, program: ProgramId) -> Result<(), GfxError> {
        if !self.programs.contains_key(&program) {
            return Err(GfxError::UnknownProgram(program));
        }
        if !self.link_status(program) {
            return Err(GfxError::ProgramNotLinked(program));
        }
        self.current_program = Some(program);
        Ok(())
    }

    // ── buffers & attributes ─────────────────────────────────────────────

    pub fn create_buffer(&mut self) -> BufferId {
        let id = BufferId(self.alloc_id());
        self.buffers.insert(id, None);
        id
    }

    pub fn bind_buffer(&mut self, target: BufferTarget, buffer: BufferId) -> Result<(), GfxError> {
        if !self.buffers.contains_key(&buffer) {
            return Err(GfxError::UnknownBuffer(buffer));
        }
        match target {
            BufferTarget::Array => self.array_buffer = Some(buffer),
        }
        Ok(())
    }

    /// Uploads `data` into the buffer bound to `target`, replacing its contents.
    pub fn buffer_data<T: Pod>(
        &mut self,
        target: BufferTarget,
        data: &[T],
        usage: BufferUsage,
    ) -> Result<(), GfxError> {
        let buffer = match target {
            BufferTarget::Array => self.array_buffer.ok_or(GfxError::NoBufferBound)?,
        };
        let bytes: &[u8] = bytemuck::cast_slice(data);

        self.backend.upload_buffer(buffer, bytes, usage)?;
        self.buffers.insert(buffer, Some(bytes.len() as u64));
        Ok(())
    }

    /// Describes how `location` reads from the currently bound array buffer.
    pub fn vertex_attrib_pointer(
        &mut self,
        location: AttribLocation,
        layout: AttribLayout,
    ) -> Result<(), GfxError> {
        let buffer = self.array_buffer.ok_or(GfxError::NoBufferBound)?;
        if layout.vertex_format().is_none() {
            return Err(GfxError::InvalidAttribute {
                location,
                reason: format!("{} components of {:?}", layout.components, layout.ty),
            });
        }

        let state = self.attribs.entry(location).or_insert(AttribState {
            source: None,
            enabled: false,
        });
        state.source = Some((buffer, layout));
        Ok(())
    }

    pub fn enable_vertex_attrib_array(&mut self, location: AttribLocation) {
        self.attribs
            .entry(location)
            .or_insert(AttribState {
                source: None,
                enabled: false,
            })
            .enabled = true;
    }

    // ── fixed-function state ─────────────────────────────────────────────

    pub fn clear_color(&mut self, color: Color) {
        self.clear_color = color.clamped();
    }

    pub fn clear_depth(&mut self, depth: f32) {
        self.clear_depth = depth.clamp(0.0, 1.0);
    }

    pub fn enable(&mut self, cap: Capability) {
        match cap {
            Capability::DepthTest => self.depth_test = true,
        }
    }

    pub fn depth_func(&mut self, func: DepthFunc) {
        self.depth_func = func;
    }

    /// Requests a clear with the current clear values.
    ///
    /// Takes effect as part of the next draw.
    pub fn clear(&mut self, mask: ClearMask) {
        if mask.color {
            self.pending_clear.color = Some(self.clear_color);
        }
        if mask.depth {
            self.pending_clear.depth = Some(self.clear_depth);
        }
    }

    // ── uniforms & draws ─────────────────────────────────────────────────

    /// Sets a `mat4x4<f32>` uniform of the program in use.
    ///
    /// `value` is column-major unless `transpose` is set.
    pub fn uniform_matrix4fv(
        &mut self,
        location: UniformLocation,
        transpose: bool,
        value: &[f32; 16],
    ) -> Result<(), GfxError> {
        let program = self.current_program.ok_or(GfxError::NoProgramInUse)?;
        let entry = self
            .programs
            .get_mut(&program)
            .ok_or(GfxError::UnknownProgram(program))?;
        let linked = entry
            .linked
            .as_ref()
            .ok_or(GfxError::ProgramNotLinked(program))?;

        let info = linked
            .uniforms()
            .iter()
            .find(|u| u.group == location.group && u.binding == location.binding)
            .ok_or_else(|| GfxError::InvalidUniform {
                location,
                reason: "no active uniform at this location".to_string(),
            })?;
        if info.ty != shader::UniformType::Mat4 {
            return Err(GfxError::InvalidUniform {
                location,
                reason: format!("`{}` is {:?}, not Mat4", info.name, info.ty),
            });
        }

        let columns = if transpose {
            Mat4::from_cols_array(value).transpose().to_cols_array()
        } else {
            *value
        };

        entry
            .uniforms
            .insert(location, bytemuck::cast_slice(&columns).to_vec());
        Ok(())
    }

    /// Draws `count` vertices starting at `first` with the program in use.
    pub fn draw_arrays(
        &mut self,
        topology: Topology,
        first: u32,
        count: u32,
    ) -> Result<(), GfxError> {
        let program = self.current_program.ok_or(GfxError::NoProgramInUse)?;
        let entry = self
            .programs
            .get(&program)
            .ok_or(GfxError::UnknownProgram(program))?;
        let linked = entry
            .linked
            .as_ref()
            .ok_or(GfxError::ProgramNotLinked(program))?;

        let mut vertex_inputs = Vec::with_capacity(linked.attributes().len());
        for attr in linked.attributes() {
            let location = AttribLocation(attr.location);
            let (buffer, layout) = self
                .attribs
                .get(&location)
                .filter(|s| s.enabled)
                .and_then(|s| s.source)
                .ok_or_else(|| GfxError::MissingVertexInput(attr.name.clone()))?;

            let available = self
                .buffers
                .get(&buffer)
                .ok_or(GfxError::UnknownBuffer(buffer))?
                .unwrap_or(0);
            // Even an empty draw binds the buffer from `offset`, so at least
            // one element must lie past it.
            let last = match count {
                0 => 0,
                n => u64::from(first) + u64::from(n) - 1,
            };
            let needed = layout.offset + last * layout.effective_stride() + layout.element_size();
            if needed > available {
                return Err(GfxError::BufferOverrun {
                    buffer,
                    needed,
                    available,
                });
            }

            vertex_inputs.push(VertexInput {
                name: attr.name.clone(),
                location: attr.location,
                buffer,
                layout,
            });
        }

        let uniforms = linked
            .uniforms()
            .iter()
            .map(|u| {
                let location = UniformLocation {
                    group: u.group,
                    binding: u.binding,
                };
                let bytes = entry
                    .uniforms
                    .get(&location)
                    .cloned()
                    .unwrap_or_else(|| vec![0; u.ty.byte_size()]);
                UniformUpload {
                    name: u.name.clone(),
                    location,
                    visibility: u.visibility,
                    bytes,
                }
            })
            .collect();

        let submission = DrawSubmission {
            program: linked,
            vertex_inputs,
            uniforms,
            clear: self.pending_clear,
            depth: self.depth_test.then_some(self.depth_func),
            topology,
            first,
            count,
        };

        log::debug!(
            "draw {:?} first={} count={} (clear: {:?})",
            topology,
            first,
            count,
            submission.clear
        );

        self.backend.draw(&submission)?;
        self.pending_clear = PendingClear::default();
        Ok(())
    }
}
