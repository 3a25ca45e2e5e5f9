//! Opaque handles handed out by [`GfxContext`](super::GfxContext).

/// Compiled shader object.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ShaderId(pub(crate) u32);

/// Program object (linked or not).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ProgramId(pub(crate) u32);

/// Buffer object.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BufferId(pub(crate) u32);

/// Vertex input slot, i.e. the shader's `@location(n)`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct AttribLocation(pub u32);

/// Uniform slot, i.e. the shader's `@group(g) @binding(b)`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct UniformLocation {
    pub group: u32,
    pub binding: u32,
}
