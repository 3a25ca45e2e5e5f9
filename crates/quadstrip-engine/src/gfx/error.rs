use thiserror::Error;

use crate::shader::ProgramLinkError;

use super::{AttribLocation, BufferId, ProgramId, ShaderId, UniformLocation};

/// Misuse of the binding layer, or a failure reported by the GPU backend.
#[derive(Debug, Error)]
pub enum GfxError {
    #[error("unknown shader {0:?}")]
    UnknownShader(ShaderId),

    #[error("unknown program {0:?}")]
    UnknownProgram(ProgramId),

    #[error("unknown buffer {0:?}")]
    UnknownBuffer(BufferId),

    #[error("a {stage} shader is already attached to {program:?}")]
    StageAlreadyAttached {
        program: ProgramId,
        stage: crate::shader::ShaderStage,
    },

    #[error(transparent)]
    Link(#[from] ProgramLinkError),

    #[error("program {0:?} is not linked")]
    ProgramNotLinked(ProgramId),

    #[error("no program in use")]
    NoProgramInUse,

    #[error("no buffer bound to the array target")]
    NoBufferBound,

    #[error("attribute {location:?}: {reason}")]
    InvalidAttribute {
        location: AttribLocation,
        reason: String,
    },

    #[error("vertex input `{0}` has no enabled buffer-backed attribute")]
    MissingVertexInput(String),

    #[error("draw reads {needed} bytes from buffer {buffer:?} holding {available}")]
    BufferOverrun {
        buffer: BufferId,
        needed: u64,
        available: u64,
    },

    #[error("uniform {location:?}: {reason}")]
    InvalidUniform {
        location: UniformLocation,
        reason: String,
    },

    #[error("failed to acquire surface texture: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}
