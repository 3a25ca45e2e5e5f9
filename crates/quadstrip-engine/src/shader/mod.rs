//! Shader compilation and program linking.
//!
//! Sources are WGSL. Compilation parses and validates one stage with `naga`;
//! linking checks that the two stages agree on their interface and builds the
//! name → location tables the binding layer resolves lookups against.

mod compile;
mod error;
mod link;
mod source;

pub use compile::{compile, CompiledShader, InterfaceVar, UniformVar};
pub use error::{ProgramLinkError, ShaderCompileError};
pub use link::{link, AttribInfo, LinkedProgram, UniformInfo, UniformType, Visibility};
pub use source::ShaderSource;

use std::fmt;

/// Pipeline stage a shader is compiled for.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub(crate) fn to_naga(self) -> naga::ShaderStage {
        match self {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        })
    }
}
