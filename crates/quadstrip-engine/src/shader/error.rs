use thiserror::Error;

use super::ShaderStage;

/// A shader failed to parse or validate.
///
/// `log` holds the compiler diagnostic, rendered against the source text.
#[derive(Debug, Clone, Error)]
#[error("An error occurred compiling the shaders: {log}")]
pub struct ShaderCompileError {
    pub stage: ShaderStage,
    pub label: String,
    pub log: String,
}

impl ShaderCompileError {
    pub(crate) fn new(stage: ShaderStage, label: &str, log: impl Into<String>) -> Self {
        Self {
            stage,
            label: label.to_string(),
            log: log.into(),
        }
    }
}

/// Two compiled stages could not be linked into a program.
///
/// `log` lists every interface mismatch found, one per line.
#[derive(Debug, Clone, Error)]
#[error("Unable to initialize the shader program: {log}")]
pub struct ProgramLinkError {
    pub log: String,
}

impl ProgramLinkError {
    pub(crate) fn new(log: impl Into<String>) -> Self {
        Self { log: log.into() }
    }
}
