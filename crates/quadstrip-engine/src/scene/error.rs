use thiserror::Error;

use crate::gfx::GfxError;
use crate::shader::{ProgramLinkError, ShaderCompileError};

/// Why scene initialization stopped.
#[derive(Debug, Error)]
pub enum InitError {
    #[error(transparent)]
    ShaderCompile(#[from] ShaderCompileError),

    #[error(transparent)]
    ProgramLink(ProgramLinkError),

    #[error("linked program has no vertex attribute `{0}`")]
    MissingAttribute(&'static str),

    #[error("linked program has no uniform `{0}`")]
    MissingUniform(&'static str),

    #[error("graphics call failed during initialization: {0}")]
    Gfx(GfxError),
}

impl InitError {
    /// Message to show the user, for the failures that warrant an alert.
    pub fn user_message(&self) -> Option<String> {
        match self {
            InitError::ShaderCompile(e) => Some(e.to_string()),
            InitError::ProgramLink(e) => Some(e.to_string()),
            _ => None,
        }
    }
}

impl From<GfxError> for InitError {
    fn from(err: GfxError) -> Self {
        match err {
            GfxError::Link(e) => InitError::ProgramLink(e),
            other => InitError::Gfx(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_failures_from_the_context_become_link_errors() {
        let gfx = GfxError::Link(ProgramLinkError::new("boom"));
        let err = InitError::from(gfx);

        assert!(matches!(err, InitError::ProgramLink(_)));
        assert_eq!(
            err.user_message().as_deref(),
            Some("Unable to initialize the shader program: boom")
        );
    }

    #[test]
    fn lookup_misses_are_not_shown_to_the_user() {
        assert_eq!(InitError::MissingUniform("uModelViewMatrix").user_message(), None);
        assert_eq!(InitError::Gfx(GfxError::NoProgramInUse).user_message(), None);
    }
}
