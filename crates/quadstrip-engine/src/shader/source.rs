use std::borrow::Cow;

/// Shader text plus a label used in diagnostics and GPU object names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    label: Cow<'static, str>,
    text: Cow<'static, str>,
}

impl ShaderSource {
    /// Transforms `aVertexPosition` by `uProjectionMatrix * uModelViewMatrix`.
    pub const VERTEX: ShaderSource = ShaderSource::from_static(
        "quadstrip vertex shader",
        include_str!("shaders/scene.vert.wgsl"),
    );

    /// Constant opaque white.
    pub const FRAGMENT: ShaderSource = ShaderSource::from_static(
        "quadstrip fragment shader",
        include_str!("shaders/scene.frag.wgsl"),
    );

    pub const fn from_static(label: &'static str, text: &'static str) -> Self {
        Self {
            label: Cow::Borrowed(label),
            text: Cow::Borrowed(text),
        }
    }

    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: Cow::Owned(label.into()),
            text: Cow::Owned(text.into()),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}
