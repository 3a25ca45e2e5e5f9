use naga::{Scalar, TypeInner, VectorSize};

use super::{CompiledShader, ProgramLinkError, ShaderStage};

/// Vertex attribute exposed by a linked program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttribInfo {
    pub name: String,
    pub location: u32,
    /// Component count of the shader-side type (1..=4).
    pub components: u8,
}

/// Uniform types the binding layer knows how to upload.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum UniformType {
    Float,
    Vec4,
    Mat4,
}

impl UniformType {
    /// Size of the value in the uniform address space, in bytes.
    pub fn byte_size(self) -> usize {
        match self {
            UniformType::Float => 4,
            UniformType::Vec4 => 16,
            UniformType::Mat4 => 64,
        }
    }

    fn from_naga(inner: &TypeInner) -> Option<Self> {
        match *inner {
            TypeInner::Scalar(s) if s == Scalar::F32 => Some(UniformType::Float),
            TypeInner::Vector {
                size: VectorSize::Quad,
                scalar,
            } if scalar == Scalar::F32 => Some(UniformType::Vec4),
            TypeInner::Matrix {
                columns: VectorSize::Quad,
                rows: VectorSize::Quad,
                scalar,
            } if scalar == Scalar::F32 => Some(UniformType::Mat4),
            _ => None,
        }
    }
}

/// Stages that read a uniform.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Visibility {
    pub vertex: bool,
    pub fragment: bool,
}

/// Uniform exposed by a linked program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformInfo {
    pub name: String,
    pub group: u32,
    pub binding: u32,
    pub ty: UniformType,
    pub visibility: Visibility,
}

/// A vertex + fragment pair whose interfaces agree.
///
/// Owns both stages for its lifetime. Attribute and uniform tables are the
/// only source of locations; names not in them have no location.
#[derive(Debug, Clone)]
pub struct LinkedProgram {
    vertex: CompiledShader,
    fragment: CompiledShader,
    attributes: Vec<AttribInfo>,
    uniforms: Vec<UniformInfo>,
}

impl LinkedProgram {
    pub fn vertex(&self) -> &CompiledShader {
        &self.vertex
    }

    pub fn fragment(&self) -> &CompiledShader {
        &self.fragment
    }

    pub fn attributes(&self) -> &[AttribInfo] {
        &self.attributes
    }

    pub fn uniforms(&self) -> &[UniformInfo] {
        &self.uniforms
    }

    pub fn attribute(&self, name: &str) -> Option<&AttribInfo> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn uniform(&self, name: &str) -> Option<&UniformInfo> {
        self.uniforms.iter().find(|u| u.name == name)
    }
}

/// Links a vertex and a fragment shader.
///
/// Every problem found is reported in the log, one per line, so a broken
/// program is diagnosed in a single pass.
pub fn link(
    vertex: CompiledShader,
    fragment: CompiledShader,
) -> Result<LinkedProgram, ProgramLinkError> {
    let mut errors = Vec::new();

    if vertex.stage() != ShaderStage::Vertex {
        errors.push(format!("`{}` is not a vertex shader", vertex.label()));
    }
    if fragment.stage() != ShaderStage::Fragment {
        errors.push(format!("`{}` is not a fragment shader", fragment.label()));
    }
    if !errors.is_empty() {
        return Err(ProgramLinkError::new(errors.join("\n")));
    }

    if !vertex.writes_position() {
        errors.push("vertex shader does not write @builtin(position)".to_string());
    }

    for input in fragment.inputs() {
        match vertex.outputs().iter().find(|o| o.location == input.location) {
            None => errors.push(format!(
                "fragment input `{}` at location {} is not written by the vertex shader",
                input.name, input.location
            )),
            Some(output) if output.ty != input.ty => errors.push(format!(
                "location {}: vertex output is {} but fragment input `{}` is {}",
                input.location,
                output.ty_name,
                input.name,
                input.ty_name
            )),
            Some(_) => {}
        }
    }

    let mut attributes = Vec::new();
    for input in vertex.inputs() {
        match components(&input.ty) {
            Some(components) => attributes.push(AttribInfo {
                name: input.name.clone(),
                location: input.location,
                components,
            }),
            None => errors.push(format!(
                "attribute `{}` has unsupported type {}",
                input.name,
                input.ty_name
            )),
        }
    }

    let mut uniforms: Vec<UniformInfo> = Vec::new();
    let stages = [(&vertex, ShaderStage::Vertex), (&fragment, ShaderStage::Fragment)];
    for (shader, stage) in stages {
        for var in shader.uniforms() {
            let Some(ty) = UniformType::from_naga(&var.ty) else {
                errors.push(format!(
                    "uniform `{}` has unsupported type {}",
                    var.name,
                    var.ty_name
                ));
                continue;
            };

            let slot = (var.binding.group, var.binding.binding);
            let found = uniforms
                .iter()
                .position(|u| u.name == var.name || (u.group, u.binding) == slot);

            let index = match found {
                Some(i) => {
                    let u = &uniforms[i];
                    if u.name != var.name {
                        errors.push(format!(
                            "uniforms `{}` and `{}` share @group({}) @binding({})",
                            u.name, var.name, slot.0, slot.1
                        ));
                        continue;
                    }
                    if (u.group, u.binding) != slot {
                        errors.push(format!(
                            "uniform `{}` is bound at @group({}) @binding({}) and @group({}) @binding({})",
                            var.name, u.group, u.binding, slot.0, slot.1
                        ));
                        continue;
                    }
                    if u.ty != ty {
                        errors.push(format!(
                            "uniform `{}` is declared with different types",
                            var.name
                        ));
                        continue;
                    }
                    i
                }
                None => {
                    uniforms.push(UniformInfo {
                        name: var.name.clone(),
                        group: slot.0,
                        binding: slot.1,
                        ty,
                        visibility: Visibility::default(),
                    });
                    uniforms.len() - 1
                }
            };

            let info = &mut uniforms[index];
            match stage {
                ShaderStage::Vertex => info.visibility.vertex = true,
                ShaderStage::Fragment => info.visibility.fragment = true,
            }
        }
    }

    if !errors.is_empty() {
        return Err(ProgramLinkError::new(errors.join("\n")));
    }

    log::debug!(
        "linked `{}` + `{}`: {} attribute(s), {} uniform(s)",
        vertex.label(),
        fragment.label(),
        attributes.len(),
        uniforms.len()
    );

    Ok(LinkedProgram {
        vertex,
        fragment,
        attributes,
        uniforms,
    })
}

fn components(inner: &TypeInner) -> Option<u8> {
    match inner {
        TypeInner::Scalar(s) if *s == Scalar::F32 => Some(1),
        TypeInner::Vector { size, scalar } if *scalar == Scalar::F32 => Some(*size as u8),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::{compile, ShaderSource};

    fn vs(text: &str) -> CompiledShader {
        compile(ShaderStage::Vertex, &ShaderSource::new("test vs", text)).unwrap()
    }

    fn fs(text: &str) -> CompiledShader {
        compile(ShaderStage::Fragment, &ShaderSource::new("test fs", text)).unwrap()
    }

    fn scene_program() -> LinkedProgram {
        let v = compile(ShaderStage::Vertex, &ShaderSource::VERTEX).unwrap();
        let f = compile(ShaderStage::Fragment, &ShaderSource::FRAGMENT).unwrap();
        link(v, f).unwrap()
    }

    #[test]
    fn scene_shaders_link() {
        let program = scene_program();

        let attr = program.attribute("aVertexPosition").unwrap();
        assert_eq!(attr.location, 0);
        assert_eq!(attr.components, 2);

        let proj = program.uniform("uProjectionMatrix").unwrap();
        assert_eq!((proj.group, proj.binding, proj.ty), (0, 0, UniformType::Mat4));
        assert!(proj.visibility.vertex && !proj.visibility.fragment);

        let mv = program.uniform("uModelViewMatrix").unwrap();
        assert_eq!((mv.group, mv.binding), (0, 1));
    }

    #[test]
    fn unknown_names_have_no_location() {
        let program = scene_program();
        assert!(program.attribute("aVertexColor").is_none());
        assert!(program.uniform("uNormalMatrix").is_none());
    }

    #[test]
    fn swapped_stages_fail_to_link() {
        let v = compile(ShaderStage::Vertex, &ShaderSource::VERTEX).unwrap();
        let f = compile(ShaderStage::Fragment, &ShaderSource::FRAGMENT).unwrap();

        let err = link(f, v).unwrap_err();
        assert!(err.log.contains("is not a vertex shader"));
        assert!(err.to_string().starts_with("Unable to initialize the shader program: "));
    }

    #[test]
    fn unmatched_fragment_input_fails_to_link() {
        let v = vs("@vertex fn main() -> @builtin(position) vec4<f32> { return vec4<f32>(0.0); }");
        let f = fs("@fragment fn main(@location(0) vColor: vec4<f32>) -> @location(0) vec4<f32> { return vColor; }");

        let err = link(v, f).unwrap_err();
        assert!(err.log.contains("`vColor` at location 0"));
    }

    #[test]
    fn varying_type_mismatch_fails_to_link() {
        let v = vs(
            "struct Out { @builtin(position) pos: vec4<f32>, @location(0) color: vec3<f32> }\n\
             @vertex fn main() -> Out { return Out(vec4<f32>(0.0), vec3<f32>(1.0)); }",
        );
        let f = fs("@fragment fn main(@location(0) color: vec4<f32>) -> @location(0) vec4<f32> { return color; }");

        let err = link(v, f).unwrap_err();
        assert!(err.log.contains("vec3<f32>"));
        assert!(err.log.contains("vec4<f32>"));
    }

    #[test]
    fn matching_varyings_link() {
        let v = vs(
            "struct Out { @builtin(position) pos: vec4<f32>, @location(0) color: vec4<f32> }\n\
             @vertex fn main() -> Out { return Out(vec4<f32>(0.0), vec4<f32>(1.0)); }",
        );
        let f = fs("@fragment fn main(@location(0) color: vec4<f32>) -> @location(0) vec4<f32> { return color; }");

        assert!(link(v, f).is_ok());
    }

    #[test]
    fn uniform_shared_between_stages_merges_visibility() {
        let v = vs(
            "@group(0) @binding(0) var<uniform> uTint: vec4<f32>;\n\
             @vertex fn main() -> @builtin(position) vec4<f32> { return uTint; }",
        );
        let f = fs(
            "@group(0) @binding(0) var<uniform> uTint: vec4<f32>;\n\
             @fragment fn main() -> @location(0) vec4<f32> { return uTint; }",
        );

        let program = link(v, f).unwrap();
        assert_eq!(program.uniforms().len(), 1);
        let tint = program.uniform("uTint").unwrap();
        assert_eq!(tint.visibility, Visibility { vertex: true, fragment: true });
    }

    #[test]
    fn unsupported_uniform_types_are_spelled_out() {
        let v = vs(
            "struct Light { color: vec4<f32> }\n\
             @group(0) @binding(0) var<uniform> uLights: array<vec4<f32>, 4>;\n\
             @group(0) @binding(1) var<uniform> uLight: Light;\n\
             @vertex fn main() -> @builtin(position) vec4<f32> { return uLights[0] + uLight.color; }",
        );
        let f = fs("@fragment fn main() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }");

        let err = link(v, f).unwrap_err();
        assert!(err.log.contains("`uLights` has unsupported type array<vec4<f32>"));
        assert!(err.log.contains("`uLight` has unsupported type Light"));
    }

    #[test]
    fn conflicting_uniform_slot_fails_to_link() {
        let v = vs(
            "@group(0) @binding(0) var<uniform> uA: vec4<f32>;\n\
             @vertex fn main() -> @builtin(position) vec4<f32> { return uA; }",
        );
        let f = fs(
            "@group(0) @binding(0) var<uniform> uB: vec4<f32>;\n\
             @fragment fn main() -> @location(0) vec4<f32> { return uB; }",
        );

        let err = link(v, f).unwrap_err();
        assert!(err.log.contains("share @group(0) @binding(0)"));
    }
}
