use naga::common::wgsl::TypeContext;
use naga::valid::{Capabilities, ValidationFlags, Validator};
use naga::{Binding, Module, ResourceBinding, TypeInner};

use super::{ShaderCompileError, ShaderSource, ShaderStage};

/// A user-defined stage input or output bound to a `@location`.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceVar {
    pub name: String,
    pub location: u32,
    pub ty: TypeInner,
    /// WGSL spelling of `ty`, for diagnostics.
    pub ty_name: String,
}

/// A `var<uniform>` global the entry point actually reads.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformVar {
    pub name: String,
    pub binding: ResourceBinding,
    pub ty: TypeInner,
    pub ty_name: String,
}

/// A successfully parsed and validated single-stage shader.
///
/// Holds the source so the GPU backend can build its own module from it, and
/// the interface reflection the linker works from.
#[derive(Debug, Clone)]
pub struct CompiledShader {
    stage: ShaderStage,
    source: ShaderSource,
    entry_point: String,
    inputs: Vec<InterfaceVar>,
    outputs: Vec<InterfaceVar>,
    writes_position: bool,
    uniforms: Vec<UniformVar>,
}

impl CompiledShader {
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn label(&self) -> &str {
        self.source.label()
    }

    pub fn source(&self) -> &str {
        self.source.text()
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    pub fn inputs(&self) -> &[InterfaceVar] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[InterfaceVar] {
        &self.outputs
    }

    /// True when the entry point writes `@builtin(position)`.
    pub fn writes_position(&self) -> bool {
        self.writes_position
    }

    pub fn uniforms(&self) -> &[UniformVar] {
        &self.uniforms
    }
}

/// Compiles `source` as a shader of kind `stage`.
///
/// The source must contain exactly one entry point for `stage`. On failure no
/// shader object exists and the error carries the compiler diagnostic.
pub fn compile(
    stage: ShaderStage,
    source: &ShaderSource,
) -> Result<CompiledShader, ShaderCompileError> {
    let text = source.text();
    let fail = |log: String| ShaderCompileError::new(stage, source.label(), log);

    let module = naga::front::wgsl::parse_str(text).map_err(|e| fail(e.emit_to_string(text)))?;

    let info = Validator::new(ValidationFlags::all(), Capabilities::empty())
        .validate(&module)
        .map_err(|e| fail(e.emit_to_string(text)))?;

    let mut candidates = module
        .entry_points
        .iter()
        .enumerate()
        .filter(|(_, ep)| ep.stage == stage.to_naga());

    let (index, entry) = match (candidates.next(), candidates.next()) {
        (Some(found), None) => found,
        (None, _) => return Err(fail(format!("no {stage} entry point in `{}`", source.label()))),
        (Some(_), Some(_)) => {
            return Err(fail(format!(
                "multiple {stage} entry points in `{}`",
                source.label()
            )));
        }
    };

    // Position as an input (fragment coord) is not a write; keep it apart.
    let mut inputs = Vec::new();
    let mut reads_position = false;
    for arg in &entry.function.arguments {
        collect_interface(
            &module,
            arg.name.as_deref(),
            arg.ty,
            arg.binding.as_ref(),
            &mut inputs,
            &mut reads_position,
        );
    }

    let mut writes_position = false;
    let mut outputs = Vec::new();
    if let Some(result) = &entry.function.result {
        collect_interface(
            &module,
            None,
            result.ty,
            result.binding.as_ref(),
            &mut outputs,
            &mut writes_position,
        );
    }

    let ep_info = info.get_entry_point(index);
    let uniforms = module
        .global_variables
        .iter()
        .filter(|(handle, var)| {
            var.space == naga::AddressSpace::Uniform && !ep_info[*handle].is_empty()
        })
        .filter_map(|(_, var)| {
            Some(UniformVar {
                name: var.name.clone()?,
                binding: var.binding.clone()?,
                ty: module.types[var.ty].inner.clone(),
                ty_name: module.types.type_to_string(var.ty),
            })
        })
        .collect();

    log::debug!(
        "compiled {stage} shader `{}` (entry `{}`)",
        source.label(),
        entry.name
    );

    Ok(CompiledShader {
        stage,
        source: source.clone(),
        entry_point: entry.name.clone(),
        inputs,
        outputs,
        writes_position,
        uniforms,
    })
}

/// Flattens one argument/result (possibly a struct of bound members) into
/// `@location` variables, noting a `@builtin(position)` along the way.
fn collect_interface(
    module: &Module,
    name: Option<&str>,
    ty: naga::Handle<naga::Type>,
    binding: Option<&Binding>,
    out: &mut Vec<InterfaceVar>,
    position: &mut bool,
) {
    match binding {
        Some(Binding::Location { location, .. }) => out.push(InterfaceVar {
            name: name.unwrap_or_default().to_string(),
            location: *location,
            ty: module.types[ty].inner.clone(),
            ty_name: module.types.type_to_string(ty),
        }),
        Some(Binding::BuiltIn(naga::BuiltIn::Position { .. })) => *position = true,
        Some(Binding::BuiltIn(_)) => {}
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    collect_interface(
                        module,
                        member.name.as_deref(),
                        member.ty,
                        member.binding.as_ref(),
                        out,
                        position,
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_sources_compile_for_their_stage() {
        let vs = compile(ShaderStage::Vertex, &ShaderSource::VERTEX).unwrap();
        let fs = compile(ShaderStage::Fragment, &ShaderSource::FRAGMENT).unwrap();

        assert_eq!(vs.stage(), ShaderStage::Vertex);
        assert_eq!(vs.entry_point(), "main");
        assert!(vs.writes_position());
        assert_eq!(fs.stage(), ShaderStage::Fragment);
        assert_eq!(fs.outputs().len(), 1);
    }

    #[test]
    fn vertex_reflection_sees_attribute_and_uniforms() {
        let vs = compile(ShaderStage::Vertex, &ShaderSource::VERTEX).unwrap();

        assert_eq!(vs.inputs().len(), 1);
        assert_eq!(vs.inputs()[0].name, "aVertexPosition");
        assert_eq!(vs.inputs()[0].location, 0);
        assert_eq!(vs.inputs()[0].ty_name, "vec2<f32>");

        let names: Vec<&str> = vs.uniforms().iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, ["uProjectionMatrix", "uModelViewMatrix"]);
    }

    #[test]
    fn malformed_source_reports_diagnostic() {
        let broken = ShaderSource::new(
            "broken",
            "@fragment fn main() -> @location(0) vec4<f32> { return vec4<f32>(1.0 }",
        );
        let err = compile(ShaderStage::Fragment, &broken).unwrap_err();

        assert_eq!(err.stage, ShaderStage::Fragment);
        assert_eq!(err.label, "broken");
        assert!(!err.log.trim().is_empty());
        assert!(err.to_string().starts_with("An error occurred compiling the shaders: "));
    }

    #[test]
    fn type_errors_fail_validation() {
        let bad = ShaderSource::new(
            "bad types",
            "@fragment fn main() -> @location(0) vec4<f32> { return 1.0; }",
        );
        let err = compile(ShaderStage::Fragment, &bad).unwrap_err();
        assert!(!err.log.is_empty());
    }

    #[test]
    fn wrong_stage_is_a_compile_error() {
        let err = compile(ShaderStage::Vertex, &ShaderSource::FRAGMENT).unwrap_err();
        assert!(err.log.contains("no vertex entry point"));
    }

    #[test]
    fn unused_uniforms_are_not_reflected() {
        let src = ShaderSource::new(
            "unused",
            "@group(0) @binding(0) var<uniform> uUnused: vec4<f32>;\n\
             @fragment fn main() -> @location(0) vec4<f32> { return vec4<f32>(0.0); }",
        );
        let fs = compile(ShaderStage::Fragment, &src).unwrap();
        assert!(fs.uniforms().is_empty());
    }
}
