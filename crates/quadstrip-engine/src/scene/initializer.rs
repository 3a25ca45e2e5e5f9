use crate::gfx::{
    AttribLayout, AttribLocation, Backend, BufferId, BufferTarget, BufferUsage, Capability,
    ClearMask, Color, DepthFunc, GfxContext, ProgramId, Topology, UniformLocation,
};
use crate::shader::{ShaderSource, ShaderStage};

use super::camera::{aspect_ratio, Camera, CameraConfig};
use super::geometry::{COMPONENTS_PER_VERTEX, STRIP_POSITIONS, VERTEX_COUNT};
use super::{InitError, Notifier};

const POSITION_ATTRIBUTE: &str = "aVertexPosition";
const PROJECTION_UNIFORM: &str = "uProjectionMatrix";
const MODEL_VIEW_UNIFORM: &str = "uModelViewMatrix";

/// Everything the one-shot scene setup is parameterized by.
#[derive(Debug, Clone)]
pub struct SceneConfig {
    pub camera: CameraConfig,
    pub clear_color: Color,
    pub clear_depth: f32,
    pub depth_func: DepthFunc,
    pub vertex_shader: ShaderSource,
    pub fragment_shader: ShaderSource,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            clear_color: Color::BLACK,
            clear_depth: 1.0,
            depth_func: DepthFunc::LessEqual,
            vertex_shader: ShaderSource::VERTEX,
            fragment_shader: ShaderSource::FRAGMENT,
        }
    }
}

/// What a successful initialization left on the GPU.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub program: ProgramId,
    pub position_buffer: BufferId,
    pub position_location: AttribLocation,
    pub projection_location: UniformLocation,
    pub model_view_location: UniformLocation,
    pub camera: Camera,
}

/// Builds and draws the strip scene, once.
#[derive(Debug, Clone, Default)]
pub struct SceneInitializer {
    config: SceneConfig,
}

impl SceneInitializer {
    pub fn new(config: SceneConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Runs the whole setup against `gfx` and issues the single draw.
    ///
    /// Stops at the first failure; nothing after the failing step touches
    /// the context.
    pub fn initialize<B: Backend>(&self, gfx: &mut GfxContext<B>) -> Result<Scene, InitError> {
        let config = &self.config;

        log::debug!("compiling shaders");
        let vertex = gfx.compile_shader(ShaderStage::Vertex, &config.vertex_shader)?;
        let fragment = gfx.compile_shader(ShaderStage::Fragment, &config.fragment_shader)?;

        log::debug!("linking program");
        let program = gfx.create_program();
        gfx.attach_shader(program, vertex)?;
        gfx.attach_shader(program, fragment)?;
        gfx.link_program(program)?;

        log::debug!("resolving locations");
        let position_location = gfx
            .attrib_location(program, POSITION_ATTRIBUTE)
            .ok_or(InitError::MissingAttribute(POSITION_ATTRIBUTE))?;
        let projection_location = gfx
            .uniform_location(program, PROJECTION_UNIFORM)
            .ok_or(InitError::MissingUniform(PROJECTION_UNIFORM))?;
        let model_view_location = gfx
            .uniform_location(program, MODEL_VIEW_UNIFORM)
            .ok_or(InitError::MissingUniform(MODEL_VIEW_UNIFORM))?;

        log::debug!("uploading strip geometry");
        let position_buffer = gfx.create_buffer();
        gfx.bind_buffer(BufferTarget::Array, position_buffer)?;
        gfx.buffer_data(BufferTarget::Array, &STRIP_POSITIONS, BufferUsage::Static)?;

        gfx.clear_color(config.clear_color);
        gfx.clear_depth(config.clear_depth);
        gfx.enable(Capability::DepthTest);
        gfx.depth_func(config.depth_func);
        gfx.clear(ClearMask::COLOR | ClearMask::DEPTH);

        let (width, height) = gfx.surface_size();
        let camera = Camera::new(&config.camera, aspect_ratio(width, height));
        log::debug!("camera for {width}x{height} surface");

        gfx.vertex_attrib_pointer(position_location, AttribLayout::floats(COMPONENTS_PER_VERTEX))?;
        gfx.enable_vertex_attrib_array(position_location);

        gfx.use_program(program)?;
        gfx.uniform_matrix4fv(projection_location, false, &camera.projection_cols())?;
        gfx.uniform_matrix4fv(model_view_location, false, &camera.model_view_cols())?;

        gfx.draw_arrays(Topology::TriangleStrip, 0, VERTEX_COUNT)?;
        log::info!("scene drawn ({VERTEX_COUNT} vertex triangle strip)");

        Ok(Scene {
            program,
            position_buffer,
            position_location,
            projection_location,
            model_view_location,
            camera,
        })
    }

    /// [`initialize`](Self::initialize), alerting the user on compile and
    /// link failures before handing the error back.
    pub fn initialize_or_alert<B: Backend>(
        &self,
        gfx: &mut GfxContext<B>,
        notifier: &mut dyn Notifier,
    ) -> Result<Scene, InitError> {
        self.initialize(gfx).inspect_err(|err| {
            log::error!("scene initialization failed: {err}");
            if let Some(message) = err.user_message() {
                notifier.alert(&message);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::RecordingBackend;

    #[derive(Default)]
    struct RecordingNotifier {
        alerts: Vec<String>,
    }

    impl Notifier for RecordingNotifier {
        fn alert(&mut self, message: &str) {
            self.alerts.push(message.to_string());
        }
    }

    fn ctx() -> GfxContext<RecordingBackend> {
        GfxContext::new(RecordingBackend::new(640, 480))
    }

    #[test]
    fn issues_exactly_one_strip_draw() {
        let mut gfx = ctx();
        let scene = SceneInitializer::default().initialize(&mut gfx).unwrap();

        let draws = gfx.backend().draws();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].topology, Topology::TriangleStrip);
        assert_eq!((draws[0].first, draws[0].count), (0, 5));
        assert_eq!(draws[0].vertex_inputs[0].buffer, scene.position_buffer);
        assert!(gfx.link_status(scene.program));
    }

    #[test]
    fn uploads_the_strip_positions_once() {
        let mut gfx = ctx();
        let scene = SceneInitializer::default().initialize(&mut gfx).unwrap();

        let backend = gfx.backend();
        assert_eq!(backend.uploads().len(), 1);
        assert_eq!(backend.uploads()[0].usage, BufferUsage::Static);

        let floats = backend.buffer_f32s(scene.position_buffer).unwrap();
        assert_eq!(floats, [1.0, 1.0, -1.0, 1.0, 1.0, -1.0, -1.0, -1.0, 0.0, -1.5]);
    }

    #[test]
    fn draw_clears_to_black_with_depth_test() {
        let mut gfx = ctx();
        SceneInitializer::default().initialize(&mut gfx).unwrap();

        let draw = &gfx.backend().draws()[0];
        assert_eq!(draw.clear.color, Some(Color::BLACK));
        assert_eq!(draw.clear.depth, Some(1.0));
        assert_eq!(draw.depth, Some(DepthFunc::LessEqual));
    }

    #[test]
    fn matrices_reach_the_draw() {
        let mut gfx = ctx();
        let scene = SceneInitializer::default().initialize(&mut gfx).unwrap();
        let draw = &gfx.backend().draws()[0];

        let projection = draw.uniform_f32s(PROJECTION_UNIFORM).unwrap();
        assert_eq!(projection, scene.camera.projection_cols());
        assert_eq!(projection[11], -1.0);

        let model_view = draw.uniform_f32s(MODEL_VIEW_UNIFORM).unwrap();
        assert_eq!(model_view, scene.camera.model_view_cols());
    }

    #[test]
    fn aspect_follows_the_surface() {
        let mut gfx = GfxContext::new(RecordingBackend::new(800, 400));
        let scene = SceneInitializer::default().initialize(&mut gfx).unwrap();

        let expected = Camera::new(&CameraConfig::default(), 2.0);
        assert_eq!(scene.camera, expected);
    }

    #[test]
    fn broken_fragment_shader_stops_before_any_program() {
        let config = SceneConfig {
            fragment_shader: ShaderSource::new(
                "broken fs",
                "@fragment fn main() -> @location(0) vec4<f32> { return vec4<f32>(1.0 }",
            ),
            ..SceneConfig::default()
        };
        let mut gfx = ctx();
        let mut notifier = RecordingNotifier::default();

        let err = SceneInitializer::new(config)
            .initialize_or_alert(&mut gfx, &mut notifier)
            .unwrap_err();

        assert!(matches!(err, InitError::ShaderCompile(_)));
        assert!(gfx.backend().draws().is_empty());
        assert!(gfx.backend().uploads().is_empty());
        assert_eq!(notifier.alerts.len(), 1);
        assert!(notifier.alerts[0].starts_with("An error occurred compiling the shaders: "));
    }

    #[test]
    fn link_failure_alerts_and_aborts() {
        // Reads a varying the vertex shader never writes.
        let config = SceneConfig {
            fragment_shader: ShaderSource::new(
                "needs color",
                "@fragment fn main(@location(0) vColor: vec4<f32>) -> @location(0) vec4<f32> { return vColor; }",
            ),
            ..SceneConfig::default()
        };
        let mut gfx = ctx();
        let mut notifier = RecordingNotifier::default();

        let err = SceneInitializer::new(config)
            .initialize_or_alert(&mut gfx, &mut notifier)
            .unwrap_err();

        assert!(matches!(err, InitError::ProgramLink(_)));
        assert!(gfx.backend().draws().is_empty());
        assert!(gfx.backend().uploads().is_empty());
        assert_eq!(notifier.alerts.len(), 1);
        assert!(notifier.alerts[0].starts_with("Unable to initialize the shader program: "));
    }

    #[test]
    fn missing_uniform_aborts_without_alert() {
        let config = SceneConfig {
            vertex_shader: ShaderSource::new(
                "no model view",
                "@group(0) @binding(0) var<uniform> uProjectionMatrix: mat4x4<f32>;\n\
                 @vertex fn main(@location(0) aVertexPosition: vec2<f32>) -> @builtin(position) vec4<f32> {\n\
                     return uProjectionMatrix * vec4<f32>(aVertexPosition, 0.0, 1.0);\n\
                 }",
            ),
            ..SceneConfig::default()
        };
        let mut gfx = ctx();
        let mut notifier = RecordingNotifier::default();

        let err = SceneInitializer::new(config)
            .initialize_or_alert(&mut gfx, &mut notifier)
            .unwrap_err();

        assert!(matches!(err, InitError::MissingUniform(MODEL_VIEW_UNIFORM)));
        assert!(notifier.alerts.is_empty());
        assert!(gfx.backend().draws().is_empty());
    }
}
