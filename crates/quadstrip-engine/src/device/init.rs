/// Initialization parameters for the GPU layer.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Prefer an sRGB surface format when available.
    ///
    /// With an sRGB target the constant white fragment output lands as white
    /// regardless of the platform's default format.
    pub prefer_srgb: bool,

    /// Present mode. FIFO is the only mode every backend must support.
    pub present_mode: wgpu::PresentMode,

    /// Optional alpha mode preference; falls back to the first supported mode.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Required wgpu features. The scene needs none.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,

    /// Format of the depth attachment allocated when depth testing is on.
    pub depth_format: wgpu::TextureFormat,

    /// Desired maximum frame latency for the surface (hint).
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
            depth_format: wgpu::TextureFormat::Depth32Float,
            desired_maximum_frame_latency: 2,
        }
    }
}
