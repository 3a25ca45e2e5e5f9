/// One acquired surface texture plus the encoder recording into it.
///
/// Handed back to [`Gpu::submit`](super::Gpu::submit), which presents it.
/// While a frame is alive no other surface texture can be acquired.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
