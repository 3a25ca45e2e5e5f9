use std::collections::HashMap;

use wgpu::util::DeviceExt;

use crate::device::Gpu;
use crate::shader::{CompiledShader, Visibility};

use super::{
    AttribLocation, Backend, BufferId, BufferUsage, DrawSubmission, GfxError, UniformUpload,
};

/// Backend that renders into the window surface through wgpu.
///
/// Every draw builds its pipeline from scratch and presents its own frame;
/// nothing is cached between draws.
pub struct WgpuBackend<'w> {
    gpu: Gpu<'w>,
    buffers: HashMap<BufferId, wgpu::Buffer>,
}

impl<'w> WgpuBackend<'w> {
    pub fn new(gpu: Gpu<'w>) -> Self {
        Self {
            gpu,
            buffers: HashMap::new(),
        }
    }

    pub fn gpu(&self) -> &Gpu<'w> {
        &self.gpu
    }

    fn shader_module(&self, shader: &CompiledShader) -> wgpu::ShaderModule {
        self.gpu
            .device()
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(shader.label()),
                source: wgpu::ShaderSource::Wgsl(shader.source().into()),
            })
    }

    /// One bind group (plus its layout) per uniform group index, with one
    /// uniform buffer per binding. Groups with no uniforms get an empty layout
    /// so group indices stay contiguous.
    fn uniform_groups(
        &self,
        uniforms: &[UniformUpload],
    ) -> (Vec<wgpu::BindGroupLayout>, Vec<wgpu::BindGroup>) {
        let device = self.gpu.device();
        let group_count = uniforms
            .iter()
            .map(|u| u.location.group + 1)
            .max()
            .unwrap_or(0);

        let mut layouts = Vec::with_capacity(group_count as usize);
        let mut groups = Vec::with_capacity(group_count as usize);

        for group in 0..group_count {
            let members: Vec<&UniformUpload> = uniforms
                .iter()
                .filter(|u| u.location.group == group)
                .collect();

            let layout_entries: Vec<wgpu::BindGroupLayoutEntry> = members
                .iter()
                .map(|u| wgpu::BindGroupLayoutEntry {
                    binding: u.location.binding,
                    visibility: shader_stages(u.visibility),
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(u.bytes.len() as u64),
                    },
                    count: None,
                })
                .collect();

            let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("quadstrip uniform bgl"),
                entries: &layout_entries,
            });

            let buffers: Vec<wgpu::Buffer> = members
                .iter()
                .map(|u| {
                    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(u.name.as_str()),
                        contents: &u.bytes,
                        usage: wgpu::BufferUsages::UNIFORM,
                    })
                })
                .collect();

            let entries: Vec<wgpu::BindGroupEntry> = members
                .iter()
                .zip(&buffers)
                .map(|(u, buffer)| wgpu::BindGroupEntry {
                    binding: u.location.binding,
                    resource: buffer.as_entire_binding(),
                })
                .collect();

            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("quadstrip uniform bind group"),
                layout: &layout,
                entries: &entries,
            });

            layouts.push(layout);
            groups.push(bind_group);
        }

        (layouts, groups)
    }
}

impl Backend for WgpuBackend<'_> {
    fn surface_size(&self) -> (u32, u32) {
        let size = self.gpu.size();
        (size.width, size.height)
    }

    fn upload_buffer(
        &mut self,
        buffer: BufferId,
        contents: &[u8],
        usage: BufferUsage,
    ) -> Result<(), GfxError> {
        // Buffers are recreated on every upload, so the usage hint only
        // matters for logging.
        log::debug!("uploading {} bytes to {buffer:?} ({usage:?})", contents.len());

        let gpu_buffer = self
            .gpu
            .device()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("quadstrip vertex buffer"),
                contents,
                usage: wgpu::BufferUsages::VERTEX,
            });
        self.buffers.insert(buffer, gpu_buffer);
        Ok(())
    }

    fn draw(&mut self, draw: &DrawSubmission<'_>) -> Result<(), GfxError> {
        let device = self.gpu.device();
        let program = draw.program;

        let vs_module = self.shader_module(program.vertex());
        let fs_module = self.shader_module(program.fragment());

        let (group_layouts, bind_groups) = self.uniform_groups(&draw.uniforms);
        let group_layout_refs: Vec<&wgpu::BindGroupLayout> = group_layouts.iter().collect();

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("quadstrip pipeline layout"),
            bind_group_layouts: &group_layout_refs,
            immediate_size: 0,
        });

        // One vertex buffer slot per attribute. The GL-style byte offset is
        // applied when slicing the buffer, so attribute offsets are always 0.
        let mut attributes = Vec::with_capacity(draw.vertex_inputs.len());
        for input in &draw.vertex_inputs {
            let format = input
                .layout
                .vertex_format()
                .ok_or_else(|| GfxError::InvalidAttribute {
                    location: AttribLocation(input.location),
                    reason: "no matching vertex format".to_string(),
                })?;
            attributes.push([wgpu::VertexAttribute {
                format,
                offset: 0,
                shader_location: input.location,
            }]);
        }

        let vertex_layouts: Vec<wgpu::VertexBufferLayout<'_>> = draw
            .vertex_inputs
            .iter()
            .zip(&attributes)
            .map(|(input, attrs)| wgpu::VertexBufferLayout {
                array_stride: input.layout.effective_stride(),
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: attrs,
            })
            .collect();

        let depth_stencil = draw.depth.map(|func| wgpu::DepthStencilState {
            format: self.gpu.depth_format(),
            depth_write_enabled: true,
            depth_compare: func.to_wgpu(),
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("quadstrip pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &vs_module,
                entry_point: Some(program.vertex().entry_point()),
                compilation_options: Default::default(),
                buffers: &vertex_layouts,
            },

            fragment: Some(wgpu::FragmentState {
                module: &fs_module,
                entry_point: Some(program.fragment().entry_point()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.gpu.surface_format(),
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: draw.topology.to_wgpu(),
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let mut slices = Vec::with_capacity(draw.vertex_inputs.len());
        for input in &draw.vertex_inputs {
            let buffer = self
                .buffers
                .get(&input.buffer)
                .ok_or(GfxError::UnknownBuffer(input.buffer))?;
            slices.push(buffer.slice(input.layout.offset..));
        }

        let mut frame = self.gpu.begin_frame()?;
        let depth_view = draw.depth.map(|_| self.gpu.create_depth_view());

        let color_load = match draw.clear.color {
            Some(c) => wgpu::LoadOp::Clear(c.into()),
            None => wgpu::LoadOp::Load,
        };
        let depth_load = match draw.clear.depth {
            Some(d) => wgpu::LoadOp::Clear(d),
            None => wgpu::LoadOp::Load,
        };

        {
            let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("quadstrip scene pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: color_load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: depth_view.as_ref().map(|view| {
                    wgpu::RenderPassDepthStencilAttachment {
                        view,
                        depth_ops: Some(wgpu::Operations {
                            load: depth_load,
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            rpass.set_pipeline(&pipeline);
            for (index, group) in bind_groups.iter().enumerate() {
                rpass.set_bind_group(index as u32, group, &[]);
            }
            for (slot, slice) in slices.into_iter().enumerate() {
                rpass.set_vertex_buffer(slot as u32, slice);
            }
            rpass.draw(draw.first..draw.first + draw.count, 0..1);
        }

        self.gpu.submit(frame);
        log::info!(
            "presented {:?} draw of {} vertices",
            draw.topology,
            draw.count
        );
        Ok(())
    }
}

fn shader_stages(visibility: Visibility) -> wgpu::ShaderStages {
    let mut stages = wgpu::ShaderStages::NONE;
    if visibility.vertex {
        stages |= wgpu::ShaderStages::VERTEX;
    }
    if visibility.fragment {
        stages |= wgpu::ShaderStages::FRAGMENT;
    }
    stages
}
