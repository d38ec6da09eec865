// GPU renderer for the Glyphfall overlay.
// One command submission per frame, five passes in strict order: dock icons
// → instanced glyph scene → bloom high-pass → separable blur (h, v) →
// composite to the surface. Each pass reads only targets written by an
// earlier pass in the same submission.

mod atlas;
mod icons;
mod shaders;
mod targets;
mod vertex;

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glyphfall_core::{DockItem, Size};
use glyphfall_sim::CellInstance;

pub use atlas::{AtlasError, GlyphAtlas, ATLAS_COLS, ATLAS_ROWS};
pub use icons::{layout_items, row_width, IconCompositor, IconMetrics, IconSlot};
pub use targets::TARGET_FORMAT;

use shaders::{POST_SHADER, SCENE_SHADER};
use targets::FrameTargets;
use vertex::{QuadVertex, CELL_INSTANCE_LAYOUT, UNIT_QUAD};

/// Straight-alpha blending on both color and alpha channels, so regions the
/// overlay never touches keep zero alpha and the desktop shows through.
pub(crate) const OVERLAY_BLEND: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
        operation: wgpu::BlendOperation::Add,
    },
};

// ──────────────────────────────────────────────
// Uniform blocks
// ──────────────────────────────────────────────

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct SceneUniforms {
    viewport: [f32; 2],
    atlas_grid: [f32; 2],
    cell_size: [f32; 2],
    _pad: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct PostUniforms {
    texel: [f32; 2],
    direction: [f32; 2],
    threshold: f32,
    intensity: f32,
    _pad: [f32; 2],
}

/// Bloom shaping knobs, fed from settings at startup.
#[derive(Debug, Clone, Copy)]
pub struct BloomTuning {
    /// Luminance below this never reaches the blur.
    pub threshold: f32,
    /// Multiplier on the blurred highlights in the composite.
    pub intensity: f32,
}

impl Default for BloomTuning {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            intensity: 1.0,
        }
    }
}

// ──────────────────────────────────────────────
// RainRenderer
// ──────────────────────────────────────────────

/// Bind groups that reference size-dependent texture views; rebuilt as a set
/// whenever the targets are reallocated.
struct FrameBindGroups {
    scene_textures: Option<wgpu::BindGroup>,
    high_pass: wgpu::BindGroup,
    blur_h: wgpu::BindGroup,
    blur_v: wgpu::BindGroup,
    composite: wgpu::BindGroup,
    composite_bloom: wgpu::BindGroup,
}

pub struct RainRenderer {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,

    // Pipelines
    scene_pipeline: wgpu::RenderPipeline,
    high_pass_pipeline: wgpu::RenderPipeline,
    blur_pipeline: wgpu::RenderPipeline,
    composite_pipeline: wgpu::RenderPipeline,

    // Static geometry + per-frame instances
    quad_vb: wgpu::Buffer,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
    instance_count: u32,

    // Uniforms
    scene_uniform_buffer: wgpu::Buffer,
    scene_uniform_bind_group: wgpu::BindGroup,
    high_pass_uniforms: wgpu::Buffer,
    blur_h_uniforms: wgpu::Buffer,
    blur_v_uniforms: wgpu::Buffer,
    composite_uniforms: wgpu::Buffer,

    // Bind group layouts kept for per-resize rebuilds
    scene_tex_bgl: wgpu::BindGroupLayout,
    post_bgl: wgpu::BindGroupLayout,
    bloom_bgl: wgpu::BindGroupLayout,

    // Size-dependent state
    targets: Option<FrameTargets>,
    frame_groups: Option<FrameBindGroups>,

    /// None when the configured atlas image failed to load and baking was
    /// disabled: the scene pass is skipped for the whole session, icons and
    /// bloom still run to no visible effect.
    atlas: Option<GlyphAtlas>,
    atlas_sampler: wgpu::Sampler,

    icons: IconCompositor,
    bloom: BloomTuning,
    cell_size: f32,
}

impl RainRenderer {
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        surface_format: wgpu::TextureFormat,
        atlas: Option<GlyphAtlas>,
        cell_size: f32,
        bloom: BloomTuning,
        icon_metrics: IconMetrics,
    ) -> Self {
        // --- Scene uniforms ---
        let scene_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("scene_uniforms"),
            size: std::mem::size_of::<SceneUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let scene_uniform_bgl =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("scene_uniform_bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let scene_uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene_uniform_bg"),
            layout: &scene_uniform_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: scene_uniform_buffer.as_entire_binding(),
            }],
        });

        // --- Scene texture bindings: atlas + sampler + icon texture ---
        let scene_tex_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene_tex_bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
            ],
        });

        // --- Scene pipeline ---
        let scene_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(SCENE_SHADER.into()),
        });

        let scene_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("scene_pipeline_layout"),
                bind_group_layouts: &[&scene_uniform_bgl, &scene_tex_bgl],
                push_constant_ranges: &[],
            });

        let scene_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("scene_pipeline"),
            layout: Some(&scene_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &scene_shader,
                entry_point: Some("vs_main"),
                buffers: &[QuadVertex::LAYOUT, CELL_INSTANCE_LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &scene_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: TARGET_FORMAT,
                    blend: Some(OVERLAY_BLEND),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        // --- Post-process pipelines ---
        let post_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("post_shader"),
            source: wgpu::ShaderSource::Wgsl(POST_SHADER.into()),
        });

        let post_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("post_bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let bloom_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("bloom_bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            }],
        });

        let post_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("post_pipeline_layout"),
            bind_group_layouts: &[&post_bgl],
            push_constant_ranges: &[],
        });
        let composite_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("composite_pipeline_layout"),
            bind_group_layouts: &[&post_bgl, &bloom_bgl],
            push_constant_ranges: &[],
        });

        let post_pipeline = |label: &str,
                             layout: &wgpu::PipelineLayout,
                             entry: &'static str,
                             format: wgpu::TextureFormat| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(layout),
                vertex: wgpu::VertexState {
                    module: &post_shader,
                    entry_point: Some("vs_fullscreen"),
                    buffers: &[],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &post_shader,
                    entry_point: Some(entry),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleStrip,
                    ..Default::default()
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        let high_pass_pipeline =
            post_pipeline("high_pass_pipeline", &post_layout, "fs_high_pass", TARGET_FORMAT);
        let blur_pipeline = post_pipeline("blur_pipeline", &post_layout, "fs_blur", TARGET_FORMAT);
        let composite_pipeline = post_pipeline(
            "composite_pipeline",
            &composite_layout,
            "fs_composite",
            surface_format,
        );

        // --- Static quad + instance buffer ---
        let quad_vb = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("unit_quad_vb"),
            size: std::mem::size_of_val(&UNIT_QUAD) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        queue.write_buffer(&quad_vb, 0, bytemuck::cast_slice(&UNIT_QUAD));

        let instance_capacity = 64 * 1024;
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("cell_instances"),
            size: instance_capacity as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // --- Post uniform buffers ---
        let post_uniform = |label: &str| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: std::mem::size_of::<PostUniforms>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };
        let high_pass_uniforms = post_uniform("high_pass_uniforms");
        let blur_h_uniforms = post_uniform("blur_h_uniforms");
        let blur_v_uniforms = post_uniform("blur_v_uniforms");
        let composite_uniforms = post_uniform("composite_uniforms");

        let atlas_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("atlas_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let icons = IconCompositor::new(&device, icon_metrics);

        Self {
            scene_pipeline,
            high_pass_pipeline,
            blur_pipeline,
            composite_pipeline,
            quad_vb,
            instance_buffer,
            instance_capacity,
            instance_count: 0,
            scene_uniform_buffer,
            scene_uniform_bind_group,
            high_pass_uniforms,
            blur_h_uniforms,
            blur_v_uniforms,
            composite_uniforms,
            scene_tex_bgl,
            post_bgl,
            bloom_bgl,
            targets: None,
            frame_groups: None,
            atlas,
            atlas_sampler,
            icons,
            bloom,
            cell_size,
            device,
            queue,
        }
    }

    /// Replace the dock item list and, if targets already exist, lay the row
    /// out for the current surface.
    pub fn set_dock_items(&mut self, items: Vec<DockItem>) {
        self.icons.set_items(&self.device, &self.queue, items);
        if let Some(targets) = &self.targets {
            self.icons.update_layout(
                &self.queue,
                Size::new(targets.width as f32, targets.height as f32),
            );
        }
    }

    /// Reallocate every size-dependent target and rebuild the bind groups
    /// that reference them. Prior targets stay alive until any in-flight GPU
    /// work against them completes; the new set is used from the next encode.
    pub fn resize(&mut self, width: u32, height: u32) {
        let targets = FrameTargets::new(&self.device, width, height);

        let uniforms = SceneUniforms {
            viewport: [targets.width as f32, targets.height as f32],
            atlas_grid: [ATLAS_COLS as f32, ATLAS_ROWS as f32],
            cell_size: [self.cell_size, self.cell_size],
            _pad: [0.0; 2],
        };
        self.queue
            .write_buffer(&self.scene_uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let write_post = |buffer: &wgpu::Buffer, texel: [f32; 2], direction: [f32; 2]| {
            let uniforms = PostUniforms {
                texel,
                direction,
                threshold: self.bloom.threshold,
                intensity: self.bloom.intensity,
                _pad: [0.0; 2],
            };
            self.queue.write_buffer(buffer, 0, bytemuck::bytes_of(&uniforms));
        };
        let bloom_texel = [
            1.0 / targets.bloom_width as f32,
            1.0 / targets.bloom_height as f32,
        ];
        write_post(
            &self.high_pass_uniforms,
            [1.0 / targets.width as f32, 1.0 / targets.height as f32],
            [0.0, 0.0],
        );
        write_post(&self.blur_h_uniforms, bloom_texel, [1.0, 0.0]);
        write_post(&self.blur_v_uniforms, bloom_texel, [0.0, 1.0]);
        write_post(&self.composite_uniforms, [0.0, 0.0], [0.0, 0.0]);

        let scene_textures = self.atlas.as_ref().map(|atlas| {
            self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("scene_tex_bg"),
                layout: &self.scene_tex_bgl,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&atlas.texture_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.atlas_sampler),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::TextureView(&targets.icon_view),
                    },
                ],
            })
        });

        let post_group = |label: &str, view: &wgpu::TextureView, uniforms: &wgpu::Buffer| {
            self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &self.post_bgl,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.atlas_sampler),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: uniforms.as_entire_binding(),
                    },
                ],
            })
        };

        let frame_groups = FrameBindGroups {
            scene_textures,
            high_pass: post_group("high_pass_bg", &targets.scene_view, &self.high_pass_uniforms),
            blur_h: post_group("blur_h_bg", &targets.bloom_a_view, &self.blur_h_uniforms),
            blur_v: post_group("blur_v_bg", &targets.bloom_b_view, &self.blur_v_uniforms),
            composite: post_group("composite_bg", &targets.scene_view, &self.composite_uniforms),
            composite_bloom: self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("composite_bloom_bg"),
                layout: &self.bloom_bgl,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&targets.bloom_a_view),
                }],
            }),
        };

        self.icons.update_layout(
            &self.queue,
            Size::new(targets.width as f32, targets.height as f32),
        );

        self.targets = Some(targets);
        self.frame_groups = Some(frame_groups);
    }

    /// Upload this frame's instance records, growing the GPU buffer when the
    /// grid outgrew it.
    pub fn upload_instances(&mut self, instances: &[CellInstance]) {
        let bytes: &[u8] = bytemuck::cast_slice(instances);
        if bytes.len() > self.instance_capacity {
            let new_cap = bytes.len().next_power_of_two().max(64 * 1024);
            self.instance_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("cell_instances"),
                size: new_cap as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            self.instance_capacity = new_cap;
        }
        if !bytes.is_empty() {
            self.queue.write_buffer(&self.instance_buffer, 0, bytes);
        }
        self.instance_count = instances.len() as u32;
    }

    /// Encode the five passes for one frame into `encoder`, ending in the
    /// surface view. No-op until the first resize has allocated targets.
    pub fn render(&mut self, encoder: &mut wgpu::CommandEncoder, surface_view: &wgpu::TextureView) {
        let (Some(targets), Some(groups)) = (&self.targets, &self.frame_groups) else {
            return;
        };

        // Pass 1: dock icons into the icon texture. Must be encoded before
        // the scene pass samples it.
        self.icons.render(encoder, &targets.icon_view);

        // Pass 2: instanced glyph scene. Skipped (clear only) without an
        // atlas, leaving the whole chain transparent.
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &targets.scene_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let Some(scene_textures) = &groups.scene_textures {
                if self.instance_count > 0 {
                    pass.set_pipeline(&self.scene_pipeline);
                    pass.set_bind_group(0, &self.scene_uniform_bind_group, &[]);
                    pass.set_bind_group(1, scene_textures, &[]);
                    pass.set_vertex_buffer(0, self.quad_vb.slice(..));
                    pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
                    pass.draw(0..4, 0..self.instance_count);
                }
            }
        }

        let fullscreen = |encoder: &mut wgpu::CommandEncoder,
                          label: &str,
                          view: &wgpu::TextureView,
                          pipeline: &wgpu::RenderPipeline,
                          group0: &wgpu::BindGroup,
                          group1: Option<&wgpu::BindGroup>| {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(label),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, group0, &[]);
            if let Some(group1) = group1 {
                pass.set_bind_group(1, group1, &[]);
            }
            pass.draw(0..4, 0..1);
        };

        // Pass 3: bright-pixel extraction into the half-res bloom target.
        fullscreen(
            encoder,
            "high_pass",
            &targets.bloom_a_view,
            &self.high_pass_pipeline,
            &groups.high_pass,
            None,
        );
        // Pass 4: horizontal blur, bloom A → bloom B.
        fullscreen(
            encoder,
            "blur_h",
            &targets.bloom_b_view,
            &self.blur_pipeline,
            &groups.blur_h,
            None,
        );
        // Pass 5: vertical blur back into bloom A.
        fullscreen(
            encoder,
            "blur_v",
            &targets.bloom_a_view,
            &self.blur_pipeline,
            &groups.blur_v,
            None,
        );
        // Pass 6: scene + blurred highlights onto the surface.
        fullscreen(
            encoder,
            "composite",
            surface_view,
            &self.composite_pipeline,
            &groups.composite,
            Some(&groups.composite_bloom),
        );
    }
}
