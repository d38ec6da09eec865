// Dock icon compositor: lays the item row out in screen space and draws it
// into the offscreen icon texture, one alpha-blended quad per icon.

use bytemuck::{Pod, Zeroable};
use glyphfall_core::{DockItem, Rect, Size};

use crate::shaders::ICON_SHADER;
use crate::targets::TARGET_FORMAT;
use crate::OVERLAY_BLEND;

// ──────────────────────────────────────────────
// Layout
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct IconMetrics {
    /// Side length of a regular (non-divider) icon square.
    pub base_size: f32,
    pub divider_width: f32,
    /// Gap between neighbouring items; none after the last.
    pub spacing: f32,
}

impl Default for IconMetrics {
    fn default() -> Self {
        Self {
            base_size: 64.0,
            divider_width: 2.0,
            spacing: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IconSlot {
    pub rect: Rect,
    /// False for dividers, which reserve space but never carry a texture.
    pub textured: bool,
}

/// Total row width for `items`: squares for regular items, thin bars for
/// dividers, fixed spacing between neighbours. Zero for an empty list.
pub fn row_width(items: &[DockItem], metrics: &IconMetrics) -> f32 {
    if items.is_empty() {
        return 0.0;
    }
    let mut width = 0.0;
    for item in items {
        width += if item.is_divider() {
            metrics.divider_width
        } else {
            metrics.base_size
        };
    }
    width + (items.len() - 1) as f32 * metrics.spacing
}

/// Screen-space slots for the item row, centered on both axes of the target
/// surface. Dividers get a thin bar at 80% of the icon height.
pub fn layout_items(items: &[DockItem], surface: Size, metrics: &IconMetrics) -> Vec<IconSlot> {
    let total = row_width(items, metrics);
    let mut x = (surface.width - total) / 2.0;
    let mut slots = Vec::with_capacity(items.len());

    for item in items {
        let (w, h) = if item.is_divider() {
            (metrics.divider_width, metrics.base_size * 0.8)
        } else {
            (metrics.base_size, metrics.base_size)
        };
        let y = (surface.height - h) / 2.0;
        slots.push(IconSlot {
            rect: Rect::new(x, y, w, h),
            textured: !item.is_divider(),
        });
        x += w + metrics.spacing;
    }

    slots
}

// ──────────────────────────────────────────────
// GPU compositor
// ──────────────────────────────────────────────

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct IconUniforms {
    rect: [f32; 4],
    viewport: [f32; 2],
    _pad: [f32; 2],
}

/// GPU-side state for one textured item. Dividers and items whose bitmap
/// failed to decode have no entry; they only occupy layout space.
struct IconEntry {
    uniform: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

pub struct IconCompositor {
    metrics: IconMetrics,
    items: Vec<DockItem>,
    entries: Vec<Option<IconEntry>>,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
}

impl IconCompositor {
    pub fn new(device: &wgpu::Device, metrics: IconMetrics) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("icon_shader"),
            source: wgpu::ShaderSource::Wgsl(ICON_SHADER.into()),
        });

        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("icon_bgl"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("icon_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("icon_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
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

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("icon_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            metrics,
            items: Vec::new(),
            entries: Vec::new(),
            pipeline,
            bind_group_layout,
            sampler,
        }
    }

    /// Replace the item list wholesale; the previous session's textures are
    /// dropped. Items without a usable bitmap keep their layout slot.
    pub fn set_items(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, items: Vec<DockItem>) {
        self.entries = items
            .iter()
            .map(|item| self.create_entry(device, queue, item))
            .collect();
        self.items = items;
    }

    fn create_entry(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        item: &DockItem,
    ) -> Option<IconEntry> {
        if item.is_divider() {
            return None;
        }
        let bitmap = item.icon.as_ref()?;
        if bitmap.rgba.len() != (bitmap.width * bitmap.height * 4) as usize {
            log::warn!(
                "icon bitmap for {:?} has inconsistent dimensions, skipping",
                item.label
            );
            return None;
        }

        // Rows upload top-first, matching the top-left UV convention of the
        // scene shader; a mismatch here renders every icon upside down.
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("dock_icon"),
            size: wgpu::Extent3d {
                width: bitmap.width,
                height: bitmap.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &bitmap.rgba,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(bitmap.width * 4),
                rows_per_image: Some(bitmap.height),
            },
            wgpu::Extent3d {
                width: bitmap.width,
                height: bitmap.height,
                depth_or_array_layers: 1,
            },
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let uniform = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("icon_uniforms"),
            size: std::mem::size_of::<IconUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("icon_bg"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        Some(IconEntry { uniform, bind_group })
    }

    /// Recompute the centered row for the current surface and push each
    /// icon's rect uniform. Call after `set_items` and on every resize.
    pub fn update_layout(&self, queue: &wgpu::Queue, surface: Size) {
        let slots = layout_items(&self.items, surface, &self.metrics);
        for (slot, entry) in slots.iter().zip(&self.entries) {
            if let Some(entry) = entry {
                let uniforms = IconUniforms {
                    rect: [slot.rect.x, slot.rect.y, slot.rect.width, slot.rect.height],
                    viewport: [surface.width, surface.height],
                    _pad: [0.0; 2],
                };
                queue.write_buffer(&entry.uniform, 0, bytemuck::bytes_of(&uniforms));
            }
        }
    }

    /// Draw every textured item into the icon texture. The pass always runs
    /// so the texture is a valid (possibly fully transparent) sampling
    /// source for the scene pass.
    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, icon_view: &wgpu::TextureView) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("icon_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: icon_view,
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

        pass.set_pipeline(&self.pipeline);
        for entry in self.entries.iter().flatten() {
            pass.set_bind_group(0, &entry.bind_group, &[]);
            pass.draw(0..4, 0..1);
        }
    }
}

// ──────────────────────────────────────────────
// Layout tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use glyphfall_core::DockItemKind;

    const METRICS: IconMetrics = IconMetrics {
        base_size: 64.0,
        divider_width: 2.0,
        spacing: 10.0,
    };

    fn app(label: &str) -> DockItem {
        DockItem::new(
            DockItemKind::PinnedApp {
                app_id: label.to_string(),
                name: label.to_string(),
                path: None,
            },
            None,
            label,
        )
    }

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn test_empty_list_has_zero_width() {
        assert_eq!(row_width(&[], &METRICS), 0.0);
        assert!(layout_items(&[], Size::new(800.0, 600.0), &METRICS).is_empty());
    }

    #[test]
    fn test_row_width_formula() {
        // 3 apps + 2 dividers: 3*64 + 2*2 + 4*10 = 236.
        let items = vec![
            app("a"),
            DockItem::divider(),
            app("b"),
            DockItem::divider(),
            app("c"),
        ];
        assert!(approx_eq(row_width(&items, &METRICS), 236.0));
    }

    #[test]
    fn test_row_is_centered() {
        let items = vec![app("a"), app("b")];
        // Width: 64*2 + 10 = 138; start x = (800 - 138) / 2 = 331.
        let slots = layout_items(&items, Size::new(800.0, 600.0), &METRICS);
        assert!(approx_eq(slots[0].rect.x, 331.0));
        assert!(approx_eq(slots[1].rect.x, 331.0 + 64.0 + 10.0));
        // Squares center vertically.
        assert!(approx_eq(slots[0].rect.y, (600.0 - 64.0) / 2.0));
    }

    #[test]
    fn test_divider_dimensions() {
        let items = vec![app("a"), DockItem::divider(), app("b")];
        let slots = layout_items(&items, Size::new(800.0, 600.0), &METRICS);
        let divider = &slots[1];
        assert!(!divider.textured);
        assert!(approx_eq(divider.rect.width, 2.0));
        assert!(approx_eq(divider.rect.height, 64.0 * 0.8));
        // The shorter divider still centers on the same axis.
        assert!(approx_eq(divider.rect.y, (600.0 - 51.2) / 2.0));
    }

    #[test]
    fn test_items_without_icons_keep_their_slot() {
        // Layout is independent of whether an icon bitmap decoded; a failed
        // item reserves space and the next item is not shifted.
        let with_gap = vec![app("a"), app("broken"), app("c")];
        let slots = layout_items(&with_gap, Size::new(800.0, 600.0), &METRICS);
        assert_eq!(slots.len(), 3);
        assert!(approx_eq(
            slots[2].rect.x - slots[1].rect.x,
            64.0 + 10.0
        ));
    }
}
