// Offscreen render targets, reallocated as a set whenever the surface
// resizes and overwritten in place every frame.

/// Format shared by every offscreen target. Alpha is meaningful throughout:
/// the desktop shows through wherever the final composite leaves it at zero.
pub const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

pub struct FrameTargets {
    pub width: u32,
    pub height: u32,
    pub bloom_width: u32,
    pub bloom_height: u32,

    pub scene: wgpu::Texture,
    pub scene_view: wgpu::TextureView,
    pub icon: wgpu::Texture,
    pub icon_view: wgpu::TextureView,
    // Bloom ping-pong pair at half resolution: quarters the blur's pixel
    // cost, and bloom is soft enough that the difference never shows.
    pub bloom_a: wgpu::Texture,
    pub bloom_a_view: wgpu::TextureView,
    pub bloom_b: wgpu::Texture,
    pub bloom_b_view: wgpu::TextureView,
}

impl FrameTargets {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let make = |label: &str, w: u32, h: u32| {
            let texture = device.create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: w,
                    height: h,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: TARGET_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                    | wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            });
            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            (texture, view)
        };

        let width = width.max(1);
        let height = height.max(1);
        let bloom_width = (width / 2).max(1);
        let bloom_height = (height / 2).max(1);

        let (scene, scene_view) = make("scene_target", width, height);
        let (icon, icon_view) = make("icon_target", width, height);
        let (bloom_a, bloom_a_view) = make("bloom_a", bloom_width, bloom_height);
        let (bloom_b, bloom_b_view) = make("bloom_b", bloom_width, bloom_height);

        Self {
            width,
            height,
            bloom_width,
            bloom_height,
            scene,
            scene_view,
            icon,
            icon_view,
            bloom_a,
            bloom_a_view,
            bloom_b,
            bloom_b_view,
        }
    }
}
