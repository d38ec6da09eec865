// Glyph atlas: an 8×8 grid of rain glyphs in one RGBA texture.
// Loads a pre-baked PNG when one is configured; otherwise bakes the grid at
// startup by rasterizing a fixed character set with cosmic-text.

use std::path::Path;

use cosmic_text::{
    Attrs, Buffer as TextBuffer, Family, FontSystem, Metrics, Shaping, SwashCache,
};
use thiserror::Error;

pub const ATLAS_COLS: u32 = 8;
pub const ATLAS_ROWS: u32 = 8;

/// Pixel size of one glyph cell in the baked atlas (512×512 total).
const BAKE_CELL: u32 = 64;

/// The 64 characters baked into the atlas, in grid order.
const GLYPH_SET: &str = "abcdefghijklmnopqrstuvwxyz0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ<>";

#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("failed to read atlas image: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode atlas image: {0}")]
    Decode(#[from] image::ImageError),
}

pub struct GlyphAtlas {
    pub texture: wgpu::Texture,
    pub texture_view: wgpu::TextureView,
    pub cols: u32,
    pub rows: u32,
}

impl GlyphAtlas {
    /// Load a pre-baked atlas image. The file is assumed to hold the 8×8
    /// glyph grid; a missing or corrupt file is a structural failure and the
    /// caller disables the scene pass for the session.
    pub fn load(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &Path,
    ) -> Result<Self, AtlasError> {
        let img = image::open(path)?.to_rgba8();
        log::info!(
            "loaded glyph atlas {} ({}x{})",
            path.display(),
            img.width(),
            img.height()
        );
        Ok(Self::from_rgba(device, queue, img.width(), img.height(), &img))
    }

    /// Rasterize the built-in character set into the 8×8 grid. Glyphs that
    /// fail to rasterize leave their cell blank; the bake itself never fails.
    pub fn bake(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let size = BAKE_CELL * ATLAS_COLS;
        let mut pixels = vec![0u8; (size * size * 4) as usize];

        let mut font_system = FontSystem::new();
        let mut swash_cache = SwashCache::new();
        let font_size = BAKE_CELL as f32 * 0.75;
        let metrics = Metrics::new(font_size, BAKE_CELL as f32);

        for (i, ch) in GLYPH_SET.chars().enumerate() {
            let cell_x = (i as u32 % ATLAS_COLS) * BAKE_CELL;
            let cell_y = (i as u32 / ATLAS_COLS) * BAKE_CELL;
            if !rasterize_into(
                &mut font_system,
                &mut swash_cache,
                metrics,
                ch,
                &mut pixels,
                size,
                cell_x,
                cell_y,
            ) {
                log::warn!("no rasterization for glyph {:?}, cell left blank", ch);
            }
        }

        Self::from_rgba(device, queue, size, size, &pixels)
    }

    fn from_rgba(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("glyph_atlas"),
            size: wgpu::Extent3d {
                width,
                height,
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
            rgba,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        let texture_view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            texture_view,
            cols: ATLAS_COLS,
            rows: ATLAS_ROWS,
        }
    }
}

/// Rasterize one character and blit it, white with the coverage in alpha,
/// into its atlas cell. Returns false when the font produced no image.
#[allow(clippy::too_many_arguments)]
fn rasterize_into(
    font_system: &mut FontSystem,
    swash_cache: &mut SwashCache,
    metrics: Metrics,
    ch: char,
    pixels: &mut [u8],
    atlas_size: u32,
    cell_x: u32,
    cell_y: u32,
) -> bool {
    let mut buffer = TextBuffer::new(font_system, metrics);
    buffer.set_text(
        font_system,
        &ch.to_string(),
        Attrs::new().family(Family::Monospace),
        Shaping::Advanced,
    );
    buffer.shape_until_scroll(font_system, false);

    let Some(run) = buffer.layout_runs().next() else {
        return false;
    };
    let Some(glyph) = run.glyphs.first() else {
        return false;
    };
    let physical = glyph.physical((0.0, 0.0), 1.0);

    let Some(image) = swash_cache.get_image(font_system, physical.cache_key) else {
        return false;
    };

    let width = image.placement.width;
    let height = image.placement.height;
    if width == 0 || height == 0 {
        return false;
    }

    let alpha: Vec<u8> = match image.content {
        cosmic_text::SwashContent::Mask => image.data.clone(),
        cosmic_text::SwashContent::Color => image
            .data
            .chunks(4)
            .map(|c| c.get(3).copied().unwrap_or(255))
            .collect(),
        cosmic_text::SwashContent::SubpixelMask => image
            .data
            .chunks(3)
            .map(|c| {
                let r = c.first().copied().unwrap_or(0) as u16;
                let g = c.get(1).copied().unwrap_or(0) as u16;
                let b = c.get(2).copied().unwrap_or(0) as u16;
                ((r + g + b) / 3) as u8
            })
            .collect(),
    };

    // Center horizontally; hang from an 80% baseline like any terminal cell.
    let origin_x = cell_x as i64 + (BAKE_CELL as i64 - width as i64) / 2;
    let baseline = cell_y as i64 + (BAKE_CELL as f32 * 0.8) as i64;
    let origin_y = baseline - image.placement.top as i64;

    for row in 0..height as i64 {
        for col in 0..width as i64 {
            let px = origin_x + col;
            let py = origin_y + row;
            // Clip to the cell so an oversized glyph can't bleed into its
            // neighbours.
            if px < cell_x as i64
                || px >= (cell_x + BAKE_CELL) as i64
                || py < cell_y as i64
                || py >= (cell_y + BAKE_CELL) as i64
            {
                continue;
            }
            let a = alpha[(row * width as i64 + col) as usize];
            let idx = ((py as u32 * atlas_size + px as u32) * 4) as usize;
            pixels[idx] = 255;
            pixels[idx + 1] = 255;
            pixels[idx + 2] = 255;
            pixels[idx + 3] = a;
        }
    }

    true
}
