// WGSL shader source for the scene, icon, and post-process pipelines.

/// Instanced glyph pass: one quad per grid cell, sampling the atlas cell
/// selected by the instance's glyph index, with the dock-icon texture
/// blended over the glyph output at the fragment's screen position.
pub const SCENE_SHADER: &str = r#"
struct Uniforms {
    viewport: vec2<f32>,
    atlas_grid: vec2<f32>,
    cell_size: vec2<f32>,
    _pad: vec2<f32>,
};

struct VertexInput {
    @location(0) corner: vec2<f32>,
    @location(1) corner_uv: vec2<f32>,
};

struct InstanceInput {
    @location(2) cell_origin: vec2<f32>,
    @location(3) glyph_index: u32,
    @location(4) brightness: f32,
    @location(5) is_head: f32,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) screen_uv: vec2<f32>,
    @location(2) brightness: f32,
    @location(3) is_head: f32,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

@group(1) @binding(0)
var atlas_texture: texture_2d<f32>;
@group(1) @binding(1)
var atlas_sampler: sampler;
@group(1) @binding(2)
var icon_texture: texture_2d<f32>;

@vertex
fn vs_main(v: VertexInput, inst: InstanceInput) -> VertexOutput {
    var out: VertexOutput;
    let pixel = inst.cell_origin + v.corner * uniforms.cell_size;
    let ndc_x = (pixel.x / uniforms.viewport.x) * 2.0 - 1.0;
    let ndc_y = 1.0 - (pixel.y / uniforms.viewport.y) * 2.0;
    out.clip_position = vec4<f32>(ndc_x, ndc_y, 0.0, 1.0);

    let cols = u32(uniforms.atlas_grid.x);
    let cell = vec2<f32>(f32(inst.glyph_index % cols), f32(inst.glyph_index / cols));
    out.uv = (cell + v.corner_uv) / uniforms.atlas_grid;
    out.screen_uv = pixel / uniforms.viewport;
    out.brightness = inst.brightness;
    out.is_head = inst.is_head;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let glyph = textureSample(atlas_texture, atlas_sampler, in.uv).a;
    let body = vec3<f32>(0.13, 0.85, 0.33) * in.brightness;
    let head = vec3<f32>(0.85, 1.0, 0.9);
    let ink = mix(body, head, step(0.5, in.is_head));
    let ink_a = glyph * in.brightness;

    // Icons sit in front of the rain wherever they are opaque.
    let icon = textureSample(icon_texture, atlas_sampler, in.screen_uv);
    let rgb = mix(ink, icon.rgb, icon.a);
    let a = icon.a + ink_a * (1.0 - icon.a);
    return vec4<f32>(rgb, a);
}
"#;

/// Dock icon pass: a 4-vertex strip per icon, generated from the vertex
/// index and a per-icon rect uniform.
pub const ICON_SHADER: &str = r#"
struct IconUniforms {
    rect: vec4<f32>,
    viewport: vec2<f32>,
    _pad: vec2<f32>,
};

@group(0) @binding(0)
var<uniform> icon: IconUniforms;
@group(0) @binding(1)
var icon_texture: texture_2d<f32>;
@group(0) @binding(2)
var icon_sampler: sampler;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> VertexOutput {
    let corner = vec2<f32>(f32(index % 2u), f32(index / 2u));
    let pixel = icon.rect.xy + corner * icon.rect.zw;
    var out: VertexOutput;
    let ndc_x = (pixel.x / icon.viewport.x) * 2.0 - 1.0;
    let ndc_y = 1.0 - (pixel.y / icon.viewport.y) * 2.0;
    out.clip_position = vec4<f32>(ndc_x, ndc_y, 0.0, 1.0);
    out.uv = corner;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(icon_texture, icon_sampler, in.uv);
}
"#;

/// Post-process chain: shared fullscreen vertex stage plus the high-pass,
/// separable blur, and composite fragment stages. The blur direction and
/// the high-pass threshold ride in the same small uniform block.
pub const POST_SHADER: &str = r#"
struct PostUniforms {
    texel: vec2<f32>,
    direction: vec2<f32>,
    threshold: f32,
    intensity: f32,
    _pad: vec2<f32>,
};

@group(0) @binding(0)
var src_texture: texture_2d<f32>;
@group(0) @binding(1)
var src_sampler: sampler;
@group(0) @binding(2)
var<uniform> post: PostUniforms;

@group(1) @binding(0)
var bloom_texture: texture_2d<f32>;

struct FullscreenOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_fullscreen(@builtin(vertex_index) index: u32) -> FullscreenOutput {
    var out: FullscreenOutput;
    let corner = vec2<f32>(f32(index % 2u), f32(index / 2u));
    out.clip_position = vec4<f32>(corner * 2.0 - 1.0, 0.0, 1.0);
    out.uv = vec2<f32>(corner.x, 1.0 - corner.y);
    return out;
}

@fragment
fn fs_high_pass(in: FullscreenOutput) -> @location(0) vec4<f32> {
    let c = textureSample(src_texture, src_sampler, in.uv);
    let luma = dot(c.rgb, vec3<f32>(0.2126, 0.7152, 0.0722));
    let keep = step(post.threshold, luma);
    return vec4<f32>(c.rgb * keep, c.a * keep);
}

@fragment
fn fs_blur(in: FullscreenOutput) -> @location(0) vec4<f32> {
    var offsets = array<f32, 4>(1.0, 2.0, 3.0, 4.0);
    var weights = array<f32, 4>(0.1945946, 0.1216216, 0.054054, 0.016216);

    var color = textureSample(src_texture, src_sampler, in.uv) * 0.227027;
    for (var i = 0; i < 4; i = i + 1) {
        let offset = post.direction * post.texel * offsets[i];
        color += textureSample(src_texture, src_sampler, in.uv + offset) * weights[i];
        color += textureSample(src_texture, src_sampler, in.uv - offset) * weights[i];
    }
    return color;
}

@fragment
fn fs_composite(in: FullscreenOutput) -> @location(0) vec4<f32> {
    let scene = textureSample(src_texture, src_sampler, in.uv);
    let bloom = textureSample(bloom_texture, src_sampler, in.uv);
    // Bloom only adds light; the scene alpha passes through untouched so the
    // overlay stays transparent where nothing was drawn.
    return vec4<f32>(scene.rgb + bloom.rgb * post.intensity, scene.a);
}
"#;
