/// WGSL shader for the textured grid planes.
///
/// `resolution` is the decoded image size, `size` the plane size; together
/// they give cover-fit UVs. `diff` bends the plane and splits color channels
/// while the grid is moving.
pub const PLANE_SHADER: &str = r#"
struct Camera {
    view_proj: mat4x4<f32>,
};

struct PlaneUniforms {
    offset: vec2<f32>,
    scale: vec2<f32>,
    resolution: vec2<f32>,
    size: vec2<f32>,
    diff: f32,
    _pad0: f32,
    _pad1: vec2<f32>,
};

@group(0) @binding(0)
var<uniform> camera: Camera;

@group(1) @binding(0)
var<uniform> plane: PlaneUniforms;
@group(1) @binding(1)
var t_image: texture_2d<f32>;
@group(1) @binding(2)
var s_image: sampler;

struct VertexInput {
    @location(0) position: vec2<f32>,
    @location(1) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

const PI: f32 = 3.14159265;

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    var local = vertex.position * plane.scale;
    local.y = local.y + sin(vertex.uv.x * PI) * plane.diff * plane.scale.y * 0.5;
    let world = vec4<f32>(local + plane.offset, 0.0, 1.0);

    var out: VertexOutput;
    out.clip_position = camera.view_proj * world;
    out.uv = vertex.uv;
    return out;
}

fn cover_uv(uv: vec2<f32>) -> vec2<f32> {
    let plane_aspect = plane.size.x / plane.size.y;
    let image_aspect = plane.resolution.x / plane.resolution.y;
    let ratio = vec2<f32>(
        min(plane_aspect / image_aspect, 1.0),
        min(image_aspect / plane_aspect, 1.0),
    );
    return uv * ratio + (vec2<f32>(1.0, 1.0) - ratio) * 0.5;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let uv = cover_uv(in.uv);
    let shift = vec2<f32>(plane.diff * 0.25, 0.0);
    let r = textureSample(t_image, s_image, uv + shift).r;
    let g = textureSample(t_image, s_image, uv).g;
    let b = textureSample(t_image, s_image, uv - shift).b;
    return vec4<f32>(r, g, b, 1.0);
}
"#;
