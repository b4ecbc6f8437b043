/// WGSL for every scene pass. Entry point names match
/// `VertexStage::entry_point` and `PixelStage::entry_point`.
pub const SCENE_SHADER: &str = r#"
const PI: f32 = 3.14159265;

struct Params {
    world: mat4x4<f32>,
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    light_dir: vec4<f32>,
    light_color: vec4<f32>,
    tint: vec4<f32>,
    time: f32,
};

@group(0) @binding(0)
var<uniform> params: Params;

@group(1) @binding(0)
var tex: texture_2d<f32>;
@group(1) @binding(1)
var tex_sampler: sampler;

struct VertexInput {
    @location(0) position: vec4<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
    @location(3) local_position: vec3<f32>,
};

fn transform(vertex: VertexInput, local: vec4<f32>) -> VertexOutput {
    let world_pos = params.world * local;
    var out: VertexOutput;
    out.clip_position = params.projection * params.view * world_pos;
    out.world_position = world_pos.xyz;
    out.world_normal = normalize((params.world * vec4<f32>(vertex.normal, 0.0)).xyz);
    out.uv = vertex.uv;
    out.local_position = vertex.position.xyz;
    return out;
}

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    return transform(vertex, vertex.position);
}

@vertex
fn vs_wave(vertex: VertexInput) -> VertexOutput {
    var local = vertex.position;
    local.y += sin(local.x * 4.0 + params.time * 2.0) * 0.1;
    return transform(vertex, local);
}

@vertex
fn vs_skybox(vertex: VertexInput) -> VertexOutput {
    var out = transform(vertex, vertex.position);
    out.clip_position = out.clip_position.xyww;
    return out;
}

fn diffuse(normal: vec3<f32>) -> f32 {
    return clamp(dot(-normalize(params.light_dir.xyz), normalize(normal)), 0.0, 1.0);
}

@fragment
fn fs_lit(in: VertexOutput) -> @location(0) vec4<f32> {
    let base = textureSample(tex, tex_sampler, in.uv);
    let light = (0.25 + diffuse(in.world_normal)) * params.light_color.rgb;
    return vec4<f32>(base.rgb * light * params.tint.rgb, base.a);
}

@fragment
fn fs_specular(in: VertexOutput) -> @location(0) vec4<f32> {
    let rotation = mat3x3<f32>(params.view[0].xyz, params.view[1].xyz, params.view[2].xyz);
    let eye = -(transpose(rotation) * params.view[3].xyz);
    let n = normalize(in.world_normal);
    let to_light = -normalize(params.light_dir.xyz);
    let half_vector = normalize(to_light + normalize(eye - in.world_position));
    let specular = pow(max(dot(n, half_vector), 0.0), 32.0);
    let color = params.tint.rgb * (0.2 + diffuse(n)) * params.light_color.rgb
        + specular * params.light_color.rgb;
    return vec4<f32>(color, params.tint.a);
}

@fragment
fn fs_solid_texture(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(tex, tex_sampler, in.uv) * params.tint;
}

@fragment
fn fs_skybox(in: VertexOutput) -> @location(0) vec4<f32> {
    let dir = normalize(in.local_position);
    let uv = vec2<f32>(atan2(dir.z, dir.x) / (2.0 * PI) + 0.5, 0.5 - asin(dir.y) / PI);
    return textureSample(tex, tex_sampler, uv) * params.tint;
}

@fragment
fn fs_crosshair(in: VertexOutput) -> @location(0) vec4<f32> {
    let color = textureSample(tex, tex_sampler, in.uv);
    if color.a < 0.1 {
        discard;
    }
    return color * params.tint;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use gallery_render::{PixelStage, VertexStage};

    #[test]
    fn every_entry_point_is_defined() {
        let vertex = [VertexStage::Standard, VertexStage::Wave, VertexStage::Skybox];
        let pixel = [
            PixelStage::Lit,
            PixelStage::Specular,
            PixelStage::SolidTexture,
            PixelStage::Skybox,
            PixelStage::Crosshair,
        ];
        for name in vertex
            .iter()
            .map(|v| v.entry_point())
            .chain(pixel.iter().map(|p| p.entry_point()))
        {
            assert!(SCENE_SHADER.contains(&format!("fn {name}(")), "missing {name}");
        }
    }
}
