//! GLSL sources for the point pipeline.
//!
//! Both stages share the `FieldParams` uniform block, which must match
//! `FieldUniforms` in the gpu module byte for byte. Vertex attribute locations follow
//! the buffer order in [`crate::field::FieldBuffers`].
//!
//! ```text
//!   location 0  position      vec3
//!   location 1  aCoordinates  vec3   (i, j, 0)
//!   location 2  aSpeed        float
//!   location 3  aOffset       float
//!   location 4  aDirection    float
//!   location 5  aPress        float
//!   set 1       t1 = 0, t2 = 1, mask = 2, texSampler = 3
//! ```

use std::borrow::Cow;
use std::path::Path;

use anyhow::{Context, Result};
use wgpu::naga::ShaderStage;

pub const DEFAULT_VERTEX_SHADER: &str = r"#version 450
layout(location = 0) in vec3 position;
layout(location = 1) in vec3 aCoordinates;
layout(location = 2) in float aSpeed;
layout(location = 3) in float aOffset;
layout(location = 4) in float aDirection;
layout(location = 5) in float aPress;

layout(std140, set = 0, binding = 0) uniform FieldParams {
    mat4 viewProj;
    vec2 mouse;
    vec2 grid;
    float progress;
    float mousePressed;
    float transition;
    float move;
    float time;
} ubo;

layout(location = 0) out vec2 vCoordinates;
layout(location = 1) out float vDepth;

void main() {
    vec3 pos = position;
    pos.x += sin(ubo.move * aSpeed) * 3.0;
    pos.y += sin(ubo.move * aSpeed) * 3.0;
    pos.z = mod(position.z + ubo.move * 200.0 * aSpeed + aOffset, 2000.0) - 1000.0;

    vec3 stable = position;
    float dist = distance(stable.xy, ubo.mouse);
    float area = 1.0 - smoothstep(0.0, 300.0, dist);
    stable.x += 50.0 * sin(0.1 * ubo.time * aPress) * aDirection * area * ubo.mousePressed;
    stable.y += 50.0 * sin(0.1 * ubo.time * aPress) * aDirection * area * ubo.mousePressed;
    stable.z += 200.0 * cos(0.1 * ubo.time * aPress) * aDirection * area * ubo.mousePressed;

    vec3 displaced = mix(stable, pos, ubo.progress);
    vCoordinates = aCoordinates.xy;
    vDepth = displaced.z;
    gl_Position = ubo.viewProj * vec4(displaced, 1.0);
}
";

pub const DEFAULT_FRAGMENT_SHADER: &str = r"#version 450
layout(location = 0) in vec2 vCoordinates;
layout(location = 1) in float vDepth;
layout(location = 0) out vec4 outColor;

layout(std140, set = 0, binding = 0) uniform FieldParams {
    mat4 viewProj;
    vec2 mouse;
    vec2 grid;
    float progress;
    float mousePressed;
    float transition;
    float move;
    float time;
} ubo;

layout(set = 1, binding = 0) uniform texture2D t1;
layout(set = 1, binding = 1) uniform texture2D t2;
layout(set = 1, binding = 2) uniform texture2D mask;
layout(set = 1, binding = 3) uniform sampler texSampler;

void main() {
    vec2 uv = (vCoordinates + 0.5) / max(ubo.grid, vec2(1.0));
    vec4 from = texture(sampler2D(t1, texSampler), uv);
    vec4 to = texture(sampler2D(t2, texSampler), uv);
    vec4 color = mix(from, to, ubo.transition);
    float shape = texture(sampler2D(mask, texSampler), uv).a;
    float alpha = (1.0 - clamp(abs(vDepth / 900.0), 0.0, 1.0)) * shape * color.a;
    outColor = vec4(color.rgb * alpha, alpha);
}
";

/// Shader text for both stages, built-in or read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSources {
    pub vertex: Cow<'static, str>,
    pub fragment: Cow<'static, str>,
}

impl Default for ShaderSources {
    fn default() -> Self {
        Self {
            vertex: Cow::Borrowed(DEFAULT_VERTEX_SHADER),
            fragment: Cow::Borrowed(DEFAULT_FRAGMENT_SHADER),
        }
    }
}

impl ShaderSources {
    /// Uses the given files where present and the built-in stages otherwise.
    pub fn load(vertex: Option<&Path>, fragment: Option<&Path>) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            vertex: match vertex {
                Some(path) => Cow::Owned(read_shader(path)?),
                None => defaults.vertex,
            },
            fragment: match fragment {
                Some(path) => Cow::Owned(read_shader(path)?),
                None => defaults.fragment,
            },
        })
    }
}

fn read_shader(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read shader at {}", path.display()))
}

pub(crate) fn compile_shader(
    device: &wgpu::Device,
    label: &str,
    source: &str,
    stage: ShaderStage,
) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Owned(source.to_owned()),
            stage,
            defines: &[],
        },
    })
}
