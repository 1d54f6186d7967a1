//! Source preparation and front-end validation for canvas shaders.
//!
//! Scene fragment shaders are written ShaderToy style: they define
//! `mainImage(out vec4, in vec2)` and read the canvas uniforms by name. Vertex
//! shaders may use WebGL-1 `attribute` declarations. Both are rewritten into
//! Vulkan-flavoured GLSL 450 before compilation.

use wgpu::naga::front::glsl::{Frontend, Options};
use wgpu::naga::valid::{Capabilities, ValidationFlags, Validator};
use wgpu::naga::ShaderStage;

use crate::error::ShaderStageKind;

/// Uniform names the canvas supplies; user declarations of them are dropped.
pub const CANVAS_UNIFORMS: [&str; 6] = [
    "iResolution",
    "iTimeDelta",
    "iTime",
    "uIntro",
    "uDayProgress",
    "uScrollOffset",
];

pub fn naga_stage(stage: ShaderStageKind) -> ShaderStage {
    match stage {
        ShaderStageKind::Vertex => ShaderStage::Vertex,
        ShaderStageKind::Fragment => ShaderStage::Fragment,
    }
}

pub fn prepare(stage: ShaderStageKind, source: &str) -> String {
    match stage {
        ShaderStageKind::Vertex => prepare_vertex(source),
        ShaderStageKind::Fragment => prepare_fragment(source),
    }
}

/// Parses and validates prepared GLSL, returning a readable log on failure.
pub fn validate(stage: ShaderStageKind, prepared: &str) -> Result<(), String> {
    let mut frontend = Frontend::default();
    let module = frontend
        .parse(&Options::from(naga_stage(stage)), prepared)
        .map_err(|err| err.emit_to_string(prepared))?;
    Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|err| err.into_inner().to_string())?;
    Ok(())
}

/// Produces a self-contained GLSL fragment shader from ShaderToy-style code.
///
/// 1. Drop `#version`, `precision` and canvas uniform declarations.
/// 2. Prepend [`FRAGMENT_HEADER`] with the uniform block and name aliases.
/// 3. Append [`FRAGMENT_FOOTER`], which flips `gl_FragCoord` to a bottom-left
///    origin and calls `mainImage`.
pub fn prepare_fragment(source: &str) -> String {
    let mut body = String::with_capacity(source.len());
    for line in source.lines() {
        if is_stripped(line) {
            continue;
        }
        body.push_str(line);
        body.push('\n');
    }
    format!("{FRAGMENT_HEADER}\n#line 1\n{body}{FRAGMENT_FOOTER}")
}

/// Rewrites WebGL-1 vertex code: `attribute` declarations become numbered
/// `layout(location = N) in` inputs.
pub fn prepare_vertex(source: &str) -> String {
    let mut out = String::from("#version 450\n");
    let mut location = 0;
    for line in source.lines() {
        if is_stripped(line) {
            continue;
        }
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix("attribute ") {
            out.push_str(&format!("layout(location = {location}) in {rest}\n"));
            location += 1;
        } else {
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

fn is_stripped(line: &str) -> bool {
    let trimmed = line.trim_start();
    if trimmed.starts_with("#version") || trimmed.starts_with("precision ") {
        return true;
    }
    trimmed.starts_with("uniform ")
        && CANVAS_UNIFORMS
            .iter()
            .any(|name| declares(trimmed, name))
}

fn declares(line: &str, name: &str) -> bool {
    line.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .any(|token| token == name)
}

/// Must match the field order of [`crate::uniforms::UniformSet`].
const FRAGMENT_HEADER: &str = r"#version 450
layout(location = 0) out vec4 canvas_color;

layout(std140, set = 0, binding = 0) uniform CanvasUniforms {
    vec3 _iResolution;
    float _iTime;
    float _iTimeDelta;
    float _uIntro;
    float _uDayProgress;
    float _uScrollOffset;
} u_canvas;

#define iResolution u_canvas._iResolution
#define iTime u_canvas._iTime
#define iTimeDelta u_canvas._iTimeDelta
#define uIntro u_canvas._uIntro
#define uDayProgress u_canvas._uDayProgress
#define uScrollOffset u_canvas._uScrollOffset

vec4 canvas_frag_coord;
#define gl_FragCoord canvas_frag_coord
";

const FRAGMENT_FOOTER: &str = r"
void main() {
    #undef gl_FragCoord
    vec2 builtin_coord = gl_FragCoord.xy;
    #define gl_FragCoord canvas_frag_coord

    vec2 fragCoord = vec2(builtin_coord.x, iResolution.y - builtin_coord.y);
    canvas_frag_coord = vec4(fragCoord, 0.0, 1.0);

    vec4 color = vec4(0.0);
    mainImage(color, fragCoord);
    canvas_color = vec4(color.rgb, 1.0);
}
";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PRISM_FRAGMENT_SHADER, QUAD_VERTEX_SHADER, SHADE_FRAGMENT_SHADER};

    #[test]
    fn fragment_wrap_strips_contract_uniforms() {
        let source = r#"
            #version 100
            precision highp float;
            uniform vec3 iResolution;
            uniform float iTime;
            uniform float uDayProgress; // 0 = morning
            uniform float uSomethingElse;
            void mainImage(out vec4 fragColor, in vec2 fragCoord) {
                fragColor = vec4(fragCoord / iResolution.xy, uDayProgress, 1.0);
            }
        "#;

        let wrapped = prepare_fragment(source);
        assert!(!wrapped.contains("uniform vec3 iResolution"));
        assert!(!wrapped.contains("uniform float uDayProgress"));
        assert!(!wrapped.contains("precision highp"));
        assert!(!wrapped.contains("#version 100"));
        assert!(wrapped.contains("uniform float uSomethingElse"));
        assert!(wrapped.starts_with("#version 450"));
        assert!(wrapped.contains("mainImage(color, fragCoord)"));
    }

    #[test]
    fn vertex_attributes_get_locations() {
        let source = "precision mediump float;\nattribute vec2 aPosition;\n  attribute vec2 aUv;\nvoid main() {}\n";
        let prepared = prepare_vertex(source);
        assert!(prepared.contains("layout(location = 0) in vec2 aPosition;"));
        assert!(prepared.contains("layout(location = 1) in vec2 aUv;"));
        assert!(!prepared.contains("attribute"));
        assert!(!prepared.contains("precision"));
    }

    #[test]
    fn bundled_shaders_validate() {
        validate(
            ShaderStageKind::Vertex,
            &prepare_vertex(QUAD_VERTEX_SHADER),
        )
        .expect("quad vertex shader");
        validate(
            ShaderStageKind::Fragment,
            &prepare_fragment(PRISM_FRAGMENT_SHADER),
        )
        .expect("prism fragment shader");
        validate(
            ShaderStageKind::Fragment,
            &prepare_fragment(SHADE_FRAGMENT_SHADER),
        )
        .expect("shade fragment shader");
    }

    #[test]
    fn malformed_fragment_reports_a_log() {
        let prepared = prepare_fragment("void mainImage(out vec4 c, in vec2 p) { c = vec4(1.0 }");
        let log = validate(ShaderStageKind::Fragment, &prepared).unwrap_err();
        assert!(!log.is_empty());
    }
}
