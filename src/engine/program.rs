//! GPU program compilation, linking, and uniform schema resolution.
//!
//! User shader text is free-form; the contract between it and the
//! engine is a fixed set of uniform and attribute names. Names the
//! shader does not declare resolve to `None`, and setting a `None`
//! location is a no-op, so shaders are free to use any subset of the
//! schema.

use std::sync::Arc;

use glow::HasContext;

use crate::error::{ShaderError, ShaderStage};
use crate::mat4::Mat4;

/// A compiled shader stage. Deleted on drop, so a stage that compiled
/// before its sibling failed is cleaned up automatically.
struct Shader {
    gl: Arc<glow::Context>,
    id: glow::Shader,
}

impl Shader {
    fn new(gl: &Arc<glow::Context>, stage: ShaderStage, source: &str) -> Result<Self, ShaderError> {
        let kind = match stage {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        };
        unsafe {
            let id = gl.create_shader(kind).map_err(|log| ShaderError::Compile {
                stage,
                log,
            })?;
            gl.shader_source(id, source);
            gl.compile_shader(id);
            if !gl.get_shader_compile_status(id) {
                let log = gl.get_shader_info_log(id);
                gl.delete_shader(id);
                return Err(ShaderError::Compile { stage, log });
            }
            Ok(Self {
                gl: Arc::clone(gl),
                id,
            })
        }
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_shader(self.id);
        }
    }
}

/// Resolved locations for the fixed uniform schema. `None` means the
/// shader does not declare the name; setters then do nothing.
#[derive(Default)]
pub struct UniformSchema {
    pub time: Option<glow::NativeUniformLocation>,
    pub resolution: Option<glow::NativeUniformLocation>,
    pub model_matrix: Option<glow::NativeUniformLocation>,
    pub view_matrix: Option<glow::NativeUniformLocation>,
    pub projection_matrix: Option<glow::NativeUniformLocation>,
    pub normal_matrix: Option<glow::NativeUniformLocation>,
    pub light_direction: Option<glow::NativeUniformLocation>,
    pub light_color: Option<glow::NativeUniformLocation>,
    pub ambient_color: Option<glow::NativeUniformLocation>,
    pub view_position: Option<glow::NativeUniformLocation>,
}

/// Resolved locations for the fixed attribute schema.
#[derive(Default, Clone, Copy)]
pub struct AttribSchema {
    pub position: Option<u32>,
    pub normal: Option<u32>,
    pub texcoord: Option<u32>,
}

/// The sampler uniform name derived from a texture slot id.
pub fn sampler_uniform_name(id: &str) -> String {
    format!("u_{id}")
}

/// A linked GPU program plus its resolved schema. Never mutated after
/// a successful build except to re-resolve sampler uniforms when the
/// texture slot list changes; replaced wholesale on recompile.
pub struct ProgramHandle {
    gl: Arc<glow::Context>,
    id: glow::Program,
    pub uniforms: UniformSchema,
    pub attribs: AttribSchema,
    /// One resolved sampler location per texture slot, in slot order.
    pub samplers: Vec<Option<glow::NativeUniformLocation>>,
}

impl ProgramHandle {
    /// Compiles both stages and links them.
    ///
    /// The vertex stage is compiled first; a failure in either stage
    /// reports that stage's log without attempting to link, and any
    /// sibling stage object already created is destroyed. A link
    /// failure reports the program log. On success the stages are
    /// detached and deleted, and the name schema is resolved against
    /// the new program.
    pub fn build(
        gl: &Arc<glow::Context>,
        vertex_source: &str,
        fragment_source: &str,
        texture_ids: &[String],
    ) -> Result<Self, ShaderError> {
        let vs = Shader::new(gl, ShaderStage::Vertex, vertex_source)?;
        let fs = Shader::new(gl, ShaderStage::Fragment, fragment_source)?;

        let id = unsafe {
            let program = gl.create_program().map_err(ShaderError::Link)?;
            gl.attach_shader(program, vs.id);
            gl.attach_shader(program, fs.id);
            gl.link_program(program);
            gl.detach_shader(program, vs.id);
            gl.detach_shader(program, fs.id);
            if !gl.get_program_link_status(program) {
                let log = gl.get_program_info_log(program);
                gl.delete_program(program);
                return Err(ShaderError::Link(log));
            }
            program
        };

        let uniforms = unsafe {
            UniformSchema {
                time: gl.get_uniform_location(id, "u_time"),
                resolution: gl.get_uniform_location(id, "u_resolution"),
                model_matrix: gl.get_uniform_location(id, "u_modelMatrix"),
                view_matrix: gl.get_uniform_location(id, "u_viewMatrix"),
                projection_matrix: gl.get_uniform_location(id, "u_projectionMatrix"),
                normal_matrix: gl.get_uniform_location(id, "u_normalMatrix"),
                light_direction: gl.get_uniform_location(id, "u_lightDirection"),
                light_color: gl.get_uniform_location(id, "u_lightColor"),
                ambient_color: gl.get_uniform_location(id, "u_ambientColor"),
                view_position: gl.get_uniform_location(id, "u_viewPosition"),
            }
        };
        let attribs = unsafe {
            AttribSchema {
                position: gl.get_attrib_location(id, "a_position"),
                normal: gl.get_attrib_location(id, "a_normal"),
                texcoord: gl.get_attrib_location(id, "a_texcoord"),
            }
        };

        let mut handle = Self {
            gl: Arc::clone(gl),
            id,
            uniforms,
            attribs,
            samplers: Vec::new(),
        };
        handle.resolve_samplers(texture_ids);
        Ok(handle)
    }

    /// Re-resolves one `u_<textureId>` sampler location per slot id.
    pub fn resolve_samplers(&mut self, texture_ids: &[String]) {
        self.samplers = texture_ids
            .iter()
            .map(|id| unsafe {
                self.gl
                    .get_uniform_location(self.id, &sampler_uniform_name(id))
            })
            .collect();
    }

    pub fn use_program(&self) {
        unsafe {
            self.gl.use_program(Some(self.id));
        }
    }

    pub fn set_f32(&self, location: &Option<glow::NativeUniformLocation>, value: f32) {
        unsafe {
            self.gl.uniform_1_f32(location.as_ref(), value);
        }
    }

    pub fn set_i32(&self, location: &Option<glow::NativeUniformLocation>, value: i32) {
        unsafe {
            self.gl.uniform_1_i32(location.as_ref(), value);
        }
    }

    pub fn set_vec2(&self, location: &Option<glow::NativeUniformLocation>, x: f32, y: f32) {
        unsafe {
            self.gl.uniform_2_f32(location.as_ref(), x, y);
        }
    }

    pub fn set_vec3(&self, location: &Option<glow::NativeUniformLocation>, v: [f32; 3]) {
        unsafe {
            self.gl.uniform_3_f32(location.as_ref(), v[0], v[1], v[2]);
        }
    }

    pub fn set_mat4(&self, location: &Option<glow::NativeUniformLocation>, m: &Mat4) {
        unsafe {
            self.gl
                .uniform_matrix_4_f32_slice(location.as_ref(), false, m);
        }
    }
}

impl Drop for ProgramHandle {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_program(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sampler_names_follow_the_slot_id() {
        assert_eq!(sampler_uniform_name("diffuse"), "u_diffuse");
        assert_eq!(sampler_uniform_name("noise0"), "u_noise0");
    }
}
