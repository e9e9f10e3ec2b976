//! The render engine: owns the GPU context's derived resources and
//! turns shader, model, texture, and camera state into draw calls.
//!
//! Lifecycle: `ContextReady` after construction, then `ProgramReady`
//! or `ProgramError` after each compile attempt. The frame tick only
//! draws while a linked program exists; a failed recompile keeps the
//! last good program on screen and surfaces the new error instead of
//! leaving a blank frame. Dropping the engine tears down the program,
//! every buffer, and every texture; in-flight texture decodes are
//! discarded by the generation check.

use std::sync::Arc;
use std::time::Instant;

use glow::HasContext;

use crate::camera::CameraState;
use crate::engine::mesh::GpuMesh;
use crate::engine::program::ProgramHandle;
use crate::engine::texture::{Texture, TextureLoader, TextureSlot};
use crate::error::ShaderError;
use crate::geometry::MeshData;
use crate::mat4;

/// What geometry the program is drawn over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// A fixed full-viewport quad; fragment shaders do all the work.
    TwoD,
    /// A camera-projected model with lighting uniforms available.
    ThreeD,
}

/// Where the engine is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Context acquired, no compile attempted yet.
    ContextReady,
    /// The most recent compile attempt linked successfully.
    ProgramReady,
    /// The most recent compile attempt failed; the previous good
    /// program, if any, is still drawn.
    ProgramError,
}

/// Full-viewport quad, two triangles, vec2 positions in clip space.
const QUAD_POSITIONS: [f32; 12] = [
    -1.0, -1.0, 1.0, -1.0, -1.0, 1.0, -1.0, 1.0, 1.0, -1.0, 1.0, 1.0,
];

const LIGHT_DIRECTION: [f32; 3] = [0.5, 0.75, 1.0];
const LIGHT_COLOR: [f32; 3] = [1.0, 1.0, 1.0];
const AMBIENT_COLOR: [f32; 3] = [0.2, 0.2, 0.3];

const FOV_Y: f32 = std::f32::consts::FRAC_PI_4;
const NEAR_PLANE: f32 = 0.1;
const FAR_PLANE: f32 = 100.0;

pub struct RenderEngine {
    gl: Arc<glow::Context>,
    state: EngineState,
    mode: RenderMode,
    vao: glow::VertexArray,
    quad: glow::Buffer,
    program: Option<ProgramHandle>,
    last_error: Option<String>,
    mesh: Option<GpuMesh>,
    slots: Vec<TextureSlot>,
    textures: Vec<(String, Texture)>,
    loader: TextureLoader,
    generation: u64,
    start: Instant,
    viewport: (u32, u32),
}

impl RenderEngine {
    /// Sets up context-level resources. The caller has already
    /// acquired the GL context (see `engine::app`); from here on the
    /// engine exclusively owns everything derived from it.
    pub fn new(gl: Arc<glow::Context>) -> Self {
        let (vao, quad) = unsafe {
            let vao = gl.create_vertex_array().unwrap();
            gl.bind_vertex_array(Some(vao));
            let quad = gl.create_buffer().unwrap();
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(quad));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                std::slice::from_raw_parts(
                    QUAD_POSITIONS.as_ptr() as *const u8,
                    std::mem::size_of_val(&QUAD_POSITIONS),
                ),
                glow::STATIC_DRAW,
            );
            (vao, quad)
        };
        Self {
            gl,
            state: EngineState::ContextReady,
            mode: RenderMode::TwoD,
            vao,
            quad,
            program: None,
            last_error: None,
            mesh: None,
            slots: Vec::new(),
            textures: Vec::new(),
            loader: TextureLoader::spawn(),
            generation: 0,
            start: Instant::now(),
            viewport: (0, 0),
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// The compile/link error from the most recent attempt, or `None`
    /// after a successful one. Updated on every attempt.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Number of live GPU textures; equals the slot count once the
    /// slot list has been applied.
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Compiles and links a new program from the source pair.
    ///
    /// The new program is built before the old one is touched: on
    /// success the old handle is dropped in the swap, on failure it
    /// stays active so the frame loop never goes blank over a typo.
    pub fn set_shaders(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<(), ShaderError> {
        let texture_ids: Vec<String> = self.slots.iter().map(|s| s.id.clone()).collect();
        match ProgramHandle::build(&self.gl, vertex_source, fragment_source, &texture_ids) {
            Ok(program) => {
                self.program = Some(program);
                self.state = EngineState::ProgramReady;
                self.last_error = None;
                Ok(())
            }
            Err(err) => {
                self.state = EngineState::ProgramError;
                self.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Switches render mode and recompiles with the given sources.
    /// Entering 2D drops the model buffers; the caller re-sends a mesh
    /// after entering 3D.
    pub fn set_mode(
        &mut self,
        mode: RenderMode,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<(), ShaderError> {
        self.mode = mode;
        if mode == RenderMode::TwoD {
            self.mesh = None;
        }
        self.set_shaders(vertex_source, fragment_source)
    }

    /// Replaces the model buffers from a new mesh snapshot. Only
    /// meaningful in 3D mode; ignored in 2D.
    pub fn set_mesh(&mut self, data: &MeshData) {
        if self.mode == RenderMode::ThreeD {
            self.mesh = Some(GpuMesh::upload(&self.gl, data));
        }
    }

    /// Replaces the texture slot list.
    ///
    /// Every previously created GPU texture is destroyed first, then a
    /// placeholder is created per new slot and its decode is queued.
    /// Bumping the generation makes any decode still in flight for the
    /// old list inert.
    pub fn set_textures(&mut self, slots: Vec<TextureSlot>) {
        self.generation += 1;
        self.textures.clear();
        for slot in &slots {
            self.textures
                .push((slot.id.clone(), Texture::placeholder(&self.gl)));
            self.loader.request(self.generation, slot);
        }
        self.slots = slots;
        if let Some(program) = &mut self.program {
            let texture_ids: Vec<String> = self.slots.iter().map(|s| s.id.clone()).collect();
            program.resolve_samplers(&texture_ids);
        }
    }

    /// One frame tick. Draws nothing until a program has linked; the
    /// camera is a read-only snapshot for the duration of the tick.
    pub fn frame(&mut self, camera: &CameraState, drawable: (u32, u32)) {
        self.upload_finished_decodes();

        let Some(program) = &self.program else {
            return;
        };
        let gl = &self.gl;

        if drawable != self.viewport {
            self.viewport = drawable;
            unsafe {
                gl.viewport(0, 0, drawable.0 as i32, drawable.1 as i32);
            }
        }

        unsafe {
            gl.bind_vertex_array(Some(self.vao));
            gl.clear_color(0.1, 0.1, 0.15, 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }

        program.use_program();
        program.set_f32(&program.uniforms.time, self.start.elapsed().as_secs_f32());
        program.set_vec2(
            &program.uniforms.resolution,
            drawable.0 as f32,
            drawable.1 as f32,
        );

        for (unit, ((_, texture), sampler)) in self
            .textures
            .iter()
            .zip(program.samplers.iter())
            .enumerate()
        {
            texture.bind_to_unit(unit as u32);
            program.set_i32(sampler, unit as i32);
        }

        match self.mode {
            RenderMode::TwoD => self.draw_quad(),
            RenderMode::ThreeD => self.draw_mesh(camera, drawable),
        }
    }

    fn upload_finished_decodes(&mut self) {
        for result in self.loader.poll() {
            if result.generation != self.generation {
                continue;
            }
            let Some(image) = result.image else {
                // Decode failed; the placeholder stays bound.
                continue;
            };
            if let Some((_, texture)) = self.textures.iter().find(|(id, _)| *id == result.id) {
                texture.upload(image.width(), image.height(), image.as_raw());
                log::debug!(
                    "texture '{}' uploaded ({}x{})",
                    result.id,
                    image.width(),
                    image.height()
                );
            }
        }
    }

    fn draw_quad(&self) {
        let Some(program) = &self.program else {
            return;
        };
        let Some(position) = program.attribs.position else {
            return;
        };
        let gl = &self.gl;
        unsafe {
            gl.disable(glow::DEPTH_TEST);
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.quad));
            gl.enable_vertex_attrib_array(position);
            gl.vertex_attrib_pointer_f32(position, 2, glow::FLOAT, false, 0, 0);
            gl.draw_arrays(glow::TRIANGLES, 0, 6);
        }
    }

    fn draw_mesh(&self, camera: &CameraState, drawable: (u32, u32)) {
        let (Some(program), Some(mesh)) = (&self.program, &self.mesh) else {
            return;
        };
        let Some(position) = program.attribs.position else {
            return;
        };
        let gl = &self.gl;

        // The camera can change every frame, so the whole transform
        // stack is recomputed here.
        let mut projection = [0.0; 16];
        let aspect = drawable.0 as f32 / drawable.1.max(1) as f32;
        mat4::perspective(&mut projection, FOV_Y, aspect, NEAR_PLANE, FAR_PLANE);

        let eye = camera.eye();
        let mut view = [0.0; 16];
        mat4::look_at(&mut view, eye, camera.target(), glam::Vec3::Y);

        let model = mat4::identity();
        // Derived from the model matrix alone, not model-view: exact
        // only while the view transform is rotation-only.
        let mut normal = mat4::identity();
        mat4::normal_matrix(&mut normal, &model);

        program.set_mat4(&program.uniforms.model_matrix, &model);
        program.set_mat4(&program.uniforms.view_matrix, &view);
        program.set_mat4(&program.uniforms.projection_matrix, &projection);
        program.set_mat4(&program.uniforms.normal_matrix, &normal);
        program.set_vec3(&program.uniforms.light_direction, LIGHT_DIRECTION);
        program.set_vec3(&program.uniforms.light_color, LIGHT_COLOR);
        program.set_vec3(&program.uniforms.ambient_color, AMBIENT_COLOR);
        program.set_vec3(&program.uniforms.view_position, eye.to_array());

        unsafe {
            gl.enable(glow::DEPTH_TEST);

            gl.bind_buffer(glow::ARRAY_BUFFER, Some(mesh.position_buffer()));
            gl.enable_vertex_attrib_array(position);
            gl.vertex_attrib_pointer_f32(position, 3, glow::FLOAT, false, 0, 0);

            // Optional attributes are bound only when both the buffer
            // exists and the shader declares the name.
            if let Some(normal_attrib) = program.attribs.normal {
                match mesh.normal_buffer() {
                    Some(buffer) => {
                        gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
                        gl.enable_vertex_attrib_array(normal_attrib);
                        gl.vertex_attrib_pointer_f32(normal_attrib, 3, glow::FLOAT, false, 0, 0);
                    }
                    None => gl.disable_vertex_attrib_array(normal_attrib),
                }
            }
            if let Some(texcoord) = program.attribs.texcoord {
                match mesh.uv_buffer() {
                    Some(buffer) => {
                        gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
                        gl.enable_vertex_attrib_array(texcoord);
                        gl.vertex_attrib_pointer_f32(texcoord, 2, glow::FLOAT, false, 0, 0);
                    }
                    None => gl.disable_vertex_attrib_array(texcoord),
                }
            }

            match mesh.index_buffer() {
                Some(buffer) => {
                    gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(buffer));
                    gl.draw_elements(
                        glow::TRIANGLES,
                        mesh.index_count(),
                        glow::UNSIGNED_SHORT,
                        0,
                    );
                }
                None => gl.draw_arrays(glow::TRIANGLES, 0, mesh.vertex_count()),
            }
        }
    }
}

impl Drop for RenderEngine {
    fn drop(&mut self) {
        // Program, mesh buffers, and textures delete themselves in
        // their own Drop impls; only the context-level objects remain.
        unsafe {
            self.gl.delete_buffer(self.quad);
            self.gl.delete_vertex_array(self.vao);
        }
    }
}
