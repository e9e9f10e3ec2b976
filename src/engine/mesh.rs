//! GPU-side buffers for one mesh snapshot.
//!
//! A [`GpuMesh`] is uploaded whole from a [`MeshData`] and replaced
//! whole when the model changes; optional attributes that the new
//! snapshot lacks are destroyed with the old buffers. Each attribute
//! lives in its own tightly packed buffer, matching the flat per-
//! attribute layout of [`MeshData`].

use std::sync::Arc;

use glow::HasContext;

use crate::geometry::MeshData;

pub struct GpuMesh {
    gl: Arc<glow::Context>,
    position: glow::Buffer,
    normal: Option<glow::Buffer>,
    uv: Option<glow::Buffer>,
    index: Option<glow::Buffer>,
    vertex_count: i32,
    index_count: i32,
}

fn upload_f32(gl: &glow::Context, data: &[f32]) -> glow::Buffer {
    unsafe {
        let buffer = gl.create_buffer().unwrap();
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
        gl.buffer_data_u8_slice(
            glow::ARRAY_BUFFER,
            std::slice::from_raw_parts(data.as_ptr() as *const u8, std::mem::size_of_val(data)),
            glow::STATIC_DRAW,
        );
        buffer
    }
}

impl GpuMesh {
    /// Uploads position, normal, UV, and index buffers for `data`.
    /// Absent optional fields get no buffer at all.
    pub fn upload(gl: &Arc<glow::Context>, data: &MeshData) -> Self {
        let position = upload_f32(gl, &data.vertices);
        let normal = (!data.normals.is_empty()).then(|| upload_f32(gl, &data.normals));
        let uv = data
            .uvs
            .as_deref()
            .filter(|uvs| !uvs.is_empty())
            .map(|uvs| upload_f32(gl, uvs));

        let index = data.indices.as_deref().filter(|i| !i.is_empty()).map(|indices| unsafe {
            let buffer = gl.create_buffer().unwrap();
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(buffer));
            gl.buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                std::slice::from_raw_parts(
                    indices.as_ptr() as *const u8,
                    std::mem::size_of_val(indices),
                ),
                glow::STATIC_DRAW,
            );
            buffer
        });

        Self {
            gl: Arc::clone(gl),
            position,
            normal,
            uv,
            index,
            vertex_count: data.vertex_count() as i32,
            index_count: data.indices.as_ref().map_or(0, |i| i.len()) as i32,
        }
    }

    pub fn position_buffer(&self) -> glow::Buffer {
        self.position
    }

    pub fn normal_buffer(&self) -> Option<glow::Buffer> {
        self.normal
    }

    pub fn uv_buffer(&self) -> Option<glow::Buffer> {
        self.uv
    }

    pub fn index_buffer(&self) -> Option<glow::Buffer> {
        self.index
    }

    pub fn vertex_count(&self) -> i32 {
        self.vertex_count
    }

    pub fn index_count(&self) -> i32 {
        self.index_count
    }
}

impl Drop for GpuMesh {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_buffer(self.position);
            if let Some(buffer) = self.normal.take() {
                self.gl.delete_buffer(buffer);
            }
            if let Some(buffer) = self.uv.take() {
                self.gl.delete_buffer(buffer);
            }
            if let Some(buffer) = self.index.take() {
                self.gl.delete_buffer(buffer);
            }
        }
    }
}
