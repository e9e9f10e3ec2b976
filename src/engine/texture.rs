//! GPU textures and the asynchronous image decode pipeline.
//!
//! A texture is bindable from the moment its slot is configured: it is
//! created with a 1x1 opaque placeholder and the real image is decoded
//! on a worker thread, off the frame loop. Decoded pixels come back
//! over a channel tagged with a generation number; the engine discards
//! results whose generation no longer matches, which covers both
//! slot-list replacement and engine teardown racing an in-flight
//! decode.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;

use glow::HasContext;
use image::RgbaImage;

/// One configured texture: a stable id (used to derive the sampler
/// uniform name `u_<id>`) and the image file it loads from.
#[derive(Debug, Clone)]
pub struct TextureSlot {
    pub id: String,
    pub source: PathBuf,
}

/// A GPU texture owned by the engine. Deleted on drop.
pub struct Texture {
    gl: Arc<glow::Context>,
    id: glow::Texture,
}

impl Texture {
    /// Creates the texture and uploads a 1x1 opaque grey placeholder so
    /// it is bindable before the real image arrives.
    pub fn placeholder(gl: &Arc<glow::Context>) -> Self {
        let texture = Self {
            gl: Arc::clone(gl),
            id: unsafe { gl.create_texture().unwrap() },
        };
        texture.upload(1, 1, &[128, 128, 128, 255]);
        texture
    }

    /// Uploads full image data, replacing whatever the texture held.
    ///
    /// Power-of-two dimensions get mipmaps and repeat wrapping.
    /// Anything else is clamped to the edge with linear, non-mipmapped
    /// filtering, since mipmap generation is invalid for such sizes
    /// under the targeted GL constraints.
    pub fn upload(&self, width: u32, height: u32, rgba: &[u8]) {
        let gl = &self.gl;
        unsafe {
            gl.bind_texture(glow::TEXTURE_2D, Some(self.id));
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA as i32,
                width as i32,
                height as i32,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(rgba)),
            );
            if width.is_power_of_two() && height.is_power_of_two() {
                gl.generate_mipmap(glow::TEXTURE_2D);
                gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::REPEAT as i32);
                gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::REPEAT as i32);
                gl.tex_parameter_i32(
                    glow::TEXTURE_2D,
                    glow::TEXTURE_MIN_FILTER,
                    glow::LINEAR_MIPMAP_LINEAR as i32,
                );
            } else {
                gl.tex_parameter_i32(
                    glow::TEXTURE_2D,
                    glow::TEXTURE_WRAP_S,
                    glow::CLAMP_TO_EDGE as i32,
                );
                gl.tex_parameter_i32(
                    glow::TEXTURE_2D,
                    glow::TEXTURE_WRAP_T,
                    glow::CLAMP_TO_EDGE as i32,
                );
                gl.tex_parameter_i32(
                    glow::TEXTURE_2D,
                    glow::TEXTURE_MIN_FILTER,
                    glow::LINEAR as i32,
                );
            }
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                glow::LINEAR as i32,
            );
            gl.bind_texture(glow::TEXTURE_2D, None);
        }
    }

    pub fn bind_to_unit(&self, unit: u32) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(glow::TEXTURE_2D, Some(self.id));
        }
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_texture(self.id);
        }
    }
}

struct DecodeTask {
    generation: u64,
    id: String,
    source: PathBuf,
}

/// A finished decode. `image` is `None` when decoding failed; the
/// placeholder then simply stays bound.
pub struct DecodeResult {
    pub generation: u64,
    pub id: String,
    pub image: Option<RgbaImage>,
}

/// Background image decoder.
///
/// One worker thread serves all requests in order; it owns no GPU
/// objects and only ships pixels back. Dropping the loader closes the
/// request channel and the worker exits on its own.
pub struct TextureLoader {
    tasks: mpsc::Sender<DecodeTask>,
    results: mpsc::Receiver<DecodeResult>,
}

impl TextureLoader {
    pub fn spawn() -> Self {
        let (task_sender, task_receiver) = mpsc::channel::<DecodeTask>();
        let (result_sender, result_receiver) = mpsc::channel::<DecodeResult>();
        thread::spawn(move || {
            while let Ok(task) = task_receiver.recv() {
                let image = match image::open(&task.source) {
                    Ok(decoded) => Some(decoded.to_rgba8()),
                    Err(err) => {
                        log::warn!(
                            "failed to decode texture '{}' from {}: {err}",
                            task.id,
                            task.source.display()
                        );
                        None
                    }
                };
                let result = DecodeResult {
                    generation: task.generation,
                    id: task.id,
                    image,
                };
                if result_sender.send(result).is_err() {
                    break;
                }
            }
        });
        Self {
            tasks: task_sender,
            results: result_receiver,
        }
    }

    /// Queues a decode for `slot`, tagged with `generation`.
    pub fn request(&self, generation: u64, slot: &TextureSlot) {
        let task = DecodeTask {
            generation,
            id: slot.id.clone(),
            source: slot.source.clone(),
        };
        // The worker outlives every sender; a send failure just means
        // it already shut down during teardown.
        let _ = self.tasks.send(task);
    }

    /// Drains every decode that has finished so far, without blocking.
    pub fn poll(&self) -> Vec<DecodeResult> {
        let mut finished = Vec::new();
        while let Ok(result) = self.results.try_recv() {
            finished.push(result);
        }
        finished
    }
}
