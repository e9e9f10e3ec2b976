//! SDL2 and OpenGL application setup.
//!
//! [`App`] owns the window, the GL context, and the event pump. Failing
//! to acquire any of them is terminal for the process: there is no
//! retry path, the error is reported once and the instance is never
//! created.

use std::sync::Arc;

use crate::error::EngineError;

/// The window, GL context, and event pump for one preview session.
pub struct App {
    pub sdl: sdl2::Sdl,
    pub video_subsystem: sdl2::VideoSubsystem,
    pub window: sdl2::video::Window,
    pub gl_context: sdl2::video::GLContext,
    pub gl: Arc<glow::Context>,
    pub event_pump: sdl2::EventPump,
}

impl App {
    /// Creates the window and a core-profile GL 3.3 context.
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self, EngineError> {
        let sdl = sdl2::init().map_err(EngineError::ContextUnavailable)?;
        let video_subsystem = sdl.video().map_err(EngineError::ContextUnavailable)?;
        let gl_attr = video_subsystem.gl_attr();
        gl_attr.set_context_profile(sdl2::video::GLProfile::Core);
        gl_attr.set_context_version(3, 3);

        let window = video_subsystem
            .window(title, width, height)
            .opengl()
            .resizable()
            .build()
            .map_err(|e| EngineError::ContextUnavailable(e.to_string()))?;
        let gl_context = window
            .gl_create_context()
            .map_err(EngineError::ContextUnavailable)?;
        window
            .gl_make_current(&gl_context)
            .map_err(EngineError::ContextUnavailable)?;
        let gl = unsafe {
            glow::Context::from_loader_function(|s| {
                video_subsystem.gl_get_proc_address(s) as *const _
            })
        };
        let event_pump = sdl.event_pump().map_err(EngineError::ContextUnavailable)?;

        Ok(Self {
            sdl,
            video_subsystem,
            window,
            gl_context,
            gl: Arc::new(gl),
            event_pump,
        })
    }

    /// Size of the drawable surface in pixels, which can differ from
    /// the window size on high-DPI displays.
    pub fn drawable_size(&self) -> (u32, u32) {
        self.window.drawable_size()
    }
}
