use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use sdl2::keyboard::Keycode;

use crate::camera::{CameraState, MoveKeys};
use crate::engine::{App, RenderEngine, RenderMode, TextureSlot};
use crate::geometry::{MeshData, make_cube, make_sphere};
use crate::obj::parse_obj;

mod camera;
mod engine;
mod error;
mod geometry;
mod mat4;
mod obj;

const DEFAULT_QUAD_VERTEX: &str = include_str!("shaders/quad/vertex_shader.glsl");
const DEFAULT_QUAD_FRAGMENT: &str = include_str!("shaders/quad/fragment_shader.glsl");
const DEFAULT_MODEL_VERTEX: &str = include_str!("shaders/model/vertex_shader.glsl");
const DEFAULT_MODEL_FRAGMENT: &str = include_str!("shaders/model/fragment_shader.glsl");

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum ModeArg {
    #[value(name = "2d")]
    TwoD,
    #[value(name = "3d")]
    ThreeD,
}

impl From<ModeArg> for RenderMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::TwoD => RenderMode::TwoD,
            ModeArg::ThreeD => RenderMode::ThreeD,
        }
    }
}

/// Live GLSL shader preview over a full-screen quad or a 3D model.
///
/// While running: drag to orbit, wheel to zoom, w/a/s/d/e/q to pan,
/// 1/2/3 to pick cube/sphere/imported OBJ, Tab to switch mode,
/// r to reload the shader files, Esc to quit.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Initial render mode.
    #[arg(long, value_enum, default_value = "2d")]
    mode: ModeArg,

    /// Fragment shader file for the initial mode (embedded default
    /// otherwise). Reloaded from disk on 'r'.
    #[arg(long)]
    fragment: Option<PathBuf>,

    /// Vertex shader file for the initial mode (embedded default
    /// otherwise). Reloaded from disk on 'r'.
    #[arg(long)]
    vertex: Option<PathBuf>,

    /// Model for 3D mode: "cube", "sphere", or a path to an .obj file.
    #[arg(long, default_value = "cube")]
    model: String,

    /// Texture slot as id=path; repeatable. Each becomes a sampler
    /// uniform named u_<id>.
    #[arg(long = "texture")]
    textures: Vec<String>,

    #[arg(long, default_value_t = 1280)]
    width: u32,

    #[arg(long, default_value_t = 720)]
    height: u32,
}

impl Args {
    /// Shader source pair for `mode`. The --vertex/--fragment overrides
    /// only apply to the mode selected on the command line; the other
    /// mode keeps its embedded defaults.
    fn shader_sources(&self, mode: RenderMode) -> (String, String) {
        let (default_vertex, default_fragment) = match mode {
            RenderMode::TwoD => (DEFAULT_QUAD_VERTEX, DEFAULT_QUAD_FRAGMENT),
            RenderMode::ThreeD => (DEFAULT_MODEL_VERTEX, DEFAULT_MODEL_FRAGMENT),
        };
        if mode != RenderMode::from(self.mode) {
            return (default_vertex.to_string(), default_fragment.to_string());
        }
        let read = |path: &Option<PathBuf>, fallback: &str| match path {
            Some(path) => std::fs::read_to_string(path).unwrap_or_else(|err| {
                log::error!("could not read {}: {err}", path.display());
                fallback.to_string()
            }),
            None => fallback.to_string(),
        };
        (
            read(&self.vertex, default_vertex),
            read(&self.fragment, default_fragment),
        )
    }
}

fn parse_texture_slots(specs: &[String]) -> Result<Vec<TextureSlot>, String> {
    specs
        .iter()
        .map(|spec| {
            let (id, path) = spec
                .split_once('=')
                .ok_or_else(|| format!("texture '{spec}' is not of the form id=path"))?;
            if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(format!(
                    "texture id '{id}' must be a non-empty [A-Za-z0-9_] name"
                ));
            }
            Ok(TextureSlot {
                id: id.to_string(),
                source: PathBuf::from(path),
            })
        })
        .collect()
}

fn load_model(selector: &str) -> MeshData {
    match selector {
        "cube" => make_cube(),
        "sphere" => make_sphere(),
        path => match std::fs::read_to_string(Path::new(path)) {
            Ok(text) => match parse_obj(&text) {
                Ok(mesh) => {
                    log::info!("imported {path}: {} vertices", mesh.vertex_count());
                    mesh
                }
                Err(err) => {
                    log::error!("failed to import {path}: {err}");
                    make_cube()
                }
            },
            Err(err) => {
                log::error!("could not read {path}: {err}");
                make_cube()
            }
        },
    }
}

/// Surfaces the outcome of a compile attempt: the error string when it
/// failed, or its clearing when it succeeded.
fn report_compile(result: Result<(), error::ShaderError>) {
    match result {
        Ok(()) => log::info!("shaders compiled and linked"),
        Err(err) => log::error!("{err}"),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let slots = match parse_texture_slots(&args.textures) {
        Ok(slots) => slots,
        Err(message) => {
            log::error!("{message}");
            std::process::exit(2);
        }
    };

    let mut app = match App::new("fragview", args.width, args.height) {
        Ok(app) => app,
        Err(err) => {
            log::error!("{err}");
            std::process::exit(1);
        }
    };
    let _ = app
        .video_subsystem
        .gl_set_swap_interval(sdl2::video::SwapInterval::VSync);

    let mut engine = RenderEngine::new(Arc::clone(&app.gl));
    engine.set_textures(slots);

    let mut mode = RenderMode::from(args.mode);
    let (vertex_source, fragment_source) = args.shader_sources(mode);
    report_compile(engine.set_mode(mode, &vertex_source, &fragment_source));

    let mut model = load_model(&args.model);
    if mode == RenderMode::ThreeD {
        engine.set_mesh(&model);
    }

    let mut camera = CameraState::default();
    let mut keys = MoveKeys::default();
    let mut last_tick = Instant::now();

    'running: loop {
        for event in app.event_pump.poll_iter() {
            match event {
                sdl2::event::Event::Quit { .. } => break 'running,
                sdl2::event::Event::KeyDown {
                    keycode: Some(key),
                    repeat: false,
                    ..
                } => match key {
                    Keycode::Escape => break 'running,
                    Keycode::W => keys.forward = true,
                    Keycode::S => keys.back = true,
                    Keycode::A => keys.left = true,
                    Keycode::D => keys.right = true,
                    Keycode::E => keys.up = true,
                    Keycode::Q => keys.down = true,
                    Keycode::Tab => {
                        mode = match mode {
                            RenderMode::TwoD => RenderMode::ThreeD,
                            RenderMode::ThreeD => RenderMode::TwoD,
                        };
                        let (vertex_source, fragment_source) = args.shader_sources(mode);
                        report_compile(engine.set_mode(mode, &vertex_source, &fragment_source));
                        if mode == RenderMode::ThreeD {
                            engine.set_mesh(&model);
                        }
                    }
                    Keycode::R => {
                        let (vertex_source, fragment_source) = args.shader_sources(mode);
                        report_compile(engine.set_shaders(&vertex_source, &fragment_source));
                    }
                    Keycode::Num1 if mode == RenderMode::ThreeD => {
                        model = load_model("cube");
                        engine.set_mesh(&model);
                    }
                    Keycode::Num2 if mode == RenderMode::ThreeD => {
                        model = load_model("sphere");
                        engine.set_mesh(&model);
                    }
                    Keycode::Num3 if mode == RenderMode::ThreeD => {
                        model = load_model(&args.model);
                        engine.set_mesh(&model);
                    }
                    _ => {}
                },
                sdl2::event::Event::KeyUp {
                    keycode: Some(key), ..
                } => match key {
                    Keycode::W => keys.forward = false,
                    Keycode::S => keys.back = false,
                    Keycode::A => keys.left = false,
                    Keycode::D => keys.right = false,
                    Keycode::E => keys.up = false,
                    Keycode::Q => keys.down = false,
                    _ => {}
                },
                sdl2::event::Event::MouseMotion {
                    xrel,
                    yrel,
                    mousestate,
                    ..
                } if mode == RenderMode::ThreeD => {
                    if mousestate.left() {
                        camera.rotate(xrel as f32, yrel as f32);
                    } else if mousestate.right() || mousestate.middle() {
                        camera.pan(xrel as f32, yrel as f32);
                    }
                }
                sdl2::event::Event::MouseWheel { y, .. } if mode == RenderMode::ThreeD => {
                    // Scroll up zooms in.
                    camera.zoom(-(y as f32) * 120.0);
                }
                _ => {}
            }
        }

        let dt = last_tick.elapsed().as_secs_f32().min(0.1);
        last_tick = Instant::now();
        if mode == RenderMode::ThreeD {
            camera.integrate_keys(&keys, dt);
        }

        engine.frame(&camera, app.drawable_size());
        app.window.gl_swap_window();
    }
}
