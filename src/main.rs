//! Windowed driver for the raycaster.
//!
//! Usage:
//!   raycast_engine [--config scene.json] [--fov 75] [--draw-distance 24]
//!
//! WASD moves, Q/E or the arrow keys turn, Escape quits.

use std::collections::HashSet;
use std::env;
use std::num::NonZeroU32;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::{Context, anyhow};
use tracing::{debug, error, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use raycast_engine::config::{MotionConfig, RaycastConfig, WindowConfig};
use raycast_engine::input::{self, InputState};
use raycast_engine::upscale::{ScaleLut, blit_nearest, internal_width};
use raycast_engine::{Camera, FrameBuffer, Surface};

struct App<'m> {
    window: Option<Rc<Window>>,
    surface: Option<softbuffer::Surface<Rc<Window>, Rc<Window>>>,
    window_cfg: WindowConfig,
    camera: Camera<'m>,
    motion: MotionConfig,

    // HUD
    frame_counter: u32,
    last_fps_print: Instant,

    // Internal low-res buffer, stretched to the window
    frame: FrameBuffer,
    scale_lut: ScaleLut,

    // Input
    keys_down: HashSet<KeyCode>,
    last_tick: Instant,
}

impl<'m> App<'m> {
    fn new(cfg: &RaycastConfig, camera: Camera<'m>) -> Self {
        let h = cfg.window.internal_height.max(1);
        Self {
            window: None,
            surface: None,
            window_cfg: cfg.window.clone(),
            camera,
            motion: cfg.motion.clone(),

            frame_counter: 0,
            last_fps_print: Instant::now(),

            frame: FrameBuffer::new(internal_width(4, 3, h), h),
            scale_lut: ScaleLut::empty(),

            keys_down: HashSet::new(),
            last_tick: Instant::now(),
        }
    }

    fn tick(&mut self) {
        // Compute dt with cap to avoid huge jumps if the app was paused
        let now = Instant::now();
        let dt = now.duration_since(self.last_tick).min(Duration::from_millis(100));
        self.last_tick = now;

        let state = InputState::from_keys(&self.keys_down);
        input::step(&mut self.camera, &state, dt.as_secs_f64(), &self.motion);
    }

    fn rebuild_internal_fb_and_lut(&mut self, dst_w: usize, dst_h: usize) {
        // Keep internal height fixed (controls pixel size look)
        let target_h = self.window_cfg.internal_height.max(1);
        let target_w = internal_width(dst_w, dst_h, target_h);
        self.frame.resize(target_w, target_h);
        self.scale_lut = ScaleLut::new(dst_w, dst_h, target_w, target_h);
        debug!(dst_w, dst_h, target_w, target_h, "rebuilt internal framebuffer");
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop, id: WindowId) {
        self.tick();

        let (window, surface) = match (&self.window, &mut self.surface) {
            (Some(w), Some(s)) if w.id() == id => (w.clone(), s),
            _ => return,
        };

        let size = window.inner_size();
        let (Some(w), Some(h)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            return; // Minimized window, skip drawing
        };
        let (dw, dh) = (size.width as usize, size.height as usize);

        if let Err(err) = surface.resize(w, h) {
            error!(%err, "failed to resize surface");
            event_loop.exit();
            return;
        }

        if self.scale_lut.dst_size() != (dw, dh) {
            self.rebuild_internal_fb_and_lut(dw, dh);
        }

        self.camera.render(&mut self.frame);

        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let mut buf = match surface.buffer_mut() {
            Ok(buf) => buf,
            Err(err) => {
                error!(%err, "failed to map surface buffer");
                event_loop.exit();
                return;
            }
        };
        blit_nearest(
            &mut buf,
            dw,
            self.frame.pixels(),
            self.frame.width(),
            &self.scale_lut,
        );
        if let Err(err) = buf.present() {
            error!(%err, "failed to present frame");
            event_loop.exit();
            return;
        }

        self.frame_counter += 1;
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_fps_print).as_secs_f32();
        if elapsed >= 1.0 {
            let pos = self.camera.position();
            info!(fps = self.frame_counter as f32 / elapsed, x = pos.x, y = pos.y, "frame stats");
            self.frame_counter = 0;
            self.last_fps_print = now;
        }

        window.request_redraw();
    }
}

impl ApplicationHandler for App<'_> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let attributes = Window::default_attributes()
            .with_title(self.window_cfg.title.clone())
            .with_inner_size(LogicalSize::new(
                self.window_cfg.width as f64,
                self.window_cfg.height as f64,
            ));

        let created = event_loop
            .create_window(attributes)
            .map_err(|err| anyhow!("creating window: {err}"))
            .and_then(|window| {
                let window = Rc::new(window);
                let context = softbuffer::Context::new(window.clone())
                    .map_err(|err| anyhow!("creating softbuffer context: {err}"))?;
                let surface = softbuffer::Surface::new(&context, window.clone())
                    .map_err(|err| anyhow!("creating softbuffer surface: {err}"))?;
                Ok((window, surface))
            });

        let (window, surface) = match created {
            Ok(pair) => pair,
            Err(err) => {
                error!("{err:#}");
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        self.rebuild_internal_fb_and_lut(size.width as usize, size.height as usize);

        window.request_redraw();
        self.surface = Some(surface);
        self.window = Some(window);
        self.last_tick = Instant::now();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("close requested; stopping");
                event_loop.exit();
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => match state {
                ElementState::Pressed if code == KeyCode::Escape => event_loop.exit(),
                ElementState::Pressed => {
                    self.keys_down.insert(code);
                }
                ElementState::Released => {
                    self.keys_down.remove(&code);
                }
            },

            WindowEvent::Focused(false) => self.keys_down.clear(),

            WindowEvent::RedrawRequested => self.redraw(event_loop, id),

            WindowEvent::Resized(new_size) => {
                self.rebuild_internal_fb_and_lut(new_size.width as usize, new_size.height as usize);
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn parse_args() -> anyhow::Result<RaycastConfig> {
    let args: Vec<String> = env::args().skip(1).collect();

    // --config first so the other flags override it
    let mut cfg = match args.iter().position(|a| a == "--config") {
        Some(i) => {
            let path = args.get(i + 1).context("--config needs a path")?;
            RaycastConfig::load(path)?
        }
        None => RaycastConfig::default(),
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => i += 2,
            "--fov" if i + 1 < args.len() => {
                cfg.camera.fov_deg = args[i + 1]
                    .parse()
                    .with_context(|| format!("invalid --fov {:?}", args[i + 1]))?;
                i += 2;
            }
            "--draw-distance" if i + 1 < args.len() => {
                cfg.camera.draw_distance = args[i + 1]
                    .parse()
                    .with_context(|| format!("invalid --draw-distance {:?}", args[i + 1]))?;
                i += 2;
            }
            other => {
                warn!(arg = other, "ignoring unknown argument");
                i += 1;
            }
        }
    }
    Ok(cfg)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cfg = parse_args()?;
    let map = cfg.build_map().context("building map")?;
    let camera = cfg.build_camera(&map).context("building camera")?;
    info!(
        width = map.width(),
        height = map.height(),
        fov_deg = cfg.camera.fov_deg,
        draw_distance = cfg.camera.draw_distance,
        "starting raycaster"
    );

    let event_loop = EventLoop::new().map_err(|err| anyhow!("creating event loop: {err}"))?;
    // Poll keeps frames coming while keys are held
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(&cfg, camera);
    event_loop
        .run_app(&mut app)
        .map_err(|err| anyhow!("event loop: {err}"))?;
    Ok(())
}
