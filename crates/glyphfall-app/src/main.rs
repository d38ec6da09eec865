// Glyphfall: a translucent always-on-top strip that rains glyphs over a
// row of dock icons. Wires the winit window and wgpu surface to the frame
// driver; all simulation and rendering happens on this thread, one tick per
// RedrawRequested at a ~60 Hz cadence.

mod dock;
mod driver;
mod gpu;
mod settings;

use std::sync::Arc;
use std::time::{Duration, Instant};

use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId, WindowLevel};

use driver::FrameDriver;
use settings::OverlaySettings;

/// Redraw pacing target (~60 Hz).
const FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

// ──────────────────────────────────────────────
// App state
// ──────────────────────────────────────────────

struct App {
    window: Option<Arc<Window>>,
    surface: Option<wgpu::Surface<'static>>,
    device: Option<Arc<wgpu::Device>>,
    queue: Option<Arc<wgpu::Queue>>,
    surface_config: Option<wgpu::SurfaceConfiguration>,
    driver: Option<FrameDriver>,

    settings: OverlaySettings,
    window_size: PhysicalSize<u32>,
    last_frame: Option<Instant>,
}

impl App {
    fn new(settings: OverlaySettings) -> Self {
        Self {
            window: None,
            surface: None,
            device: None,
            queue: None,
            surface_config: None,
            driver: None,
            settings,
            window_size: PhysicalSize::new(0, 0),
            last_frame: None,
        }
    }

    fn render(&mut self) {
        let surface = match self.surface.as_ref() {
            Some(s) => s,
            None => return,
        };

        let output = match surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.reconfigure_surface();
                return;
            }
            Err(e) => {
                log::error!("surface error: {}", e);
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let now = Instant::now();
        let dt = self
            .last_frame
            .map(|t| (now - t).as_secs_f64())
            .unwrap_or(0.0);
        self.last_frame = Some(now);

        let device = self.device.as_ref().unwrap();
        let queue = self.queue.as_ref().unwrap();
        let driver = self.driver.as_mut().unwrap();

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame_encoder"),
        });
        driver.tick(dt, &mut encoder, &view);
        queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }
}

// ──────────────────────────────────────────────
// ApplicationHandler implementation
// ──────────────────────────────────────────────

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        // A full-height strip along the edge of the primary monitor.
        let screen = event_loop
            .primary_monitor()
            .map(|m| m.size())
            .unwrap_or(PhysicalSize::new(1920, 1080));
        let width = ((screen.width as f32 * self.settings.width_fraction) as u32).max(200);

        let attrs = WindowAttributes::default()
            .with_title("Glyphfall")
            .with_transparent(true)
            .with_decorations(false)
            .with_window_level(WindowLevel::AlwaysOnTop)
            .with_inner_size(PhysicalSize::new(width, screen.height));

        let window = Arc::new(event_loop.create_window(attrs).expect("create window"));
        self.window = Some(window);
        self.init_gpu();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                self.window_size = size;
                self.reconfigure_surface();
                if let Some(driver) = self.driver.as_mut() {
                    driver.resize(size.width.max(1), size.height.max(1));
                }
            }
            WindowEvent::RedrawRequested => {
                self.render();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        // Fixed-cadence animation without busy-waiting: redraw when a full
        // frame interval has passed, otherwise sleep out the remainder.
        let elapsed = self
            .last_frame
            .map(|t| t.elapsed())
            .unwrap_or(FRAME_INTERVAL);
        if elapsed >= FRAME_INTERVAL {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        } else {
            event_loop.set_control_flow(ControlFlow::wait_duration(FRAME_INTERVAL - elapsed));
        }
    }
}

// ──────────────────────────────────────────────
// Entry point
// ──────────────────────────────────────────────

fn main() {
    env_logger::init();

    let settings = settings::load_settings();

    let event_loop = EventLoop::new().expect("create event loop");
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(settings);
    event_loop.run_app(&mut app).expect("run event loop");
}
