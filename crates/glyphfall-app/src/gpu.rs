use std::sync::Arc;

use glyphfall_renderer::{GlyphAtlas, IconMetrics, RainRenderer};

use crate::driver::FrameDriver;
use crate::{dock, App};

impl App {
    pub(crate) fn init_gpu(&mut self) {
        let window = self.window.as_ref().unwrap().clone();
        self.window_size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window).expect("create surface");

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .expect("no suitable GPU adapter found");

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("glyphfall_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .expect("failed to create device");

        let device = Arc::new(device);
        let queue = Arc::new(queue);

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .copied()
            .unwrap_or(caps.formats[0]);

        // The overlay only works see-through when the compositor honors the
        // surface alpha channel.
        let alpha_mode = [
            wgpu::CompositeAlphaMode::PreMultiplied,
            wgpu::CompositeAlphaMode::PostMultiplied,
        ]
        .into_iter()
        .find(|m| caps.alpha_modes.contains(m))
        .unwrap_or(caps.alpha_modes[0]);
        if alpha_mode == wgpu::CompositeAlphaMode::Opaque {
            log::warn!("compositor offers no alpha mode; overlay will be opaque");
        }

        // Prefer Mailbox (low latency, no tearing) > Fifo (vsync fallback)
        let present_mode = if caps.present_modes.contains(&wgpu::PresentMode::Mailbox) {
            wgpu::PresentMode::Mailbox
        } else {
            wgpu::PresentMode::Fifo
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: self.window_size.width.max(1),
            height: self.window_size.height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        // Atlas: a configured image that fails to decode disables the scene
        // pass for the whole session; with no image configured the atlas is
        // baked from the system monospace font instead.
        let atlas = match self.settings.atlas_image.as_deref() {
            Some(path) => match GlyphAtlas::load(&device, &queue, path) {
                Ok(atlas) => Some(atlas),
                Err(e) => {
                    log::error!(
                        "glyph atlas {} unusable, scene pass disabled: {}",
                        path.display(),
                        e
                    );
                    None
                }
            },
            None => Some(GlyphAtlas::bake(&device, &queue)),
        };

        let renderer = RainRenderer::new(
            Arc::clone(&device),
            Arc::clone(&queue),
            format,
            atlas,
            self.settings.cell_size,
            self.settings.bloom(),
            IconMetrics::default(),
        );

        let mut driver = FrameDriver::new(renderer, self.settings.tuning(), self.settings.cell_size);

        // Blocking fetch is fine here: it runs once, before the first frame.
        driver.set_dock_items(dock::fetch_dock_items());
        driver.resize(config.width, config.height);

        self.surface = Some(surface);
        self.device = Some(device);
        self.queue = Some(queue);
        self.surface_config = Some(config);
        self.driver = Some(driver);
    }

    pub(crate) fn reconfigure_surface(&mut self) {
        if let (Some(surface), Some(device), Some(config)) = (
            self.surface.as_ref(),
            self.device.as_ref(),
            self.surface_config.as_mut(),
        ) {
            config.width = self.window_size.width.max(1);
            config.height = self.window_size.height.max(1);
            surface.configure(device, config);
        }
    }
}
