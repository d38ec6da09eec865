// Frame driver: owns the simulation, the instance staging vector, and the
// renderer. Pull-based: the event loop decides when to tick; the driver
// never sleeps or schedules anything itself.

use glyphfall_core::DockItem;
use glyphfall_renderer::RainRenderer;
use glyphfall_sim::{fill_instances, CellInstance, DropTuning, RainGrid};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// GPU resources exist but no surface size has been adopted yet.
    Uninitialized,
    Ready,
    /// A reallocation is in progress; ticks are dropped rather than drawn
    /// against mismatched buffer sizes.
    Resizing,
}

pub struct FrameDriver {
    renderer: RainRenderer,
    grid: RainGrid,
    instances: Vec<CellInstance>,
    cell_size: f32,
    phase: Phase,
}

impl FrameDriver {
    pub fn new(renderer: RainRenderer, tuning: DropTuning, cell_size: f32) -> Self {
        Self {
            renderer,
            grid: RainGrid::new(tuning),
            instances: Vec::new(),
            cell_size,
            phase: Phase::Uninitialized,
        }
    }

    pub fn set_dock_items(&mut self, items: Vec<DockItem>) {
        self.renderer.set_dock_items(items);
    }

    /// Adopt a new surface size. The grid only reallocates when the derived
    /// cell dimensions actually changed; the GPU targets are always rebuilt
    /// to match the surface exactly.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.phase = Phase::Resizing;

        let cols = ((width as f32 / self.cell_size).floor() as usize).max(1);
        let rows = ((height as f32 / self.cell_size).floor() as usize).max(1);
        if self.grid.resize(cols, rows) {
            log::debug!("grid reallocated to {}x{} cells", cols, rows);
        }
        self.renderer.resize(width, height);

        self.phase = Phase::Ready;
    }

    /// One frame: advance the simulation by `dt` seconds (clamped inside the
    /// grid), rebuild and upload the instance records, and encode the render
    /// passes ending in `surface_view`.
    pub fn tick(
        &mut self,
        dt: f64,
        encoder: &mut wgpu::CommandEncoder,
        surface_view: &wgpu::TextureView,
    ) {
        if self.phase != Phase::Ready {
            return;
        }
        self.grid.advance(dt);
        fill_instances(&self.grid, self.cell_size, &mut self.instances);
        self.renderer.upload_instances(&self.instances);
        self.renderer.render(encoder, surface_view);
    }
}
