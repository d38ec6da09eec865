// Character-grid rain simulation.
// Owns the glyph grid and one falling drop per column; the renderer consumes
// the state through fill_instances() once per frame.

mod instance;
mod tests;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub use instance::{fill_instances, tail_brightness, CellInstance, BRIGHTNESS_FALLOFF};

/// Number of selectable glyphs; matches the 8×8 atlas grid.
pub const GLYPH_COUNT: u32 = 64;

/// Largest simulation step (seconds) a single frame may consume. Caps the
/// jump after a stall, e.g. resume from a suspended session.
pub const MAX_FRAME_DT: f64 = 0.1;

// ──────────────────────────────────────────────
// Drops
// ──────────────────────────────────────────────

/// Falling-stream state for one column. `position` is the head row in row
/// units; it may sit below 0 (above the screen) or beyond the row count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RainDrop {
    pub position: f64,
    pub speed: f64,
    pub tail_length: f64,
}

/// Randomization ranges for drop resets and the ambient glyph flicker.
#[derive(Debug, Clone, Copy)]
pub struct DropTuning {
    /// Fall speed range in rows/second.
    pub speed_min: f64,
    pub speed_max: f64,
    /// Tail length range in rows.
    pub tail_min: f64,
    pub tail_max: f64,
    /// Per-column probability per second of re-randomizing one glyph.
    pub flicker_rate: f64,
}

impl Default for DropTuning {
    fn default() -> Self {
        Self {
            speed_min: 10.0,
            speed_max: 30.0,
            tail_min: 10.0,
            tail_max: 50.0,
            flicker_rate: 0.5,
        }
    }
}

// ──────────────────────────────────────────────
// RainGrid
// ──────────────────────────────────────────────

/// The simulation arena: a contiguous column-major glyph grid plus one drop
/// per column. Starts empty (0×0); call `resize` before the first `advance`.
pub struct RainGrid {
    cols: usize,
    rows: usize,
    /// Glyph index per cell, `index = col * rows + row`.
    cells: Vec<u32>,
    drops: Vec<RainDrop>,
    tuning: DropTuning,
    rng: StdRng,
}

impl RainGrid {
    pub fn new(tuning: DropTuning) -> Self {
        Self::with_rng(tuning, StdRng::from_entropy())
    }

    /// Deterministic variant for tests and reproducible runs.
    pub fn with_seed(tuning: DropTuning, seed: u64) -> Self {
        Self::with_rng(tuning, StdRng::seed_from_u64(seed))
    }

    fn with_rng(tuning: DropTuning, rng: StdRng) -> Self {
        Self {
            cols: 0,
            rows: 0,
            cells: Vec::new(),
            drops: Vec::new(),
            tuning,
            rng,
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cell(&self, col: usize, row: usize) -> u32 {
        self.cells[col * self.rows + row]
    }

    pub fn drops(&self) -> &[RainDrop] {
        &self.drops
    }

    /// Direct drop access, e.g. to freeze a column for a scripted scene.
    pub fn drop_mut(&mut self, col: usize) -> &mut RainDrop {
        &mut self.drops[col]
    }

    /// Adopt new grid dimensions. Returns false (leaving every cell and drop
    /// untouched) when the dimensions are unchanged; otherwise reallocates
    /// both arenas, re-rolls every glyph, and scatters the drops across
    /// `[-rows, rows]` so columns don't start in lockstep.
    pub fn resize(&mut self, cols: usize, rows: usize) -> bool {
        if cols == self.cols && rows == self.rows {
            return false;
        }
        self.cols = cols;
        self.rows = rows;

        self.cells.clear();
        self.cells.resize(cols * rows, 0);
        for i in 0..self.cells.len() {
            self.cells[i] = self.rng.gen_range(0..GLYPH_COUNT);
        }

        self.drops.clear();
        self.drops.resize(
            cols,
            RainDrop {
                position: 0.0,
                speed: 0.0,
                tail_length: 0.0,
            },
        );
        let spread = rows as f64;
        for col in 0..cols {
            self.reset_drop(col);
            self.drops[col].position = self.rng.gen_range(-spread..=spread);
        }
        true
    }

    /// Advance every drop by `dt` seconds (clamped to MAX_FRAME_DT) and
    /// apply the ambient glyph flicker. The off-screen reset check runs
    /// after the position update, so a drop that clears the bottom edge this
    /// frame respawns immediately rather than one frame late.
    pub fn advance(&mut self, dt: f64) {
        let dt = dt.min(MAX_FRAME_DT);
        let bottom = self.rows as f64;

        for col in 0..self.cols {
            self.drops[col].position += self.drops[col].speed * dt;

            if self.drops[col].position - self.drops[col].tail_length > bottom {
                self.reset_drop(col);
            }

            if self.rng.gen::<f64>() < self.tuning.flicker_rate * dt {
                let row = self.rng.gen_range(0..self.rows);
                self.cells[col * self.rows + row] = self.rng.gen_range(0..GLYPH_COUNT);
            }
        }
    }

    fn reset_drop(&mut self, col: usize) {
        let top = -(self.rows as f64);
        self.drops[col] = RainDrop {
            position: self.rng.gen_range(top..=0.0),
            speed: self.rng.gen_range(self.tuning.speed_min..=self.tuning.speed_max),
            tail_length: self.rng.gen_range(self.tuning.tail_min..=self.tuning.tail_max),
        };
    }
}
