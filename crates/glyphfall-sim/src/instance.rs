// Per-cell render records for the instanced scene pass.

use bytemuck::{Pod, Zeroable};

use crate::RainGrid;

/// Exponent of the tail falloff curve. Sub-linear: brightness stays high
/// over most of the tail and only drops off near its end.
pub const BRIGHTNESS_FALLOFF: f32 = 0.7;

/// One record per grid cell, rebuilt from scratch every frame and uploaded
/// verbatim as the instance buffer of the scene pass. 32-byte stride.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct CellInstance {
    /// Top-left corner of the cell in surface pixels.
    pub position: [f32; 2],
    pub glyph_index: u32,
    pub brightness: f32,
    /// 1.0 for the leading cell of a drop, 0.0 otherwise.
    pub is_head: f32,
    pub _pad: [f32; 3],
}

/// Brightness of a cell `dist` rows behind a drop head. Zero outside the
/// half-open interval `[0, tail_length)`; the cell at exactly one tail
/// length behind the head is already invisible.
pub fn tail_brightness(dist: f64, tail_length: f64) -> f32 {
    if dist >= 0.0 && dist < tail_length {
        (1.0 - (dist / tail_length) as f32).powf(BRIGHTNESS_FALLOFF)
    } else {
        0.0
    }
}

/// Rewrite `out` from the current grid state: one record per cell at
/// `index = col * rows + row`. The vector is resized only when the grid
/// dimensions changed since the previous fill, so the steady-state path
/// performs no allocation. A full scan of tens of thousands of cells runs
/// every frame.
pub fn fill_instances(grid: &RainGrid, cell_size: f32, out: &mut Vec<CellInstance>) {
    let cols = grid.cols();
    let rows = grid.rows();
    let count = cols * rows;
    if out.len() != count {
        out.clear();
        out.resize(count, CellInstance::zeroed());
    }

    for col in 0..cols {
        let drop = grid.drops()[col];
        let x = col as f32 * cell_size;
        for row in 0..rows {
            let index = col * rows + row;
            let dist = drop.position - row as f64;
            let visible = dist >= 0.0 && dist < drop.tail_length;
            out[index] = CellInstance {
                position: [x, row as f32 * cell_size],
                glyph_index: grid.cell(col, row),
                brightness: if visible {
                    tail_brightness(dist, drop.tail_length)
                } else {
                    0.0
                },
                is_head: if visible && dist < 1.0 { 1.0 } else { 0.0 },
                _pad: [0.0; 3],
            };
        }
    }
}
