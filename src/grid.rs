// Fits a fixed cols x rows grid of square cells into the viewport.

use crate::types::Grid;

/// Largest integer cell size that fits both axes, with the grid centered.
pub fn plan(viewport_w: usize, viewport_h: usize, cols: usize, rows: usize) -> Grid {
    let w = viewport_w as f32;
    let h = viewport_h as f32;
    let size = (w / cols.max(1) as f32).min(h / rows.max(1) as f32).floor();
    let used_w = size * cols as f32;
    let used_h = size * rows as f32;
    Grid {
        cols,
        rows,
        size,
        origin_x: ((w - used_w) / 2.0).floor(),
        origin_y: ((h - used_h) / 2.0).floor(),
    }
}
