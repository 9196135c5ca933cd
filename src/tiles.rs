// Turns the synthesized eye into tiles: one per visible cell, each with a scatter
// start, a relief-projected resting spot and its own arrival timing.

use rand::Rng;

use crate::synth::EyeImage;
use crate::types::{Grid, ScreenRect, Tile};

// Static relief pre-pass. The per-frame projection uses a longer focal length.
const STATIC_FOCAL: f32 = 1.6;
pub const DEPTH_SCALE: f32 = 0.9;

const MAX_DELAY_MS: f32 = 300.0;
const MIN_DURATION_MS: f32 = 1200.0;
const MAX_DURATION_MS: f32 = 2200.0;
const SCATTER_SPREAD: f32 = 2.0; // in multiples of max(cols, rows) cells

/// Pinhole scale for a point at pseudo-depth `z` in [-1, 1].
#[inline]
pub fn perspective(focal: f32, z: f32) -> f32 {
    focal / (focal - z * DEPTH_SCALE)
}

/// Build the tile set for the given layout. `center` is the scene (viewport) center.
pub fn build<R: Rng + ?Sized>(eye: &EyeImage, grid: &Grid, center: (f32, f32), rng: &mut R) -> Vec<Tile> {
    let (scx, scy) = center;
    let half = grid.size * 0.5;
    let spread = grid.cols.max(grid.rows) as f32 * SCATTER_SPREAD;
    let mut tiles = Vec::with_capacity(eye.visible_cells());

    // Bulk walk over the three buffers in lockstep.
    let cells = eye.color.enumerate_pixels().zip(eye.depth.pixels()).zip(eye.pupil.pixels());
    for (((x, y, color), depth), pupil) in cells {
        if color[1] == 0 {
            continue;
        }
        let z = depth[0];

        let base_x = grid.origin_x + x as f32 * grid.size + half;
        let base_y = grid.origin_y + y as f32 * grid.size + half;
        let persp = perspective(STATIC_FOCAL, (z - 0.5) * 2.0);
        let target_x = scx + (base_x - scx) * persp - half;
        let target_y = scy + (base_y - scy) * persp - half;

        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
        let radius = rng.gen_range(0.0..spread) * grid.size;
        let delay_ms = rng.gen_range(0.0..MAX_DELAY_MS);
        let duration_ms = rng.gen_range(MIN_DURATION_MS..MAX_DURATION_MS);

        tiles.push(Tile {
            start_x: target_x + angle.cos() * radius,
            start_y: target_y + angle.sin() * radius,
            target_x,
            target_y,
            gray: color[0],
            depth: z,
            is_pupil: pupil[0] > 0,
            delay_ms,
            duration_ms,
            screen: ScreenRect::default(),
            disperse: (0.0, 0.0),
        });
    }
    tiles
}
