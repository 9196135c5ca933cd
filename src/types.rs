// Core types shared by the synthesizer, the tile builder and the frame loop.

#[derive(Clone)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the frame is on screen (pixels)
    pub height: usize,     // how tall the frame is on screen (pixels)
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![0u32; width * height] }
    }

    /// Reallocate for a new window size. Contents are black afterwards.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width * height, 0);
    }

    pub fn clear(&mut self, color: u32) {
        self.pixels.fill(color);
    }
}

/// Pack a gray level into 0x00RRGGBB. Truncates then clamps, like a CSS `rgb()` built from `v|0`.
#[inline]
pub fn gray(v: f32) -> u32 {
    let g = (v.trunc() as i32).clamp(0, 255) as u32;
    (g << 16) | (g << 8) | g
}

/// Square cell layout of the eye on screen. Recomputed on every resize.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Grid {
    pub cols: usize,
    pub rows: usize,
    pub size: f32,      // integer-valued cell edge in pixels
    pub origin_x: f32,  // top-left of the grid, centering it in the viewport
    pub origin_y: f32,
}

impl Grid {
    /// Half of the drawn grid extent per axis, used to normalise scene coordinates.
    pub fn radii(&self) -> (f32, f32) {
        (self.size * self.cols as f32 * 0.5, self.size * self.rows as f32 * 0.5)
    }
}

/// Axis-aligned square as it was last drawn, in viewport pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScreenRect {
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

impl ScreenRect {
    /// Inclusive on all four edges.
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.size && py >= self.y && py <= self.y + self.size
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.size * 0.5, self.y + self.size * 0.5)
    }
}

/// One square of the eye. Created on rebuild, never patched afterwards
/// except for `screen` (every frame) and `disperse` (once, on trigger).
#[derive(Clone, Debug)]
pub struct Tile {
    pub start_x: f32,   // scatter origin (top-left)
    pub start_y: f32,
    pub target_x: f32,  // relief-projected resting spot (top-left)
    pub target_y: f32,
    pub gray: u8,
    pub depth: f32,     // 0 = far, 1 = near
    pub is_pupil: bool,
    pub delay_ms: f32,
    pub duration_ms: f32,
    pub screen: ScreenRect,
    pub disperse: (f32, f32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gray_packs_all_three_channels() {
        assert_eq!(gray(0x12 as f32), 0x00_12_12_12);
        assert_eq!(gray(300.0), 0x00_FF_FF_FF);
        assert_eq!(gray(-4.0), 0);
        assert_eq!(gray(99.9), gray(99.0));
    }

    #[test]
    fn screen_rect_edges_are_inclusive() {
        let r = ScreenRect { x: 10.0, y: 20.0, size: 5.0 };
        assert!(r.contains(10.0, 20.0));
        assert!(r.contains(15.0, 25.0));
        assert!(!r.contains(15.01, 22.0));
        assert!(!r.contains(9.99, 22.0));
        assert_eq!(r.center(), (12.5, 22.5));
    }

    #[test]
    fn resize_reallocates_black() {
        let mut fb = FrameBuffer::new(4, 4);
        fb.clear(0x00_FF_FF_FF);
        fb.resize(3, 2);
        assert_eq!(fb.pixels.len(), 6);
        assert!(fb.pixels.iter().all(|&p| p == 0));
    }
}
