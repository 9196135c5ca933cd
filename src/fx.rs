// FX: scanline glitch on the assembled eye, and the one-shot filter before leaving.
// Visual outcomes:
// - Once in a while a thin horizontal slice of the frame jumps sideways and up/down.
// - When the burst ends the whole frame flips hue and brightens.

use rand::Rng;

use crate::types::FrameBuffer;

pub const GLITCH_CHANCE: f64 = 0.015;

/// Roll for a glitch this frame and, if it hits, smear 1-2 bands of the drawn frame.
/// Returns how many bands were moved.
pub fn maybe_glitch<R: Rng + ?Sized>(fb: &mut FrameBuffer, rng: &mut R) -> usize {
    if fb.height < 4 || !rng.gen_bool(GLITCH_CHANCE) {
        return 0;
    }
    let bands = rng.gen_range(1..=2);
    for _ in 0..bands {
        let src_y = rng.gen_range(0..fb.height - 3);
        let h = rng.gen_range(2..12);
        let dx = rng.gen_range(-5..=5);
        let dy = rng.gen_range(-4..=4);
        shift_band(fb, src_y, h, dx, dy);
    }
    bands
}

/// Copy rows [src_y, src_y + h) to start at src_y + dy, shifted right by dx.
/// Pixels that would land outside the frame are dropped; uncovered ones keep their old value.
pub fn shift_band(fb: &mut FrameBuffer, src_y: usize, h: usize, dx: i32, dy: i32) {
    let w = fb.width;
    let end = (src_y + h).min(fb.height);
    if src_y >= end {
        return;
    }
    // Snapshot first; source and destination may overlap.
    let band: Vec<u32> = fb.pixels[src_y * w..end * w].to_vec();

    for (row, line) in band.chunks_exact(w).enumerate() {
        let ty = src_y as i32 + row as i32 + dy;
        if ty < 0 || ty >= fb.height as i32 {
            continue;
        }
        let dst = &mut fb.pixels[ty as usize * w..(ty as usize + 1) * w];
        for (x, &px) in line.iter().enumerate() {
            let tx = x as i32 + dx;
            if tx >= 0 && (tx as usize) < w {
                dst[tx as usize] = px;
            }
        }
    }
}

/// `hue-rotate(deg) brightness(b)` over the whole frame, like a CSS filter on the page body.
pub fn page_filter(fb: &mut FrameBuffer, hue_deg: f32, brightness: f32) {
    let m = hue_matrix(hue_deg);
    for px in &mut fb.pixels {
        let r = ((*px >> 16) & 0xFF) as f32;
        let g = ((*px >> 8) & 0xFF) as f32;
        let b = (*px & 0xFF) as f32;

        let mix = |row: [f32; 3]| -> u32 {
            let v = (row[0] * r + row[1] * g + row[2] * b) * brightness;
            v.round().clamp(0.0, 255.0) as u32
        };
        *px = (mix(m[0]) << 16) | (mix(m[1]) << 8) | mix(m[2]);
    }
}

// Filter Effects hue-rotate matrix (luminance preserving).
fn hue_matrix(deg: f32) -> [[f32; 3]; 3] {
    let (s, c) = deg.to_radians().sin_cos();
    [
        [
            0.213 + c * 0.787 - s * 0.213,
            0.715 - c * 0.715 - s * 0.715,
            0.072 - c * 0.072 + s * 0.928,
        ],
        [
            0.213 - c * 0.213 + s * 0.143,
            0.715 + c * 0.285 + s * 0.140,
            0.072 - c * 0.072 - s * 0.283,
        ],
        [
            0.213 - c * 0.213 - s * 0.787,
            0.715 - c * 0.715 + s * 0.715,
            0.072 + c * 0.928 + s * 0.072,
        ],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::gray;
    use rand::{SeedableRng, rngs::SmallRng};

    fn striped(w: usize, h: usize) -> FrameBuffer {
        let mut fb = FrameBuffer::new(w, h);
        for y in 0..h {
            for x in 0..w {
                fb.pixels[y * w + x] = (y as u32) << 8 | x as u32;
            }
        }
        fb
    }

    #[test]
    fn band_moves_sideways_and_down() {
        let mut fb = striped(8, 8);
        shift_band(&mut fb, 2, 2, 1, 3);
        // Row 2 landed on row 5, one pixel to the right.
        assert_eq!(fb.pixels[5 * 8 + 1], (2 << 8) | 0);
        assert_eq!(fb.pixels[6 * 8 + 7], (3 << 8) | 6);
        // Left edge of the destination is untouched.
        assert_eq!(fb.pixels[5 * 8], 5 << 8);
        // Source rows are not cleared.
        assert_eq!(fb.pixels[2 * 8 + 3], (2 << 8) | 3);
    }

    #[test]
    fn band_past_the_edges_is_clipped() {
        let mut fb = striped(4, 4);
        shift_band(&mut fb, 2, 10, -6, 3);
        shift_band(&mut fb, 0, 1, 0, -2);
        assert_eq!(fb.pixels, striped(4, 4).pixels);
    }

    #[test]
    fn glitch_is_rare() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut fb = striped(64, 64);
        let hits = (0..10_000).filter(|_| maybe_glitch(&mut fb, &mut rng) > 0).count();
        assert!((80..250).contains(&hits), "hits = {hits}");
    }

    #[test]
    fn filter_keeps_grays_gray_and_brightens() {
        let mut fb = FrameBuffer::new(3, 1);
        fb.pixels = vec![gray(100.0), gray(0.0), gray(220.0)];
        page_filter(&mut fb, 180.0, 1.5);
        assert_eq!(fb.pixels[0], gray(150.0));
        assert_eq!(fb.pixels[1], 0);
        assert_eq!(fb.pixels[2], gray(255.0));
    }

    #[test]
    fn zero_rotation_is_identity() {
        let mut fb = FrameBuffer::new(1, 1);
        fb.pixels[0] = 0x00_30_80_C0;
        page_filter(&mut fb, 0.0, 1.0);
        assert_eq!(fb.pixels[0], 0x00_30_80_C0);
    }
}
