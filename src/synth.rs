// Procedural eye: turns grid coordinates into gray level, visibility, depth and a pupil flag.
// Visual expectation: an almond-shaped open eye with a ringed iris, black pupil,
// dark upper lid band, lighter lower lid band, a moist inner corner and lash speckles.

use image::{GrayAlphaImage, GrayImage, ImageBuffer, Luma, LumaA};
use rand::Rng;

/// Depth per cell in [0,1]; 0 = far, 1 = near.
pub type DepthMap = ImageBuffer<Luma<f32>, Vec<f32>>;

const UPPER_LASH_CHANCE: f64 = 0.26;
const LOWER_LASH_CHANCE: f64 = 0.16;
const LASH_GRAY: u8 = 15;
pub const UPPER_LASH_DEPTH: f32 = 0.80;
pub const LOWER_LASH_DEPTH: f32 = 0.78;

/// The three parallel buffers the tile builder reads in one pass.
pub struct EyeImage {
    pub color: GrayAlphaImage, // luma = gray level, alpha = 0 (empty) or 255 (eye)
    pub depth: DepthMap,
    pub pupil: GrayImage,      // 255 where the cell belongs to the pupil
}

impl EyeImage {
    pub fn width(&self) -> u32 {
        self.color.width()
    }

    pub fn height(&self) -> u32 {
        self.color.height()
    }

    /// Number of visible cells; equals the tile count after a rebuild.
    pub fn visible_cells(&self) -> usize {
        self.color.pixels().filter(|p| p[1] > 0).count()
    }
}

/// One synthesized cell before it is written into the buffers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Texel {
    pub gray: u8,
    pub alpha: u8,
    pub depth: f32,
}

impl Texel {
    const EMPTY: Texel = Texel { gray: 0, alpha: 0, depth: 0.0 };

    fn solid(gray: u8, depth: f32) -> Self {
        Self { gray, alpha: 255, depth }
    }
}

/// Analytic eye geometry. Every length is a fraction of min(width, height).
#[derive(Clone, Copy, Debug)]
pub struct EyeShape {
    pub cx: f32,
    pub cy: f32,
    pub eye_w: f32,
    pub eye_h: f32,
    pub iris_r: f32,
    pub pupil_r: f32,
    upper_lid: f32,
    lower_lid: f32,
    fissure_lift: f32,
    canthus_tilt: f32,
    top_band_max: f32,
    bot_band_max: f32,
    tear_x: f32,
    tear_y: f32,
    tear_r: f32,
}

impl EyeShape {
    pub fn for_raster(width: u32, height: u32) -> Self {
        let (w, h) = (width as f32, height as f32);
        let eye_w = w.min(h) * 0.92;
        let eye_h = eye_w * 0.52;
        let iris_r = eye_w * 0.2;
        let cx = w / 2.0;
        let cy = h / 2.0;
        Self {
            cx,
            cy,
            eye_w,
            eye_h,
            iris_r,
            pupil_r: iris_r * 0.3,
            upper_lid: eye_h * 0.16,
            lower_lid: eye_h * 0.10,
            fissure_lift: eye_h * 0.08,
            canthus_tilt: eye_h * 0.04,
            top_band_max: eye_h * 0.10,
            bot_band_max: eye_h * 0.06,
            tear_x: cx - eye_w * 0.45,
            tear_y: cy,
            tear_r: eye_w * 0.06,
        }
    }

    /// Horizontal coordinate normalised so the eye spans u in [-1, 1].
    #[inline]
    pub fn u(&self, x: f32) -> f32 {
        (x - self.cx) / (self.eye_w * 0.5)
    }

    // Upper lid: tapered corners, fuller center, pulled toward the outer canthus.
    fn almond_top(&self, u: f32) -> f32 {
        let a = (1.0 - u.abs()).max(0.0).powf(0.9);
        let outer_bias = 0.08 * u;
        self.upper_lid * (0.5 + 0.6 * a) - self.canthus_tilt * u + outer_bias * self.eye_h
    }

    // Lower lid: flatter than the top.
    fn almond_bot(&self, u: f32) -> f32 {
        let a = (1.0 - u.abs()).max(0.0).powf(1.1);
        let outer_bias = 0.05 * u;
        self.lower_lid * (0.35 + 0.5 * a) - self.canthus_tilt * u + outer_bias * self.eye_h * 0.5
    }

    fn band_top(&self, u: f32) -> f32 {
        self.top_band_max * (1.0 - u.abs()).max(0.0).powf(0.7)
    }

    fn band_bot(&self, u: f32) -> f32 {
        self.bot_band_max * (1.0 - u.abs()).max(0.0).powf(0.8)
    }

    /// Upper and lower edge of the open fissure at horizontal position `u`.
    pub fn lid_curves(&self, u: f32) -> (f32, f32) {
        (
            self.cy - self.fissure_lift - self.almond_top(u),
            self.cy + self.fissure_lift + self.almond_bot(u),
        )
    }

    /// The deterministic part of the image: everything except lashes.
    pub fn texel(&self, x: f32, y: f32) -> Texel {
        let mut t = Texel::EMPTY;
        let dx = x - self.cx;
        let dy = y - self.cy;
        let u = self.u(x);

        if (x - self.tear_x).hypot(y - self.tear_y) < self.tear_r {
            t = Texel::solid(200, 0.55);
        }

        if u.abs() > 1.0 {
            return t;
        }

        let (y_top, y_bot) = self.lid_curves(u);

        if y >= y_top && y <= y_bot {
            t = Texel::solid(220, 0.40);
            let mut g = 220.0_f32;

            let rx = dx / (self.eye_w * 0.5);
            let ry = dy / (self.eye_h * 0.5);
            let dome = (1.0 - (rx * rx + ry * ry)).max(0.0).sqrt();
            t.depth = t.depth.max(0.40 + dome * 0.15);

            let d = dx.hypot(dy);
            if d <= self.iris_r {
                let angle = dy.atan2(dx);
                let radius = d / self.iris_r;
                let rings = 0.4 + 0.6 * (radius * 15.0 + angle * 3.0).cos() * (radius * 8.0 + angle * 2.0).sin();
                g = (90.0 + rings * 70.0).round();
                t.depth = t.depth.max(0.50 + dome * 0.10);
                if d < self.pupil_r {
                    g = 5.0;
                    t.depth = 0.35;
                }
            }

            // Soft shadow cast by the lids onto the eyeball.
            let edge = (y - y_top).max(0.0).min((y_bot - y).max(0.0));
            let shadow = (1.0 - edge / (self.upper_lid * 0.40)).max(0.0);
            g = (g * (1.0 - shadow * 0.16)).round();
            t.gray = g.clamp(0.0, 255.0) as u8;
        }

        let top_band = y_top - self.band_top(u);
        let bot_band = y_bot + self.band_bot(u);
        if y >= top_band && y < y_top {
            t = Texel::solid(70, 0.70);
        }
        if y > y_bot && y <= bot_band {
            t = Texel::solid(180, 0.60);
        }
        t
    }

    /// Lash speckle for a cell, if the dice say so. Only the region beyond the lids is eligible.
    pub fn lash<R: Rng + ?Sized>(&self, x: f32, y: f32, rng: &mut R) -> Option<Texel> {
        let u = self.u(x);
        let (y_top, y_bot) = self.lid_curves(u);
        let mut lash = None;
        if u.abs() <= 0.9 && y < y_top - 1.0 && rng.gen_bool(UPPER_LASH_CHANCE) {
            lash = Some(Texel::solid(LASH_GRAY, UPPER_LASH_DEPTH));
        }
        if u.abs() <= 0.75 && y > y_bot + 1.0 && rng.gen_bool(LOWER_LASH_CHANCE) {
            lash = Some(Texel::solid(LASH_GRAY, LOWER_LASH_DEPTH));
        }
        lash
    }

    /// Geometric pupil membership, before visibility is considered.
    pub fn in_pupil(&self, x: f32, y: f32) -> bool {
        (x - self.cx).hypot(y - self.cy) < self.pupil_r
    }
}

/// Render the eye into `cols x rows` buffers. Lash placement draws from `rng`.
pub fn synthesize<R: Rng + ?Sized>(cols: u32, rows: u32, rng: &mut R) -> EyeImage {
    let shape = EyeShape::for_raster(cols, rows);
    let mut color = GrayAlphaImage::new(cols, rows);
    let mut depth = DepthMap::new(cols, rows);
    let mut pupil = GrayImage::new(cols, rows);

    for y in 0..rows {
        for x in 0..cols {
            let (fx, fy) = (x as f32, y as f32);
            let mut t = shape.texel(fx, fy);
            if let Some(lash) = shape.lash(fx, fy, rng) {
                t = lash;
            }
            color.put_pixel(x, y, LumaA([t.gray, t.alpha]));
            depth.put_pixel(x, y, Luma([t.depth.clamp(0.0, 1.0)]));
            let is_pupil = t.alpha > 0 && shape.in_pupil(fx, fy);
            pupil.put_pixel(x, y, Luma([if is_pupil { 255 } else { 0 }]));
        }
    }

    tracing::debug!(cols, rows, visible = color.pixels().filter(|p| p[1] > 0).count(), "eye synthesized");
    EyeImage { color, depth, pupil }
}
