// The frame loop state: grid, eye buffers, tiles, gaze and the burst.
// Visual expectation per phase:
//   Scattered   -> tiles sprinkled far around the window, nothing moving yet
//   Assembling  -> tiles glide in one by one and settle into the eye
//   Assembled   -> the eye follows the pointer, occasional scanline glitch
//   Dispersing  -> tiles blow outward from the clicked pupil
//   Navigated   -> filtered last frame, loop stops drawing

use rand::{SeedableRng, rngs::SmallRng};

use crate::config::Config;
use crate::draw::fill_rect;
use crate::fx;
use crate::gaze::Gaze;
use crate::grid;
use crate::synth::{self, EyeImage};
use crate::tiles::{self, perspective};
use crate::types::{FrameBuffer, Grid, ScreenRect, Tile, gray};

// Live projection focal length; longer than the static relief pre-pass.
const LIVE_FOCAL: f32 = 1.8;
pub const DISPERSE_MS: f64 = 2000.0;
const BACKGROUND: u32 = 0x00_00_00_00;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Scattered,
    Assembling,
    Assembled,
    Dispersing,
    Navigated,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Scattered => "SCATTERED",
            Phase::Assembling => "ASSEMBLING",
            Phase::Assembled => "ASSEMBLED",
            Phase::Dispersing => "DISPERSING",
            Phase::Navigated => "NAVIGATED",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Keep calling `frame`.
    Continue,
    /// The burst just ended and the page filter was applied. Reported once.
    Finished,
    /// Nothing drawn; the loop is over for this epoch.
    Halted,
}

pub struct Scene {
    cols: usize,
    rows: usize,
    fill: f32,
    pub(crate) viewport: (usize, usize),
    pub(crate) grid: Grid,
    pub(crate) center: (f32, f32),
    pub(crate) eye: EyeImage,
    pub(crate) tiles: Vec<Tile>,
    pub(crate) gaze: Gaze,
    pub(crate) pointer: Option<(f32, f32)>,
    pub(crate) phase: Phase,
    start_ms: f64,
    pub(crate) disperse_start_ms: f64,
    pub(crate) rng: SmallRng,
}

/// Symmetric half-cosine ease; 0 -> 0, 1 -> 1.
#[inline]
pub fn ease_in_out_sine(t: f32) -> f32 {
    0.5 * (1.0 - (std::f32::consts::PI * t.clamp(0.0, 1.0)).cos())
}

/// Local assembly time of one tile, clamped to [0, 1].
#[inline]
pub fn assembly_progress(elapsed_ms: f64, delay_ms: f32, duration_ms: f32) -> f32 {
    let t = (elapsed_ms - delay_ms as f64) / (duration_ms.max(f32::EPSILON) as f64);
    t.clamp(0.0, 1.0) as f32
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Per-frame camera: scene center, normalisation radii and the gaze rotation.
struct View {
    cx: f32,
    cy: f32,
    rx: f32,
    ry: f32,
    half: f32,
    cos_x: f32,
    sin_x: f32,
    cos_y: f32,
    sin_y: f32,
}

impl View {
    fn new(center: (f32, f32), grid: &Grid, gaze: &Gaze) -> Self {
        let (rx, ry) = grid.radii();
        // Pitch is inverted so pointer-up turns the eye up.
        let (sin_x, cos_x) = (-gaze.pitch).sin_cos();
        let (sin_y, cos_y) = gaze.yaw.sin_cos();
        Self { cx: center.0, cy: center.1, rx, ry, half: grid.size * 0.5, cos_x, sin_x, cos_y, sin_y }
    }

    /// Map the tile's resting spot onto the eyeball, turn it by the gaze, project it back.
    /// Returns the rotated top-left and the perspective factor.
    fn project(&self, tile: &Tile) -> (f32, f32, f32) {
        let u = (tile.target_x + self.half - self.cx) / self.rx.max(1.0);
        let v = (tile.target_y + self.half - self.cy) / self.ry.max(1.0);
        let z_sphere = (1.0 - u * u - v * v).max(0.0).sqrt();
        let relief = (tile.depth - 0.4) * 1.2;
        let z = (0.6 * z_sphere + 0.4 * relief).clamp(-1.0, 1.0);

        // Around X (pitch), then around Y (yaw).
        let y1 = v * self.cos_x - z * self.sin_x;
        let z1 = v * self.sin_x + z * self.cos_x;
        let x2 = u * self.cos_y + z1 * self.sin_y;
        let z2 = -u * self.sin_y + z1 * self.cos_y;

        let persp = perspective(LIVE_FOCAL, z2);
        (
            self.cx + x2 * self.rx * persp - self.half,
            self.cy + y1 * self.ry * persp - self.half,
            persp,
        )
    }
}

/// Everything derived from the viewport size in one rebuild.
struct Epoch {
    grid: Grid,
    center: (f32, f32),
    eye: EyeImage,
    tiles: Vec<Tile>,
}

impl Epoch {
    fn build(viewport: (usize, usize), cols: usize, rows: usize, rng: &mut SmallRng) -> Self {
        let grid = grid::plan(viewport.0, viewport.1, cols, rows);
        let center = (viewport.0 as f32 / 2.0, viewport.1 as f32 / 2.0);
        let eye = synth::synthesize(cols as u32, rows as u32, rng);
        let tiles = tiles::build(&eye, &grid, center, rng);
        Self { grid, center, eye, tiles }
    }

    fn log(&self, viewport: (usize, usize)) {
        tracing::info!(
            width = viewport.0,
            height = viewport.1,
            cell = self.grid.size,
            tiles = self.tiles.len(),
            "rebuilt eye"
        );
    }
}

impl Scene {
    pub fn new(cfg: &Config, viewport: (usize, usize), now_ms: f64) -> Self {
        let mut rng = match cfg.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::seed_from_u64(rand::random()),
        };
        let epoch = Epoch::build(viewport, cfg.cols, cfg.rows, &mut rng);
        epoch.log(viewport);
        Self {
            cols: cfg.cols,
            rows: cfg.rows,
            fill: cfg.fill,
            viewport,
            grid: epoch.grid,
            center: epoch.center,
            eye: epoch.eye,
            tiles: epoch.tiles,
            gaze: Gaze::default(),
            pointer: None,
            phase: Phase::Scattered,
            start_ms: now_ms,
            disperse_start_ms: 0.0,
            rng,
        }
    }

    /// Throw everything away and start a fresh epoch for this viewport.
    pub fn rebuild(&mut self, viewport: (usize, usize), now_ms: f64) {
        let epoch = Epoch::build(viewport, self.cols, self.rows, &mut self.rng);
        epoch.log(viewport);
        self.viewport = viewport;
        self.grid = epoch.grid;
        self.center = epoch.center;
        self.eye = epoch.eye;
        self.tiles = epoch.tiles;
        self.phase = Phase::Scattered;
        self.start_ms = now_ms;
        self.disperse_start_ms = 0.0;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn eye(&self) -> &EyeImage {
        &self.eye
    }

    /// Draw one frame at `now_ms` into `fb` (sized to the viewport).
    pub fn frame(&mut self, now_ms: f64, fb: &mut FrameBuffer) -> FrameOutcome {
        if self.phase == Phase::Navigated {
            return FrameOutcome::Halted;
        }
        fb.clear(BACKGROUND);

        self.gaze.update(self.pointer, self.center, self.grid.radii());
        let view = View::new(self.center, &self.grid, &self.gaze);

        let dispersing = self.phase == Phase::Dispersing;
        let burst = if dispersing {
            ease_in_out_sine(((now_ms - self.disperse_start_ms) / DISPERSE_MS) as f32)
        } else {
            0.0
        };
        let (vw, vh) = (fb.width as f32, fb.height as f32);
        let elapsed = now_ms - self.start_ms;
        let size = self.grid.size;

        let mut all_assembled = true;
        let mut any_moving = false;
        for tile in &mut self.tiles {
            let local = assembly_progress(elapsed, tile.delay_ms, tile.duration_ms);
            all_assembled &= local >= 1.0;
            any_moving |= local > 0.0;
            let eased = ease_in_out_sine(local);

            let (rot_x, rot_y, persp) = view.project(tile);
            let mut px = lerp(tile.start_x, rot_x, eased);
            let mut py = lerp(tile.start_y, rot_y, eased);
            if dispersing {
                px += tile.disperse.0 * burst;
                py += tile.disperse.1 * burst;
            }

            let s = size * self.fill * persp;
            let gutter = (size - s) * 0.5;
            let rect = ScreenRect { x: px + gutter, y: py + gutter, size: s };
            tile.screen = rect;

            if dispersing && (rect.x + s < 0.0 || rect.x > vw || rect.y + s < 0.0 || rect.y > vh) {
                continue;
            }
            let shade = 0.4 + 0.6 * tile.depth;
            fill_rect(fb, rect, gray(tile.gray as f32 * shade));
        }

        if !dispersing {
            let next = if all_assembled {
                Phase::Assembled
            } else if any_moving {
                Phase::Assembling
            } else {
                Phase::Scattered
            };
            if next != self.phase {
                tracing::debug!(from = ?self.phase, to = ?next, "phase change");
                self.phase = next;
            }
        }

        if self.phase == Phase::Assembled {
            let bands = fx::maybe_glitch(fb, &mut self.rng);
            if bands > 0 {
                tracing::trace!(bands, "glitch");
            }
        }

        if dispersing && now_ms - self.disperse_start_ms >= DISPERSE_MS {
            fx::page_filter(fb, 180.0, 1.5);
            self.phase = Phase::Navigated;
            tracing::info!("burst finished");
            return FrameOutcome::Finished;
        }
        FrameOutcome::Continue
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::navigate::PendingNavigation;
    use crate::navigate::tests::RecordingNavigator;

    pub(crate) fn scene(seed: u64) -> (Scene, FrameBuffer) {
        let cfg = Config { seed: Some(seed), ..Config::default() };
        (Scene::new(&cfg, (800, 600), 0.0), FrameBuffer::new(800, 600))
    }

    /// Run frames until every tile has landed.
    pub(crate) fn assembled(seed: u64) -> (Scene, FrameBuffer) {
        let (mut s, mut fb) = scene(seed);
        assert_eq!(s.frame(2600.0, &mut fb), FrameOutcome::Continue);
        assert_eq!(s.phase(), Phase::Assembled);
        (s, fb)
    }

    #[test]
    fn easing_is_monotonic_and_hits_one() {
        let mut last = 0.0;
        for i in 0..=400 {
            let p = assembly_progress(i as f64 * 10.0, 250.0, 1500.0);
            assert!(p >= last && p <= 1.0);
            let e = ease_in_out_sine(p);
            assert!((0.0..=1.0).contains(&e));
            last = p;
        }
        assert_eq!(assembly_progress(1750.0, 250.0, 1500.0), 1.0);
        assert_eq!(assembly_progress(1e7, 250.0, 1500.0), 1.0);
        assert_eq!(assembly_progress(100.0, 250.0, 1500.0), 0.0);
        assert_eq!(ease_in_out_sine(0.0), 0.0);
        assert!((ease_in_out_sine(1.0) - 1.0).abs() < 1e-6);
        assert!((ease_in_out_sine(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn phases_follow_the_clock() {
        let (mut s, mut fb) = scene(1);
        assert_eq!(s.tile_count(), s.eye().visible_cells());
        s.frame(0.0, &mut fb);
        assert_eq!(s.phase(), Phase::Scattered);
        s.frame(400.0, &mut fb);
        assert_eq!(s.phase(), Phase::Assembling);
        s.frame(2600.0, &mut fb);
        assert_eq!(s.phase(), Phase::Assembled);
    }

    #[test]
    fn assembled_frame_draws_the_eye() {
        let (s, fb) = assembled(2);
        assert!(fb.pixels.iter().any(|&p| p != BACKGROUND));
        // Near-black pupil tiles stay dark after shading.
        let pupil = s
            .tiles
            .iter()
            .filter(|t| t.is_pupil)
            .min_by(|a, b| {
                let da = (a.screen.center().0 - 400.0).hypot(a.screen.center().1 - 300.0);
                let db = (b.screen.center().0 - 400.0).hypot(b.screen.center().1 - 300.0);
                da.total_cmp(&db)
            })
            .unwrap();
        let (cx, cy) = pupil.screen.center();
        let px = fb.pixels[cy as usize * fb.width + cx as usize] & 0xFF;
        assert!(px < 10, "pupil pixel {px:#x}");
    }

    #[test]
    fn resting_tiles_match_projection_with_centered_gaze() {
        let (s, _) = assembled(3);
        let view = View::new(s.center, &s.grid, &s.gaze);
        for t in s.tiles.iter().take(50) {
            let (x, y, persp) = view.project(t);
            let size = s.grid.size * s.fill * persp;
            let gutter = (s.grid.size - size) * 0.5;
            assert!((t.screen.x - (x + gutter)).abs() < 1e-3);
            assert!((t.screen.y - (y + gutter)).abs() < 1e-3);
        }
    }

    #[test]
    fn burst_ends_with_exactly_one_navigation() {
        let (mut s, mut fb) = assembled(4);
        let (hx, hy) = s.tiles.iter().find(|t| t.is_pupil).unwrap().screen.center();
        assert!(s.click(hx, hy, 3000.0));

        let mut nav = RecordingNavigator::default();
        let mut pending = None;
        let mut t = 3000.0;
        while t < 7000.0 {
            match s.frame(t, &mut fb) {
                FrameOutcome::Finished => {
                    assert!(pending.is_none());
                    pending = Some(PendingNavigation::schedule("search.html", t));
                }
                FrameOutcome::Halted => assert!(t >= 5000.0),
                FrameOutcome::Continue => assert!(t < 5000.0),
            }
            if let Some(p) = pending.as_mut() {
                p.poll(t, &mut nav);
            }
            t += 16.0;
        }
        assert_eq!(s.phase(), Phase::Navigated);
        assert_eq!(nav.visits.len(), 1);
    }
}
