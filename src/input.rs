// Pointer, click and resize handling for the scene.
// Visual: moving the pointer turns the eye, clicking the pupil of the finished eye
// blows it apart, resizing the window starts the whole assembly over.

use rand::Rng;

use crate::scene::{Phase, Scene};

/// Burst distance per tile, in multiples of the grid's longer side.
const BURST_MIN: f32 = 2.5;
const BURST_SPREAD: f32 = 1.5;

impl Scene {
    /// Pointer position relative to the surface; read by the gaze on the next frame.
    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.pointer = Some((x, y));
    }

    /// Pointer left the surface: aim back at the center, let the eye ease there.
    pub fn pointer_left(&mut self) {
        self.pointer = None;
        self.gaze.release();
    }

    /// Returns true if this click started the burst.
    /// Only a fully assembled eye reacts, and only to a hit on a pupil tile as last drawn.
    pub fn click(&mut self, x: f32, y: f32, now_ms: f64) -> bool {
        if self.phase != Phase::Assembled {
            tracing::debug!(phase = ?self.phase, "click ignored");
            return false;
        }
        let hit = self.tiles.iter().any(|t| t.is_pupil && t.screen.contains(x, y));
        if !hit {
            return false;
        }
        self.start_disperse(x, y, now_ms);
        true
    }

    fn start_disperse(&mut self, x: f32, y: f32, now_ms: f64) {
        let reach = self.grid.size * self.grid.cols.max(self.grid.rows) as f32;
        for tile in &mut self.tiles {
            let (cx, cy) = tile.screen.center();
            let (vx, vy) = (cx - x, cy - y);
            let len = vx.hypot(vy);
            let len = if len > 0.0 { len } else { 1.0 };
            let mag = reach * (BURST_MIN + self.rng.gen_range(0.0..BURST_SPREAD));
            tile.disperse = (vx / len * mag, vy / len * mag);
        }
        self.phase = Phase::Dispersing;
        self.disperse_start_ms = now_ms;
        tracing::info!(x, y, tiles = self.tiles.len(), "pupil clicked, dispersing");
    }

    /// New window size. Same size is a no-op; anything else starts a new epoch.
    pub fn resize(&mut self, viewport: (usize, usize), now_ms: f64) -> bool {
        if viewport == self.viewport {
            return false;
        }
        self.rebuild(viewport, now_ms);
        true
    }
}

#[cfg(test)]
mod tests {
    use crate::scene::tests::{assembled, scene};
    use crate::scene::{FrameOutcome, Phase};

    // Just off a pupil tile's center, so no tile sits exactly under the click.
    fn pupil_hit(s: &crate::scene::Scene) -> (f32, f32) {
        let (x, y) = s.tiles.iter().find(|t| t.is_pupil).unwrap().screen.center();
        (x + 0.3, y + 0.2)
    }

    #[test]
    fn click_outside_pupil_changes_nothing() {
        let (mut s, _) = assembled(10);
        let before: Vec<_> = s.tiles.iter().map(|t| t.disperse).collect();
        assert!(!s.click(1.0, 1.0, 3000.0));
        // An iris/sclera tile is not a pupil tile.
        let (ix, iy) = s.tiles.iter().find(|t| !t.is_pupil && t.gray > 100).unwrap().screen.center();
        let on_pupil = s.tiles.iter().any(|t| t.is_pupil && t.screen.contains(ix, iy));
        if !on_pupil {
            assert!(!s.click(ix, iy, 3000.0));
        }
        assert_eq!(s.phase(), Phase::Assembled);
        let after: Vec<_> = s.tiles.iter().map(|t| t.disperse).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn pupil_click_before_assembly_is_ignored() {
        let (mut s, mut fb) = scene(11);
        s.frame(500.0, &mut fb);
        assert_eq!(s.phase(), Phase::Assembling);
        let (x, y) = pupil_hit(&s);
        assert!(!s.click(x, y, 500.0));
        assert_eq!(s.phase(), Phase::Assembling);
    }

    #[test]
    fn pupil_click_triggers_once() {
        let (mut s, mut fb) = assembled(12);
        let (x, y) = pupil_hit(&s);
        assert!(s.click(x, y, 3000.0));
        assert_eq!(s.phase(), Phase::Dispersing);
        let first: Vec<_> = s.tiles.iter().map(|t| t.disperse).collect();
        assert!(first.iter().all(|&(dx, dy)| dx.hypot(dy) > 0.0));

        s.frame(3100.0, &mut fb);
        assert!(!s.click(x, y, 3100.0));
        let again: Vec<_> = s.tiles.iter().map(|t| t.disperse).collect();
        assert_eq!(first, again);
    }

    #[test]
    fn burst_points_away_from_the_click() {
        let (mut s, _) = assembled(13);
        let (x, y) = pupil_hit(&s);
        assert!(s.click(x, y, 3000.0));
        let reach = s.grid.size * 160.0;
        for t in &s.tiles {
            let (cx, cy) = t.screen.center();
            let (dx, dy) = t.disperse;
            let mag = dx.hypot(dy);
            assert!(mag >= reach * 2.5 - 1e-2 && mag <= reach * 4.0 + 1e-2);
            // Same direction as click -> tile center (dot product non-negative).
            assert!((cx - x) * dx + (cy - y) * dy >= -1e-3);
        }
    }

    #[test]
    fn resize_starts_a_new_epoch() {
        let (mut s, mut fb) = assembled(14);
        let (x, y) = pupil_hit(&s);
        assert!(s.click(x, y, 3000.0));
        assert!(!s.resize((800, 600), 3100.0));
        assert_eq!(s.phase(), Phase::Dispersing);

        assert!(s.resize((1600, 1200), 3200.0));
        fb.resize(1600, 1200);
        assert_eq!(s.phase(), Phase::Scattered);
        assert_eq!(s.grid.size, 10.0);
        assert_eq!(s.tile_count(), s.eye().visible_cells());
        assert_eq!(s.frame(3200.0, &mut fb), FrameOutcome::Continue);
        assert_eq!(s.phase(), Phase::Scattered);
        s.frame(3200.0 + 2600.0, &mut fb);
        assert_eq!(s.phase(), Phase::Assembled);
    }

    #[test]
    fn leaving_resets_gaze_target() {
        let (mut s, mut fb) = assembled(15);
        s.pointer_moved(800.0, 0.0);
        s.frame(2700.0, &mut fb);
        assert!(s.gaze.target_yaw > 0.0);
        s.pointer_left();
        assert_eq!(s.gaze.target_yaw, 0.0);
        let yaw = s.gaze.yaw;
        s.frame(2716.0, &mut fb);
        assert!(s.gaze.yaw > 0.0 && s.gaze.yaw < yaw);
    }
}
