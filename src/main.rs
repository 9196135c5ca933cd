// What you SEE:
// • Gray tiles fly in from all around the window and assemble into an 8-bit eye.
// • Move the mouse: the eye turns to follow it, and eases back when the pointer leaves.
// • Once assembled, click the black pupil: the tiles burst outward, the frame flips
//   hue and brightens, then the program hands off to the destination and exits.
// • Resize the window to start the assembly over. ESC quits.

mod config;
mod draw;
mod error;
mod export;
mod fx;
mod gaze;
mod grid;
mod input;
mod navigate;
mod scene;
mod synth;
mod tiles;
mod types;

use clap::Parser;
use config::Config;
use draw::{Drawer, draw_crosshair, draw_text_5x7};
use error::Error;
use navigate::{Navigator, PendingNavigation, StdoutNavigator};
use scene::{FrameOutcome, Scene};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use types::FrameBuffer;

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = Config::parse();
    cfg.validate()?;

    /* --- Window setup ---
       Visual: a black window opens at the configured size. */
    let mut drawer = Drawer::new("Pixel Eye", cfg.width, cfg.height)?;
    let clock = Instant::now();
    let now_ms = || clock.elapsed().as_secs_f64() * 1000.0;

    let (w, h) = drawer.size();
    let viewport = cfg.viewport(w, h);
    let mut screen = FrameBuffer::new(viewport.0, viewport.1);
    let mut scene = Scene::new(&cfg, viewport, now_ms());

    if let Some(dir) = &cfg.dump {
        export::dump_buffers(scene.eye(), dir)?;
    }

    let mut navigator: Box<dyn Navigator> = Box::new(StdoutNavigator);
    let mut pending: Option<PendingNavigation> = None;

    /* --- HUD / FPS --- */
    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;
    let mut hud_fps_text = String::from("FPS: 0.0");

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        let now = now_ms();

        /* 1) Resize: a new window size throws the eye away and starts over. */
        let (w, h) = drawer.size();
        let viewport = cfg.viewport(w, h);
        if scene.resize(viewport, now) {
            screen.resize(viewport.0, viewport.1);
        }

        /* 2) Pointer: move / leave / click */
        match drawer.mouse_pos() {
            Some((mx, my)) => scene.pointer_moved(mx, my),
            None => scene.pointer_left(),
        }
        if let Some((cx, cy)) = drawer.clicked() {
            scene.click(cx, cy, now);
        }

        /* 3) Draw the tiles. After the burst, the last filtered frame stays on screen. */
        match scene.frame(now, &mut screen) {
            FrameOutcome::Continue => {}
            FrameOutcome::Finished => pending = Some(PendingNavigation::schedule(cfg.destination.clone(), now)),
            FrameOutcome::Halted => {}
        }

        /* 4) Debug overlay */
        if cfg.hud && pending.is_none() {
            if let Some((mx, my)) = drawer.mouse_pos() {
                draw_crosshair(&mut screen, mx as i32, my as i32, 12, 0x00_FF_CC_33);
            }
            let hud = format!("{} | TILES {} | {}", scene.phase().label(), scene.tile_count(), hud_fps_text);
            draw_text_5x7(&mut screen, 8, 8, &hud, 0x00_FF_FF_FF);
        }

        /* 5) Present */
        drawer.present(&screen)?;

        /* 6) Delayed hand-off, then leave. */
        if let Some(p) = pending.as_mut() {
            if p.poll(now_ms(), navigator.as_mut()) {
                break;
            }
        }

        /* 7) FPS counter (debug log + HUD once per second) */
        frames_this_second += 1;
        let tick = Instant::now();
        if tick.duration_since(last_fps_time) >= Duration::from_secs(1) {
            let secs = tick.duration_since(last_fps_time).as_secs_f32();
            let fps = frames_this_second as f32 / secs;
            tracing::debug!(fps, "frame rate");
            hud_fps_text = format!("FPS: {:.1}", fps);
            frames_this_second = 0;
            last_fps_time = tick;
        }
    }

    Ok(())
}
