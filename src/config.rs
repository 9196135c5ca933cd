// Command-line knobs. Defaults reproduce the stock effect.

use std::path::PathBuf;

use clap::Parser;

use crate::error::Error;

pub const DEFAULT_WIDTH: usize = 1200;
pub const DEFAULT_HEIGHT: usize = 800;

#[derive(Parser, Debug, Clone)]
#[command(name = "pixel-eye", version, about = "8-bit grayscale eye that assembles from tiles and bursts when you click the pupil")]
pub struct Config {
    /// Initial window width; also the fallback when the window reports zero.
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    pub width: usize,

    /// Initial window height; also the fallback when the window reports zero.
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    pub height: usize,

    /// Grid columns (synthesized image width in cells).
    #[arg(long, default_value_t = 160)]
    pub cols: usize,

    /// Grid rows (synthesized image height in cells).
    #[arg(long, default_value_t = 120)]
    pub rows: usize,

    /// Fraction of a cell covered by its tile; the rest is gutter.
    #[arg(long, default_value_t = 0.75)]
    pub fill: f32,

    /// Seed for lashes, scatter and glitches. Random when omitted.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Where to go once the eye has burst.
    #[arg(long, default_value = "search.html")]
    pub destination: String,

    /// Write the synthesized color/depth/pupil buffers as PNGs into this directory.
    #[arg(long)]
    pub dump: Option<PathBuf>,

    /// Draw phase, tile count and FPS in the corner plus a pointer crosshair.
    #[arg(long)]
    pub hud: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            cols: 160,
            rows: 120,
            fill: 0.75,
            seed: None,
            destination: "search.html".into(),
            dump: None,
            hud: false,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), Error> {
        if self.cols == 0 || self.rows == 0 {
            return Err(Error::config(format!("grid must be at least 1x1, got {}x{}", self.cols, self.rows)));
        }
        if !(self.fill > 0.0 && self.fill <= 1.0) {
            return Err(Error::config(format!("fill must be in (0, 1], got {}", self.fill)));
        }
        Ok(())
    }

    /// Viewport to use for a reported window size, falling back to the configured default on zero.
    pub fn viewport(&self, width: usize, height: usize) -> (usize, usize) {
        let w = if width == 0 { self.width.max(1) } else { width };
        let h = if height == 0 { self.height.max(1) } else { height };
        (w, h)
    }
}
