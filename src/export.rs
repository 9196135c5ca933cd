// Writes the synthesized buffers to disk for inspection.
// Visual expectation: eye_color.png is the small gray eye, eye_depth.png its relief
// (brighter = nearer), eye_pupil.png a white disc on black.

use std::path::{Path, PathBuf};

use image::{GrayImage, Luma};

use crate::error::Error;
use crate::synth::EyeImage;

/// Save all three buffers into `dir` (created if missing). Returns the written paths.
pub fn dump_buffers(eye: &EyeImage, dir: &Path) -> Result<Vec<PathBuf>, Error> {
    std::fs::create_dir_all(dir).map_err(|e| Error::Export {
        path: dir.to_path_buf(),
        source: image::ImageError::IoError(e),
    })?;

    let depth8 = GrayImage::from_fn(eye.width(), eye.height(), |x, y| {
        let z = eye.depth.get_pixel(x, y)[0];
        Luma([(z * 255.0).round().clamp(0.0, 255.0) as u8])
    });

    let color = dir.join("eye_color.png");
    let depth = dir.join("eye_depth.png");
    let pupil = dir.join("eye_pupil.png");
    save(&color, |p| eye.color.save(p))?;
    save(&depth, |p| depth8.save(p))?;
    save(&pupil, |p| eye.pupil.save(p))?;

    tracing::info!(dir = %dir.display(), "dumped eye buffers");
    Ok(vec![color, depth, pupil])
}

fn save(path: &Path, write: impl FnOnce(&Path) -> image::ImageResult<()>) -> Result<(), Error> {
    write(path).map_err(|source| Error::Export { path: path.to_path_buf(), source })
}
