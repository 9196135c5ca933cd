// Smooths the pointer into a yaw/pitch the eye turns toward.
// Visual: the eye follows the cursor with a short lag and drifts back to center when it leaves.

pub const MAX_YAW: f32 = 0.6; // left-right, radians
pub const MAX_PITCH: f32 = 0.45; // up-down, radians
const SMOOTHING: f32 = 0.25;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Gaze {
    pub target_yaw: f32,
    pub target_pitch: f32,
    pub yaw: f32,
    pub pitch: f32,
}

impl Gaze {
    /// One frame of tracking. `pointer` is None once the pointer has left the surface;
    /// the target then returns to zero while the current angles keep easing.
    pub fn update(&mut self, pointer: Option<(f32, f32)>, center: (f32, f32), radii: (f32, f32)) {
        match pointer {
            Some((px, py)) => {
                let nx = ((px - center.0) / radii.0.max(1.0)).clamp(-1.0, 1.0);
                let ny = ((py - center.1) / radii.1.max(1.0)).clamp(-1.0, 1.0);
                self.target_yaw = nx * MAX_YAW;
                self.target_pitch = ny * MAX_PITCH;
            }
            None => self.release(),
        }
        self.yaw += (self.target_yaw - self.yaw) * SMOOTHING;
        self.pitch += (self.target_pitch - self.pitch) * SMOOTHING;
    }

    pub fn release(&mut self) {
        self.target_yaw = 0.0;
        self.target_pitch = 0.0;
    }
}
