//! Tunable camera and projection parameters

/// Free camera tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSettings {
    /// World units moved per frame while a movement key is held
    pub speed: f32,
    /// Degrees of yaw/pitch per pixel of cursor travel
    pub sensitivity: f32,
    /// Pitch is clamped to `[-pitch_limit, pitch_limit]` degrees
    pub pitch_limit: f32,
}

impl CameraSettings {
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_sensitivity(mut self, sensitivity: f32) -> Self {
        self.sensitivity = sensitivity;
        self
    }
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            speed: 0.05,
            sensitivity: 0.1,
            pitch_limit: 89.0,
        }
    }
}

/// Perspective parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionSettings {
    /// Vertical field of view in degrees
    pub fovy: f32,
    pub near: f32,
    pub far: f32,
}

impl ProjectionSettings {
    pub fn with_fovy(mut self, fovy: f32) -> Self {
        self.fovy = fovy;
        self
    }
}

impl Default for ProjectionSettings {
    fn default() -> Self {
        Self {
            fovy: 45.0,
            near: 0.1,
            far: 100.0,
        }
    }
}
