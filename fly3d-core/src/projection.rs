/// Perspective projection with scroll-wheel zoom
use nalgebra::Matrix4;

use crate::config::ProjectionSettings;
use crate::uniforms::{FrameUniforms, UniformSink};

/// Perspective state; field of view is the only field input changes
#[derive(Debug, Clone)]
pub struct Projection {
    /// Vertical field of view in degrees, never below zero
    fovy: f32,
    aspect: f32,
    near: f32,
    far: f32,
    matrix: Matrix4<f32>,
    uniform_name: String,
}

impl Projection {
    pub fn new(fovy: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut projection = Self {
            fovy: fovy.max(0.0),
            aspect,
            near,
            far,
            matrix: Matrix4::identity(),
            uniform_name: FrameUniforms::PROJECTION.to_owned(),
        };
        projection.matrix = projection.compute_matrix();
        projection
    }

    pub fn from_settings(settings: &ProjectionSettings, width: u32, height: u32) -> Self {
        Self::new(
            settings.fovy,
            aspect_ratio(width, height),
            settings.near,
            settings.far,
        )
    }

    /// Publish under a different uniform name than `"projection"`.
    pub fn with_uniform_name(mut self, name: impl Into<String>) -> Self {
        self.uniform_name = name.into();
        self
    }

    pub fn fovy(&self) -> f32 {
        self.fovy
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    /// Projection matrix as of the last `reset`.
    pub fn matrix(&self) -> &Matrix4<f32> {
        &self.matrix
    }

    /// Zoom: scrolling up narrows the field of view. Only the lower bound of
    /// zero is enforced.
    pub fn scroll(&mut self, delta: f32) {
        self.fovy = (self.fovy - delta).max(0.0);
    }

    /// Track a viewport resize. A zero dimension counts as one pixel.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = aspect_ratio(width, height);
    }

    /// Recompute the perspective matrix and publish it. Call once per frame,
    /// after the frame's scroll events.
    pub fn reset<S: UniformSink + ?Sized>(&mut self, sink: &mut S) -> &Matrix4<f32> {
        self.matrix = self.compute_matrix();
        sink.set_matrix(&self.uniform_name, &self.matrix);
        &self.matrix
    }

    fn compute_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_perspective(self.aspect, self.fovy.to_radians(), self.near, self.far)
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::from_settings(&ProjectionSettings::default(), 800, 600)
    }
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}
