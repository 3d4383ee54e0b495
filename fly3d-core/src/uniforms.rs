/// Per-frame matrix publishing boundary
use std::collections::HashMap;

use nalgebra::Matrix4;

/// Receiver for the matrices a frame publishes, keyed by uniform name.
///
/// A GPU backend forwards these to its shader program; the terminal viewer
/// just keeps them for its CPU rasterizer.
pub trait UniformSink {
    fn set_matrix(&mut self, name: &str, value: &Matrix4<f32>);
}

impl UniformSink for HashMap<String, Matrix4<f32>> {
    fn set_matrix(&mut self, name: &str, value: &Matrix4<f32>) {
        self.insert(name.to_owned(), *value);
    }
}

/// The two matrices a frame needs, filled in by `reset` calls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
}

impl FrameUniforms {
    pub const VIEW: &'static str = "camera";
    pub const PROJECTION: &'static str = "projection";

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection * self.view
    }
}

impl Default for FrameUniforms {
    fn default() -> Self {
        Self {
            view: Matrix4::identity(),
            projection: Matrix4::identity(),
        }
    }
}

impl UniformSink for FrameUniforms {
    fn set_matrix(&mut self, name: &str, value: &Matrix4<f32>) {
        match name {
            Self::VIEW => self.view = *value,
            Self::PROJECTION => self.projection = *value,
            other => log::trace!("ignoring uniform `{other}`"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_uniforms_routes_by_name() {
        let mut frame = FrameUniforms::default();
        let scale = Matrix4::new_scaling(2.0);
        frame.set_matrix("projection", &scale);
        frame.set_matrix("model", &Matrix4::zeros());

        assert_eq!(frame.projection, scale);
        assert_eq!(frame.view, Matrix4::identity());
        assert_eq!(frame.view_projection(), scale);
    }

    #[test]
    fn test_map_sink_records() {
        let mut sink: HashMap<String, Matrix4<f32>> = HashMap::new();
        sink.set_matrix("camera", &Matrix4::identity());
        assert_eq!(sink.get("camera"), Some(&Matrix4::identity()));
    }
}
