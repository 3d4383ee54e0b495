/// Fly3D Web - WASM bindings for the browser render layer
///
/// Hands the interleaved vertex data, element indices and per-frame matrices
/// to JavaScript, which owns the WebGL/WGPU context and all GPU calls.
use fly3d_core::{
    CameraSettings, FrameUniforms, FreeCamera, Mesh, MouseButton, Movement, Projection,
    ProjectionSettings, VertexBuffer,
};
use nalgebra::{Point3, Vector3};
use wasm_bindgen::prelude::*;

/// A parsed mesh with its position + normal vertex buffer
#[wasm_bindgen]
pub struct WebMesh {
    mesh: Mesh,
    buffer: VertexBuffer,
}

#[wasm_bindgen]
impl WebMesh {
    /// Parse OFF text and build the interleaved buffer.
    pub fn from_off(text: &str) -> Result<WebMesh, JsValue> {
        Self::build(text).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Interleaved floats, `stride_floats()` per vertex
    pub fn vertices(&self) -> Vec<f32> {
        self.buffer.as_slice().to_vec()
    }

    /// Triangle indices for an element buffer
    pub fn indices(&self) -> Vec<u32> {
        self.mesh.indices()
    }

    pub fn vertex_count(&self) -> usize {
        self.buffer.vertex_count()
    }

    pub fn stride_floats(&self) -> usize {
        self.buffer.stride()
    }

    pub fn stride_bytes(&self) -> usize {
        self.buffer.stride_bytes()
    }

    /// Byte offset of each attribute, in attribute-location order
    pub fn attribute_offsets(&self) -> Vec<u32> {
        self.buffer
            .attributes()
            .iter()
            .map(|a| a.offset_bytes() as u32)
            .collect()
    }
}

impl WebMesh {
    fn build(text: &str) -> fly3d_core::Result<WebMesh> {
        let mesh = fly3d_core::parse_off(text)?;
        let buffer = mesh.vertex_buffer()?;
        log::info!(
            "mesh ready: {} vertices, {} faces",
            mesh.vertex_count(),
            mesh.face_count()
        );
        Ok(WebMesh { mesh, buffer })
    }
}

/// Camera and projection driven by DOM events
#[wasm_bindgen]
pub struct WebViewer {
    camera: FreeCamera,
    projection: Projection,
    uniforms: FrameUniforms,
}

#[wasm_bindgen]
impl WebViewer {
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32) -> WebViewer {
        WebViewer {
            camera: FreeCamera::new(
                Point3::new(0.0, 0.0, 3.0),
                -Vector3::z(),
                Vector3::y(),
                CameraSettings::default(),
            ),
            projection: Projection::from_settings(&ProjectionSettings::default(), width, height),
            uniforms: FrameUniforms::default(),
        }
    }

    /// `MouseEvent.button`: 0 left, 1 middle, 2 right
    pub fn mouse_down(&mut self, button: i16, x: f64, y: f64) {
        self.camera.cursor_moved(x, y);
        if let Some(button) = dom_button(button) {
            self.camera.mouse_pressed(button);
        }
    }

    pub fn mouse_up(&mut self, button: i16) {
        if let Some(button) = dom_button(button) {
            self.camera.mouse_released(button);
        }
    }

    pub fn mouse_move(&mut self, x: f64, y: f64) {
        self.camera.cursor_moved(x, y);
    }

    /// `KeyboardEvent.code`, e.g. `"KeyW"`
    pub fn key_down(&mut self, code: &str) {
        if let Some(movement) = dom_movement(code) {
            self.camera.key_pressed(movement);
        }
    }

    pub fn key_up(&mut self, code: &str) {
        if let Some(movement) = dom_movement(code) {
            self.camera.key_released(movement);
        }
    }

    pub fn blur(&mut self) {
        self.camera.release_all();
    }

    /// `WheelEvent.deltaY` is positive when scrolling down
    pub fn wheel(&mut self, delta_y: f32) {
        if delta_y != 0.0 {
            self.projection.scroll(-delta_y.signum());
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.projection.resize(width, height);
    }

    /// Advance one frame and return `[view, projection]`, each 16 floats column-major.
    pub fn frame(&mut self) -> Vec<f32> {
        self.camera.update();
        self.camera.reset(&mut self.uniforms);
        self.projection.reset(&mut self.uniforms);

        let mut matrices = Vec::with_capacity(32);
        matrices.extend_from_slice(self.uniforms.view.as_slice());
        matrices.extend_from_slice(self.uniforms.projection.as_slice());
        matrices
    }
}

fn dom_button(button: i16) -> Option<MouseButton> {
    match button {
        0 => Some(MouseButton::Left),
        1 => Some(MouseButton::Middle),
        2 => Some(MouseButton::Right),
        _ => None,
    }
}

fn dom_movement(code: &str) -> Option<Movement> {
    match code {
        "KeyW" | "ArrowUp" => Some(Movement::Forward),
        "KeyS" | "ArrowDown" => Some(Movement::Backward),
        "KeyA" | "ArrowLeft" => Some(Movement::Left),
        "KeyD" | "ArrowRight" => Some(Movement::Right),
        "Space" => Some(Movement::Up),
        _ => None,
    }
}

#[wasm_bindgen(start)]
pub fn main() {
    // Logging is best effort; a second init only fails
    let _ = console_log::init_with_level(log::Level::Info);
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE: &str = "OFF\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2\n";

    #[test]
    fn test_web_mesh_layout() {
        let mesh = WebMesh::build(TRIANGLE).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.stride_bytes(), 24);
        assert_eq!(mesh.attribute_offsets(), vec![0, 12]);
        assert_eq!(mesh.indices(), vec![0, 1, 2]);
        assert_eq!(&mesh.vertices()[3..6], &[0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_build_reports_errors() {
        assert!(WebMesh::build("OFF\n3 1 0\n").is_err());
    }

    #[test]
    fn test_viewer_frame() {
        let mut viewer = WebViewer::new(800, 600);
        viewer.key_down("KeyW");
        let matrices = viewer.frame();
        assert_eq!(matrices.len(), 32);
        viewer.key_up("KeyW");

        viewer.wheel(120.0);
        viewer.frame();
        assert_eq!(viewer.projection.fovy(), 46.0);
    }
}
