/// Fly3D Core Library - CPU-side mesh and view preparation for rendering
///
/// Loads OFF meshes, estimates per-vertex normals, assembles interleaved vertex
/// buffers and keeps the free camera and perspective projection a render loop
/// publishes every frame.

pub mod camera;
pub mod config;
pub mod error;
pub mod geometry;
pub mod normals;
pub mod off;
pub mod projection;
pub mod transform;
pub mod uniforms;
pub mod vertex_buffer;

// Re-export commonly used types
pub use camera::{FreeCamera, MouseButton, Movement, MovementKeys};
pub use config::{CameraSettings, ProjectionSettings};
pub use error::{MeshError, Result, Section};
pub use geometry::{Cell, Face, Mesh, Triangle};
pub use off::{load_off, parse_off, read_off, save_off, write_off};
pub use projection::Projection;
pub use transform::Transform;
pub use uniforms::{FrameUniforms, UniformSink};
pub use vertex_buffer::{AttributeKind, VertexAttribute, VertexBuffer, VertexBufferBuilder};
