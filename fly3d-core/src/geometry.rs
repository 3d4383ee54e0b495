/// Geometry primitives for 3D rendering
use nalgebra::{Point3, Vector3};

use crate::error::{MeshError, Result};
use crate::normals;
use crate::vertex_buffer::{AttributeKind, VertexBuffer};

/// A triangle face: three vertex indices, counter-clockwise.
pub type Face = [u32; 3];

/// A tetrahedral cell: four vertex indices.
pub type Cell = [u32; 4];

/// A triangle resolved against a position list
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub vertices: [Point3<f32>; 3],
}

impl Triangle {
    pub fn new(v0: Point3<f32>, v1: Point3<f32>, v2: Point3<f32>) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Unnormalized `(v1 - v0) x (v2 - v0)`; its length is twice the area.
    pub fn cross(&self) -> Vector3<f32> {
        let [v0, v1, v2] = self.vertices;
        (v1 - v0).cross(&(v2 - v0))
    }

    /// Unit face normal, or `None` when the cross product is exactly zero or
    /// not finite. Small but valid triangles still get a normal.
    pub fn calculate_normal(&self) -> Option<Vector3<f32>> {
        let cross = self.cross();
        let norm = cross.norm();
        (norm > 0.0 && norm.is_finite()).then(|| cross / norm)
    }
}

/// An indexed mesh as read from an OFF file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<Point3<f32>>,
    pub faces: Vec<Face>,
    /// Volume cells; carried along but never rendered
    pub cells: Vec<Cell>,
}

impl Mesh {
    pub fn new(positions: Vec<Point3<f32>>, faces: Vec<Face>, cells: Vec<Cell>) -> Self {
        Self {
            positions,
            faces,
            cells,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Resolve face `index` into its three positions.
    pub fn triangle(&self, index: usize) -> Result<Triangle> {
        let face = self.faces.get(index).ok_or(MeshError::FaceOutOfRange {
            face: index,
            face_count: self.faces.len(),
        })?;
        let corner = |i: u32| {
            self.positions
                .get(i as usize)
                .copied()
                .ok_or(MeshError::IndexOutOfRange {
                    face: index,
                    index: i,
                    vertex_count: self.positions.len(),
                })
        };
        Ok(Triangle::new(corner(face[0])?, corner(face[1])?, corner(face[2])?))
    }

    /// Per-vertex unit normals; vertices with no faces keep a zero vector.
    pub fn vertex_normals(&self) -> Result<Vec<Vector3<f32>>> {
        let mut normals = normals::accumulate_vertex_normals(&self.positions, &self.faces)?;
        normals::normalize_vertex_normals(&mut normals);
        Ok(normals)
    }

    /// Interleaved position + normal buffer, ready for upload.
    pub fn vertex_buffer(&self) -> Result<VertexBuffer> {
        let normals = self.vertex_normals()?;
        let mut buffer = VertexBuffer::from_positions_3d(&self.positions);
        buffer.append_attribute_3d(AttributeKind::Normal, &normals)?;
        Ok(buffer)
    }

    /// Flat triangle index list for an element buffer.
    pub fn indices(&self) -> Vec<u32> {
        self.faces.iter().flatten().copied().collect()
    }

    /// Create a simple cube mesh for testing
    pub fn cube(size: f32) -> Self {
        let half = size / 2.0;
        let positions = vec![
            Point3::new(-half, -half, -half),
            Point3::new(half, -half, -half),
            Point3::new(half, half, -half),
            Point3::new(-half, half, -half),
            Point3::new(-half, -half, half),
            Point3::new(half, -half, half),
            Point3::new(half, half, half),
            Point3::new(-half, half, half),
        ];

        let faces = vec![
            // Front
            [4, 5, 6],
            [4, 6, 7],
            // Back
            [0, 3, 2],
            [0, 2, 1],
            // Top
            [3, 7, 6],
            [3, 6, 2],
            // Bottom
            [0, 1, 5],
            [0, 5, 4],
            // Right
            [1, 2, 6],
            [1, 6, 5],
            // Left
            [0, 4, 7],
            [0, 7, 3],
        ];

        Self::new(positions, faces, Vec::new())
    }
}
