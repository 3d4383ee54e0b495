/// Interleaved vertex buffer whose stride grows as attributes are appended
///
/// Layout is one record per vertex, attributes in append order:
/// `[attr0 .. attr1 .. attrN][attr0 .. ]`. The buffer exposes exactly what an
/// upload call needs: the flat floats, the vertex count, the stride and the
/// per-attribute offsets.
use nalgebra::{Point2, Point3, Vector2, Vector3};

use crate::error::{MeshError, Result};

/// Per-vertex data channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Position,
    Normal,
    TexCoord,
    Color,
    Tangent,
    Bitangent,
}

impl AttributeKind {
    pub fn name(&self) -> &'static str {
        match self {
            AttributeKind::Position => "position",
            AttributeKind::Normal => "normal",
            AttributeKind::TexCoord => "texcoord",
            AttributeKind::Color => "color",
            AttributeKind::Tangent => "tangent",
            AttributeKind::Bitangent => "bitangent",
        }
    }
}

/// Placement of one attribute inside a vertex record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub kind: AttributeKind,
    /// Number of floats this attribute contributes
    pub components: usize,
    /// Offset in floats from the start of the vertex record
    pub offset: usize,
}

impl VertexAttribute {
    pub fn offset_bytes(&self) -> usize {
        self.offset * std::mem::size_of::<f32>()
    }
}

/// Flat, interleaved per-vertex float storage
#[derive(Debug, Clone, PartialEq)]
pub struct VertexBuffer {
    data: Vec<f32>,
    vertex_count: usize,
    stride: usize,
    attributes: Vec<VertexAttribute>,
}

impl VertexBuffer {
    /// Start a buffer with a 3-component position attribute.
    pub fn from_positions_3d(positions: &[Point3<f32>]) -> Self {
        let data = positions.iter().flat_map(|p| [p.x, p.y, p.z]).collect();
        Self::with_first_attribute(data, positions.len(), AttributeKind::Position, 3)
    }

    /// Start a buffer with a 2-component position attribute.
    pub fn from_positions_2d(positions: &[Point2<f32>]) -> Self {
        let data = positions.iter().flat_map(|p| [p.x, p.y]).collect();
        Self::with_first_attribute(data, positions.len(), AttributeKind::Position, 2)
    }

    fn with_first_attribute(
        data: Vec<f32>,
        vertex_count: usize,
        kind: AttributeKind,
        components: usize,
    ) -> Self {
        Self {
            data,
            vertex_count,
            stride: components,
            attributes: vec![VertexAttribute {
                kind,
                components,
                offset: 0,
            }],
        }
    }

    /// Append a 3-component attribute, one value per vertex.
    ///
    /// Rebuilds the whole array, O(vertices x stride). When all attributes are
    /// known up front, [`VertexBufferBuilder`] interleaves once instead.
    pub fn append_attribute_3d(
        &mut self,
        kind: AttributeKind,
        values: &[Vector3<f32>],
    ) -> Result<()> {
        self.check_len(kind, values.len())?;
        self.interleave(kind, 3, |i, out| out.extend_from_slice(values[i].as_slice()));
        Ok(())
    }

    /// Append a 2-component attribute, one value per vertex.
    pub fn append_attribute_2d(
        &mut self,
        kind: AttributeKind,
        values: &[Vector2<f32>],
    ) -> Result<()> {
        self.check_len(kind, values.len())?;
        self.interleave(kind, 2, |i, out| out.extend_from_slice(values[i].as_slice()));
        Ok(())
    }

    fn check_len(&self, kind: AttributeKind, found: usize) -> Result<()> {
        if found != self.vertex_count {
            return Err(MeshError::ShapeMismatch {
                attribute: kind.name(),
                expected: self.vertex_count,
                found,
            });
        }
        Ok(())
    }

    // Builds into scratch storage and swaps it in, so `self` is untouched until
    // the new array is complete.
    fn interleave<F>(&mut self, kind: AttributeKind, components: usize, mut write: F)
    where
        F: FnMut(usize, &mut Vec<f32>),
    {
        let old_stride = self.stride;
        let mut data = Vec::with_capacity(self.vertex_count * (old_stride + components));
        for (i, record) in self.data.chunks_exact(old_stride).enumerate() {
            data.extend_from_slice(record);
            write(i, &mut data);
        }

        self.data = data;
        self.attributes.push(VertexAttribute {
            kind,
            components,
            offset: old_stride,
        });
        self.stride = old_stride + components;
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Backing storage as raw bytes, for buffer uploads.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Floats per vertex.
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn stride_bytes(&self) -> usize {
        self.stride * std::mem::size_of::<f32>()
    }

    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    /// First attribute of the given kind.
    pub fn attribute(&self, kind: AttributeKind) -> Option<&VertexAttribute> {
        self.attributes.iter().find(|a| a.kind == kind)
    }

    /// Offset in floats of attribute `index`: the component sum of all earlier attributes.
    pub fn attribute_offset(&self, index: usize) -> Option<usize> {
        self.attributes.get(index).map(|a| a.offset)
    }

    /// The full record for vertex `index`.
    pub fn vertex(&self, index: usize) -> Option<&[f32]> {
        if index >= self.vertex_count {
            return None;
        }
        let start = index * self.stride;
        Some(&self.data[start..start + self.stride])
    }

    /// One attribute's components for vertex `index`.
    pub fn vertex_attribute(&self, index: usize, kind: AttributeKind) -> Option<&[f32]> {
        let attribute = self.attribute(kind)?;
        let record = self.vertex(index)?;
        Some(&record[attribute.offset..attribute.offset + attribute.components])
    }
}

/// Collects attribute arrays, then interleaves them in a single pass
#[derive(Debug, Clone)]
pub struct VertexBufferBuilder {
    vertex_count: usize,
    attributes: Vec<(AttributeKind, usize, Vec<f32>)>,
}

impl VertexBufferBuilder {
    pub fn with_positions_3d(positions: &[Point3<f32>]) -> Self {
        let flat = positions.iter().flat_map(|p| [p.x, p.y, p.z]).collect();
        Self {
            vertex_count: positions.len(),
            attributes: vec![(AttributeKind::Position, 3, flat)],
        }
    }

    pub fn with_positions_2d(positions: &[Point2<f32>]) -> Self {
        let flat = positions.iter().flat_map(|p| [p.x, p.y]).collect();
        Self {
            vertex_count: positions.len(),
            attributes: vec![(AttributeKind::Position, 2, flat)],
        }
    }

    pub fn attribute_3d(mut self, kind: AttributeKind, values: &[Vector3<f32>]) -> Self {
        let flat = values.iter().flat_map(|v| [v.x, v.y, v.z]).collect();
        self.attributes.push((kind, 3, flat));
        self
    }

    pub fn attribute_2d(mut self, kind: AttributeKind, values: &[Vector2<f32>]) -> Self {
        let flat = values.iter().flat_map(|v| [v.x, v.y]).collect();
        self.attributes.push((kind, 2, flat));
        self
    }

    /// Validate every attribute length and interleave.
    pub fn build(self) -> Result<VertexBuffer> {
        let mut layout = Vec::with_capacity(self.attributes.len());
        let mut stride = 0;
        for (kind, components, values) in &self.attributes {
            let found = values.len() / components;
            if found != self.vertex_count || values.len() % components != 0 {
                return Err(MeshError::ShapeMismatch {
                    attribute: kind.name(),
                    expected: self.vertex_count,
                    found,
                });
            }
            layout.push(VertexAttribute {
                kind: *kind,
                components: *components,
                offset: stride,
            });
            stride += components;
        }

        let mut data = Vec::with_capacity(self.vertex_count * stride);
        for vertex in 0..self.vertex_count {
            for (_, components, values) in &self.attributes {
                let start = vertex * components;
                data.extend_from_slice(&values[start..start + components]);
            }
        }

        Ok(VertexBuffer {
            data,
            vertex_count: self.vertex_count,
            stride,
            attributes: layout,
        })
    }
}
