/// ASCII rasterizer for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use fly3d_core::{AttributeKind, Face, Transform, VertexBuffer};
use nalgebra::{Matrix4, Point3, Vector3};
use std::io::Write;

/// Character luminosity ramp for depth/shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// ASCII renderer that rasterizes an interleaved vertex buffer to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
    }

    /// Rasterize `faces` reading positions and normals straight out of the
    /// interleaved buffer. Shading is the averaged vertex normal against
    /// `light_dir`.
    pub fn render_mesh(
        &mut self,
        buffer: &VertexBuffer,
        faces: &[Face],
        mvp: &Matrix4<f32>,
        light_dir: &Vector3<f32>,
    ) {
        let light_dir = light_dir.try_normalize(f32::EPSILON).unwrap_or_else(Vector3::z);
        for face in faces {
            self.render_face(buffer, face, mvp, &light_dir);
        }
    }

    fn render_face(
        &mut self,
        buffer: &VertexBuffer,
        face: &Face,
        mvp: &Matrix4<f32>,
        light_dir: &Vector3<f32>,
    ) {
        let mut screen_coords = [(0.0, 0.0, 0.0); 3];
        let mut normal = Vector3::zeros();

        for (slot, &index) in screen_coords.iter_mut().zip(face) {
            let index = index as usize;
            let Some(p) = buffer.vertex_attribute(index, AttributeKind::Position) else {
                return;
            };
            if let Some(n) = buffer.vertex_attribute(index, AttributeKind::Normal) {
                normal += Vector3::from_column_slice(n);
            }

            let position = Point3::new(p[0], p[1], p[2]);
            // Triangle is clipped as soon as one corner leaves the view volume
            let Some(coord) =
                Transform::project_to_screen(mvp, &position, self.width as u32, self.height as u32)
            else {
                return;
            };
            *slot = coord;
        }

        let brightness = normal
            .try_normalize(f32::EPSILON)
            .map_or(0.0, |n| n.dot(light_dir).max(0.0));

        // Map brightness to character; lit faces never vanish into the background
        let char_index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
        let char_index = char_index.clamp(1, LUMINOSITY_RAMP.len() - 1);
        self.rasterize_triangle(&screen_coords, LUMINOSITY_RAMP[char_index]);
    }

    fn rasterize_triangle(&mut self, coords: &[(f32, f32, f32); 3], character: char) {
        let [v0, v1, v2] = *coords;

        // Bounding box, clipped to screen bounds
        let min_x = (v0.0.min(v1.0).min(v2.0).floor() as i32).max(0);
        let max_x = (v0.0.max(v1.0).max(v2.0).ceil() as i32).min(self.width as i32 - 1);
        let min_y = (v0.1.min(v1.1).min(v2.1).floor() as i32).max(0);
        let max_y = (v0.1.max(v1.1).max(v2.1).ceil() as i32).min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = (x as f32 + 0.5, y as f32 + 0.5);
                let Some((w0, w1, w2)) =
                    barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), p)
                else {
                    continue;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                let idx = y as usize * self.width + x as usize;
                if depth < self.depth_buffer[idx] {
                    self.depth_buffer[idx] = depth;
                    self.char_buffer[idx] = character;
                }
            }
        }
    }

    /// Character at a cell, for inspection.
    pub fn char_at(&self, x: usize, y: usize) -> Option<char> {
        (x < self.width && y < self.height).then(|| self.char_buffer[y * self.width + x])
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut current = None;
        for row in self.char_buffer.chunks(self.width.max(1)) {
            for &c in row {
                // Color based on character intensity
                let color = match c {
                    ' ' | '.' | ':' => Color::DarkGrey,
                    '-' | '=' => Color::Grey,
                    '+' | '*' => Color::White,
                    _ => Color::Cyan,
                };
                if current != Some(color) {
                    writer.queue(SetForegroundColor(color))?;
                    current = Some(color);
                }
                writer.queue(Print(c))?;
            }
            writer.queue(Print("\r\n"))?;
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fly3d_core::{FreeCamera, Mesh, Projection};

    #[test]
    fn test_barycentric_inside_and_degenerate() {
        let (w0, w1, w2) = barycentric((0.0, 0.0), (4.0, 0.0), (0.0, 4.0), (1.0, 1.0)).unwrap();
        assert!(w0 > 0.0 && w1 > 0.0 && w2 > 0.0);
        assert!(barycentric((0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (1.0, 0.0)).is_none());
    }

    #[test]
    fn test_cube_lights_screen_center() {
        let mesh = Mesh::cube(1.0);
        let buffer = mesh.vertex_buffer().unwrap();
        let camera = FreeCamera::default();
        let projection = Projection::new(45.0, 1.0, 0.1, 100.0);
        let mvp = Transform::mvp_matrix(
            &Matrix4::identity(),
            camera.view_matrix(),
            projection.matrix(),
        );

        let mut renderer = AsciiRenderer::new(40, 40);
        renderer.render_mesh(&buffer, &mesh.faces, &mvp, &-camera.front());

        let center = renderer.char_at(20, 20).unwrap();
        assert_ne!(center, ' ');
        assert_eq!(renderer.char_at(0, 0), Some(' '));

        renderer.clear();
        assert_eq!(renderer.char_at(20, 20), Some(' '));
    }

    #[test]
    fn test_draw_emits_every_row() {
        let renderer = AsciiRenderer::new(3, 2);
        let mut out = Vec::new();
        renderer.draw(&mut out).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert_eq!(text.matches("\r\n").count(), 2);
    }
}
