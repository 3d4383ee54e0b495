/// Model matrices and clip-to-screen mapping
use nalgebra::{Matrix4, Point3, Vector3};

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    /// Create a translation matrix
    pub fn translation_matrix(x: f32, y: f32, z: f32) -> Matrix4<f32> {
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }

    /// Create a uniform scale matrix
    pub fn scale_matrix(s: f32) -> Matrix4<f32> {
        Matrix4::new_scaling(s)
    }

    /// Model matrix that centers `positions` on the origin and scales their
    /// largest extent to 2, so any mesh fits the `[-1, 1]` cube.
    pub fn fit_to_unit_cube(positions: &[Point3<f32>]) -> Matrix4<f32> {
        let Some(first) = positions.first() else {
            return Matrix4::identity();
        };
        let (min, max) = positions.iter().fold((*first, *first), |(min, max), p| {
            (min.inf(p), max.sup(p))
        });

        let center = nalgebra::center(&min, &max);
        let extent = (max - min).max();
        let scale = if extent > f32::EPSILON { 2.0 / extent } else { 1.0 };

        Self::scale_matrix(scale) * Self::translation_matrix(-center.x, -center.y, -center.z)
    }

    /// Create a model-view-projection matrix
    pub fn mvp_matrix(
        model: &Matrix4<f32>,
        view: &Matrix4<f32>,
        projection: &Matrix4<f32>,
    ) -> Matrix4<f32> {
        projection * view * model
    }

    /// Map a model-space point through `mvp` to screen pixels plus NDC depth.
    ///
    /// Returns `None` behind the eye or outside the view volume.
    pub fn project_to_screen(
        mvp: &Matrix4<f32>,
        point: &Point3<f32>,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let clip = mvp * point.to_homogeneous();

        // Prevent division by near-zero or negative w
        if clip.w < 1e-6 {
            return None;
        }

        let ndc = clip.xyz() / clip.w;
        if ndc.iter().any(|c| !(-1.0..=1.0).contains(c)) {
            return None;
        }

        let screen_x = (ndc.x + 1.0) * 0.5 * width as f32;
        let screen_y = (1.0 - ndc.y) * 0.5 * height as f32;

        Some((screen_x, screen_y, ndc.z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_to_unit_cube() {
        let positions = [Point3::new(2.0, 2.0, 2.0), Point3::new(6.0, 4.0, 3.0)];
        let model = Transform::fit_to_unit_cube(&positions);
        let a = model.transform_point(&positions[0]);
        let b = model.transform_point(&positions[1]);
        assert!((a - Point3::new(-1.0, -0.5, -0.25)).norm() < 1e-6);
        assert!((b - Point3::new(1.0, 0.5, 0.25)).norm() < 1e-6);
    }

    #[test]
    fn test_fit_empty_is_identity() {
        assert_eq!(Transform::fit_to_unit_cube(&[]), Matrix4::identity());
    }

    #[test]
    fn test_project_center_and_behind() {
        let view = Matrix4::look_at_rh(
            &Point3::new(0.0, 0.0, 5.0),
            &Point3::origin(),
            &Vector3::y(),
        );
        let projection = Matrix4::new_perspective(1.0, std::f32::consts::FRAC_PI_2, 0.1, 100.0);
        let mvp = Transform::mvp_matrix(&Matrix4::identity(), &view, &projection);

        let (x, y, depth) = Transform::project_to_screen(&mvp, &Point3::origin(), 80, 40).unwrap();
        assert!((x - 40.0).abs() < 1e-4);
        assert!((y - 20.0).abs() < 1e-4);
        assert!(depth > -1.0 && depth < 1.0);

        assert!(Transform::project_to_screen(&mvp, &Point3::new(0.0, 0.0, 10.0), 80, 40).is_none());
    }
}
