/// Per-vertex normal estimation from triangle connectivity
use log::warn;
use nalgebra::{Point3, Vector3};

use crate::error::{MeshError, Result};
use crate::geometry::{Face, Triangle};

/// Sum the unit face normal of every triangle into each of its three corners.
///
/// The sum is unweighted (no area or angle weighting) and is not normalized;
/// a vertex that no face touches stays at zero. Degenerate faces contribute
/// nothing. Winding is taken as given.
pub fn accumulate_vertex_normals(
    positions: &[Point3<f32>],
    faces: &[Face],
) -> Result<Vec<Vector3<f32>>> {
    let mut normals = vec![Vector3::zeros(); positions.len()];
    let mut degenerate = 0usize;

    for (face_index, face) in faces.iter().enumerate() {
        let mut corners = [Point3::origin(); 3];
        for (corner, &index) in corners.iter_mut().zip(face) {
            *corner = *positions
                .get(index as usize)
                .ok_or(MeshError::IndexOutOfRange {
                    face: face_index,
                    index,
                    vertex_count: positions.len(),
                })?;
        }

        let Some(normal) = Triangle::new(corners[0], corners[1], corners[2]).calculate_normal()
        else {
            degenerate += 1;
            continue;
        };

        for &index in face {
            normals[index as usize] += normal;
        }
    }

    if degenerate > 0 {
        warn!("skipped {degenerate} degenerate faces while estimating normals");
    }

    Ok(normals)
}

/// Unit-normalize accumulated normals in place, leaving zero vectors alone.
pub fn normalize_vertex_normals(normals: &mut [Vector3<f32>]) {
    for normal in normals.iter_mut() {
        if let Some(unit) = normal.try_normalize(f32::EPSILON) {
            *normal = unit;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> (Vec<Point3<f32>>, Vec<Face>) {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        (positions, vec![[0, 1, 2], [0, 2, 3]])
    }

    #[test]
    fn test_single_triangle_shares_face_normal() {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
            Point3::new(0.0, 0.0, 3.0),
        ];
        let normals = accumulate_vertex_normals(&positions, &[[0, 1, 2]]).unwrap();
        for normal in &normals {
            assert!((normal - Vector3::x()).norm() < 1e-6);
        }
    }

    #[test]
    fn test_shared_vertices_sum_unweighted() {
        let (positions, faces) = quad();
        let normals = accumulate_vertex_normals(&positions, &faces).unwrap();
        // Vertices 0 and 2 sit on both triangles
        assert!((normals[0] - Vector3::new(0.0, 0.0, 2.0)).norm() < 1e-6);
        assert!((normals[2] - Vector3::new(0.0, 0.0, 2.0)).norm() < 1e-6);
        assert!((normals[1] - Vector3::z()).norm() < 1e-6);
        assert!((normals[3] - Vector3::z()).norm() < 1e-6);
    }

    #[test]
    fn test_isolated_vertex_stays_zero() {
        let (mut positions, faces) = quad();
        positions.push(Point3::new(5.0, 5.0, 5.0));
        let mut normals = accumulate_vertex_normals(&positions, &faces).unwrap();
        assert_eq!(normals[4], Vector3::zeros());

        normalize_vertex_normals(&mut normals);
        assert_eq!(normals[4], Vector3::zeros());
        assert!((normals[0].norm() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_face_is_skipped() {
        let (positions, mut faces) = quad();
        faces.push([0, 0, 1]);
        let normals = accumulate_vertex_normals(&positions, &faces).unwrap();
        assert!((normals[1] - Vector3::z()).norm() < 1e-6);
    }

    #[test]
    fn test_small_triangle_contributes() {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1e-4, 0.0, 0.0),
            Point3::new(0.0, 1e-4, 0.0),
        ];
        let normals = accumulate_vertex_normals(&positions, &[[0, 1, 2]]).unwrap();
        for normal in &normals {
            assert!((normal - Vector3::z()).norm() < 1e-5);
        }
    }

    #[test]
    fn test_out_of_range_index() {
        let (positions, _) = quad();
        let err = accumulate_vertex_normals(&positions, &[[0, 1, 9]]).unwrap_err();
        assert!(matches!(
            err,
            MeshError::IndexOutOfRange {
                face: 0,
                index: 9,
                vertex_count: 4
            }
        ));
    }

    #[test]
    fn test_opposite_windings_cancel() {
        let (positions, _) = quad();
        let normals = accumulate_vertex_normals(&positions, &[[0, 1, 2], [0, 2, 1]]).unwrap();
        assert!(normals[0].norm() < 1e-6);
    }
}
