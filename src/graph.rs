//! Build the triangle mesh from delaunator output.
//!
//! For each halfedge `e = 3t + j`, the opposite halfedge identifies the
//! neighbor triangle across that edge (`opposite / 3`); a missing
//! opposite marks an open edge, which makes `t` a boundary triangle.

use log::debug;

use crate::error::GenError;
use crate::geometry::Point;
use crate::mesh::{TriMesh, NONE};

/// Triangulate a point set into a [`TriMesh`].
pub fn build_tri_mesh(points: &[Point]) -> Result<TriMesh, GenError> {
    if points.len() < 3 {
        return Err(GenError::DegenerateMesh(format!(
            "need at least 3 points, got {}",
            points.len()
        )));
    }

    let delaunator_points: Vec<delaunator::Point> =
        points.iter().map(|&p| p.into()).collect();
    let triangulation = delaunator::triangulate(&delaunator_points);

    let num_triangles = triangulation.halfedges.len() / 3;
    if num_triangles == 0 {
        return Err(GenError::DegenerateMesh(
            "triangulation produced no triangles".to_string(),
        ));
    }

    let mut mesh = TriMesh {
        centroids: Vec::with_capacity(num_triangles),
        neighbors: Vec::with_capacity(num_triangles),
        boundary: Vec::with_capacity(num_triangles),
    };

    for t in 0..num_triangles {
        let i0 = triangulation.triangles[3 * t];
        let i1 = triangulation.triangles[3 * t + 1];
        let i2 = triangulation.triangles[3 * t + 2];

        let p0 = points[i0];
        let p1 = points[i1];
        let p2 = points[i2];
        mesh.centroids.push(Point::new(
            (p0.x + p1.x + p2.x) / 3.0,
            (p0.y + p1.y + p2.y) / 3.0,
        ));

        let mut row = [NONE; 3];
        let mut is_boundary = false;
        for (j, slot) in row.iter_mut().enumerate() {
            let opposite = triangulation.halfedges[3 * t + j];
            if opposite == delaunator::EMPTY {
                is_boundary = true;
            } else {
                *slot = opposite / 3;
            }
        }
        mesh.neighbors.push(row);
        mesh.boundary.push(is_boundary);
    }

    mesh.validate().map_err(GenError::Internal)?;

    debug!(
        "triangulated {} points into {} triangles ({} boundary)",
        points.len(),
        mesh.len(),
        mesh.boundary.iter().filter(|&&b| b).count()
    );

    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BoundingBox;
    use crate::pointgen::{generate_points, PointGeneratorConfig};

    fn test_mesh() -> TriMesh {
        let config = PointGeneratorConfig {
            width: 200.0,
            height: 150.0,
            ..Default::default()
        };
        let points = generate_points(&config);
        build_tri_mesh(&points.points).unwrap()
    }

    #[test]
    fn test_build_produces_triangles() {
        let mesh = test_mesh();
        assert!(mesh.len() > 10);
        assert!(mesh.boundary.iter().any(|&b| b), "hull triangles should be boundary");
        assert!(mesh.boundary.iter().any(|&b| !b), "interior triangles should exist");
    }

    #[test]
    fn test_neighbor_symmetry() {
        let mesh = test_mesh();
        for t in 0..mesh.len() {
            for u in mesh.neighbors_of(t) {
                assert!(
                    mesh.neighbors[u].contains(&t),
                    "neighbor symmetry broken between {} and {}",
                    t,
                    u
                );
            }
        }
    }

    #[test]
    fn test_centroids_strictly_inside() {
        let bounds = BoundingBox::new(0.0, 0.0, 200.0, 150.0);
        let mesh = test_mesh();
        for t in 0..mesh.len() {
            assert!(
                bounds.contains_strict(&mesh.centroid(t)),
                "centroid of triangle {} is not strictly inside the map",
                t
            );
        }
    }

    #[test]
    fn test_too_few_points_is_error() {
        let points = vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)];
        assert!(build_tri_mesh(&points).is_err());
    }

    #[test]
    fn test_collinear_points_is_error() {
        let points: Vec<Point> = (0..10).map(|i| Point::new(i as f64, 0.0)).collect();
        assert!(build_tri_mesh(&points).is_err());
    }
}
