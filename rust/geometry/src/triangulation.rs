// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon triangulation
//!
//! 2D polygons (with holes) go through earcutr. Planar 3D faces are projected
//! onto their best-fit plane first.

use nalgebra::{Point2, Point3, Vector3};

use crate::error::{Error, Result};

fn earcut(vertices: &[f64], hole_starts: &[usize]) -> Result<Vec<usize>> {
    earcutr::earcut(vertices, hole_starts, 2)
        .map_err(|e| Error::Triangulation(format!("{:?}", e)))
}

fn is_convex(points: &[Point2<f64>]) -> bool {
    let n = points.len();
    let mut sign = 0.0f64;
    for i in 0..n {
        let (a, b, c) = (points[i], points[(i + 1) % n], points[(i + 2) % n]);
        let cross = (b.x - a.x) * (c.y - b.y) - (b.y - a.y) * (c.x - b.x);
        if cross.abs() <= 1e-12 {
            continue;
        }
        if sign == 0.0 {
            sign = cross.signum();
        } else if sign != cross.signum() {
            return false;
        }
    }
    true
}

/// Triangulate a simple polygon. Indices refer to `points`.
pub fn triangulate_polygon(points: &[Point2<f64>]) -> Result<Vec<usize>> {
    let n = points.len();
    if n < 3 {
        return Err(Error::Triangulation(format!(
            "polygon has {} vertices, need at least 3",
            n
        )));
    }
    if n == 3 {
        return Ok(vec![0, 1, 2]);
    }
    if is_convex(points) {
        return Ok((1..n - 1).flat_map(|i| [0, i, i + 1]).collect());
    }

    let flat: Vec<f64> = points.iter().flat_map(|p| [p.x, p.y]).collect();
    earcut(&flat, &[])
}

/// Triangulate a polygon with holes.
///
/// Indices refer to the concatenation `outer ++ holes[0] ++ holes[1] ...`;
/// holes with fewer than three points still occupy their slots but are not cut.
pub fn triangulate_polygon_with_holes(
    outer: &[Point2<f64>],
    holes: &[Vec<Point2<f64>>],
) -> Result<Vec<usize>> {
    if holes.iter().all(Vec::is_empty) {
        return triangulate_polygon(outer);
    }
    if outer.len() < 3 {
        return Err(Error::Triangulation(
            "outer boundary has fewer than 3 vertices".to_string(),
        ));
    }

    let total = outer.len() + holes.iter().map(Vec::len).sum::<usize>();
    let mut flat = Vec::with_capacity(total * 2);
    flat.extend(outer.iter().flat_map(|p| [p.x, p.y]));

    // earcut only sees usable holes; degenerate ones are kept in the flat
    // buffer as dangling points so the index space stays aligned
    let mut hole_starts = Vec::with_capacity(holes.len());
    let mut dangling = Vec::new();
    for hole in holes {
        let start = flat.len() / 2;
        if hole.len() >= 3 {
            hole_starts.push(start);
            flat.extend(hole.iter().flat_map(|p| [p.x, p.y]));
        } else {
            dangling.extend(hole.iter().copied());
        }
    }

    if dangling.is_empty() {
        return earcut(&flat, &hole_starts);
    }

    // Rare path: rebuild with only usable holes, then map indices back
    let mut remap = Vec::with_capacity(total);
    let mut compact = Vec::with_capacity(total * 2);
    let mut compact_holes = Vec::new();
    let mut cursor = 0;
    compact.extend(outer.iter().flat_map(|p| [p.x, p.y]));
    remap.extend(0..outer.len());
    cursor += outer.len();
    for hole in holes {
        if hole.len() >= 3 {
            compact_holes.push(compact.len() / 2);
            compact.extend(hole.iter().flat_map(|p| [p.x, p.y]));
            remap.extend(cursor..cursor + hole.len());
        }
        cursor += hole.len();
    }
    Ok(earcut(&compact, &compact_holes)?
        .into_iter()
        .map(|i| remap[i])
        .collect())
}

/// Polygon normal by Newell's method; `None` for degenerate loops
pub fn polygon_normal(points: &[Point3<f64>]) -> Option<Vector3<f64>> {
    if points.len() < 3 {
        return None;
    }
    let mut normal = Vector3::zeros();
    for (i, current) in points.iter().enumerate() {
        let next = &points[(i + 1) % points.len()];
        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }
    normal.try_normalize(1e-12)
}

/// Orthonormal in-plane axes `(u, v)` for a plane normal
pub fn plane_basis(normal: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    let reference = if normal.x.abs() <= normal.y.abs() && normal.x.abs() <= normal.z.abs() {
        Vector3::x()
    } else if normal.y.abs() <= normal.z.abs() {
        Vector3::y()
    } else {
        Vector3::z()
    };
    let u = normal.cross(&reference).normalize();
    let v = normal.cross(&u);
    (u, v)
}

/// Triangulate a planar 3D face with optional inner loops.
///
/// Indices refer to `outer ++ holes...`. Triangles are wound like `outer`.
pub fn triangulate_face(outer: &[Point3<f64>], holes: &[Vec<Point3<f64>>]) -> Result<Vec<usize>> {
    if outer.len() == 3 && holes.is_empty() {
        return Ok(vec![0, 1, 2]);
    }
    let normal = polygon_normal(outer)
        .ok_or_else(|| Error::Triangulation("degenerate face loop".to_string()))?;
    let (u, v) = plane_basis(&normal);
    let origin = outer[0];
    let project = |p: &Point3<f64>| {
        let d = p - origin;
        Point2::new(d.dot(&u), d.dot(&v))
    };

    let outer_2d: Vec<Point2<f64>> = outer.iter().map(project).collect();
    let holes_2d: Vec<Vec<Point2<f64>>> = holes
        .iter()
        .map(|hole| hole.iter().map(project).collect())
        .collect();

    let mut indices = triangulate_polygon_with_holes(&outer_2d, &holes_2d)?;

    // (u, v, normal) is right-handed, so CCW in 2D matches the loop normal.
    // Make sure each triangle follows the outer loop orientation.
    let all: Vec<&Point2<f64>> = outer_2d.iter().chain(holes_2d.iter().flatten()).collect();
    for tri in indices.chunks_exact_mut(3) {
        let (a, b, c) = (all[tri[0]], all[tri[1]], all[tri[2]]);
        let cross = (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x);
        if cross < 0.0 {
            tri.swap(1, 2);
        }
    }
    Ok(indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f64, offset: f64) -> Vec<Point2<f64>> {
        vec![
            Point2::new(offset, offset),
            Point2::new(offset + size, offset),
            Point2::new(offset + size, offset + size),
            Point2::new(offset, offset + size),
        ]
    }

    #[test]
    fn test_triangulate_square() {
        assert_eq!(triangulate_polygon(&square(1.0, 0.0)).unwrap().len(), 6);
    }

    #[test]
    fn test_triangulate_concave() {
        let l_shape = vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 2.0),
            Point2::new(0.0, 2.0),
        ];
        assert_eq!(triangulate_polygon(&l_shape).unwrap().len(), 12);
    }

    #[test]
    fn test_insufficient_points() {
        let points = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)];
        assert!(triangulate_polygon(&points).is_err());
    }

    #[test]
    fn test_square_with_hole() {
        let mut hole = square(4.0, 3.0);
        hole.reverse();
        let indices = triangulate_polygon_with_holes(&square(10.0, 0.0), &[hole]).unwrap();
        assert_eq!(indices.len() % 3, 0);
        assert_eq!(indices.len(), 8 * 3);
        assert!(indices.iter().all(|&i| i < 8));
    }

    #[test]
    fn test_degenerate_hole_keeps_index_space() {
        let degenerate = vec![Point2::new(5.0, 5.0)];
        let mut hole = square(2.0, 6.0);
        hole.reverse();
        let indices =
            triangulate_polygon_with_holes(&square(10.0, 0.0), &[degenerate, hole]).unwrap();
        assert!(indices.iter().all(|&i| i != 4));
        assert!(indices.iter().any(|&i| i >= 5));
    }

    #[test]
    fn test_polygon_normal() {
        let points = vec![
            Point3::new(0.0, 0.0, 2.0),
            Point3::new(1.0, 0.0, 2.0),
            Point3::new(1.0, 1.0, 2.0),
            Point3::new(0.0, 1.0, 2.0),
        ];
        let n = polygon_normal(&points).unwrap();
        assert!((n.z - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_triangulate_vertical_face_keeps_winding() {
        let outer = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let normal = polygon_normal(&outer).unwrap();
        let indices = triangulate_face(&outer, &[]).unwrap();
        assert_eq!(indices.len(), 6);
        for tri in indices.chunks_exact(3) {
            let (a, b, c) = (outer[tri[0]], outer[tri[1]], outer[tri[2]]);
            assert!((b - a).cross(&(c - a)).dot(&normal) > 0.0);
        }
    }
}
