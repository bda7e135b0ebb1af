// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D profiles used as extrusion cross sections

use nalgebra::{Matrix3, Point2};

use crate::error::{Error, Result};
use crate::triangulation::triangulate_polygon_with_holes;

/// 2D profile with optional holes
#[derive(Debug, Clone, PartialEq)]
pub struct Profile2D {
    /// Outer boundary
    pub outer: Vec<Point2<f64>>,
    /// Inner boundaries
    pub holes: Vec<Vec<Point2<f64>>>,
}

/// Triangulated profile: points are `outer ++ holes...`
#[derive(Debug, Clone)]
pub struct Triangulation {
    pub points: Vec<Point2<f64>>,
    pub indices: Vec<usize>,
}

/// Twice the signed area; positive for counter-clockwise loops
pub fn signed_area2(points: &[Point2<f64>]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let (a, b) = (points[i], points[(i + 1) % n]);
            a.x * b.y - b.x * a.y
        })
        .sum()
}

/// Remove the closing duplicate and consecutive duplicates of a loop
pub fn clean_loop(points: &mut Vec<Point2<f64>>) {
    points.dedup_by(|a, b| (*a - *b).norm() < 1e-9);
    while points.len() > 1 {
        let (first, last) = (points[0], points[points.len() - 1]);
        if (first - last).norm() < 1e-9 {
            points.pop();
        } else {
            break;
        }
    }
}

impl Profile2D {
    pub fn new(outer: Vec<Point2<f64>>) -> Self {
        Self {
            outer,
            holes: Vec::new(),
        }
    }

    pub fn add_hole(&mut self, hole: Vec<Point2<f64>>) {
        self.holes.push(hole);
    }

    /// Clean loops, make the outer loop counter-clockwise and holes clockwise
    pub fn normalized(mut self) -> Self {
        clean_loop(&mut self.outer);
        if signed_area2(&self.outer) < 0.0 {
            self.outer.reverse();
        }
        for hole in &mut self.holes {
            clean_loop(hole);
            if signed_area2(hole) > 0.0 {
                hole.reverse();
            }
        }
        self.holes.retain(|hole| hole.len() >= 3);
        self
    }

    /// Apply a 2D homogeneous transform (profile Position)
    pub fn transform(&mut self, transform: &Matrix3<f64>) {
        let apply = |p: &mut Point2<f64>| *p = transform.transform_point(p);
        self.outer.iter_mut().for_each(apply);
        self.holes.iter_mut().flatten().for_each(apply);
    }

    /// Triangulate the profile with earcutr
    pub fn triangulate(&self) -> Result<Triangulation> {
        if self.outer.len() < 3 {
            return Err(Error::InvalidProfile(format!(
                "outer boundary has {} vertices",
                self.outer.len()
            )));
        }
        let mut indices = triangulate_polygon_with_holes(&self.outer, &self.holes)?;
        let points: Vec<Point2<f64>> = self
            .outer
            .iter()
            .chain(self.holes.iter().flatten())
            .copied()
            .collect();

        // earcut does not promise an orientation; caps expect counter-clockwise
        for tri in indices.chunks_exact_mut(3) {
            if signed_area2(&[points[tri[0]], points[tri[1]], points[tri[2]]]) < 0.0 {
                tri.swap(1, 2);
            }
        }
        Ok(Triangulation { points, indices })
    }
}

/// Rectangle centred on the origin
pub fn create_rectangle(width: f64, height: f64) -> Profile2D {
    let (hw, hh) = (width / 2.0, height / 2.0);
    Profile2D::new(vec![
        Point2::new(-hw, -hh),
        Point2::new(hw, -hh),
        Point2::new(hw, hh),
        Point2::new(-hw, hh),
    ])
}

/// Segment count for a circle of `radius`, between 8 and 32
pub fn calculate_circle_segments(radius: f64) -> usize {
    ((radius.abs().sqrt() * 8.0).ceil() as usize).clamp(8, 32)
}

/// Counter-clockwise circle polygon centred on the origin
pub fn circle_points(radius: f64) -> Vec<Point2<f64>> {
    let segments = calculate_circle_segments(radius);
    (0..segments)
        .map(|i| {
            let angle = std::f64::consts::TAU * i as f64 / segments as f64;
            Point2::new(radius * angle.cos(), radius * angle.sin())
        })
        .collect()
}

/// Circle with an optional concentric hole
pub fn create_circle(radius: f64, hole_radius: Option<f64>) -> Profile2D {
    let mut profile = Profile2D::new(circle_points(radius));
    if let Some(inner) = hole_radius.filter(|r| *r > 0.0 && *r < radius) {
        let mut hole = circle_points(inner);
        hole.reverse();
        profile.add_hole(hole);
    }
    profile
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_profile() {
        let profile = create_rectangle(10.0, 5.0);
        assert_eq!(profile.outer.len(), 4);
        assert_eq!(profile.outer[0], Point2::new(-5.0, -2.5));
        assert_eq!(profile.outer[2], Point2::new(5.0, 2.5));
        assert!(signed_area2(&profile.outer) > 0.0);
    }

    #[test]
    fn test_hollow_circle() {
        let profile = create_circle(10.0, Some(5.0));
        assert_eq!(profile.holes.len(), 1);
        assert!(signed_area2(&profile.holes[0]) < 0.0);

        let tri = profile.triangulate().unwrap();
        assert_eq!(
            tri.points.len(),
            calculate_circle_segments(10.0) + calculate_circle_segments(5.0)
        );
    }

    #[test]
    fn test_hole_larger_than_outer_is_ignored() {
        assert!(create_circle(1.0, Some(2.0)).holes.is_empty());
    }

    #[test]
    fn test_normalized_fixes_orientation_and_closure() {
        let profile = Profile2D::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 0.0),
        ])
        .normalized();
        assert_eq!(profile.outer.len(), 4);
        assert!(signed_area2(&profile.outer) > 0.0);
    }

    #[test]
    fn test_circle_segments() {
        assert_eq!(calculate_circle_segments(1.0), 8);
        assert_eq!(calculate_circle_segments(4.0), 16);
        assert_eq!(calculate_circle_segments(500.0), 32);
    }

    #[test]
    fn test_degenerate_profile_rejected() {
        let profile = Profile2D::new(vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)]);
        assert!(matches!(profile.triangulate(), Err(Error::InvalidProfile(_))));
    }
}
