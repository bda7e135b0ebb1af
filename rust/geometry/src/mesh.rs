// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh data structures

use nalgebra::{Matrix3, Matrix4, Point3, Vector3};

/// Triangle mesh in f64 coordinates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions (x, y, z)
    pub positions: Vec<f64>,
    /// Triangle indices (i0, i1, i2)
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertex_count: usize, index_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count * 3),
            indices: Vec::with_capacity(index_count),
        }
    }

    /// Add a vertex and return its index
    #[inline]
    pub fn add_vertex(&mut self, position: Point3<f64>) -> u32 {
        let index = self.vertex_count() as u32;
        self.positions
            .extend_from_slice(&[position.x, position.y, position.z]);
        index
    }

    #[inline]
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.extend_from_slice(&[i0, i1, i2]);
    }

    #[inline]
    pub fn vertex(&self, index: usize) -> Point3<f64> {
        let i = index * 3;
        Point3::new(self.positions[i], self.positions[i + 1], self.positions[i + 2])
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.indices.is_empty()
    }

    /// Triangles as vertex index triples
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|tri| [tri[0], tri[1], tri[2]])
    }

    /// Append another mesh, offsetting its indices
    pub fn merge(&mut self, other: &Mesh) {
        if other.is_empty() {
            return;
        }
        let offset = self.vertex_count() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.indices
            .extend(other.indices.iter().map(|&index| index + offset));
    }

    /// Apply an affine transform to every vertex.
    ///
    /// A transform with negative determinant mirrors the mesh; triangle
    /// winding is flipped so faces keep pointing outwards.
    pub fn transform(&mut self, transform: &Matrix4<f64>) {
        for chunk in self.positions.chunks_exact_mut(3) {
            let p = transform.transform_point(&Point3::new(chunk[0], chunk[1], chunk[2]));
            chunk[0] = p.x;
            chunk[1] = p.y;
            chunk[2] = p.z;
        }
        let linear: Matrix3<f64> = transform.fixed_view::<3, 3>(0, 0).into_owned();
        if linear.determinant() < 0.0 {
            self.flip_winding();
        }
    }

    /// Uniform scale about the origin
    pub fn scale(&mut self, factor: f64) {
        if factor != 1.0 {
            self.positions.iter_mut().for_each(|v| *v *= factor);
        }
    }

    pub fn flip_winding(&mut self) {
        for tri in self.indices.chunks_exact_mut(3) {
            tri.swap(1, 2);
        }
    }

    /// Drop triangles that reference missing vertices or repeat a vertex
    pub fn retain_valid_triangles(&mut self) {
        let count = self.vertex_count() as u32;
        let mut kept = Vec::with_capacity(self.indices.len());
        for [a, b, c] in self.triangles() {
            if a < count && b < count && c < count && a != b && b != c && a != c {
                kept.extend_from_slice(&[a, b, c]);
            }
        }
        self.indices = kept;
    }

    /// Axis-aligned bounds `(min, max)`; `None` for a mesh without vertices
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        if self.positions.is_empty() {
            return None;
        }
        let mut min = Point3::new(f64::MAX, f64::MAX, f64::MAX);
        let mut max = Point3::new(f64::MIN, f64::MIN, f64::MIN);
        for chunk in self.positions.chunks_exact(3) {
            for axis in 0..3 {
                min[axis] = min[axis].min(chunk[axis]);
                max[axis] = max[axis].max(chunk[axis]);
            }
        }
        Some((min, max))
    }

    /// Area of one triangle
    #[inline]
    pub fn triangle_area(&self, tri: [u32; 3]) -> f64 {
        let a = self.vertex(tri[0] as usize);
        let b = self.vertex(tri[1] as usize);
        let c = self.vertex(tri[2] as usize);
        0.5 * (b - a).cross(&(c - a)).norm()
    }

    /// Total surface area
    pub fn surface_area(&self) -> f64 {
        self.triangles().map(|tri| self.triangle_area(tri)).sum()
    }

    /// Unit normal of a triangle, zero vector when degenerate
    pub fn triangle_normal(&self, tri: [u32; 3]) -> Vector3<f64> {
        let a = self.vertex(tri[0] as usize);
        let b = self.vertex(tri[1] as usize);
        let c = self.vertex(tri[2] as usize);
        (b - a)
            .cross(&(c - a))
            .try_normalize(1e-12)
            .unwrap_or_else(Vector3::zeros)
    }
}
