// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coloured triangle meshes produced by workers and the aggregator.

use std::ops::Range;

use ifc2cloud_geometry::Mesh;
use rustc_hash::FxHashMap;

/// Output of one worker. Face indices are local to this mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialMesh {
    pub vertices: Vec<[f64; 3]>,
    pub faces: Vec<[u32; 3]>,
    /// One colour per vertex
    pub colors: Vec<[f32; 3]>,
    /// Element id -> interval of `faces`
    pub element_ranges: FxHashMap<u32, Range<usize>>,
}

impl PartialMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a resolved element mesh with a uniform colour
    pub fn push_element(&mut self, element_id: u32, mesh: &Mesh, color: [f32; 3]) {
        let base = self.vertices.len() as u32;
        let first_face = self.faces.len();

        self.vertices
            .extend(mesh.positions.chunks_exact(3).map(|p| [p[0], p[1], p[2]]));
        self.colors.resize(self.vertices.len(), color);
        self.faces
            .extend(mesh.triangles().map(|[a, b, c]| [base + a, base + b, base + c]));

        self.element_ranges
            .insert(element_id, first_face..self.faces.len());
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

/// Merged mesh of all workers with global face indices.
///
/// Every face index is below `vertices.len()` and element face ranges are
/// disjoint; [`aggregate`](crate::aggregate) is the only producer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateMesh {
    pub vertices: Vec<[f64; 3]>,
    pub faces: Vec<[u32; 3]>,
    pub colors: Vec<[f32; 3]>,
    pub element_ranges: FxHashMap<u32, Range<usize>>,
}

impl AggregateMesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Corner positions of face `index`
    pub fn face_vertices(&self, index: usize) -> [[f64; 3]; 3] {
        let [a, b, c] = self.faces[index];
        [
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        ]
    }

    /// Area of face `index`: half the norm of the edge cross product
    pub fn face_area(&self, index: usize) -> f64 {
        triangle_area(self.face_vertices(index))
    }

    pub fn surface_area(&self) -> f64 {
        (0..self.faces.len()).map(|i| self.face_area(i)).sum()
    }

    /// Axis-aligned bounds of the vertices
    pub fn bounds(&self) -> Option<([f64; 3], [f64; 3])> {
        let first = *self.vertices.first()?;
        Some(self.vertices.iter().fold((first, first), |(mut min, mut max), v| {
            for axis in 0..3 {
                min[axis] = min[axis].min(v[axis]);
                max[axis] = max[axis].max(v[axis]);
            }
            (min, max)
        }))
    }
}

pub(crate) fn triangle_area([a, b, c]: [[f64; 3]; 3]) -> f64 {
    let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
    let cross = [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ];
    0.5 * (cross[0] * cross[0] + cross[1] * cross[1] + cross[2] * cross[2]).sqrt()
}
