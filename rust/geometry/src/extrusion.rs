// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extrusion - 2D profiles swept along a direction into closed meshes

use nalgebra::{Point2, Point3, Vector3};

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::profile::{Profile2D, Triangulation};

/// Extrude a profile lying in the XY plane by `depth` along `direction`.
///
/// `direction` need not be normalized but must leave the XY plane. The
/// result is a closed mesh: bottom cap, top cap and one quad per boundary edge.
pub fn extrude_profile(profile: &Profile2D, depth: f64, direction: Vector3<f64>) -> Result<Mesh> {
    if !(depth > 0.0) || !depth.is_finite() {
        return Err(Error::geometry(format!("extrusion depth {} is not positive", depth)));
    }
    let direction = direction
        .try_normalize(1e-12)
        .ok_or_else(|| Error::geometry("zero extrusion direction"))?;
    if direction.z.abs() < 1e-9 {
        return Err(Error::geometry("extrusion direction lies in the profile plane"));
    }

    let profile = profile.clone().normalized();
    let triangulation = profile.triangulate()?;
    let offset = direction * depth;

    let boundary_len = profile.outer.len() + profile.holes.iter().map(Vec::len).sum::<usize>();
    let mut mesh = Mesh::with_capacity(
        triangulation.points.len() * 2 + boundary_len * 4,
        triangulation.indices.len() * 2 + boundary_len * 6,
    );

    add_cap(&mut mesh, &triangulation, Vector3::zeros(), true);
    add_cap(&mut mesh, &triangulation, offset, false);

    add_side_walls(&mut mesh, &profile.outer, offset);
    for hole in &profile.holes {
        add_side_walls(&mut mesh, hole, offset);
    }

    // Extruding towards -Z mirrors the solid relative to the profile winding
    if direction.z < 0.0 {
        mesh.flip_winding();
    }

    Ok(mesh)
}

fn add_cap(mesh: &mut Mesh, triangulation: &Triangulation, offset: Vector3<f64>, bottom: bool) {
    let base = mesh.vertex_count() as u32;
    for p in &triangulation.points {
        mesh.add_vertex(Point3::new(p.x, p.y, 0.0) + offset);
    }
    for tri in triangulation.indices.chunks_exact(3) {
        let (a, b, c) = (
            base + tri[0] as u32,
            base + tri[1] as u32,
            base + tri[2] as u32,
        );
        if bottom {
            mesh.add_triangle(a, c, b);
        } else {
            mesh.add_triangle(a, b, c);
        }
    }
}

fn add_side_walls(mesh: &mut Mesh, boundary: &[Point2<f64>], offset: Vector3<f64>) {
    for (i, p0) in boundary.iter().enumerate() {
        let p1 = &boundary[(i + 1) % boundary.len()];
        if (p1 - p0).norm() < 1e-12 {
            continue;
        }
        let b0 = Point3::new(p0.x, p0.y, 0.0);
        let b1 = Point3::new(p1.x, p1.y, 0.0);
        let i0 = mesh.add_vertex(b0);
        let i1 = mesh.add_vertex(b1);
        let i2 = mesh.add_vertex(b1 + offset);
        let i3 = mesh.add_vertex(b0 + offset);
        mesh.add_triangle(i0, i1, i2);
        mesh.add_triangle(i0, i2, i3);
    }
}
