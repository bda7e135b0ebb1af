// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Boundary representation processors.
//!
//! IfcFacetedBrep, IfcFaceBasedSurfaceModel and IfcShellBasedSurfaceModel all
//! bottom out in shells (IfcClosedShell / IfcOpenShell / IfcConnectedFaceSet)
//! whose faces are bounded by IfcPolyLoop polygons.

use ifc2cloud_core::{DecodedEntity, EntityDecoder, IfcType};
use nalgebra::Point3;

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::router::{GeometryProcessor, ItemContext};
use crate::transform::parse_cartesian_point;
use crate::triangulation::triangulate_face;

/// Polygon of an IfcFaceBound / IfcFaceOuterBound, honouring its Orientation flag
fn bound_polygon(bound: &DecodedEntity, decoder: &mut EntityDecoder) -> Result<Vec<Point3<f64>>> {
    // IfcFaceBound: 0 Bound (IfcLoop), 1 Orientation (BOOLEAN)
    let loop_id = bound
        .get_ref(0)
        .ok_or_else(|| Error::geometry(format!("bound #{} has no loop", bound.id)))?;
    let poly_loop = decoder.decode_by_id(loop_id)?;
    if poly_loop.ifc_type != IfcType::IfcPolyLoop {
        return Err(Error::UnsupportedType(poly_loop.ifc_type.name().to_string()));
    }

    let mut polygon = poly_loop
        .get_refs(0)
        .into_iter()
        .map(|point_id| parse_cartesian_point(decoder, point_id))
        .collect::<Result<Vec<_>>>()?;
    polygon.dedup_by(|a, b| (*a - *b).norm() < 1e-12);
    if polygon.len() > 1 && (polygon[0] - polygon[polygon.len() - 1]).norm() < 1e-12 {
        polygon.pop();
    }

    if bound.get_enum(1) == Some("F") {
        polygon.reverse();
    }
    Ok(polygon)
}

/// Triangulate one IfcFace into `mesh`
fn add_face(face: &DecodedEntity, decoder: &mut EntityDecoder, mesh: &mut Mesh) -> Result<()> {
    let mut outer = None;
    let mut holes = Vec::new();
    for bound_id in face.get_refs(0) {
        let bound = decoder.decode_by_id(bound_id)?;
        let polygon = bound_polygon(&bound, decoder)?;
        if polygon.len() < 3 {
            continue;
        }
        if bound.ifc_type == IfcType::IfcFaceOuterBound && outer.is_none() {
            outer = Some(polygon);
        } else {
            holes.push(polygon);
        }
    }

    // Without an explicit outer bound the first bound is the outer one
    let outer = match outer {
        Some(outer) => outer,
        None if !holes.is_empty() => holes.remove(0),
        None => return Err(Error::geometry(format!("face #{} has no usable bound", face.id))),
    };

    let indices = triangulate_face(&outer, &holes)?;
    let base = mesh.vertex_count() as u32;
    for p in outer.iter().chain(holes.iter().flatten()) {
        mesh.add_vertex(*p);
    }
    for tri in indices.chunks_exact(3) {
        mesh.add_triangle(base + tri[0] as u32, base + tri[1] as u32, base + tri[2] as u32);
    }
    Ok(())
}

/// Faces of a shell (CfsFaces at attribute 0 for every shell type)
fn add_shell(shell_id: u32, decoder: &mut EntityDecoder, mesh: &mut Mesh) -> Result<()> {
    let shell = decoder.decode_by_id(shell_id)?;
    match shell.ifc_type {
        IfcType::IfcClosedShell | IfcType::IfcOpenShell | IfcType::IfcConnectedFaceSet => {}
        other => return Err(Error::UnsupportedType(other.name().to_string())),
    }
    for face_id in shell.get_refs(0) {
        let face = decoder.decode_by_id(face_id)?;
        // Skip degenerate faces; the rest of the shell is still usable
        let _ = add_face(&face, decoder, mesh);
    }
    Ok(())
}

/// Handles IfcFacetedBrep
#[derive(Debug, Default)]
pub struct FacetedBrepProcessor;

impl FacetedBrepProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl GeometryProcessor for FacetedBrepProcessor {
    fn process(
        &self,
        entity: &DecodedEntity,
        decoder: &mut EntityDecoder,
        _items: &ItemContext<'_>,
    ) -> Result<Mesh> {
        // IfcFacetedBrep: 0 Outer (IfcClosedShell)
        let shell_id = entity
            .get_ref(0)
            .ok_or_else(|| Error::geometry(format!("#{} has no Outer shell", entity.id)))?;
        let mut mesh = Mesh::new();
        add_shell(shell_id, decoder, &mut mesh)?;
        Ok(mesh)
    }

    fn supported_types(&self) -> Vec<IfcType> {
        vec![IfcType::IfcFacetedBrep]
    }
}

/// Handles IfcFaceBasedSurfaceModel - a set of connected face sets
#[derive(Debug, Default)]
pub struct FaceBasedSurfaceModelProcessor;

impl FaceBasedSurfaceModelProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl GeometryProcessor for FaceBasedSurfaceModelProcessor {
    fn process(
        &self,
        entity: &DecodedEntity,
        decoder: &mut EntityDecoder,
        _items: &ItemContext<'_>,
    ) -> Result<Mesh> {
        // IfcFaceBasedSurfaceModel: 0 FbsmFaces (SET OF IfcConnectedFaceSet)
        let mut mesh = Mesh::new();
        for face_set_id in entity.get_refs(0) {
            add_shell(face_set_id, decoder, &mut mesh)?;
        }
        Ok(mesh)
    }

    fn supported_types(&self) -> Vec<IfcType> {
        vec![IfcType::IfcFaceBasedSurfaceModel]
    }
}

/// Handles IfcShellBasedSurfaceModel - open or closed shells
#[derive(Debug, Default)]
pub struct ShellBasedSurfaceModelProcessor;

impl ShellBasedSurfaceModelProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl GeometryProcessor for ShellBasedSurfaceModelProcessor {
    fn process(
        &self,
        entity: &DecodedEntity,
        decoder: &mut EntityDecoder,
        _items: &ItemContext<'_>,
    ) -> Result<Mesh> {
        // IfcShellBasedSurfaceModel: 0 SbsmBoundary (SET OF IfcShell)
        let mut mesh = Mesh::new();
        for shell_id in entity.get_refs(0) {
            add_shell(shell_id, decoder, &mut mesh)?;
        }
        Ok(mesh)
    }

    fn supported_types(&self) -> Vec<IfcType> {
        vec![IfcType::IfcShellBasedSurfaceModel]
    }
}
