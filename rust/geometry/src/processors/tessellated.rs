// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tessellated geometry processors - pre-tessellated/polygon meshes.
//!
//! Handles IfcTriangulatedFaceSet (explicit triangle meshes) and
//! IfcPolygonalFaceSet (polygon meshes requiring triangulation).

use ifc2cloud_core::{AttributeValue, DecodedEntity, EntityDecoder, IfcType};
use nalgebra::Point3;

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::router::{GeometryProcessor, ItemContext};
use crate::triangulation::triangulate_face;

/// Coordinates of the IfcCartesianPointList3D referenced by attribute 0
fn point_list(entity: &DecodedEntity, decoder: &mut EntityDecoder) -> Result<Vec<Point3<f64>>> {
    let list_id = entity
        .get_ref(0)
        .ok_or_else(|| Error::geometry(format!("#{} has no Coordinates", entity.id)))?;
    let list = decoder.decode_by_id(list_id)?;
    if list.ifc_type != IfcType::IfcCartesianPointList3D {
        return Err(Error::geometry(format!(
            "#{} is {}, expected IfcCartesianPointList3D",
            list_id, list.ifc_type
        )));
    }
    let coords = list.get_list(0).unwrap_or_default();
    Ok(AttributeValue::parse_coordinate_list_3d(coords)
        .into_iter()
        .map(|[x, y, z]| Point3::new(x, y, z))
        .collect())
}

/// Flat list of 1-based indices converted to 0-based
fn index_list(values: &[AttributeValue]) -> Vec<u32> {
    values
        .iter()
        .filter_map(AttributeValue::as_int)
        .filter(|&i| i >= 1 && i <= u32::MAX as i64)
        .map(|i| (i - 1) as u32)
        .collect()
}

/// Optional PnIndex remapping: face indices address PnIndex, which addresses points
struct PointIndex {
    remap: Option<Vec<u32>>,
    point_count: usize,
}

impl PointIndex {
    fn new(pn_index: Option<&[AttributeValue]>, point_count: usize) -> Self {
        let remap = pn_index.map(index_list).filter(|pn| !pn.is_empty());
        Self { remap, point_count }
    }

    fn resolve(&self, index: u32) -> Option<u32> {
        let resolved = match &self.remap {
            Some(remap) => *remap.get(index as usize)?,
            None => index,
        };
        ((resolved as usize) < self.point_count).then_some(resolved)
    }
}

fn mesh_from_points(points: &[Point3<f64>]) -> Mesh {
    let mut mesh = Mesh::with_capacity(points.len(), 0);
    for p in points {
        mesh.add_vertex(*p);
    }
    mesh
}

/// Handles IfcTriangulatedFaceSet - explicit triangle meshes
#[derive(Debug, Default)]
pub struct TriangulatedFaceSetProcessor;

impl TriangulatedFaceSetProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl GeometryProcessor for TriangulatedFaceSetProcessor {
    fn process(
        &self,
        entity: &DecodedEntity,
        decoder: &mut EntityDecoder,
        _items: &ItemContext<'_>,
    ) -> Result<Mesh> {
        // IfcTriangulatedFaceSet attributes:
        // 0: Coordinates (IfcCartesianPointList3D)
        // 1: Normals (optional)
        // 2: Closed (optional)
        // 3: CoordIndex (list of list of IfcPositiveInteger)
        // 4: PnIndex (optional)
        let points = point_list(entity, decoder)?;
        let index = PointIndex::new(entity.get_list(4), points.len());
        let tuples = entity
            .get_list(3)
            .map(AttributeValue::parse_index_tuples)
            .ok_or_else(|| Error::geometry(format!("#{} has no CoordIndex", entity.id)))?;

        let mut mesh = mesh_from_points(&points);
        for tuple in tuples {
            // Out-of-range references drop the triangle, not the whole set
            let [a, b, c] = tuple[..] else { continue };
            if let (Some(a), Some(b), Some(c)) = (index.resolve(a), index.resolve(b), index.resolve(c)) {
                mesh.add_triangle(a, b, c);
            }
        }
        Ok(mesh)
    }

    fn supported_types(&self) -> Vec<IfcType> {
        vec![IfcType::IfcTriangulatedFaceSet]
    }
}

/// Handles IfcPolygonalFaceSet - polygon meshes requiring triangulation
#[derive(Debug, Default)]
pub struct PolygonalFaceSetProcessor;

impl PolygonalFaceSetProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Triangulate one IfcIndexedPolygonalFace(WithVoids) into `mesh`
    fn add_face(
        &self,
        face: &DecodedEntity,
        index: &PointIndex,
        points: &[Point3<f64>],
        mesh: &mut Mesh,
    ) -> Result<()> {
        let resolve = |loop_indices: Vec<u32>| -> Option<Vec<u32>> {
            loop_indices.into_iter().map(|i| index.resolve(i)).collect()
        };

        let outer = face
            .get_list(0)
            .map(index_list)
            .and_then(resolve)
            .ok_or_else(|| Error::geometry(format!("face #{} has invalid CoordIndex", face.id)))?;
        let holes: Vec<Vec<u32>> = if face.ifc_type == IfcType::IfcIndexedPolygonalFaceWithVoids {
            face.get_list(1)
                .map(AttributeValue::parse_index_tuples)
                .unwrap_or_default()
                .into_iter()
                .filter_map(resolve)
                .filter(|hole| hole.len() >= 3)
                .collect()
        } else {
            Vec::new()
        };
        if outer.len() < 3 {
            return Err(Error::geometry(format!("face #{} has fewer than 3 vertices", face.id)));
        }

        let to_points = |loop_indices: &[u32]| -> Vec<Point3<f64>> {
            loop_indices.iter().map(|&i| points[i as usize]).collect()
        };
        let outer_points = to_points(&outer);
        let hole_points: Vec<Vec<Point3<f64>>> = holes.iter().map(|h| to_points(h)).collect();

        let local = triangulate_face(&outer_points, &hole_points)?;
        let global: Vec<u32> = outer.iter().chain(holes.iter().flatten()).copied().collect();
        for tri in local.chunks_exact(3) {
            mesh.add_triangle(global[tri[0]], global[tri[1]], global[tri[2]]);
        }
        Ok(())
    }
}

impl GeometryProcessor for PolygonalFaceSetProcessor {
    fn process(
        &self,
        entity: &DecodedEntity,
        decoder: &mut EntityDecoder,
        _items: &ItemContext<'_>,
    ) -> Result<Mesh> {
        // IfcPolygonalFaceSet attributes:
        // 0: Coordinates (IfcCartesianPointList3D)
        // 1: Closed (optional)
        // 2: Faces (list of IfcIndexedPolygonalFace)
        // 3: PnIndex (optional)
        let points = point_list(entity, decoder)?;
        let index = PointIndex::new(entity.get_list(3), points.len());

        let mut mesh = mesh_from_points(&points);
        for face_id in entity.get_refs(2) {
            let face = decoder.decode_by_id(face_id)?;
            // A single degenerate polygon should not discard the whole set
            let _ = self.add_face(&face, &index, &points, &mut mesh);
        }
        Ok(mesh)
    }

    fn supported_types(&self) -> Vec<IfcType> {
        vec![IfcType::IfcPolygonalFaceSet]
    }
}
