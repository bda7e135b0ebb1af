// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Placement and transformation parsing
//!
//! Local placement chains, axis placements and cartesian transformation
//! operators are turned into nalgebra matrices that map local coordinates
//! into the parent (ultimately world) coordinate system.

use ifc2cloud_core::{AttributeValue, DecodedEntity, EntityDecoder, IfcType};
use nalgebra::{Matrix3, Matrix4, Point3, Vector3};

use crate::error::{Error, Result};

/// Placement chains deeper than this are treated as malformed (cycles)
const MAX_PLACEMENT_DEPTH: usize = 100;

fn coordinates(list: Option<&[AttributeValue]>) -> [f64; 3] {
    let value = |i: usize| {
        list.and_then(|l| l.get(i))
            .and_then(|v| v.as_float())
            .unwrap_or(0.0)
    };
    [value(0), value(1), value(2)]
}

/// IfcCartesianPoint by id; 2D points get z = 0
pub fn parse_cartesian_point(decoder: &mut EntityDecoder, point_id: u32) -> Result<Point3<f64>> {
    let point = decoder.decode_by_id(point_id)?;
    if point.ifc_type != IfcType::IfcCartesianPoint {
        return Err(Error::geometry(format!(
            "#{} is {}, expected IfcCartesianPoint",
            point_id, point.ifc_type
        )));
    }
    let [x, y, z] = coordinates(point.get_list(0));
    Ok(Point3::new(x, y, z))
}

/// IfcDirection ratios (not normalized)
pub fn parse_direction(direction: &DecodedEntity) -> Result<Vector3<f64>> {
    if direction.ifc_type != IfcType::IfcDirection {
        return Err(Error::geometry(format!(
            "#{} is {}, expected IfcDirection",
            direction.id, direction.ifc_type
        )));
    }
    let [x, y, z] = coordinates(direction.get_list(0));
    Ok(Vector3::new(x, y, z))
}

/// Direction referenced by attribute `index`, or `default` when the attribute is `$`
pub fn optional_direction(
    entity: &DecodedEntity,
    index: usize,
    decoder: &mut EntityDecoder,
    default: Vector3<f64>,
) -> Result<Vector3<f64>> {
    match entity.get_ref(index) {
        Some(id) => {
            let direction = decoder.decode_by_id(id)?;
            Ok(parse_direction(&direction)?
                .try_normalize(1e-12)
                .unwrap_or(default))
        }
        None => Ok(default),
    }
}

fn optional_point(
    entity: &DecodedEntity,
    index: usize,
    decoder: &mut EntityDecoder,
) -> Result<Point3<f64>> {
    match entity.get_ref(index) {
        Some(id) => parse_cartesian_point(decoder, id),
        None => Ok(Point3::origin()),
    }
}

/// Right-handed orthonormal basis from a Z axis and an approximate X axis
fn orthonormal_basis(z: Vector3<f64>, x: Vector3<f64>) -> (Vector3<f64>, Vector3<f64>, Vector3<f64>) {
    let z = z.try_normalize(1e-12).unwrap_or_else(Vector3::z);
    let x = (x - z * x.dot(&z))
        .try_normalize(1e-6)
        .unwrap_or_else(|| {
            let fallback = if z.x.abs() < 0.9 { Vector3::x() } else { Vector3::y() };
            (fallback - z * fallback.dot(&z)).normalize()
        });
    let y = z.cross(&x);
    (x, y, z)
}

fn matrix_from_axes(
    x: Vector3<f64>,
    y: Vector3<f64>,
    z: Vector3<f64>,
    origin: Point3<f64>,
) -> Matrix4<f64> {
    #[rustfmt::skip]
    let m = Matrix4::new(
        x.x, y.x, z.x, origin.x,
        x.y, y.y, z.y, origin.y,
        x.z, y.z, z.z, origin.z,
        0.0, 0.0, 0.0, 1.0,
    );
    m
}

/// IfcAxis2Placement3D(Location, Axis, RefDirection)
pub fn parse_axis2_placement_3d(
    placement: &DecodedEntity,
    decoder: &mut EntityDecoder,
) -> Result<Matrix4<f64>> {
    let location = optional_point(placement, 0, decoder)?;
    let z = optional_direction(placement, 1, decoder, Vector3::z())?;
    let x = optional_direction(placement, 2, decoder, Vector3::x())?;
    let (x, y, z) = orthonormal_basis(z, x);
    Ok(matrix_from_axes(x, y, z, location))
}

/// IfcAxis2Placement2D(Location, RefDirection) as a 2D homogeneous matrix
pub fn parse_axis2_placement_2d(
    placement: &DecodedEntity,
    decoder: &mut EntityDecoder,
) -> Result<Matrix3<f64>> {
    let location = optional_point(placement, 0, decoder)?;
    let x = optional_direction(placement, 1, decoder, Vector3::x())?;
    let x = Vector3::new(x.x, x.y, 0.0)
        .try_normalize(1e-12)
        .unwrap_or_else(Vector3::x);
    #[rustfmt::skip]
    let m = Matrix3::new(
        x.x, -x.y, location.x,
        x.y,  x.x, location.y,
        0.0,  0.0, 1.0,
    );
    Ok(m)
}

/// Any axis placement as a 3D matrix; 2D placements stay in the XY plane
pub fn parse_placement(placement: &DecodedEntity, decoder: &mut EntityDecoder) -> Result<Matrix4<f64>> {
    match placement.ifc_type {
        IfcType::IfcAxis2Placement3D => parse_axis2_placement_3d(placement, decoder),
        IfcType::IfcAxis2Placement2D => {
            let m = parse_axis2_placement_2d(placement, decoder)?;
            #[rustfmt::skip]
            let lifted = Matrix4::new(
                m[(0, 0)], m[(0, 1)], 0.0, m[(0, 2)],
                m[(1, 0)], m[(1, 1)], 0.0, m[(1, 2)],
                0.0,       0.0,       1.0, 0.0,
                0.0,       0.0,       0.0, 1.0,
            );
            Ok(lifted)
        }
        other => Err(Error::geometry(format!(
            "#{} is {}, expected an axis placement",
            placement.id, other
        ))),
    }
}

/// World transform of an IfcLocalPlacement(PlacementRelTo, RelativePlacement) chain
pub fn local_placement_transform(
    decoder: &mut EntityDecoder,
    placement_id: u32,
) -> Result<Matrix4<f64>> {
    let mut transform = Matrix4::identity();
    let mut next = Some(placement_id);
    let mut depth = 0;

    // Walk child -> parent, pre-multiplying each parent
    while let Some(id) = next {
        if depth > MAX_PLACEMENT_DEPTH {
            return Err(Error::geometry(format!(
                "placement chain from #{} exceeds {} levels",
                placement_id, MAX_PLACEMENT_DEPTH
            )));
        }
        let placement = decoder.decode_by_id(id)?;
        if placement.ifc_type != IfcType::IfcLocalPlacement {
            // IfcGridPlacement and friends are not resolved
            break;
        }
        let local = match placement.get_ref(1) {
            Some(relative_id) => {
                let relative = decoder.decode_by_id(relative_id)?;
                parse_placement(&relative, decoder)?
            }
            None => Matrix4::identity(),
        };
        transform = local * transform;
        next = placement.get_ref(0);
        depth += 1;
    }

    Ok(transform)
}

/// IfcCartesianTransformationOperator3D(Axis1, Axis2, LocalOrigin, Scale, Axis3)
/// and the non-uniform variant (.., Scale2, Scale3)
pub fn parse_cartesian_transformation_operator(
    operator: &DecodedEntity,
    decoder: &mut EntityDecoder,
) -> Result<Matrix4<f64>> {
    let x = optional_direction(operator, 0, decoder, Vector3::x())?;
    let origin = optional_point(operator, 2, decoder)?;
    let scale = operator.get_float(3).unwrap_or(1.0);
    let z = optional_direction(operator, 4, decoder, Vector3::z())?;

    let (scale_y, scale_z) = if operator.ifc_type == IfcType::IfcCartesianTransformationOperator3DnonUniform {
        (
            operator.get_float(5).unwrap_or(scale),
            operator.get_float(6).unwrap_or(scale),
        )
    } else {
        (scale, scale)
    };

    let (x, y, z) = orthonormal_basis(z, x);
    Ok(matrix_from_axes(x * scale, y * scale_y, z * scale_z, origin))
}
