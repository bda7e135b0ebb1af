// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Profile definitions - IfcProfileDef entities to [`Profile2D`]
//!
//! Parameterized profiles carry a Position (attribute 2) that is applied to
//! the generated outline. Arbitrary profiles are read from their bounding curves.

use std::f64::consts::TAU;

use ifc2cloud_core::{AttributeValue, DecodedEntity, EntityDecoder, IfcType};
use nalgebra::Point2;

use crate::error::{Error, Result};
use crate::profile::{create_circle, create_rectangle, Profile2D};
use crate::transform::{parse_axis2_placement_2d, parse_cartesian_point};

/// Turns profile definitions into 2D outlines
#[derive(Debug, Default, Clone, Copy)]
pub struct ProfileProcessor;

fn dimension(profile: &DecodedEntity, index: usize, what: &str) -> Result<f64> {
    match profile.get_float(index) {
        Some(value) if value.is_finite() && value > 0.0 => Ok(value),
        Some(value) => Err(Error::InvalidProfile(format!(
            "#{} {} must be positive, got {}",
            profile.id, what, value
        ))),
        None => Err(Error::InvalidProfile(format!(
            "#{} is missing {}",
            profile.id, what
        ))),
    }
}

impl ProfileProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Build the outline of a profile definition in its own XY plane
    pub fn process(&self, profile: &DecodedEntity, decoder: &mut EntityDecoder) -> Result<Profile2D> {
        let outline = match profile.ifc_type {
            IfcType::IfcArbitraryClosedProfileDef | IfcType::IfcArbitraryProfileDefWithVoids => {
                return self.process_arbitrary(profile, decoder).map(Profile2D::normalized);
            }
            IfcType::IfcRectangleProfileDef => create_rectangle(
                dimension(profile, 3, "XDim")?,
                dimension(profile, 4, "YDim")?,
            ),
            IfcType::IfcRectangleHollowProfileDef => self.rectangle_hollow(profile)?,
            IfcType::IfcCircleProfileDef => create_circle(dimension(profile, 3, "Radius")?, None),
            IfcType::IfcCircleHollowProfileDef => {
                let radius = dimension(profile, 3, "Radius")?;
                let wall = dimension(profile, 4, "WallThickness")?;
                create_circle(radius, Some(radius - wall))
            }
            IfcType::IfcIShapeProfileDef => self.i_shape(profile)?,
            IfcType::IfcLShapeProfileDef => self.l_shape(profile)?,
            other => {
                return Err(Error::UnsupportedType(format!(
                    "{} (profile #{})",
                    other, profile.id
                )))
            }
        };

        let mut outline = outline;
        if let Some(position_id) = profile.get_ref(2) {
            let position = decoder.decode_by_id(position_id)?;
            if position.ifc_type == IfcType::IfcAxis2Placement2D {
                outline.transform(&parse_axis2_placement_2d(&position, decoder)?);
            }
        }
        Ok(outline.normalized())
    }

    fn rectangle_hollow(&self, profile: &DecodedEntity) -> Result<Profile2D> {
        let x = dimension(profile, 3, "XDim")?;
        let y = dimension(profile, 4, "YDim")?;
        let wall = dimension(profile, 5, "WallThickness")?;
        let mut outline = create_rectangle(x, y);
        if 2.0 * wall < x && 2.0 * wall < y {
            let mut hole = create_rectangle(x - 2.0 * wall, y - 2.0 * wall).outer;
            hole.reverse();
            outline.add_hole(hole);
        }
        Ok(outline)
    }

    /// IfcIShapeProfileDef(.., OverallWidth, OverallDepth, WebThickness, FlangeThickness, ..)
    fn i_shape(&self, profile: &DecodedEntity) -> Result<Profile2D> {
        let hw = dimension(profile, 3, "OverallWidth")? / 2.0;
        let hd = dimension(profile, 4, "OverallDepth")? / 2.0;
        let tw = dimension(profile, 5, "WebThickness")? / 2.0;
        let tf = dimension(profile, 6, "FlangeThickness")?;
        Ok(Profile2D::new(vec![
            Point2::new(-hw, -hd),
            Point2::new(hw, -hd),
            Point2::new(hw, -hd + tf),
            Point2::new(tw, -hd + tf),
            Point2::new(tw, hd - tf),
            Point2::new(hw, hd - tf),
            Point2::new(hw, hd),
            Point2::new(-hw, hd),
            Point2::new(-hw, hd - tf),
            Point2::new(-tw, hd - tf),
            Point2::new(-tw, -hd + tf),
            Point2::new(-hw, -hd + tf),
        ]))
    }

    /// IfcLShapeProfileDef(.., Depth, Width, Thickness, ..); Width defaults to Depth
    fn l_shape(&self, profile: &DecodedEntity) -> Result<Profile2D> {
        let depth = dimension(profile, 3, "Depth")?;
        let width = profile.get_float(4).filter(|w| *w > 0.0).unwrap_or(depth);
        let t = dimension(profile, 5, "Thickness")?;
        let (hw, hd) = (width / 2.0, depth / 2.0);
        Ok(Profile2D::new(vec![
            Point2::new(-hw, -hd),
            Point2::new(hw, -hd),
            Point2::new(hw, -hd + t),
            Point2::new(-hw + t, -hd + t),
            Point2::new(-hw + t, hd),
            Point2::new(-hw, hd),
        ]))
    }

    /// IfcArbitraryClosedProfileDef(.., OuterCurve) and
    /// IfcArbitraryProfileDefWithVoids(.., OuterCurve, InnerCurves)
    fn process_arbitrary(&self, profile: &DecodedEntity, decoder: &mut EntityDecoder) -> Result<Profile2D> {
        let outer_id = profile.get_ref(2).ok_or_else(|| {
            Error::InvalidProfile(format!("#{} has no OuterCurve", profile.id))
        })?;
        let mut outline = Profile2D::new(self.curve_points(decoder, outer_id)?);

        if profile.ifc_type == IfcType::IfcArbitraryProfileDefWithVoids {
            for inner_id in profile.get_refs(3) {
                outline.add_hole(self.curve_points(decoder, inner_id)?);
            }
        }
        Ok(outline)
    }

    /// Points of a bounded 2D curve (polyline or indexed poly curve)
    pub fn curve_points(&self, decoder: &mut EntityDecoder, curve_id: u32) -> Result<Vec<Point2<f64>>> {
        let curve = decoder.decode_by_id(curve_id)?;
        match curve.ifc_type {
            IfcType::IfcPolyline => curve
                .get_refs(0)
                .into_iter()
                .map(|id| parse_cartesian_point(decoder, id).map(|p| Point2::new(p.x, p.y)))
                .collect(),
            IfcType::IfcIndexedPolyCurve => self.indexed_poly_curve(&curve, decoder),
            other => Err(Error::UnsupportedType(format!("{} (curve #{})", other, curve_id))),
        }
    }

    /// IfcIndexedPolyCurve(Points, Segments, SelfIntersect)
    fn indexed_poly_curve(&self, curve: &DecodedEntity, decoder: &mut EntityDecoder) -> Result<Vec<Point2<f64>>> {
        let list_id = curve
            .get_ref(0)
            .ok_or_else(|| Error::InvalidProfile(format!("#{} has no Points", curve.id)))?;
        let list = decoder.decode_by_id(list_id)?;
        let points: Vec<Point2<f64>> = list
            .get_list(0)
            .map(AttributeValue::parse_coordinate_list_3d)
            .unwrap_or_default()
            .into_iter()
            .map(|[x, y, _]| Point2::new(x, y))
            .collect();

        let Some(segments) = curve.get_list(1) else {
            return Ok(points);
        };

        let mut result: Vec<Point2<f64>> = Vec::with_capacity(points.len());
        let mut push = |p: Point2<f64>| {
            if result.last().map_or(true, |last| (last - p).norm() > 1e-12) {
                result.push(p);
            }
        };

        for segment in segments {
            // IFCLINEINDEX((1,2,..)) or IFCARCINDEX((1,2,3))
            let AttributeValue::Typed(kind, args) = segment else {
                continue;
            };
            let indices: Vec<Point2<f64>> = args
                .first()
                .and_then(|a| a.as_list())
                .unwrap_or_default()
                .iter()
                .filter_map(|v| v.as_int())
                .filter_map(|i| points.get((i as usize).checked_sub(1)?).copied())
                .collect();

            if kind.eq_ignore_ascii_case("IFCARCINDEX") && indices.len() == 3 {
                arc_through(indices[0], indices[1], indices[2])
                    .into_iter()
                    .for_each(&mut push);
            } else {
                indices.into_iter().for_each(&mut push);
            }
        }
        Ok(result)
    }
}

/// Circular arc from `start` through `mid` to `end`, as a polyline
pub fn arc_through(start: Point2<f64>, mid: Point2<f64>, end: Point2<f64>) -> Vec<Point2<f64>> {
    let d = 2.0
        * (start.x * (mid.y - end.y) + mid.x * (end.y - start.y) + end.x * (start.y - mid.y));
    if d.abs() < 1e-12 {
        return vec![start, mid, end];
    }

    let sq = |p: Point2<f64>| p.x * p.x + p.y * p.y;
    let centre = Point2::new(
        (sq(start) * (mid.y - end.y) + sq(mid) * (end.y - start.y) + sq(end) * (start.y - mid.y)) / d,
        (sq(start) * (end.x - mid.x) + sq(mid) * (start.x - end.x) + sq(end) * (mid.x - start.x)) / d,
    );
    let radius = (start - centre).norm();
    let angle = |p: Point2<f64>| (p.y - centre.y).atan2(p.x - centre.x);
    let ccw_from_start = |p: Point2<f64>| (angle(p) - angle(start)).rem_euclid(TAU);

    let mut sweep = ccw_from_start(end);
    if ccw_from_start(mid) > sweep {
        sweep -= TAU;
    }

    let segments = ((sweep.abs() / TAU * 32.0).ceil() as usize).clamp(2, 32);
    let start_angle = angle(start);
    (0..=segments)
        .map(|i| {
            let a = start_angle + sweep * i as f64 / segments as f64;
            Point2::new(centre.x + radius * a.cos(), centre.y + radius * a.sin())
        })
        .collect()
}
