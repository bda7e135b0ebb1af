// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Unit extraction for IFC files
//!
//! Finds the project's length unit and turns it into a factor that converts
//! model coordinates to metres.

use crate::decoder::EntityDecoder;
use crate::error::Result;
use crate::parser::EntityScanner;
use crate::schema::{DecodedEntity, IfcType};

/// SI prefix multipliers (IfcSIPrefix)
#[inline]
pub fn get_si_prefix_multiplier(prefix: &str) -> f64 {
    match prefix {
        "ATTO" => 1e-18,
        "FEMTO" => 1e-15,
        "PICO" => 1e-12,
        "NANO" => 1e-9,
        "MICRO" => 1e-6,
        "MILLI" => 1e-3,
        "CENTI" => 1e-2,
        "DECI" => 1e-1,
        "DECA" => 1e1,
        "HECTO" => 1e2,
        "KILO" => 1e3,
        "MEGA" => 1e6,
        "GIGA" => 1e9,
        "TERA" => 1e12,
        "PETA" => 1e15,
        "EXA" => 1e18,
        _ => 1.0,
    }
}

/// Length factor of a unit entity, `None` if it is not a length unit.
///
/// IFCSIUNIT(Dimensions, UnitType, Prefix, Name)
/// IFCCONVERSIONBASEDUNIT(Dimensions, UnitType, Name, ConversionFactor)
fn length_factor(decoder: &mut EntityDecoder, unit: &DecodedEntity, depth: u32) -> Option<f64> {
    if depth > 8 || unit.get_enum(1) != Some("LENGTHUNIT") {
        return None;
    }

    match unit.ifc_type {
        IfcType::IfcSIUnit => Some(unit.get_enum(2).map_or(1.0, get_si_prefix_multiplier)),
        IfcType::IfcConversionBasedUnit => {
            // IFCMEASUREWITHUNIT(ValueComponent, UnitComponent)
            let measure = decoder.decode_by_id(unit.get_ref(3)?).ok()?;
            let value = measure.get_float(0)?;
            let base = match measure.get_ref(1) {
                Some(base_id) => {
                    let base_unit = decoder.decode_by_id(base_id).ok()?;
                    length_factor(decoder, &base_unit, depth + 1).unwrap_or(1.0)
                }
                None => 1.0,
            };
            Some(value * base)
        }
        _ => None,
    }
}

/// Length unit scale of a project
///
/// Follows IFCPROJECT (attr 8) -> IFCUNITASSIGNMENT -> length unit.
/// Returns 1.0 when the project declares no length unit.
pub fn extract_length_unit_scale(decoder: &mut EntityDecoder, project_id: u32) -> Result<f64> {
    let project = decoder.decode_by_id(project_id)?;
    if project.ifc_type != IfcType::IfcProject {
        return Ok(1.0);
    }

    let Some(assignment_id) = project.get_ref(8) else {
        return Ok(1.0);
    };
    let assignment = decoder.decode_by_id(assignment_id)?;
    if assignment.ifc_type != IfcType::IfcUnitAssignment {
        return Ok(1.0);
    }

    for unit_id in assignment.get_refs(0) {
        let Ok(unit) = decoder.decode_by_id(unit_id) else {
            continue;
        };
        if let Some(factor) = length_factor(decoder, &unit, 0) {
            if factor.is_finite() && factor > 0.0 {
                return Ok(factor);
            }
        }
    }

    Ok(1.0)
}

/// Length unit scale of the first IFCPROJECT in `content`, 1.0 if there is none
pub fn length_unit_scale(content: &str, decoder: &mut EntityDecoder) -> Result<f64> {
    let project = EntityScanner::new(content)
        .find(|entity| entity.type_name.eq_ignore_ascii_case("IFCPROJECT"));

    match project {
        Some(project) => extract_length_unit_scale(decoder, project.id),
        None => Ok(1.0),
    }
}
