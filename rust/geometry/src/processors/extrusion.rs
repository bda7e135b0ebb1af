// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ExtrudedAreaSolid processor - extrusion of 2D profiles.

use ifc2cloud_core::{DecodedEntity, EntityDecoder, IfcType};
use nalgebra::Vector3;

use crate::error::{Error, Result};
use crate::extrusion::extrude_profile;
use crate::mesh::Mesh;
use crate::profiles::ProfileProcessor;
use crate::router::{GeometryProcessor, ItemContext};
use crate::transform::{optional_direction, parse_placement};

/// Handles IfcExtrudedAreaSolid
#[derive(Debug, Default)]
pub struct ExtrudedAreaSolidProcessor {
    profiles: ProfileProcessor,
}

impl ExtrudedAreaSolidProcessor {
    pub fn new() -> Self {
        Self {
            profiles: ProfileProcessor::new(),
        }
    }
}

impl GeometryProcessor for ExtrudedAreaSolidProcessor {
    fn process(
        &self,
        entity: &DecodedEntity,
        decoder: &mut EntityDecoder,
        _items: &ItemContext<'_>,
    ) -> Result<Mesh> {
        // IfcExtrudedAreaSolid attributes:
        // 0: SweptArea (IfcProfileDef)
        // 1: Position (IfcAxis2Placement3D, optional in IFC4)
        // 2: ExtrudedDirection (IfcDirection)
        // 3: Depth (IfcPositiveLengthMeasure)
        let profile_id = entity
            .get_ref(0)
            .ok_or_else(|| Error::geometry(format!("#{} has no SweptArea", entity.id)))?;
        let profile_entity = decoder.decode_by_id(profile_id)?;
        let profile = self.profiles.process(&profile_entity, decoder)?;

        let direction = optional_direction(entity, 2, decoder, Vector3::z())?;
        let depth = entity
            .get_float(3)
            .ok_or_else(|| Error::geometry(format!("#{} has no Depth", entity.id)))?;

        let mut mesh = extrude_profile(&profile, depth, direction)?;

        if let Some(position_id) = entity.get_ref(1) {
            let position = decoder.decode_by_id(position_id)?;
            mesh.transform(&parse_placement(&position, decoder)?);
        }

        Ok(mesh)
    }

    fn supported_types(&self) -> Vec<IfcType> {
        vec![IfcType::IfcExtrudedAreaSolid]
    }
}
