// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MappedItem processor - geometry instancing.

use ifc2cloud_core::{DecodedEntity, EntityDecoder, IfcType};
use nalgebra::Matrix4;

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::router::{GeometryProcessor, ItemContext};
use crate::transform::{parse_cartesian_transformation_operator, parse_placement};

/// Handles IfcMappedItem by processing the shared representation and
/// placing it with MappingTarget * MappingOrigin
#[derive(Debug, Default)]
pub struct MappedItemProcessor;

impl MappedItemProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl GeometryProcessor for MappedItemProcessor {
    fn process(
        &self,
        entity: &DecodedEntity,
        decoder: &mut EntityDecoder,
        items: &ItemContext<'_>,
    ) -> Result<Mesh> {
        // IfcMappedItem: 0 MappingSource (IfcRepresentationMap), 1 MappingTarget
        let source_id = entity
            .get_ref(0)
            .ok_or_else(|| Error::geometry(format!("#{} has no MappingSource", entity.id)))?;
        let source = decoder.decode_by_id(source_id)?;

        // IfcRepresentationMap: 0 MappingOrigin, 1 MappedRepresentation
        let representation_id = source.get_ref(1).ok_or_else(|| {
            Error::geometry(format!("#{} has no MappedRepresentation", source_id))
        })?;
        let representation = decoder.decode_by_id(representation_id)?;
        let item_ids = representation.get_refs(3);
        if item_ids.is_empty() {
            return Err(Error::NoRepresentation);
        }

        let mut mesh = items.process_items(decoder, &item_ids)?;

        let origin = match source.get_ref(0) {
            Some(origin_id) => {
                let origin = decoder.decode_by_id(origin_id)?;
                parse_placement(&origin, decoder)?
            }
            None => Matrix4::identity(),
        };
        let target = match entity.get_ref(1) {
            Some(target_id) => {
                let target = decoder.decode_by_id(target_id)?;
                parse_cartesian_transformation_operator(&target, decoder)?
            }
            None => Matrix4::identity(),
        };
        mesh.transform(&(target * origin));

        Ok(mesh)
    }

    fn supported_types(&self) -> Vec<IfcType> {
        vec![IfcType::IfcMappedItem]
    }
}
