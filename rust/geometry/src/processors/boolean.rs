// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Boolean results.
//!
//! Only the first operand is meshed. Openings and clipping half-spaces remove
//! little surface compared to the solid they cut, and the point cloud samples
//! surfaces rather than volumes.

use ifc2cloud_core::{DecodedEntity, EntityDecoder, IfcType};

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::router::{GeometryProcessor, ItemContext};

/// Handles IfcBooleanResult and IfcBooleanClippingResult
#[derive(Debug, Default)]
pub struct BooleanResultProcessor;

impl BooleanResultProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl GeometryProcessor for BooleanResultProcessor {
    fn process(
        &self,
        entity: &DecodedEntity,
        decoder: &mut EntityDecoder,
        items: &ItemContext<'_>,
    ) -> Result<Mesh> {
        // IfcBooleanResult: 0 Operator, 1 FirstOperand, 2 SecondOperand
        let first_operand = entity
            .get_ref(1)
            .ok_or_else(|| Error::geometry(format!("#{} has no FirstOperand", entity.id)))?;
        items.process_item(decoder, first_operand)
    }

    fn supported_types(&self) -> Vec<IfcType> {
        vec![IfcType::IfcBooleanResult, IfcType::IfcBooleanClippingResult]
    }
}
