// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC model adapter: STEP file in, elements and world-space meshes out.

use std::path::Path;
use std::sync::Arc;

use ifc2cloud_core::{
    build_entity_index, canonical_type_name, length_unit_scale, parse_entity, EntityDecoder,
    EntityIndex, EntityScanner, Token,
};
use ifc2cloud_geometry::{GeometryRouter, Mesh};
use rustc_hash::FxHashSet;

use crate::element::{BimModel, Element, GeometryHandle};
use crate::error::{PipelineError, Result};

/// IfcProduct attribute positions shared by every product subtype
const OBJECT_PLACEMENT: usize = 5;
const REPRESENTATION: usize = 6;

/// A parsed IFC file.
///
/// The content and entity index are shared; every `resolve` call works
/// through its own decoder so workers never contend on a cache.
pub struct IfcModel {
    content: String,
    index: Arc<EntityIndex>,
    router: GeometryRouter,
}

impl IfcModel {
    /// Read and index an IFC file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| PipelineError::input(format!("cannot read {}: {}", path.display(), e)))?;
        let content = match String::from_utf8(bytes) {
            Ok(content) => content,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        };
        Self::from_content(content)
            .map_err(|e| PipelineError::input(format!("{}: {}", path.display(), e)))
    }

    /// Index in-memory STEP content
    pub fn from_content(content: impl Into<String>) -> Result<Self> {
        let content = content.into();
        if !content.trim_start().starts_with("ISO-10303-21") {
            return Err(PipelineError::input(
                "not a STEP physical file (missing ISO-10303-21 header)",
            ));
        }
        if !content.contains("DATA;") {
            return Err(PipelineError::input("STEP file has no DATA section"));
        }

        let start = std::time::Instant::now();
        let index = Arc::new(build_entity_index(&content));
        if index.is_empty() {
            return Err(PipelineError::input("DATA section contains no entities"));
        }

        let mut decoder = EntityDecoder::with_index(&content, Arc::clone(&index));
        let unit_scale = length_unit_scale(&content, &mut decoder)
            .map_err(|e| PipelineError::input(format!("cannot read project units: {}", e)))?;

        tracing::info!(
            entities = index.len(),
            unit_scale = unit_scale,
            index_time_ms = start.elapsed().as_millis(),
            "IFC model indexed"
        );

        Ok(Self {
            content,
            index,
            router: GeometryRouter::with_scale(unit_scale),
        })
    }

    /// Length unit of the file in metres
    pub fn unit_scale(&self) -> f64 {
        self.router.unit_scale()
    }

    pub fn entity_count(&self) -> usize {
        self.index.len()
    }
}

impl BimModel for IfcModel {
    /// Every product whose Representation is an IfcProductDefinitionShape, in file order
    fn enumerate(&self) -> Vec<Element> {
        let shapes: FxHashSet<u32> = EntityScanner::new(&self.content)
            .filter(|e| e.type_name.eq_ignore_ascii_case("IFCPRODUCTDEFINITIONSHAPE"))
            .map(|e| e.id)
            .collect();
        if shapes.is_empty() {
            return Vec::new();
        }

        let mut elements = Vec::new();
        for scanned in EntityScanner::new(&self.content) {
            let (id, type_name, tokens) = match parse_entity(scanned.text(&self.content)) {
                Ok(parsed) => parsed,
                Err(e) => {
                    tracing::debug!(entity = scanned.id, error = %e, "Unparseable entity skipped");
                    continue;
                }
            };
            let Some(Token::EntityRef(representation)) = tokens.get(REPRESENTATION) else {
                continue;
            };
            if !shapes.contains(representation) {
                continue;
            }
            let placement = match tokens.get(OBJECT_PLACEMENT) {
                Some(Token::EntityRef(placement)) => Some(*placement),
                _ => None,
            };
            elements.push(Element {
                id,
                category: canonical_type_name(type_name).into_owned(),
                geometry: GeometryHandle {
                    representation: *representation,
                    placement,
                },
            });
        }
        elements
    }

    fn resolve(&self, element: &Element) -> ifc2cloud_geometry::Result<Mesh> {
        let mut decoder = EntityDecoder::with_index(&self.content, Arc::clone(&self.index));
        self.router.process_product(
            &mut decoder,
            element.geometry.representation,
            element.geometry.placement,
        )
    }
}
