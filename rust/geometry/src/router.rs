// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry Router - dispatch of representation items to processors
//!
//! The router owns one processor per supported item type. For a product it
//! selects the body representation, processes every item, applies the object
//! placement and finally the project length unit, yielding a world-space
//! mesh in metres.

use std::sync::Arc;

use ifc2cloud_core::{DecodedEntity, EntityDecoder, IfcType};
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::processors::{
    BooleanResultProcessor, ExtrudedAreaSolidProcessor, FaceBasedSurfaceModelProcessor,
    FacetedBrepProcessor, MappedItemProcessor, PolygonalFaceSetProcessor,
    ShellBasedSurfaceModelProcessor, TriangulatedFaceSetProcessor,
};
use crate::transform::local_placement_transform;

/// Nesting limit for mapped items and boolean operands
const MAX_ITEM_DEPTH: usize = 16;

/// Geometry processor trait.
/// Each processor turns one kind of representation item into a mesh in the
/// item's own coordinate system.
pub trait GeometryProcessor: Send + Sync {
    fn process(
        &self,
        entity: &DecodedEntity,
        decoder: &mut EntityDecoder,
        items: &ItemContext<'_>,
    ) -> Result<Mesh>;

    fn supported_types(&self) -> Vec<IfcType>;
}

/// Handle given to processors whose items contain further items
pub struct ItemContext<'r> {
    router: &'r GeometryRouter,
    depth: usize,
}

impl ItemContext<'_> {
    /// Process a nested item one level deeper
    pub fn process_item(&self, decoder: &mut EntityDecoder, item_id: u32) -> Result<Mesh> {
        let item = decoder.decode_by_id(item_id)?;
        self.router.process_item_at_depth(&item, decoder, self.depth + 1)
    }

    /// Process several items and merge them.
    ///
    /// Failing items are skipped; if every item fails the first error is returned.
    pub fn process_items(&self, decoder: &mut EntityDecoder, item_ids: &[u32]) -> Result<Mesh> {
        let mut mesh = Mesh::new();
        let mut first_error = None;
        for &id in item_ids {
            match self.process_item(decoder, id) {
                Ok(item_mesh) => mesh.merge(&item_mesh),
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) if mesh.is_empty() => Err(e),
            _ if mesh.is_empty() => Err(Error::EmptyMesh),
            _ => Ok(mesh),
        }
    }
}

/// Geometry router - routes representation items to processors
pub struct GeometryRouter {
    processors: FxHashMap<IfcType, Arc<dyn GeometryProcessor>>,
    /// File length unit in metres (e.g. 0.001 for millimetres)
    unit_scale: f64,
}

impl GeometryRouter {
    /// Router with the default processors, coordinates in file units
    pub fn new() -> Self {
        let mut router = Self {
            processors: FxHashMap::default(),
            unit_scale: 1.0,
        };

        router.register(Box::new(ExtrudedAreaSolidProcessor::new()));
        router.register(Box::new(TriangulatedFaceSetProcessor::new()));
        router.register(Box::new(PolygonalFaceSetProcessor::new()));
        router.register(Box::new(FacetedBrepProcessor::new()));
        router.register(Box::new(FaceBasedSurfaceModelProcessor::new()));
        router.register(Box::new(ShellBasedSurfaceModelProcessor::new()));
        router.register(Box::new(MappedItemProcessor::new()));
        router.register(Box::new(BooleanResultProcessor::new()));

        router
    }

    /// Router that converts results to metres with the given unit scale
    pub fn with_scale(unit_scale: f64) -> Self {
        let mut router = Self::new();
        router.unit_scale = unit_scale;
        router
    }

    pub fn unit_scale(&self) -> f64 {
        self.unit_scale
    }

    /// Register a geometry processor for all of its supported types
    pub fn register(&mut self, processor: Box<dyn GeometryProcessor>) {
        let processor: Arc<dyn GeometryProcessor> = Arc::from(processor);
        for ifc_type in processor.supported_types() {
            self.processors.insert(ifc_type, Arc::clone(&processor));
        }
    }

    pub fn supports(&self, ifc_type: IfcType) -> bool {
        self.processors.contains_key(&ifc_type)
    }

    /// Process a single representation item in its own coordinates (file units)
    pub fn process_item(&self, item: &DecodedEntity, decoder: &mut EntityDecoder) -> Result<Mesh> {
        self.process_item_at_depth(item, decoder, 0)
    }

    fn process_item_at_depth(
        &self,
        item: &DecodedEntity,
        decoder: &mut EntityDecoder,
        depth: usize,
    ) -> Result<Mesh> {
        if depth > MAX_ITEM_DEPTH {
            return Err(Error::geometry(format!(
                "item #{} nested deeper than {} levels",
                item.id, MAX_ITEM_DEPTH
            )));
        }
        let processor = self.processors.get(&item.ifc_type).ok_or_else(|| {
            let name = decoder
                .get_raw_content(item.id)
                .and_then(|raw| raw.split('=').nth(1))
                .map(|rest| rest.trim_start().split('(').next().unwrap_or(rest).trim().to_string())
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| item.ifc_type.name().to_string());
            Error::UnsupportedType(name)
        })?;
        let context = ItemContext {
            router: self,
            depth,
        };
        processor.process(item, decoder, &context)
    }

    /// Representation items of an IfcProductDefinitionShape.
    ///
    /// Shape representations identified as `Body` win; when there is none,
    /// the items of every shape representation are used.
    pub fn shape_items(&self, decoder: &mut EntityDecoder, definition_id: u32) -> Result<Vec<u32>> {
        let definition = decoder.decode_by_id(definition_id)?;
        if definition.ifc_type != IfcType::IfcProductDefinitionShape {
            return Err(Error::NoRepresentation);
        }

        let mut body = Vec::new();
        let mut all = Vec::new();
        for representation_id in definition.get_refs(2) {
            let representation = decoder.decode_by_id(representation_id)?;
            if representation.ifc_type != IfcType::IfcShapeRepresentation {
                continue;
            }
            let items = representation.get_refs(3);
            let is_body = representation
                .get_string(1)
                .is_some_and(|identifier| identifier.eq_ignore_ascii_case("Body"));
            if is_body {
                body.extend_from_slice(&items);
            }
            all.extend(items);
        }

        Ok(if body.is_empty() { all } else { body })
    }

    /// World-space mesh of a product in metres
    pub fn process_product(
        &self,
        decoder: &mut EntityDecoder,
        definition_id: u32,
        placement_id: Option<u32>,
    ) -> Result<Mesh> {
        let items = self.shape_items(decoder, definition_id)?;
        if items.is_empty() {
            return Err(Error::NoRepresentation);
        }

        let context = ItemContext {
            router: self,
            depth: 0,
        };
        let mut mesh = context.process_items(decoder, &items)?;

        if let Some(placement_id) = placement_id {
            mesh.transform(&local_placement_transform(decoder, placement_id)?);
        }
        mesh.scale(self.unit_scale);
        mesh.retain_valid_triangles();

        if mesh.is_empty() {
            return Err(Error::EmptyMesh);
        }
        Ok(mesh)
    }
}

impl Default for GeometryRouter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const WALL: &str = r#"
#1=IFCCARTESIANPOINT((0.,0.,0.));
#2=IFCAXIS2PLACEMENT3D(#1,$,$);
#3=IFCCARTESIANPOINT((1000.,0.,0.));
#4=IFCAXIS2PLACEMENT3D(#3,$,$);
#5=IFCLOCALPLACEMENT($,#4);
#6=IFCRECTANGLEPROFILEDEF(.AREA.,$,$,2000.,200.);
#7=IFCDIRECTION((0.,0.,1.));
#8=IFCEXTRUDEDAREASOLID(#6,#2,#7,3000.);
#9=IFCSHAPEREPRESENTATION($,'Body','SweptSolid',(#8));
#10=IFCPOLYLINE((#1,#3));
#11=IFCSHAPEREPRESENTATION($,'Axis','Curve2D',(#10));
#12=IFCPRODUCTDEFINITIONSHAPE($,$,(#11,#9));
#13=IFCWALL('g',$,'W',$,$,#5,#12,$,$);
"#;

    #[test]
    fn test_body_representation_selected() {
        let mut decoder = EntityDecoder::new(WALL);
        let router = GeometryRouter::new();
        assert_eq!(router.shape_items(&mut decoder, 12).unwrap(), vec![8]);
    }

    #[test]
    fn test_process_product_applies_placement_and_units() {
        let mut decoder = EntityDecoder::new(WALL);
        let router = GeometryRouter::with_scale(0.001);
        let mesh = router.process_product(&mut decoder, 12, Some(5)).unwrap();

        let (min, max) = mesh.bounds().unwrap();
        assert_relative_eq!(min.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(max.x, 2.0, epsilon = 1e-9);
        assert_relative_eq!(max.z, 3.0, epsilon = 1e-9);
        assert_relative_eq!(
            mesh.surface_area(),
            2.0 * (2.0 * 0.2 + 2.0 * 3.0 + 0.2 * 3.0),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_unsupported_item_reports_type_name() {
        let content = r#"
#1=IFCSWEPTDISKSOLID(#2,0.1,$,$,$);
#3=IFCSHAPEREPRESENTATION($,'Body','AdvancedSweptSolid',(#1));
#4=IFCPRODUCTDEFINITIONSHAPE($,$,(#3));
"#;
        let mut decoder = EntityDecoder::new(content);
        let err = GeometryRouter::new()
            .process_product(&mut decoder, 4, None)
            .unwrap_err();
        assert_eq!(err, Error::UnsupportedType("IFCSWEPTDISKSOLID".to_string()));
    }

    #[test]
    fn test_no_representation() {
        let content = "#1=IFCPRODUCTDEFINITIONSHAPE($,$,());";
        let mut decoder = EntityDecoder::new(content);
        let err = GeometryRouter::new()
            .process_product(&mut decoder, 1, None)
            .unwrap_err();
        assert_eq!(err, Error::NoRepresentation);
    }

    #[test]
    fn test_default_processors_registered() {
        let router = GeometryRouter::new();
        assert!(router.supports(IfcType::IfcExtrudedAreaSolid));
        assert!(router.supports(IfcType::IfcMappedItem));
        assert!(router.supports(IfcType::IfcShellBasedSurfaceModel));
        assert!(!router.supports(IfcType::IfcWall));
    }

    #[test]
    fn test_router_is_shareable() {
        fn assert_sync<T: Send + Sync>() {}
        assert_sync::<GeometryRouter>();
    }
}
