// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Elements and the model abstraction the pipeline runs on.

use std::collections::BTreeMap;

use ifc2cloud_geometry::Mesh;
use serde::{Deserialize, Serialize};

/// Where a model finds an element's geometry. Opaque to the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryHandle {
    /// Shape definition (IfcProductDefinitionShape for IFC models)
    pub representation: u32,
    /// Object placement, if any
    pub placement: Option<u32>,
}

/// One geometry-bearing element of a model.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Stable identifier, unique within the model
    pub id: u32,
    /// Category label, e.g. `IfcWall`
    pub category: String,
    pub geometry: GeometryHandle,
}

/// A parsed building model.
///
/// `enumerate` must be deterministic and keep file order. `resolve` is
/// called concurrently from several workers and returns a world-space mesh
/// in metres.
pub trait BimModel: Sync {
    fn enumerate(&self) -> Vec<Element>;

    fn resolve(&self, element: &Element) -> ifc2cloud_geometry::Result<Mesh>;
}

/// Category occurrence count, for listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

/// Count elements per category, sorted by category label
pub fn count_categories(elements: &[Element]) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for element in elements {
        *counts.entry(element.category.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(category, count)| CategoryCount {
            category: category.to_string(),
            count,
        })
        .collect()
}
