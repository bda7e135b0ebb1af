// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry worker: resolves one chunk of elements.

use serde::{Deserialize, Serialize};

use crate::color::CategoryColors;
use crate::element::{BimModel, Element};
use crate::mesh::PartialMesh;

/// An element whose geometry could not be resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementFailure {
    pub element_id: u32,
    pub category: String,
    pub reason: String,
}

/// Resolve every element of `chunk` into one partial mesh.
///
/// A failing element is recorded and skipped; it never aborts the chunk.
pub fn process_chunk<M>(
    model: &M,
    chunk: Vec<Element>,
    colors: CategoryColors,
) -> (PartialMesh, Vec<ElementFailure>)
where
    M: BimModel + ?Sized,
{
    let mut partial = PartialMesh::new();
    let mut failures = Vec::new();

    for element in chunk {
        match model.resolve(&element) {
            Ok(mesh) if !mesh.is_empty() => {
                partial.push_element(element.id, &mesh, colors.color_for(&element.category));
            }
            Ok(_) => failures.push(ElementFailure {
                element_id: element.id,
                category: element.category,
                reason: "empty mesh".to_string(),
            }),
            Err(e) => {
                tracing::debug!(element = element.id, category = %element.category, error = %e, "Element skipped");
                failures.push(ElementFailure {
                    element_id: element.id,
                    category: element.category,
                    reason: e.to_string(),
                });
            }
        }
    }

    (partial, failures)
}
