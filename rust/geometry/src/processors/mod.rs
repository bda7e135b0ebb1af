// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry Processors
//!
//! One processor per family of representation items:
//!
//! - `extrusion`: ExtrudedAreaSolid (extruded profiles)
//! - `tessellated`: TriangulatedFaceSet, PolygonalFaceSet (pre-tessellated meshes)
//! - `brep`: FacetedBrep, FaceBasedSurfaceModel, ShellBasedSurfaceModel
//! - `mapped`: MappedItem (geometry instancing)
//! - `boolean`: BooleanResult, BooleanClippingResult (first operand only)

mod boolean;
mod brep;
mod extrusion;
mod mapped;
mod tessellated;

#[cfg(test)]
mod tests;

pub use boolean::BooleanResultProcessor;
pub use brep::{FaceBasedSurfaceModelProcessor, FacetedBrepProcessor, ShellBasedSurfaceModelProcessor};
pub use extrusion::ExtrudedAreaSolidProcessor;
pub use mapped::MappedItemProcessor;
pub use tessellated::{PolygonalFaceSetProcessor, TriangulatedFaceSetProcessor};
