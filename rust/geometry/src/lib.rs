// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ifc2cloud Geometry Processing
//!
//! Turns IFC shape representations into triangle meshes using earcutr
//! triangulation and nalgebra transformations. [`GeometryRouter`] is the
//! entry point: it picks the body representation of a product, dispatches
//! each item to a [`GeometryProcessor`] and returns a world-space mesh in
//! metres.

pub mod error;
pub mod extrusion;
pub mod mesh;
pub mod processors;
pub mod profile;
pub mod profiles;
pub mod router;
pub mod transform;
pub mod triangulation;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix4, Point2, Point3, Vector3};

pub use error::{Error, Result};
pub use extrusion::extrude_profile;
pub use mesh::Mesh;
pub use profile::Profile2D;
pub use profiles::ProfileProcessor;
pub use router::{GeometryProcessor, GeometryRouter, ItemContext};
pub use transform::local_placement_transform;
pub use triangulation::{triangulate_face, triangulate_polygon};
