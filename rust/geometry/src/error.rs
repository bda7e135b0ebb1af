// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while turning a representation into a mesh
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Geometry error: {0}")]
    Geometry(String),

    #[error("Triangulation failed: {0}")]
    Triangulation(String),

    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("Unsupported representation item {0}")]
    UnsupportedType(String),

    #[error("Product has no shape representation")]
    NoRepresentation,

    #[error("Representation produced an empty mesh")]
    EmptyMesh,

    #[error("Core parser error: {0}")]
    Core(#[from] ifc2cloud_core::Error),
}

impl Error {
    pub fn geometry(message: impl Into<String>) -> Self {
        Error::Geometry(message.into())
    }
}
