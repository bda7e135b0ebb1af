// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for parsing and decoding
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while reading STEP content
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Parse error at byte {position}: {message}")]
    Parse { position: usize, message: String },

    #[error("Entity #{0} not found")]
    EntityNotFound(u32),

    #[error("Entity #{id}: {message}")]
    Attribute { id: u32, message: String },
}

impl Error {
    /// Build a parse error
    pub fn parse(position: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            position,
            message: message.into(),
        }
    }

    /// Build an attribute error for entity `id`
    pub fn attribute(id: u32, message: impl Into<String>) -> Self {
        Error::Attribute {
            id,
            message: message.into(),
        }
    }
}
