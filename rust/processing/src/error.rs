// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the conversion pipeline.

use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Fatal conversion errors.
///
/// Per-element geometry failures are not errors at this level; they are
/// collected as [`ElementFailure`](crate::ElementFailure) records.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Input error: {0}")]
    Input(String),

    #[error("{0}")]
    NoGeometry(String),

    #[error("Failed to start worker pool: {0}")]
    WorkerPool(String),

    #[error("Worker {worker} crashed: {message}")]
    WorkerFault { worker: usize, message: String },

    #[error("Internal aggregation error: {0}")]
    Aggregation(String),

    #[error("Cannot sample points: mesh has zero surface area")]
    DegenerateSurface,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Export error: {0}")]
    Export(String),
}

impl PipelineError {
    pub fn input(message: impl Into<String>) -> Self {
        PipelineError::Input(message.into())
    }

    pub fn export(message: impl Into<String>) -> Self {
        PipelineError::Export(message.into())
    }
}
