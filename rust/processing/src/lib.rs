// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # ifc2cloud processing
//!
//! Parallel geometry extraction and point sampling for building models.
//!
//! ```rust,ignore
//! use ifc2cloud_processing::{IfcModel, Pipeline, PipelineConfig};
//!
//! let model = IfcModel::open("building.ifc")?;
//! let config = PipelineConfig::default()
//!     .with_excluded(["IfcSpace", "IfcOpeningElement"])
//!     .with_target_points(50_000);
//! let conversion = Pipeline::new(config)?.run(&model)?;
//! println!("{} points", conversion.cloud.len());
//! ```
//!
//! The pipeline only sees the [`BimModel`] trait; [`IfcModel`] is the
//! STEP-backed implementation.

pub mod aggregate;
pub mod color;
pub mod config;
pub mod element;
pub mod error;
pub mod export;
pub mod filter;
pub mod ifc;
pub mod mesh;
pub mod partition;
pub mod pipeline;
pub mod report;
pub mod sampler;
pub mod worker;

pub use aggregate::aggregate;
pub use color::{CategoryColors, DEFAULT_COLOR, PALETTE};
pub use config::{PipelineConfig, DEFAULT_TARGET_POINTS, DEFAULT_VOXEL_SIZE};
pub use element::{count_categories, BimModel, CategoryCount, Element, GeometryHandle};
pub use error::{PipelineError, Result};
pub use export::{write_mesh, write_point_cloud, MeshFormat, PointCloudFormat};
pub use filter::filter_elements;
pub use ifc::IfcModel;
pub use mesh::{AggregateMesh, PartialMesh};
pub use partition::partition;
pub use pipeline::{Conversion, Extraction, Pipeline, PipelineStats};
pub use report::ExtractionReport;
pub use sampler::{sample_surface, voxel_downsample, PointCloud, PointSampler};
pub use worker::{process_chunk, ElementFailure};
