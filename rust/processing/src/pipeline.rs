// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pipeline orchestration.
//!
//! enumerate -> filter -> partition -> (parallel) workers -> aggregate -> sample
//!
//! Each conversion owns a dedicated rayon pool. Chunks are moved into the
//! workers and partial meshes are moved back out; results are gathered in
//! worker order before aggregation.

use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::aggregate::aggregate;
use crate::color::CategoryColors;
use crate::config::PipelineConfig;
use crate::element::BimModel;
use crate::error::{PipelineError, Result};
use crate::filter::filter_elements;
use crate::mesh::AggregateMesh;
use crate::partition::partition;
use crate::sampler::{PointCloud, PointSampler};
use crate::worker::{process_chunk, ElementFailure};

/// Counters of one extraction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineStats {
    pub elements_total: usize,
    pub elements_admitted: usize,
    pub elements_excluded: usize,
    pub elements_resolved: usize,
    pub elements_failed: usize,
    pub workers: usize,
    pub vertices: usize,
    pub faces: usize,
    pub surface_area: f64,
    pub extract_time_ms: u64,
}

/// Aggregate mesh plus everything needed to report on it
#[derive(Debug, Clone)]
pub struct Extraction {
    pub mesh: AggregateMesh,
    pub failures: Vec<ElementFailure>,
    pub colors: CategoryColors,
    pub stats: PipelineStats,
}

/// Full conversion result
#[derive(Debug, Clone)]
pub struct Conversion {
    pub extraction: Extraction,
    pub cloud: PointCloud,
    pub seed: u64,
}

/// Conversion pipeline for one configuration
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Resolve all admitted elements into one aggregate mesh
    pub fn extract<M: BimModel + ?Sized>(&self, model: &M) -> Result<Extraction> {
        let start = Instant::now();

        let elements = model.enumerate();
        let elements_total = elements.len();
        if elements_total == 0 {
            tracing::warn!("Model contains no elements with geometry");
        }

        let admitted = filter_elements(elements, &self.config.excluded);
        let elements_admitted = admitted.len();
        if !self.config.excluded.is_empty() {
            tracing::info!(
                excluded = ?self.config.excluded,
                removed = elements_total - elements_admitted,
                "Category filter applied"
            );
        }
        if admitted.is_empty() {
            return Err(PipelineError::NoGeometry("no geometry to sample".into()));
        }

        let colors = CategoryColors::from_categories(admitted.iter().map(|e| e.category.clone()));
        let workers = self.config.worker_count();
        let chunks = partition(admitted, workers);

        tracing::info!(
            elements = elements_admitted,
            workers = workers,
            chunk_sizes = ?chunks.iter().map(Vec::len).collect::<Vec<_>>(),
            "Starting geometry extraction"
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("geometry-worker-{}", i))
            .build()
            .map_err(|e| PipelineError::WorkerPool(e.to_string()))?;

        let results: Vec<_> = pool.install(|| {
            chunks
                .into_par_iter()
                .enumerate()
                .map(|(worker, chunk)| {
                    let chunk_len = chunk.len();
                    let colors = colors.clone();
                    let output = panic::catch_unwind(AssertUnwindSafe(|| {
                        process_chunk(model, chunk, colors)
                    }))
                    .map_err(|payload| PipelineError::WorkerFault {
                        worker,
                        message: panic_message(payload.as_ref()),
                    })?;
                    tracing::debug!(
                        worker = worker,
                        elements = chunk_len,
                        faces = output.0.face_count(),
                        failures = output.1.len(),
                        "Chunk complete"
                    );
                    Ok(output)
                })
                .collect::<Result<Vec<_>>>()
        })?;

        let mut parts = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        for (part, part_failures) in results {
            parts.push(part);
            failures.extend(part_failures);
        }

        let mesh = aggregate(parts)?;

        let stats = PipelineStats {
            elements_total,
            elements_admitted,
            elements_excluded: elements_total - elements_admitted,
            elements_resolved: mesh.element_ranges.len(),
            elements_failed: failures.len(),
            workers,
            vertices: mesh.vertex_count(),
            faces: mesh.face_count(),
            surface_area: mesh.surface_area(),
            extract_time_ms: start.elapsed().as_millis() as u64,
        };

        tracing::info!(
            resolved = stats.elements_resolved,
            failed = stats.elements_failed,
            vertices = stats.vertices,
            triangles = stats.faces,
            extract_time_ms = stats.extract_time_ms,
            "Geometry extraction complete"
        );

        Ok(Extraction {
            mesh,
            failures,
            colors,
            stats,
        })
    }

    /// Sampler seeded from the configuration, or from a fresh random seed
    pub fn sampler(&self) -> PointSampler {
        let seed = self.config.seed.unwrap_or_else(rand::random);
        tracing::info!(seed = seed, "Point sampler seeded");
        PointSampler::new(seed, self.config.voxel_size)
    }

    /// Sample the configured number of points from `mesh`
    pub fn sample(&self, mesh: &AggregateMesh) -> Result<PointCloud> {
        self.sampler().sample(mesh, self.config.target_points)
    }

    /// Extract and sample in one go
    pub fn run<M: BimModel + ?Sized>(&self, model: &M) -> Result<Conversion> {
        let extraction = self.extract(model)?;
        let start = Instant::now();
        let mut sampler = self.sampler();
        let cloud = sampler.sample(&extraction.mesh, self.config.target_points)?;
        tracing::info!(
            points = cloud.len(),
            sample_time_ms = start.elapsed().as_millis(),
            "Point sampling complete"
        );
        Ok(Conversion {
            extraction,
            cloud,
            seed: sampler.seed(),
        })
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "worker panicked".to_string()
    }
}
