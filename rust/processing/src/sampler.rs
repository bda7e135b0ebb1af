// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Area-uniform surface sampling and voxel-grid downsampling.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashSet;

use crate::error::{PipelineError, Result};
use crate::mesh::AggregateMesh;

/// Sampled points
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    pub points: Vec<[f64; 3]>,
}

impl PointCloud {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Cumulative face areas; the last entry is the total surface area
fn cumulative_areas(mesh: &AggregateMesh) -> Vec<f64> {
    let mut total = 0.0;
    (0..mesh.face_count())
        .map(|i| {
            total += mesh.face_area(i);
            total
        })
        .collect()
}

/// Draw `target_count` points, choosing faces proportionally to their area
/// and positions uniformly inside each chosen face.
pub fn sample_surface<R: Rng + ?Sized>(
    mesh: &AggregateMesh,
    target_count: usize,
    rng: &mut R,
) -> Result<PointCloud> {
    let cumulative = cumulative_areas(mesh);
    let total = cumulative.last().copied().unwrap_or(0.0);
    if !(total > 0.0) || !total.is_finite() {
        return Err(PipelineError::DegenerateSurface);
    }

    let last_face = cumulative.len() - 1;
    let points = (0..target_count)
        .map(|_| {
            let target = rng.gen::<f64>() * total;
            let face = cumulative.partition_point(|&c| c <= target).min(last_face);
            let [a, b, c] = mesh.face_vertices(face);

            // sqrt warps the first coordinate so points do not bunch at vertex `a`
            let r1 = rng.gen::<f64>().sqrt();
            let r2 = rng.gen::<f64>();
            let (wa, wb, wc) = (1.0 - r1, r1 * (1.0 - r2), r1 * r2);
            [
                wa * a[0] + wb * b[0] + wc * c[0],
                wa * a[1] + wb * b[1] + wc * c[1],
                wa * a[2] + wb * b[2] + wc * c[2],
            ]
        })
        .collect();

    Ok(PointCloud { points })
}

/// Keep the first point of every occupied voxel of edge `voxel_size`.
/// A non-positive edge returns the cloud unchanged.
pub fn voxel_downsample(cloud: PointCloud, voxel_size: f64) -> PointCloud {
    if !(voxel_size > 0.0) {
        return cloud;
    }
    let mut occupied = FxHashSet::default();
    let points = cloud
        .points
        .into_iter()
        .filter(|p| {
            let key = (
                (p[0] / voxel_size).floor() as i64,
                (p[1] / voxel_size).floor() as i64,
                (p[2] / voxel_size).floor() as i64,
            );
            occupied.insert(key)
        })
        .collect();
    PointCloud { points }
}

/// Surface sampler with a reproducible random stream
#[derive(Debug)]
pub struct PointSampler {
    rng: ChaCha8Rng,
    seed: u64,
    voxel_size: f64,
}

impl PointSampler {
    pub fn new(seed: u64, voxel_size: f64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            voxel_size,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Area-uniform sample of `target_count` draws, then voxel downsampling.
    /// The result has at most `target_count` points.
    pub fn sample(&mut self, mesh: &AggregateMesh, target_count: usize) -> Result<PointCloud> {
        if target_count == 0 {
            return Err(PipelineError::InvalidConfig(
                "target point count must be at least 1".into(),
            ));
        }
        let drawn = sample_surface(mesh, target_count, &mut self.rng)?;
        let drawn_count = drawn.len();
        let cloud = voxel_downsample(drawn, self.voxel_size);
        tracing::debug!(
            drawn = drawn_count,
            kept = cloud.len(),
            voxel_size = self.voxel_size,
            "Voxel downsampling complete"
        );
        Ok(cloud)
    }
}
