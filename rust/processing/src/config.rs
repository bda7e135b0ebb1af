// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pipeline configuration.

use crate::error::{PipelineError, Result};

/// Default number of surface samples
pub const DEFAULT_TARGET_POINTS: usize = 100_000;

/// Default voxel edge for downsampling, in metres
pub const DEFAULT_VOXEL_SIZE: f64 = 0.01;

/// Conversion settings.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Requested worker count; `None` means one less than the core count.
    pub workers: Option<usize>,
    /// Category labels to leave out (exact, case-sensitive).
    pub excluded: Vec<String>,
    /// Number of area-weighted draws before downsampling.
    pub target_points: usize,
    /// Voxel edge length in metres; 0 disables downsampling.
    pub voxel_size: f64,
    /// Sampling seed; a random one is drawn (and logged) when absent.
    pub seed: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: None,
            excluded: Vec::new(),
            target_points: DEFAULT_TARGET_POINTS,
            voxel_size: DEFAULT_VOXEL_SIZE,
            seed: None,
        }
    }
}

impl PipelineConfig {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn with_excluded<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_target_points(mut self, target_points: usize) -> Self {
        self.target_points = target_points;
        self
    }

    pub fn with_voxel_size(mut self, voxel_size: f64) -> Self {
        self.voxel_size = voxel_size;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == Some(0) {
            return Err(PipelineError::InvalidConfig(
                "worker count must be at least 1".into(),
            ));
        }
        if self.target_points == 0 {
            return Err(PipelineError::InvalidConfig(
                "target point count must be at least 1".into(),
            ));
        }
        if !self.voxel_size.is_finite() || self.voxel_size < 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "voxel size must be a non-negative number, got {}",
                self.voxel_size
            )));
        }
        Ok(())
    }

    /// Effective pool size: `min(configured, cores)`, default `max(1, cores - 1)`
    pub fn worker_count(&self) -> usize {
        resolve_worker_count(self.workers, num_cpus::get())
    }
}

fn resolve_worker_count(configured: Option<usize>, cores: usize) -> usize {
    let cores = cores.max(1);
    match configured {
        Some(n) => n.clamp(1, cores),
        None => cores.saturating_sub(1).max(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_count_resolution() {
        assert_eq!(resolve_worker_count(None, 8), 7);
        assert_eq!(resolve_worker_count(None, 1), 1);
        assert_eq!(resolve_worker_count(Some(4), 8), 4);
        assert_eq!(resolve_worker_count(Some(32), 8), 8);
    }

    #[test]
    fn test_validate() {
        assert!(PipelineConfig::default().validate().is_ok());
        assert!(PipelineConfig::default().with_workers(0).validate().is_err());
        assert!(PipelineConfig::default().with_target_points(0).validate().is_err());
        assert!(PipelineConfig::default().with_voxel_size(-1.0).validate().is_err());
        assert!(PipelineConfig::default().with_voxel_size(f64::NAN).validate().is_err());
        assert!(PipelineConfig::default().with_voxel_size(0.0).validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = PipelineConfig::default()
            .with_excluded(["IfcDoor", "IfcWindow"])
            .with_seed(7);
        assert_eq!(config.excluded, vec!["IfcDoor".to_string(), "IfcWindow".to_string()]);
        assert_eq!(config.seed, Some(7));
    }
}
