// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON extraction report.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::element::CategoryCount;
use crate::error::{PipelineError, Result};
use crate::pipeline::PipelineStats;
use crate::worker::ElementFailure;

/// Everything a run found out about a model
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub input: String,
    pub unit_scale: f64,
    pub excluded: Vec<String>,
    pub categories: Vec<CategoryCount>,
    pub stats: PipelineStats,
    pub failures: Vec<ElementFailure>,
    /// Sampling seed, absent when sampling did not run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<usize>,
}

impl ExtractionReport {
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| PipelineError::export(format!("report serialization failed: {}", e)))
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .map_err(|e| PipelineError::export(format!("{}: {}", path.display(), e)))?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer
            .flush()
            .map_err(|e| PipelineError::export(format!("{}: {}", path.display(), e)))
    }
}
