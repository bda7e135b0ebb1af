// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command line arguments.

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use ifc2cloud_processing::{PipelineConfig, DEFAULT_TARGET_POINTS, DEFAULT_VOXEL_SIZE};

/// Convert an IFC model into an evenly distributed point cloud
#[derive(Parser, Debug, Clone)]
#[command(name = "ifc2cloud", version)]
pub struct Args {
    /// Path to the IFC file
    pub ifc_path: PathBuf,

    /// Point cloud output (.ply, .pcd or .xyz)
    #[arg(short, long, default_value = "pointcloud.ply")]
    pub output: PathBuf,

    /// Aggregate mesh output (.ply, .obj or .stl)
    #[arg(short, long, default_value = "mesh.ply")]
    pub mesh_output: PathBuf,

    /// Number of points to sample
    #[arg(short, long, env = "IFC2CLOUD_POINTS", default_value_t = DEFAULT_TARGET_POINTS)]
    pub points: usize,

    /// Number of geometry workers [default: cores - 1]
    #[arg(short = 'n', long, env = "IFC2CLOUD_WORKERS")]
    pub processes: Option<usize>,

    /// Element types to exclude (e.g. IfcDoor IfcWindow)
    #[arg(short, long, num_args = 1..)]
    pub exclude: Vec<String>,

    /// Voxel edge for downsampling in metres, 0 disables
    #[arg(long, env = "IFC2CLOUD_VOXEL_SIZE", default_value_t = DEFAULT_VOXEL_SIZE)]
    pub voxel_size: f64,

    /// Seed for reproducible sampling
    #[arg(long, env = "IFC2CLOUD_SEED")]
    pub seed: Option<u64>,

    /// List all element types in the IFC file and exit
    #[arg(short, long)]
    pub list_types: bool,

    /// Don't print the colour legend and result summary
    #[arg(long, visible_alias = "nd")]
    pub no_display: bool,

    /// Interactively select element types to exclude after listing
    #[arg(short, long)]
    pub interactive_filter: bool,

    /// Print every element whose geometry could not be resolved
    #[arg(long)]
    pub list_failures: bool,

    /// Write a JSON extraction report
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn pipeline_config(&self, excluded: Vec<String>) -> PipelineConfig {
        PipelineConfig {
            workers: self.processes,
            excluded,
            target_points: self.points,
            voxel_size: self.voxel_size,
            seed: self.seed,
        }
    }

    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
