// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ifc2cloud - convert an IFC model into a point cloud.
//!
//! Geometry of every admitted element is extracted in parallel, merged into
//! one colored mesh and sampled uniformly by area. The mesh is written before
//! sampling so it survives a degenerate-surface failure.

use std::io;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use ifc2cloud_processing::{
    count_categories, write_mesh, write_point_cloud, BimModel, Conversion, ExtractionReport,
    IfcModel, MeshFormat, Pipeline, PointCloudFormat,
};
use tracing_subscriber::EnvFilter;

mod args;
mod listing;

use args::Args;

fn main() -> ExitCode {
    let args = Args::parse();

    // Logs go to stderr so tables on stdout stay clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_level())),
        )
        .with_writer(io::stderr)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let start = Instant::now();

    let model = IfcModel::open(&args.ifc_path)
        .with_context(|| format!("failed to load {}", args.ifc_path.display()))?;
    tracing::info!(
        entities = model.entity_count(),
        unit_scale = model.unit_scale(),
        "Model loaded"
    );

    let elements = model.enumerate();
    let counts = count_categories(&elements);
    let file_name = args
        .ifc_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.ifc_path.display().to_string());

    if listing::shows_category_table(args) {
        listing::print_category_table(&file_name, &counts);
    }
    if args.list_types {
        return Ok(());
    }

    let mut excluded = args.exclude.clone();
    if args.interactive_filter {
        let selected = listing::prompt_exclusions(&counts, &mut io::stdin().lock())
            .context("failed to read exclusion selection")?;
        for category in selected {
            if !excluded.contains(&category) {
                excluded.push(category);
            }
        }
    }
    if !excluded.is_empty() {
        tracing::info!(excluded = ?excluded, "Excluding element types");
    }

    // Reject unknown extensions before the expensive part
    MeshFormat::from_path(&args.mesh_output)?;
    PointCloudFormat::from_path(&args.output)?;

    let pipeline = Pipeline::new(args.pipeline_config(excluded.clone()))?;
    let extraction = pipeline.extract(&model)?;

    write_mesh(&args.mesh_output, &extraction.mesh)
        .with_context(|| format!("failed to write mesh {}", args.mesh_output.display()))?;

    let mut report = ExtractionReport {
        input: args.ifc_path.display().to_string(),
        unit_scale: model.unit_scale(),
        excluded,
        categories: counts,
        stats: extraction.stats.clone(),
        failures: extraction.failures.clone(),
        seed: None,
        points: None,
    };

    let mut sampler = pipeline.sampler();
    let sampled = sampler.sample(&extraction.mesh, pipeline.config().target_points);
    let cloud = match sampled {
        Ok(cloud) => cloud,
        Err(e) => {
            listing::print_failures(&extraction.failures, args.list_failures);
            write_report(args, &report)?;
            return Err(e).context("sampling failed; the mesh was still written");
        }
    };

    write_point_cloud(&args.output, &cloud)
        .with_context(|| format!("failed to write point cloud {}", args.output.display()))?;

    report.seed = Some(sampler.seed());
    report.points = Some(cloud.len());
    write_report(args, &report)?;

    listing::print_failures(&extraction.failures, args.list_failures);

    let conversion = Conversion {
        extraction,
        cloud,
        seed: sampler.seed(),
    };
    if !args.no_display {
        listing::print_summary(&conversion);
    }

    tracing::info!(
        points = conversion.cloud.len(),
        output = %args.output.display(),
        total_time_ms = start.elapsed().as_millis() as u64,
        "Conversion complete"
    );
    Ok(())
}

fn write_report(args: &Args, report: &ExtractionReport) -> anyhow::Result<()> {
    if let Some(path) = &args.report {
        report
            .write(path)
            .with_context(|| format!("failed to write report {}", path.display()))?;
        tracing::info!(path = %path.display(), "Report written");
    }
    Ok(())
}
