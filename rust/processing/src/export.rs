// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Point cloud and mesh writers, format chosen by file extension.
//!
//! Point clouds: `.ply`, `.pcd`, `.xyz`. Meshes: `.ply` (vertex colours),
//! `.obj` (vertex colours as extra `v` columns), `.stl`. All ASCII.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::error::{PipelineError, Result};
use crate::mesh::AggregateMesh;
use crate::sampler::PointCloud;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointCloudFormat {
    Ply,
    Pcd,
    Xyz,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    Ply,
    Obj,
    Stl,
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

impl PointCloudFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match extension(path).as_deref() {
            Some("ply") => Ok(Self::Ply),
            Some("pcd") => Ok(Self::Pcd),
            Some("xyz") => Ok(Self::Xyz),
            _ => Err(PipelineError::export(format!(
                "{}: unsupported point cloud format (use .ply, .pcd or .xyz)",
                path.display()
            ))),
        }
    }
}

impl MeshFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match extension(path).as_deref() {
            Some("ply") => Ok(Self::Ply),
            Some("obj") => Ok(Self::Obj),
            Some("stl") => Ok(Self::Stl),
            _ => Err(PipelineError::export(format!(
                "{}: unsupported mesh format (use .ply, .obj or .stl)",
                path.display()
            ))),
        }
    }
}

fn color_byte(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

pub fn write_point_cloud_to<W: Write>(
    writer: &mut W,
    cloud: &PointCloud,
    format: PointCloudFormat,
) -> io::Result<()> {
    let n = cloud.len();
    match format {
        PointCloudFormat::Ply => {
            writeln!(writer, "ply")?;
            writeln!(writer, "format ascii 1.0")?;
            writeln!(writer, "element vertex {}", n)?;
            writeln!(writer, "property double x")?;
            writeln!(writer, "property double y")?;
            writeln!(writer, "property double z")?;
            writeln!(writer, "end_header")?;
        }
        PointCloudFormat::Pcd => {
            writeln!(writer, "# .PCD v0.7 - Point Cloud Data file format")?;
            writeln!(writer, "VERSION 0.7")?;
            writeln!(writer, "FIELDS x y z")?;
            writeln!(writer, "SIZE 8 8 8")?;
            writeln!(writer, "TYPE F F F")?;
            writeln!(writer, "COUNT 1 1 1")?;
            writeln!(writer, "WIDTH {}", n)?;
            writeln!(writer, "HEIGHT 1")?;
            writeln!(writer, "VIEWPOINT 0 0 0 1 0 0 0")?;
            writeln!(writer, "POINTS {}", n)?;
            writeln!(writer, "DATA ascii")?;
        }
        PointCloudFormat::Xyz => {}
    }
    for [x, y, z] in &cloud.points {
        writeln!(writer, "{} {} {}", x, y, z)?;
    }
    Ok(())
}

pub fn write_mesh_to<W: Write>(writer: &mut W, mesh: &AggregateMesh, format: MeshFormat) -> io::Result<()> {
    match format {
        MeshFormat::Ply => {
            writeln!(writer, "ply")?;
            writeln!(writer, "format ascii 1.0")?;
            writeln!(writer, "element vertex {}", mesh.vertex_count())?;
            writeln!(writer, "property double x")?;
            writeln!(writer, "property double y")?;
            writeln!(writer, "property double z")?;
            writeln!(writer, "property uchar red")?;
            writeln!(writer, "property uchar green")?;
            writeln!(writer, "property uchar blue")?;
            writeln!(writer, "element face {}", mesh.face_count())?;
            writeln!(writer, "property list uchar int vertex_indices")?;
            writeln!(writer, "end_header")?;
            for ([x, y, z], [r, g, b]) in mesh.vertices.iter().zip(&mesh.colors) {
                writeln!(
                    writer,
                    "{} {} {} {} {} {}",
                    x,
                    y,
                    z,
                    color_byte(*r),
                    color_byte(*g),
                    color_byte(*b)
                )?;
            }
            for [a, b, c] in &mesh.faces {
                writeln!(writer, "3 {} {} {}", a, b, c)?;
            }
        }
        MeshFormat::Obj => {
            writeln!(writer, "# ifc2cloud aggregate mesh")?;
            for ([x, y, z], [r, g, b]) in mesh.vertices.iter().zip(&mesh.colors) {
                writeln!(writer, "v {} {} {} {} {} {}", x, y, z, r, g, b)?;
            }
            // OBJ indices are 1-based
            for [a, b, c] in &mesh.faces {
                writeln!(writer, "f {} {} {}", a + 1, b + 1, c + 1)?;
            }
        }
        MeshFormat::Stl => {
            writeln!(writer, "solid ifc2cloud")?;
            for i in 0..mesh.face_count() {
                let [a, b, c] = mesh.face_vertices(i);
                let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
                let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
                let mut n = [
                    u[1] * v[2] - u[2] * v[1],
                    u[2] * v[0] - u[0] * v[2],
                    u[0] * v[1] - u[1] * v[0],
                ];
                let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
                if len > 0.0 {
                    n.iter_mut().for_each(|c| *c /= len);
                }
                writeln!(writer, "  facet normal {} {} {}", n[0], n[1], n[2])?;
                writeln!(writer, "    outer loop")?;
                for p in [a, b, c] {
                    writeln!(writer, "      vertex {} {} {}", p[0], p[1], p[2])?;
                }
                writeln!(writer, "    endloop")?;
                writeln!(writer, "  endfacet")?;
            }
            writeln!(writer, "endsolid ifc2cloud")?;
        }
    }
    Ok(())
}

fn write_file(path: &Path, body: impl FnOnce(&mut BufWriter<File>) -> io::Result<()>) -> Result<()> {
    let export_error = |e: io::Error| PipelineError::export(format!("{}: {}", path.display(), e));
    let file = File::create(path).map_err(export_error)?;
    let mut writer = BufWriter::new(file);
    body(&mut writer).map_err(export_error)?;
    writer.flush().map_err(export_error)
}

/// Write a point cloud, format by extension
pub fn write_point_cloud(path: impl AsRef<Path>, cloud: &PointCloud) -> Result<()> {
    let path = path.as_ref();
    let format = PointCloudFormat::from_path(path)?;
    write_file(path, |w| write_point_cloud_to(w, cloud, format))?;
    tracing::info!(path = %path.display(), points = cloud.len(), "Point cloud written");
    Ok(())
}

/// Write the aggregate mesh, format by extension
pub fn write_mesh(path: impl AsRef<Path>, mesh: &AggregateMesh) -> Result<()> {
    let path = path.as_ref();
    let format = MeshFormat::from_path(path)?;
    write_file(path, |w| write_mesh_to(w, mesh, format))?;
    tracing::info!(
        path = %path.display(),
        vertices = mesh.vertex_count(),
        triangles = mesh.face_count(),
        "Mesh written"
    );
    Ok(())
}
