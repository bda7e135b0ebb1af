// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh aggregation.

use crate::error::{PipelineError, Result};
use crate::mesh::{AggregateMesh, PartialMesh};

/// Concatenate partial meshes in worker order.
///
/// Vertices and colours are appended verbatim, face indices are shifted by
/// the running vertex total and element ranges by the running face total.
/// A repeated element id or an out-of-range local index is an internal
/// contract violation.
pub fn aggregate(parts: Vec<PartialMesh>) -> Result<AggregateMesh> {
    let mut mesh = AggregateMesh {
        vertices: Vec::with_capacity(parts.iter().map(PartialMesh::vertex_count).sum()),
        faces: Vec::with_capacity(parts.iter().map(PartialMesh::face_count).sum()),
        ..AggregateMesh::default()
    };

    for (worker, part) in parts.into_iter().enumerate() {
        let vertex_count = part.vertices.len();
        if part.colors.len() != vertex_count {
            return Err(PipelineError::Aggregation(format!(
                "worker {} returned {} colours for {} vertices",
                worker,
                part.colors.len(),
                vertex_count
            )));
        }
        if let Some(face) = part
            .faces
            .iter()
            .find(|face| face.iter().any(|&i| i as usize >= vertex_count))
        {
            return Err(PipelineError::Aggregation(format!(
                "worker {} face {:?} indexes past {} vertices",
                worker, face, vertex_count
            )));
        }

        let vertex_offset = u32::try_from(mesh.vertices.len()).map_err(|_| {
            PipelineError::Aggregation("aggregate mesh exceeds u32 vertex indices".into())
        })?;
        let face_offset = mesh.faces.len();

        for (id, range) in part.element_ranges {
            if range.end > part.faces.len() || range.start > range.end {
                return Err(PipelineError::Aggregation(format!(
                    "worker {} element #{} has face range {:?} outside {} faces",
                    worker,
                    id,
                    range,
                    part.faces.len()
                )));
            }
            let shifted = range.start + face_offset..range.end + face_offset;
            if mesh.element_ranges.insert(id, shifted).is_some() {
                return Err(PipelineError::Aggregation(format!(
                    "element #{} produced by more than one worker",
                    id
                )));
            }
        }

        mesh.vertices.extend(part.vertices);
        mesh.colors.extend(part.colors);
        mesh.faces.extend(
            part.faces
                .into_iter()
                .map(|[a, b, c]| [a + vertex_offset, b + vertex_offset, c + vertex_offset]),
        );
    }

    Ok(mesh)
}
