// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Work partitioning.
//!
//! Chunks are balanced by element count, not by geometric cost. A chunk of
//! large breps can take much longer than a chunk of simple extrusions.

/// Split `items` into exactly `worker_count` contiguous chunks.
///
/// Sizes differ by at most one, larger chunks come first, and chunks are
/// empty when there are fewer items than workers. A count of 0 is treated as 1.
pub fn partition<T>(items: Vec<T>, worker_count: usize) -> Vec<Vec<T>> {
    let worker_count = worker_count.max(1);
    let base = items.len() / worker_count;
    let extra = items.len() % worker_count;

    let mut rest = items.into_iter();
    (0..worker_count)
        .map(|i| {
            let size = base + usize::from(i < extra);
            rest.by_ref().take(size).collect()
        })
        .collect()
}
