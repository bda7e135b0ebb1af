// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Category colouring.

use std::collections::BTreeMap;

/// Palette cycled over categories in sorted order
pub const PALETTE: [[f32; 3]; 15] = [
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [1.0, 1.0, 0.0],
    [1.0, 0.0, 1.0],
    [0.0, 1.0, 1.0],
    [0.5, 0.0, 0.0],
    [0.0, 0.5, 0.0],
    [0.0, 0.0, 0.5],
    [0.5, 0.5, 0.0],
    [0.5, 0.0, 0.5],
    [0.0, 0.5, 0.5],
    [1.0, 0.5, 0.0],
    [0.5, 1.0, 0.0],
    [0.0, 0.5, 1.0],
];

/// Colour of categories missing from the map
pub const DEFAULT_COLOR: [f32; 3] = [0.7, 0.7, 0.7];

/// Immutable category -> colour table, built once per conversion and
/// handed to every worker by value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryColors {
    colors: BTreeMap<String, [f32; 3]>,
}

impl CategoryColors {
    /// Assign palette colours to the distinct categories in sorted order
    pub fn from_categories<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut colors: BTreeMap<String, [f32; 3]> = categories
            .into_iter()
            .map(|category| (category.into(), DEFAULT_COLOR))
            .collect();
        for (i, color) in colors.values_mut().enumerate() {
            *color = PALETTE[i % PALETTE.len()];
        }
        Self { colors }
    }

    pub fn color_for(&self, category: &str) -> [f32; 3] {
        self.colors.get(category).copied().unwrap_or(DEFAULT_COLOR)
    }

    /// Legend entries in category order
    pub fn iter(&self) -> impl Iterator<Item = (&str, [f32; 3])> {
        self.colors.iter().map(|(category, color)| (category.as_str(), *color))
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}
