// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Category filter.

use rustc_hash::FxHashSet;

use crate::element::Element;

/// Keep the elements whose category is not excluded.
///
/// Labels match exactly and case-sensitively; order is preserved.
pub fn filter_elements(elements: Vec<Element>, excluded: &[String]) -> Vec<Element> {
    if excluded.is_empty() {
        return elements;
    }
    let excluded: FxHashSet<&str> = excluded.iter().map(String::as_str).collect();
    elements
        .into_iter()
        .filter(|element| !excluded.contains(element.category.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::GeometryHandle;

    fn elements(categories: &[&str]) -> Vec<Element> {
        categories
            .iter()
            .enumerate()
            .map(|(i, category)| Element {
                id: i as u32 + 1,
                category: category.to_string(),
                geometry: GeometryHandle {
                    representation: 0,
                    placement: None,
                },
            })
            .collect()
    }

    #[test]
    fn test_excludes_exact_category() {
        let all = elements(&["IfcWall", "IfcDoor", "IfcSlab", "IfcDoor"]);
        let kept = filter_elements(all, &["IfcDoor".to_string()]);
        let ids: Vec<u32> = kept.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let all = elements(&["IfcDoor"]);
        assert_eq!(filter_elements(all, &["IFCDOOR".to_string()]).len(), 1);
    }

    #[test]
    fn test_absent_category_is_noop() {
        let all = elements(&["IfcWall", "IfcSlab"]);
        let kept = filter_elements(all.clone(), &["IfcWindow".to_string()]);
        assert_eq!(kept, all);
    }

    #[test]
    fn test_empty_exclusion_is_identity() {
        let all = elements(&["IfcWall", "IfcSlab"]);
        assert_eq!(filter_elements(all.clone(), &[]), all);
    }
}
