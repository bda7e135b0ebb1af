// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Console tables and interactive category selection.

use std::io::{self, BufRead, Write};

use ifc2cloud_processing::{CategoryColors, CategoryCount, Conversion, ElementFailure, Extraction};

use crate::args::Args;

/// Listing and interactive modes always show the table; conversions unless `--no-display`
pub fn shows_category_table(args: &Args) -> bool {
    args.list_types || args.interactive_filter || !args.no_display
}

pub fn print_category_table(file_name: &str, counts: &[CategoryCount]) {
    println!("\nElement types in {}:", file_name);
    println!("{}", "-".repeat(50));
    println!("{:<30} | {:<10}", "Element Type", "Count");
    println!("{}", "-".repeat(50));
    for row in counts {
        println!("{:<30} | {:<10}", row.category, row.count);
    }
    println!("{}", "-".repeat(50));
    println!("Total element types: {}", counts.len());
    println!(
        "Total elements with geometry: {}",
        counts.iter().map(|row| row.count).sum::<usize>()
    );
}

/// Parse comma-separated 1-based numbers into category labels.
///
/// Empty input or `none` selects nothing. Out-of-range numbers are ignored.
/// Returns `None` when the input is not a number list.
pub fn parse_selection(input: &str, categories: &[String]) -> Option<Vec<String>> {
    let input = input.trim();
    if input.is_empty() || input.eq_ignore_ascii_case("none") {
        return Some(Vec::new());
    }
    let numbers = input
        .split(',')
        .map(|part| part.trim().parse::<usize>())
        .collect::<Result<Vec<_>, _>>()
        .ok()?;

    let mut selected: Vec<String> = Vec::new();
    for n in numbers {
        if let Some(category) = n.checked_sub(1).and_then(|i| categories.get(i)) {
            if !selected.contains(category) {
                selected.push(category.clone());
            }
        }
    }
    Some(selected)
}

/// Show numbered categories and read the exclusion choice from `input`
pub fn prompt_exclusions<R: BufRead>(counts: &[CategoryCount], input: &mut R) -> io::Result<Vec<String>> {
    let categories: Vec<String> = counts.iter().map(|row| row.category.clone()).collect();

    println!("\nAvailable element types for filtering:");
    for (i, category) in categories.iter().enumerate() {
        println!("{}. {}", i + 1, category);
    }
    println!("\nEnter the numbers of element types to EXCLUDE (comma-separated, or 'none'):");
    print!("> ");
    io::stdout().flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;

    Ok(match parse_selection(&line, &categories) {
        Some(selected) => {
            if !selected.is_empty() {
                println!("Excluding: {}", selected.join(", "));
            }
            selected
        }
        None => {
            println!("Invalid input. Proceeding without exclusions.");
            Vec::new()
        }
    })
}

pub fn print_failures(failures: &[ElementFailure], list_all: bool) {
    if failures.is_empty() {
        return;
    }
    println!("{} elements could not be converted to geometry", failures.len());
    if list_all {
        for failure in failures {
            println!("  #{:<8} {:<30} {}", failure.element_id, failure.category, failure.reason);
        }
    } else {
        println!("  (use --list-failures for details)");
    }
}

fn print_legend(colors: &CategoryColors, extraction: &Extraction) {
    println!("\nElement types in the point cloud:");
    for (category, [r, g, b]) in colors.iter() {
        println!("  - {:<30} (Color: [{:.1}, {:.1}, {:.1}])", category, r, g, b);
    }
    if let Some((min, max)) = extraction.mesh.bounds() {
        println!(
            "Model bounds: [{:.3}, {:.3}, {:.3}] .. [{:.3}, {:.3}, {:.3}] m",
            min[0], min[1], min[2], max[0], max[1], max[2]
        );
    }
}

/// Post-run legend and summary
pub fn print_summary(conversion: &Conversion) {
    let extraction = &conversion.extraction;
    print_legend(&extraction.colors, extraction);
    println!(
        "Mesh: {} vertices, {} triangles, {:.2} m2",
        extraction.stats.vertices, extraction.stats.faces, extraction.stats.surface_area
    );
    println!(
        "Point cloud: {} points (seed {})",
        conversion.cloud.len(),
        conversion.seed
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories() -> Vec<String> {
        ["IfcDoor", "IfcSlab", "IfcWall"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_selects_numbers() {
        assert_eq!(
            parse_selection("1, 3", &categories()),
            Some(vec!["IfcDoor".to_string(), "IfcWall".to_string()])
        );
    }

    #[test]
    fn test_none_and_empty() {
        assert_eq!(parse_selection("none", &categories()), Some(vec![]));
        assert_eq!(parse_selection("NONE\n", &categories()), Some(vec![]));
        assert_eq!(parse_selection("  \n", &categories()), Some(vec![]));
    }

    #[test]
    fn test_out_of_range_ignored() {
        assert_eq!(
            parse_selection("0,2,9", &categories()),
            Some(vec!["IfcSlab".to_string()])
        );
    }

    #[test]
    fn test_invalid_input() {
        assert_eq!(parse_selection("doors", &categories()), None);
        assert_eq!(parse_selection("1,x", &categories()), None);
    }

    #[test]
    fn test_category_table_shown_on_conversion_runs() {
        use clap::Parser;
        let parse = |extra: &[&str]| {
            let mut argv = vec!["ifc2cloud", "model.ifc"];
            argv.extend_from_slice(extra);
            Args::parse_from(argv)
        };
        assert!(shows_category_table(&parse(&[])));
        assert!(!shows_category_table(&parse(&["--no-display"])));
        assert!(shows_category_table(&parse(&["--no-display", "-l"])));
        assert!(shows_category_table(&parse(&["--nd", "-i"])));
    }

    #[test]
    fn test_prompt_reads_line() {
        let counts = vec![
            CategoryCount { category: "IfcDoor".into(), count: 2 },
            CategoryCount { category: "IfcWall".into(), count: 5 },
        ];
        let mut input = io::Cursor::new("2\n");
        assert_eq!(prompt_exclusions(&counts, &mut input).unwrap(), vec!["IfcWall"]);
    }
}
