//! Output rows
//!
//! One tab-separated row per generated tree:
//!
//! ```text
//! {word index}_{tree index}  {surface word}  <0.0>  {annotated compound}  {tree}
//! ```
//!
//! Tree indices start at 1. A failed word is written as a single row whose
//! tree is [`ERROR_TREE`] when the error policy records failures.

use std::io::{self, Write};

use crate::batch::WordReport;
use crate::config::ErrorPolicy;

/// Placeholder tree for words whose analysis failed
pub const ERROR_TREE: &str = "error";

/// Weight column; trees are not ranked here
pub const WEIGHT: &str = "<0.0>";

/// Restore the plain word from its annotated form
///
/// Drops boundary, escape, suffix, joiner, prior and verb-prefix marks and
/// bracketed tags of one to four characters.
pub fn surface_form(annotated: &str) -> String {
    let mut surface = String::with_capacity(annotated.len());
    let mut chars = annotated.chars();

    while let Some(c) = chars.next() {
        match c {
            '#' | '\\' | '~' | '|' | '@' | '=' => {}
            '<' => {
                let tag: String = chars.clone().take(5).collect();
                match tag.find('>') {
                    Some(end) if (1..=4).contains(&tag[..end].chars().count()) => {
                        for _ in 0..=tag[..end].chars().count() {
                            chars.next();
                        }
                    }
                    _ => surface.push(c),
                }
            }
            _ => surface.push(c),
        }
    }

    surface
}

/// Format the rows for one report
pub fn report_rows(report: &WordReport, policy: ErrorPolicy) -> Vec<String> {
    let surface = surface_form(&report.annotated);
    let row = |tree_index: usize, tree: &str| {
        format!(
            "{}_{}\t{}\t{}\t{}\t{}",
            report.index, tree_index, surface, WEIGHT, report.annotated, tree
        )
    };

    match (&report.result, policy) {
        (Ok(trees), _) => trees
            .iter()
            .enumerate()
            .map(|(i, tree)| row(i + 1, tree))
            .collect(),
        (Err(_), ErrorPolicy::Record) => vec![row(1, ERROR_TREE)],
        (Err(_), ErrorPolicy::Skip) => Vec::new(),
    }
}

/// Write all rows for `reports`; returns the number of rows written
pub fn write_rows<W: Write>(
    writer: &mut W,
    reports: &[WordReport],
    policy: ErrorPolicy,
) -> io::Result<usize> {
    let mut written = 0;
    for report in reports {
        for row in report_rows(report, policy) {
            writeln!(writer, "{}", row)?;
            written += 1;
        }
    }
    writer.flush()?;
    Ok(written)
}
