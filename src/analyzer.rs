//! End-to-end analysis of one annotated compound
//!
//! The analyzer provides the per-word pipeline:
//! 1. Parse the annotated string into fragments
//! 2. Normalize and merge the fragments into one subtree per group
//! 3. Enumerate and serialize every binary bracketing

use thiserror::Error;

use crate::config::Limits;
use crate::generator::{GeneratorError, generate};
use crate::grammar::{GrammarError, parse_compound};

/// Error during analysis of one word
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error(transparent)]
    Generator(#[from] GeneratorError),
}

/// Analyze one annotated compound
///
/// Returns the distinct serialized trees. The function is pure: the same
/// input always yields the same trees, and nothing is shared between calls
/// beyond the read-only category table.
pub fn analyze(word: &str, limits: &Limits) -> Result<Vec<String>, AnalysisError> {
    let fragments = parse_compound(word)?;
    Ok(generate(fragments, limits)?)
}
