//! Compoundtree: exhaustive bracketing of annotated compound nouns
//!
//! Turns a morphologically annotated compound (stems, suffixes, links and
//! `#` boundaries) into every binary-branching tree consistent with its
//! markup. Core implementation in Rust with Python bindings.

// Core modules
pub mod analyzer; // Per-word pipeline (grammar + generator)
pub mod category; // Base label to category table
pub mod generator; // Normalization, merge and bracketing
pub mod grammar; // Morphological grammar over annotated words
pub mod tree; // Tree data structures, rendering and parsing back

// Corpus processing
pub mod batch; // Parallel per-word analysis
pub mod config; // Layered TOML configuration
pub mod corpus; // Input corpus reader
pub mod output; // Output rows and surface forms

// Python bindings
#[cfg(feature = "pyo3")]
pub mod python;

// Re-exports for convenience
pub use analyzer::{AnalysisError, analyze};
pub use batch::{BatchError, BatchSummary, WordReport, analyze_batch};
pub use config::{AnalyzerConfig, BatchConfig, ErrorPolicy, Limits, Loader, Overrides};
pub use corpus::{CompoundEntry, CompoundReader, ReadError};
pub use generator::{GeneratorError, generate};
pub use grammar::{Fragment, FragmentKind, GrammarError, parse_compound};
pub use output::{surface_form, write_rows};
pub use tree::{Node, Tree};
