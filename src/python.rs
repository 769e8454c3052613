//! Python bindings for compoundtree
//!
//! This module provides PyO3-based Python bindings for the Rust core.

use pyo3::exceptions::{PyIOError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use std::path::PathBuf;

use crate::analyzer::{AnalysisError, analyze};
use crate::batch::{BatchError, WordReport, analyze_batch};
use crate::config::{BatchConfig, Limits};
use crate::corpus::{CompoundEntry, CompoundReader, ReadError};
use crate::grammar::{FragmentKind, parse_compound};
use crate::output::surface_form;

/// Convert AnalysisError to Python exception
impl From<AnalysisError> for PyErr {
    fn from(err: AnalysisError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

impl From<ReadError> for PyErr {
    fn from(err: ReadError) -> PyErr {
        PyIOError::new_err(err.to_string())
    }
}

impl From<BatchError> for PyErr {
    fn from(err: BatchError) -> PyErr {
        PyRuntimeError::new_err(err.to_string())
    }
}

fn kind_name(kind: FragmentKind) -> &'static str {
    match kind {
        FragmentKind::Stem => "stem",
        FragmentKind::Suffix => "suffix",
        FragmentKind::Particle => "particle",
        FragmentKind::Link => "link",
        FragmentKind::Boundary => "boundary",
        FragmentKind::VerbPrefix => "verb_prefix",
    }
}

/// Analysis outcome of one corpus word.
#[pyclass(name = "WordReport")]
pub struct PyWordReport {
    inner: WordReport,
}

#[pymethods]
impl PyWordReport {
    #[getter]
    fn index(&self) -> usize {
        self.inner.index
    }

    #[getter]
    fn annotated(&self) -> String {
        self.inner.annotated.clone()
    }

    #[getter]
    fn surface(&self) -> String {
        surface_form(&self.inner.annotated)
    }

    #[getter]
    fn trees(&self) -> Vec<String> {
        self.inner.trees().to_vec()
    }

    /// Error message of a failed analysis, None on success
    #[getter]
    fn error(&self) -> Option<String> {
        self.inner.result.as_ref().err().map(|e| e.to_string())
    }

    fn __len__(&self) -> usize {
        self.inner.trees().len()
    }

    fn __repr__(&self) -> String {
        match &self.inner.result {
            Ok(trees) => format!(
                "<WordReport index={} word='{}' trees={}>",
                self.inner.index,
                self.inner.annotated,
                trees.len()
            ),
            Err(_) => format!(
                "<WordReport index={} word='{}' failed>",
                self.inner.index, self.inner.annotated
            ),
        }
    }
}

/// Split an annotated compound into grammar fragments.
///
/// Args:
///     word: Annotated compound (e.g. "Kind~er#Garten")
///
/// Returns:
///     List of (kind, text) tuples
///
/// Raises:
///     ValueError: If the word does not match the grammar
#[pyfunction]
fn parse_fragments(word: &str) -> PyResult<Vec<(&'static str, String)>> {
    let fragments = parse_compound(word).map_err(AnalysisError::from)?;
    Ok(fragments
        .into_iter()
        .map(|f| (kind_name(f.kind), f.text))
        .collect())
}

/// Generate every tree for an annotated compound.
///
/// Args:
///     word: Annotated compound
///     max_segments: Largest number of subtrees to bracket
///     max_trees: Largest number of trees to return
///
/// Returns:
///     List of serialized trees
///
/// Raises:
///     ValueError: If the word cannot be analyzed
#[pyfunction]
#[pyo3(signature = (word, max_segments=None, max_trees=None))]
fn generate_trees(
    word: &str,
    max_segments: Option<usize>,
    max_trees: Option<usize>,
) -> PyResult<Vec<String>> {
    let defaults = Limits::default();
    let limits = Limits {
        max_segments: max_segments.unwrap_or(defaults.max_segments),
        max_trees: max_trees.unwrap_or(defaults.max_trees),
    };
    Ok(analyze(word, &limits)?)
}

/// Analyze many words in parallel.
///
/// Failed words do not raise; their report carries the error instead.
///
/// Args:
///     words: List of annotated compounds, indexed from 1
///     workers: Worker threads (0 = one per core)
///
/// Returns:
///     List of WordReport objects in input order
#[pyfunction(name = "analyze_batch")]
#[pyo3(signature = (words, workers=0))]
fn py_analyze_batch(py: Python<'_>, words: Vec<String>, workers: usize) -> PyResult<Vec<PyWordReport>> {
    let entries = words
        .into_iter()
        .enumerate()
        .map(|(i, word)| CompoundEntry::new(i + 1, word))
        .collect();
    run_batch(py, entries, workers)
}

/// Analyze every word of a corpus file.
///
/// Args:
///     path: Corpus with one `index<TAB>compound` per line (.gz allowed)
///     workers: Worker threads (0 = one per core)
///
/// Returns:
///     List of WordReport objects in file order
///
/// Raises:
///     IOError: If the file cannot be read
#[pyfunction]
#[pyo3(signature = (path, workers=0))]
fn analyze_file(py: Python<'_>, path: PathBuf, workers: usize) -> PyResult<Vec<PyWordReport>> {
    let entries = CompoundReader::from_file(&path)?.collect::<Result<Vec<_>, _>>()?;
    run_batch(py, entries, workers)
}

fn run_batch(
    py: Python<'_>,
    entries: Vec<CompoundEntry>,
    workers: usize,
) -> PyResult<Vec<PyWordReport>> {
    let batch = BatchConfig {
        workers,
        ..BatchConfig::default()
    };
    let reports = py.detach(|| analyze_batch(entries, &Limits::default(), &batch))?;
    Ok(reports
        .into_iter()
        .map(|inner| PyWordReport { inner })
        .collect())
}

/// Strip the annotation marks from a compound.
#[pyfunction(name = "surface_form")]
fn py_surface_form(word: &str) -> String {
    surface_form(word)
}

#[pyfunction]
fn __version__() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[pymodule]
fn compoundtree(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyWordReport>()?;

    m.add_function(wrap_pyfunction!(parse_fragments, m)?)?;
    m.add_function(wrap_pyfunction!(generate_trees, m)?)?;
    m.add_function(wrap_pyfunction!(py_analyze_batch, m)?)?;
    m.add_function(wrap_pyfunction!(analyze_file, m)?)?;
    m.add_function(wrap_pyfunction!(py_surface_form, m)?)?;
    m.add_function(wrap_pyfunction!(__version__, m)?)?;

    Ok(())
}
