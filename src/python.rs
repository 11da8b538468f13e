//! Python bindings (feature `python`).

use std::collections::HashMap;
use std::path::Path;

use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;

use crate::catalog;
use crate::engine::{self, SubstitutionRequest};
use crate::error::CatalogError;
use crate::markup;
use crate::substitute;

/// Rehumanize a document.
/// Returns: (processed_plain_text, processed_markup_text or None, counts)
#[pyfunction]
#[pyo3(signature = (plain_text, person_name, terms=None, markup_text=None))]
fn process_document(
    plain_text: String,
    person_name: String,
    terms: Option<Vec<String>>,
    markup_text: Option<String>,
) -> PyResult<(String, Option<String>, HashMap<String, u64>)> {
    let mut request = SubstitutionRequest::new(plain_text, person_name);
    if let Some(terms) = terms {
        request = request.with_terms(terms);
    }
    if let Some(markup_text) = markup_text {
        request = request.with_markup(markup_text);
    }

    let result = engine::process(&request).map_err(|e| PyValueError::new_err(e.to_string()))?;
    Ok((
        result.processed_plain_text,
        result.processed_markup_text,
        result.counts_by_term,
    ))
}

/// Catalog terms in order (the default selection)
#[pyfunction]
fn default_terms() -> Vec<String> {
    catalog::default_terms()
}

/// Why a term is considered dehumanizing, if it is in the catalog
#[pyfunction]
fn term_rationale(term: String) -> Option<String> {
    catalog::lookup().rationale(&term).map(str::to_string)
}

/// Install a catalog file; returns the number of terms in the active catalog
#[pyfunction]
fn init_catalog(path: String) -> PyResult<usize> {
    catalog::init_catalog(Path::new(&path))
        .map(catalog::Catalog::len)
        .map_err(|e| match e {
            CatalogError::Io { .. } => PyIOError::new_err(e.to_string()),
            CatalogError::MalformedLine { .. } => PyValueError::new_err(e.to_string()),
        })
}

#[pyfunction]
fn substitute_plain(
    text: String,
    terms: Vec<String>,
    replacement: String,
) -> (String, HashMap<String, u64>) {
    substitute::substitute_plain(&text, &terms, &replacement)
}

#[pyfunction]
fn substitute_markup(markup: String, terms: Vec<String>, replacement: String) -> String {
    substitute::substitute_markup(&markup, &terms, &replacement)
}

#[pyfunction]
fn strip_tags(markup: String) -> String {
    markup::strip_tags(&markup)
}

#[pyfunction]
fn paragraphs_from_plain_text(text: String) -> String {
    markup::paragraphs_from_plain_text(&text)
}

/// Paragraph markup from page texts, with page breaks between pages
#[pyfunction]
fn paragraphs_from_pages(pages: Vec<String>) -> String {
    markup::paragraphs_from_pages(&pages)
}

/// Paragraph texts of processed markup, ready for PDF/DOCX writers
#[pyfunction]
fn export_paragraphs(markup: String) -> Vec<String> {
    markup::export_paragraphs(&markup)
}

#[pymodule]
fn rehumanize(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(process_document, m)?)?;
    m.add_function(wrap_pyfunction!(default_terms, m)?)?;
    m.add_function(wrap_pyfunction!(term_rationale, m)?)?;
    m.add_function(wrap_pyfunction!(init_catalog, m)?)?;
    m.add_function(wrap_pyfunction!(substitute_plain, m)?)?;
    m.add_function(wrap_pyfunction!(substitute_markup, m)?)?;
    m.add_function(wrap_pyfunction!(strip_tags, m)?)?;
    m.add_function(wrap_pyfunction!(paragraphs_from_plain_text, m)?)?;
    m.add_function(wrap_pyfunction!(paragraphs_from_pages, m)?)?;
    m.add_function(wrap_pyfunction!(export_paragraphs, m)?)?;
    Ok(())
}
