//! Rehumanization engine.
//!
//! Takes one request, validates it, runs the plain-text pass and (when
//! markup is supplied) the markup pass, and returns a single result. The
//! engine keeps no state between calls.

use std::collections::{HashMap, HashSet};
use std::sync::mpsc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{self, TermSelection};
use crate::error::ValidationError;
use crate::substitute::{compile, substitute_markup_with, substitute_plain_with};

/// One user submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstitutionRequest {
    pub plain_text: String,
    pub markup_text: Option<String>,
    pub person_name: String,
    /// Terms to replace, in the order they are applied.
    pub selected_terms: Vec<String>,
}

impl SubstitutionRequest {
    /// Request with every catalog term selected and no markup.
    pub fn new(plain_text: impl Into<String>, person_name: impl Into<String>) -> Self {
        Self {
            plain_text: plain_text.into(),
            markup_text: None,
            person_name: person_name.into(),
            selected_terms: catalog::default_terms(),
        }
    }

    pub fn with_markup(mut self, markup_text: impl Into<String>) -> Self {
        self.markup_text = Some(markup_text.into());
        self
    }

    pub fn with_terms<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_terms = terms.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_selection(mut self, selection: TermSelection) -> Self {
        self.selected_terms = selection.into_terms();
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.plain_text.trim().is_empty() {
            return Err(ValidationError::EmptyDocument);
        }
        if self.person_name.trim().is_empty() {
            return Err(ValidationError::EmptyPersonName);
        }
        if self.unique_terms().is_empty() {
            return Err(ValidationError::NoTermsSelected);
        }
        Ok(())
    }

    /// Selected terms with empty strings and duplicates removed; the first
    /// occurrence keeps its place.
    fn unique_terms(&self) -> Vec<&str> {
        let mut seen = HashSet::with_capacity(self.selected_terms.len());
        self.selected_terms
            .iter()
            .map(String::as_str)
            .filter(|term| !term.is_empty() && seen.insert(*term))
            .collect()
    }
}

/// Outcome of a processed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstitutionResult {
    pub original_plain_text: String,
    pub processed_plain_text: String,
    /// Present iff the request carried markup.
    pub processed_markup_text: Option<String>,
    /// Replacement counts from the plain-text pass. Terms with no match
    /// are absent.
    pub counts_by_term: HashMap<String, u64>,
}

impl SubstitutionResult {
    pub fn total_replacements(&self) -> u64 {
        self.counts_by_term.values().sum()
    }

    pub fn count_for(&self, term: &str) -> u64 {
        self.counts_by_term.get(term).copied().unwrap_or(0)
    }

    /// Text handed to export: the processed markup when present,
    /// otherwise the processed plain text.
    pub fn export_text(&self) -> &str {
        self.processed_markup_text
            .as_deref()
            .unwrap_or(&self.processed_plain_text)
    }
}

/// Process one request.
pub fn process(request: &SubstitutionRequest) -> Result<SubstitutionResult, ValidationError> {
    request.validate()?;

    let terms = request.unique_terms();
    let matchers = compile(&terms);
    let name = request.person_name.as_str();

    let (processed_plain_text, counts_by_term) =
        substitute_plain_with(&matchers, &request.plain_text, name);

    // Markup counts are not reported; the plain-text counts are authoritative.
    let processed_markup_text = request
        .markup_text
        .as_deref()
        .map(|markup| substitute_markup_with(&matchers, markup, name).0);

    let result = SubstitutionResult {
        original_plain_text: request.plain_text.clone(),
        processed_plain_text,
        processed_markup_text,
        counts_by_term,
    };

    debug!(
        plain_bytes = request.plain_text.len(),
        has_markup = request.markup_text.is_some(),
        terms = terms.len(),
        replacements = result.total_replacements(),
        "document processed"
    );

    Ok(result)
}

/// Process independent requests in parallel. Output order matches input.
pub fn process_batch(
    requests: &[SubstitutionRequest],
) -> Vec<Result<SubstitutionResult, ValidationError>> {
    requests.par_iter().map(process).collect()
}

/// Handle to a request running on the worker pool.
///
/// Dropping the handle abandons the request; its result is discarded.
#[derive(Debug)]
pub struct PendingResult {
    rx: mpsc::Receiver<Result<SubstitutionResult, ValidationError>>,
}

impl PendingResult {
    /// Block until the outcome is ready. `None` means the worker died
    /// without producing one.
    pub fn wait(self) -> Option<Result<SubstitutionResult, ValidationError>> {
        self.rx.recv().ok()
    }

    /// Take the outcome if it is ready, without blocking.
    pub fn try_take(&self) -> Option<Result<SubstitutionResult, ValidationError>> {
        self.rx.try_recv().ok()
    }
}

/// Run `process` on the rayon pool so the caller's thread is not blocked.
pub fn submit(request: SubstitutionRequest) -> PendingResult {
    let (tx, rx) = mpsc::sync_channel(1);
    rayon::spawn(move || {
        let outcome = process(&request);
        if tx.send(outcome).is_err() {
            debug!("request abandoned, result discarded");
        }
    });
    PendingResult { rx }
}
