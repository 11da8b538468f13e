//! Catalog of dehumanizing terms and the reason each one gets replaced.
//!
//! The built-in catalog covers common legal phrasing. A deployment can
//! install its own list once at startup from a tab-separated file; after
//! that the catalog is read-only for the life of the process.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::CatalogError;

/// Environment variable naming a catalog file for [`init_catalog_from_env`].
pub const CATALOG_ENV_VAR: &str = "REHUMANIZE_CATALOG";

/// Catalog installed by `init_catalog` (loaded once, reused)
static INSTALLED: OnceLock<Catalog> = OnceLock::new();

lazy_static! {
    static ref BUILTIN: Catalog = Catalog::from_pairs([
        ("the accused", "Legal term that reduces a person to their accusation"),
        ("the respondent", "Removes personal identity in legal proceedings"),
        ("the defendant", "Defines person solely by their role in legal proceedings"),
        ("the perpetrator", "Assumes guilt and reduces person to alleged actions"),
        ("the aggressor", "Labels person negatively without context"),
        ("the abuser", "Defines person by alleged negative actions"),
        ("alleged offender", "Combines accusation with negative label"),
        ("the appellant", "Legal jargon that depersonalizes"),
        ("criminal defendant", "Combines 'criminal' label with legal role"),
        ("suspect", "Focuses only on suspicion status"),
        ("offender", "Assumes guilt without legal determination"),
        ("culprit", "Assumes responsibility before legal determination"),
        ("the prisoner", "Reduces person to their incarceration status"),
    ]);
}

/// One catalog term with its rationale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub term: String,
    pub rationale: String,
}

/// Ordered term -> rationale mapping. Iteration order is insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawCatalog")]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

/// Serialized shape of a catalog, canonicalized on the way in.
#[derive(Deserialize)]
struct RawCatalog {
    entries: Vec<CatalogEntry>,
}

impl From<RawCatalog> for Catalog {
    fn from(raw: RawCatalog) -> Self {
        Self::from_pairs(raw.entries.into_iter().map(|e| (e.term, e.rationale)))
    }
}

impl Catalog {
    /// Build a catalog from `(term, rationale)` pairs. Terms are stored
    /// trimmed and lower-cased; a repeated term keeps its first rationale.
    pub fn from_pairs<I, T, R>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (T, R)>,
        T: AsRef<str>,
        R: Into<String>,
    {
        let mut catalog = Self::default();
        for (term, rationale) in pairs {
            catalog.insert(term.as_ref(), rationale.into());
        }
        catalog
    }

    fn insert(&mut self, term: &str, rationale: String) -> bool {
        let term = canonical(term);
        if term.is_empty() || self.contains(&term) {
            return false;
        }
        self.entries.push(CatalogEntry { term, rationale });
        true
    }

    /// Parse a catalog file: one `term<TAB>rationale` per line.
    /// Blank lines and lines starting with `#` are ignored.
    pub fn parse(content: &str) -> Result<Self, CatalogError> {
        let mut catalog = Self::default();
        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let malformed = || CatalogError::MalformedLine {
                line: idx + 1,
                content: line.to_string(),
            };
            let (term, rationale) = line.split_once('\t').ok_or_else(malformed)?;
            if term.trim().is_empty() {
                return Err(malformed());
            }
            if !catalog.insert(term, rationale.trim().to_string()) {
                warn!(line = idx + 1, term = term.trim(), "duplicate catalog term ignored");
            }
        }
        Ok(catalog)
    }

    /// Read and parse a catalog file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.term.as_str())
    }

    /// Case-insensitive rationale lookup.
    pub fn rationale(&self, term: &str) -> Option<&str> {
        let wanted = canonical(term);
        self.entries
            .iter()
            .find(|e| e.term == wanted)
            .map(|e| e.rationale.as_str())
    }

    pub fn contains(&self, term: &str) -> bool {
        self.rationale(term).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn canonical(term: &str) -> String {
    term.trim().to_lowercase()
}

/// The active catalog: the installed one if `init_catalog` ran, otherwise
/// the built-in list.
pub fn lookup() -> &'static Catalog {
    INSTALLED.get().unwrap_or(&BUILTIN)
}

/// The built-in catalog, regardless of any installed override.
pub fn builtin() -> &'static Catalog {
    &BUILTIN
}

/// Catalog keys in order; the default selection for a request.
pub fn default_terms() -> Vec<String> {
    lookup().terms().map(str::to_string).collect()
}

/// Install a catalog from a file. Only the first successful call takes
/// effect; later calls return the catalog already in place.
pub fn init_catalog(path: &Path) -> Result<&'static Catalog, CatalogError> {
    if let Some(existing) = INSTALLED.get() {
        info!("catalog already initialized");
        return Ok(existing);
    }

    let catalog = Catalog::load(path)?;
    if catalog.is_empty() {
        warn!(path = %path.display(), "catalog file contains no terms");
    }
    let count = catalog.len();

    match INSTALLED.set(catalog) {
        Ok(()) => info!(path = %path.display(), terms = count, "catalog initialization complete"),
        Err(_) => info!("catalog already initialized"),
    }
    Ok(lookup())
}

/// Install the catalog named by `REHUMANIZE_CATALOG`, if set.
pub fn init_catalog_from_env() -> Result<&'static Catalog, CatalogError> {
    match std::env::var_os(CATALOG_ENV_VAR) {
        Some(path) => init_catalog(Path::new(&path)),
        None => Ok(lookup()),
    }
}

/// Ordered set of terms chosen for replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermSelection {
    terms: Vec<String>,
}

impl Default for TermSelection {
    fn default() -> Self {
        Self::all(lookup())
    }
}

impl TermSelection {
    pub fn all(catalog: &Catalog) -> Self {
        Self {
            terms: catalog.terms().map(str::to_string).collect(),
        }
    }

    pub fn none() -> Self {
        Self { terms: Vec::new() }
    }

    /// Remove `term` if selected, otherwise append it. Returns whether the
    /// term is selected afterwards.
    pub fn toggle(&mut self, term: &str) -> bool {
        if let Some(pos) = self.terms.iter().position(|t| t == term) {
            self.terms.remove(pos);
            false
        } else {
            self.terms.push(term.to_string());
            true
        }
    }

    pub fn select_all(&mut self, catalog: &Catalog) {
        *self = Self::all(catalog);
    }

    pub fn deselect_all(&mut self) {
        self.terms.clear();
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.iter().any(|t| t == term)
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn into_terms(self) -> Vec<String> {
        self.terms
    }
}
