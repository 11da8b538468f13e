//! Replace dehumanizing legal terms in a document with a person's name.
//!
//! Plain text is rewritten term by term with per-term counts. Paragraph
//! markup is rewritten the same way, but only inside text content, so tag
//! syntax survives byte for byte.

pub mod catalog;
pub mod engine;
pub mod error;
pub mod markup;
pub mod substitute;

#[cfg(feature = "python")]
mod python;

pub use catalog::{Catalog, CatalogEntry, TermSelection};
pub use engine::{process, process_batch, submit, PendingResult, SubstitutionRequest, SubstitutionResult};
pub use error::{CatalogError, ValidationError};
pub use substitute::{substitute_markup, substitute_plain, TermMatcher};
