//! Term substitution over plain text and over paragraph markup.
//!
//! Both passes walk the terms in the order given and rewrite the current
//! buffer after each term, so a later term sees the output of earlier
//! replacements. Terms are always matched as literal, case-insensitive
//! substrings.

use std::collections::HashMap;

use regex::{NoExpand, Regex, RegexBuilder};
use tracing::{trace, warn};

use crate::markup::{segments, Segment};

/// A compiled, case-insensitive literal matcher for one term.
#[derive(Debug, Clone)]
pub struct TermMatcher {
    term: String,
    pattern: Regex,
}

impl TermMatcher {
    /// Compile `term`. Empty terms never match and yield `None`.
    pub fn new(term: &str) -> Option<Self> {
        if term.is_empty() {
            return None;
        }
        match RegexBuilder::new(&regex::escape(term))
            .case_insensitive(true)
            .build()
        {
            Ok(pattern) => Some(Self {
                term: term.to_string(),
                pattern,
            }),
            Err(e) => {
                warn!(term, error = %e, "skipping term that failed to compile");
                None
            }
        }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    /// Number of non-overlapping matches, scanning left to right.
    pub fn count(&self, text: &str) -> u64 {
        self.pattern.find_iter(text).count() as u64
    }

    /// Replace every match with `replacement` verbatim.
    /// Returns the rewritten text and the number of matches replaced.
    pub fn replace(&self, text: &str, replacement: &str) -> (String, u64) {
        let count = self.count(text);
        if count == 0 {
            return (text.to_string(), 0);
        }
        let replaced = self.pattern.replace_all(text, NoExpand(replacement));
        (replaced.into_owned(), count)
    }
}

/// Compile matchers for `terms`, keeping their order.
pub fn compile<S: AsRef<str>>(terms: &[S]) -> Vec<TermMatcher> {
    terms
        .iter()
        .filter_map(|t| TermMatcher::new(t.as_ref()))
        .collect()
}

/// Replace each term in `text` with `replacement`.
///
/// Returns the new text and per-term match counts. Terms with no match
/// have no entry in the map.
pub fn substitute_plain<S: AsRef<str>>(
    text: &str,
    terms: &[S],
    replacement: &str,
) -> (String, HashMap<String, u64>) {
    substitute_plain_with(&compile(terms), text, replacement)
}

/// [`substitute_plain`] over pre-compiled matchers.
pub fn substitute_plain_with(
    matchers: &[TermMatcher],
    text: &str,
    replacement: &str,
) -> (String, HashMap<String, u64>) {
    let mut result = text.to_string();
    let mut counts: HashMap<String, u64> = HashMap::new();

    for matcher in matchers {
        let (replaced, count) = matcher.replace(&result, replacement);
        if count > 0 {
            trace!(term = matcher.term(), count, "plain text replacements");
            *counts.entry(matcher.term().to_string()).or_insert(0) += count;
            result = replaced;
        }
    }

    (result, counts)
}

/// Replace each term with `replacement`, touching only text content.
/// Tag spans are copied through unchanged.
pub fn substitute_markup<S: AsRef<str>>(markup: &str, terms: &[S], replacement: &str) -> String {
    substitute_markup_with(&compile(terms), markup, replacement).0
}

/// [`substitute_markup`] that also reports how many matches each term had
/// inside the markup's text regions.
pub fn substitute_markup_counted<S: AsRef<str>>(
    markup: &str,
    terms: &[S],
    replacement: &str,
) -> (String, HashMap<String, u64>) {
    substitute_markup_with(&compile(terms), markup, replacement)
}

/// Markup pass over pre-compiled matchers.
pub fn substitute_markup_with(
    matchers: &[TermMatcher],
    markup: &str,
    replacement: &str,
) -> (String, HashMap<String, u64>) {
    let mut result = markup.to_string();
    let mut counts: HashMap<String, u64> = HashMap::new();

    for matcher in matchers {
        let mut rebuilt = String::with_capacity(result.len());
        let mut term_count = 0;

        for segment in segments(&result) {
            match segment {
                Segment::Tag(tag) => rebuilt.push_str(tag),
                Segment::Text(text) => {
                    let (replaced, count) = matcher.replace(text, replacement);
                    term_count += count;
                    rebuilt.push_str(&replaced);
                }
            }
        }

        if term_count > 0 {
            trace!(term = matcher.term(), count = term_count, "markup replacements");
            *counts.entry(matcher.term().to_string()).or_insert(0) += term_count;
            result = rebuilt;
        }
    }

    (result, counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_order_sensitivity() {
        let (text, counts) = substitute_plain(
            "the accused is the respondent",
            &["the accused", "the respondent"],
            "Alex",
        );
        assert_eq!(text, "Alex is Alex");
        assert_eq!(counts.len(), 2);
        assert_eq!(counts["the accused"], 1);
        assert_eq!(counts["the respondent"], 1);
    }

    #[test]
    fn test_case_insensitive() {
        let (text, counts) = substitute_plain("The Accused", &["the accused"], "Sam");
        assert_eq!(text, "Sam");
        assert_eq!(counts["the accused"], 1);

        let (text, counts) = substitute_plain("THE ACCUSED and the accused", &["the accused"], "Sam");
        assert_eq!(text, "Sam and Sam");
        assert_eq!(counts["the accused"], 2);
    }

    #[test]
    fn test_substring_matching() {
        // No word boundaries: "offender" inside "offenders" is a match.
        let (text, counts) = substitute_plain("Repeat offenders", &["offender"], "Kim");
        assert_eq!(text, "Repeat Kims");
        assert_eq!(counts["offender"], 1);
    }

    #[test]
    fn test_no_match_has_no_entry() {
        let (text, counts) = substitute_plain("Nothing here", &["the accused", "culprit"], "Sam");
        assert_eq!(text, "Nothing here");
        assert!(counts.is_empty());
    }

    #[test]
    fn test_empty_terms_and_empty_replacement() {
        let terms: [&str; 0] = [];
        let (text, counts) = substitute_plain("the accused", &terms, "Sam");
        assert_eq!(text, "the accused");
        assert!(counts.is_empty());

        let (text, counts) = substitute_plain("ask the accused now", &["the accused "], "");
        assert_eq!(text, "ask now");
        assert_eq!(counts["the accused "], 1);
    }

    #[test]
    fn test_empty_term_is_skipped() {
        let (text, counts) = substitute_plain("abc", &["", "b"], "X");
        assert_eq!(text, "aXc");
        assert_eq!(counts.len(), 1);
    }

    #[test]
    fn test_terms_are_literal() {
        let (text, counts) = substitute_plain("abc a.c (x)", &["a.c", "(x)"], "Y");
        assert_eq!(text, "abc Y Y");
        assert_eq!(counts["a.c"], 1);
        assert_eq!(counts["(x)"], 1);
    }

    #[test]
    fn test_replacement_is_verbatim() {
        let (text, _) = substitute_plain("the accused", &["the accused"], "$1 ${name} Jo");
        assert_eq!(text, "$1 ${name} Jo");
    }

    #[test]
    fn test_later_term_matches_earlier_replacement() {
        // Replacements are fed to later terms; this is kept deliberately.
        let (text, counts) = substitute_plain(
            "the accused left",
            &["the accused", "suspect"],
            "Suspect Jones",
        );
        assert_eq!(text, "Suspect Jones Jones left");
        assert_eq!(counts["the accused"], 1);
        assert_eq!(counts["suspect"], 1);
    }

    #[test]
    fn test_term_order_changes_outcome() {
        let text = "the alleged offender";
        let (a, a_counts) = substitute_plain(text, &["offender", "alleged offender"], "Sam");
        let (b, b_counts) = substitute_plain(text, &["alleged offender", "offender"], "Sam");

        assert_eq!(a, "the alleged Sam");
        assert_eq!(a_counts.get("alleged offender"), None);
        assert_eq!(b, "the Sam");
        assert_eq!(b_counts.get("offender"), None);
    }

    #[test]
    fn test_markup_preservation() {
        let out = substitute_markup("<p>The accused said <b>no</b></p>", &["the accused"], "Sam");
        assert_eq!(out, "<p>Sam said <b>no</b></p>");
    }

    #[test]
    fn test_markup_term_across_tag_does_not_match() {
        let markup = "<p>the<b> accused</b></p>";
        assert_eq!(substitute_markup(markup, &["the accused"], "Sam"), markup);
    }

    #[test]
    fn test_markup_tags_untouched() {
        let markup = r#"<p class="suspect">Suspect</p><!-- the suspect --><br/>suspect"#;
        let (out, counts) = substitute_markup_counted(markup, &["suspect"], "Lee");
        assert_eq!(out, r#"<p class="suspect">Lee</p><!-- the suspect --><br/>Lee"#);
        assert_eq!(counts["suspect"], 2);
    }

    #[test]
    fn test_markup_all_occurrences_in_region() {
        let out = substitute_markup(
            "<p>the accused and the accused</p>",
            &["the accused"],
            "Sam",
        );
        assert_eq!(out, "<p>Sam and Sam</p>");
    }

    #[test]
    fn test_markup_unterminated_tag() {
        let out = substitute_markup("culprit <i culprit", &["culprit"], "Ana");
        assert_eq!(out, "Ana <i culprit");
    }

    #[test]
    fn test_markup_paragraph_markers() {
        let markup = "<p class=\"text-center\">The Defendant</p>\n<div class=\"page-break\"></div>\n<p>&nbsp;</p>";
        let out = substitute_markup(markup, &["the defendant"], "Ray");
        assert_eq!(
            out,
            "<p class=\"text-center\">Ray</p>\n<div class=\"page-break\"></div>\n<p>&nbsp;</p>"
        );
    }

    proptest! {
        #[test]
        fn absent_terms_leave_text_unchanged(text in "[a-m ]{0,64}", replacement in "[A-Z]{0,8}") {
            let (out, counts) = substitute_plain(&text, &["xyz", "the prisoner"], &replacement);
            prop_assert_eq!(out, text);
            prop_assert!(counts.is_empty());
        }

        #[test]
        fn count_matches_greedy_scan(text in "[abAB ]{0,64}") {
            let expected = text.to_ascii_lowercase().matches("ab").count() as u64;
            let (_, counts) = substitute_plain(&text, &["ab"], "_");
            prop_assert_eq!(counts.get("ab").copied().unwrap_or(0), expected);
        }

        #[test]
        fn term_split_by_tag_never_matches(before in "[fgkm ]{0,12}", after in "[fgkm ]{0,12}") {
            let markup = format!("<p>{before}the<b> accused</b>{after}</p>");
            prop_assert_eq!(substitute_markup(&markup, &["the accused"], "Sam"), markup);
        }
    }
}
