//! Canonical form of document text.
//!
//! The badge region is delimited by explicit markers:
//!
//! ```text
//! <!--vellum:badge--> ...anything... <!--/vellum:badge-->
//! ```
//!
//! Each region is removed together with its markers. Regions may not nest,
//! and an unmatched marker is an error rather than a silent pass-through, so
//! a stray edit to a marker shows up as "unverified" instead of as a
//! spurious digest.

use std::borrow::Cow;

use crate::error::{VerifyError, VerifyResult};

pub const BADGE_BEGIN: &str = "<!--vellum:badge-->";
pub const BADGE_END: &str = "<!--/vellum:badge-->";

/// Remove every badge region from `content`.
///
/// Idempotent: `canonicalize(canonicalize(x)) == canonicalize(x)`.
pub fn canonicalize(content: &str) -> VerifyResult<Cow<'_, str>> {
    let first_begin = content.find(BADGE_BEGIN);
    let first_end = content.find(BADGE_END);

    match (first_begin, first_end) {
        (None, None) => return Ok(Cow::Borrowed(content)),
        (None, Some(end)) => return Err(VerifyError::UnmatchedEnd(end)),
        (Some(begin), Some(end)) if end < begin => return Err(VerifyError::UnmatchedEnd(end)),
        _ => {}
    }

    let mut out = String::with_capacity(content.len());
    let mut cursor = 0;

    while let Some(rel_begin) = content[cursor..].find(BADGE_BEGIN) {
        let begin = cursor + rel_begin;

        if let Some(rel_end) = content[cursor..begin].find(BADGE_END) {
            return Err(VerifyError::UnmatchedEnd(cursor + rel_end));
        }
        out.push_str(&content[cursor..begin]);

        let inner_start = begin + BADGE_BEGIN.len();
        let end = match content[inner_start..].find(BADGE_END) {
            Some(rel) => inner_start + rel,
            None => return Err(VerifyError::UnclosedBegin(begin)),
        };
        if let Some(rel_nested) = content[inner_start..end].find(BADGE_BEGIN) {
            return Err(VerifyError::NestedBegin(inner_start + rel_nested));
        }
        cursor = end + BADGE_END.len();
    }

    if let Some(rel_end) = content[cursor..].find(BADGE_END) {
        return Err(VerifyError::UnmatchedEnd(cursor + rel_end));
    }
    out.push_str(&content[cursor..]);
    Ok(Cow::Owned(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn badge(inner: &str) -> String {
        format!("{BADGE_BEGIN}{inner}{BADGE_END}")
    }

    #[test]
    fn unmarked_content_is_borrowed() {
        let text = "<html><body>plain</body></html>";
        assert!(matches!(canonicalize(text).unwrap(), Cow::Borrowed(_)));
    }

    #[test]
    fn region_removed_with_markers() {
        let text = format!("<p>a</p>{}<p>b</p>", badge("<span>verified</span>"));
        assert_eq!(canonicalize(&text).unwrap(), "<p>a</p><p>b</p>");
    }

    #[test]
    fn multiple_regions_removed() {
        let text = format!("x{}y{}z", badge("1"), badge("2"));
        assert_eq!(canonicalize(&text).unwrap(), "xyz");
    }

    #[test]
    fn badge_contents_do_not_matter() {
        let a = format!("head{}tail", badge(""));
        let b = format!("head{}tail", badge("TAMPERED: expected ab12cd, got ff0011"));
        assert_eq!(canonicalize(&a).unwrap(), canonicalize(&b).unwrap());
    }

    #[test]
    fn unclosed_begin_is_error() {
        let text = format!("a{BADGE_BEGIN}b");
        assert_eq!(canonicalize(&text).unwrap_err(), VerifyError::UnclosedBegin(1));
    }

    #[test]
    fn stray_end_is_error() {
        let text = format!("a{BADGE_END}b");
        assert_eq!(canonicalize(&text).unwrap_err(), VerifyError::UnmatchedEnd(1));

        let after = format!("{}{BADGE_END}", badge("x"));
        assert!(matches!(
            canonicalize(&after).unwrap_err(),
            VerifyError::UnmatchedEnd(_)
        ));
    }

    #[test]
    fn nested_begin_is_error() {
        let text = format!("{BADGE_BEGIN}{BADGE_BEGIN}{BADGE_END}");
        assert!(matches!(
            canonicalize(&text).unwrap_err(),
            VerifyError::NestedBegin(_)
        ));
    }

    proptest! {
        #[test]
        fn idempotent(prefix in "[a-z <>/]{0,40}", inner in "[a-z0-9 ]{0,20}", suffix in "[a-z <>/]{0,40}") {
            let text = format!("{prefix}{}{suffix}", badge(&inner));
            let once = canonicalize(&text).unwrap().into_owned();
            let twice = canonicalize(&once).unwrap().into_owned();
            prop_assert_eq!(once, twice);
        }
    }
}
