//! Font format normalization.
//!
//! Requested formats are deduplicated and put into the canonical priority
//! order `eot, woff2, woff, ttf, svg`. Identifiers outside that table sort
//! after every known format, alphabetically, so the order is total.

use icon_font_config::FontFormat;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Compare two formats by canonical priority.
pub fn compare_formats(a: &FontFormat, b: &FontFormat) -> Ordering {
    match (a.priority(), b.priority()) {
        (Some(pa), Some(pb)) => pa.cmp(&pb),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.as_str().cmp(b.as_str()),
    }
}

/// Deduplicate and sort `requested` into canonical priority order.
pub fn normalize(requested: &[FontFormat]) -> Vec<FontFormat> {
    let mut seen = HashSet::new();
    let mut formats: Vec<FontFormat> = requested
        .iter()
        .filter(|format| seen.insert(*format))
        .cloned()
        .collect();
    formats.sort_by(compare_formats);
    formats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f(name: &str) -> FontFormat {
        FontFormat::from(name)
    }

    #[test]
    fn test_sorts_into_canonical_order() {
        let requested = [f("svg"), f("ttf"), f("woff"), f("woff2"), f("eot")];
        assert_eq!(
            normalize(&requested),
            vec![f("eot"), f("woff2"), f("woff"), f("ttf"), f("svg")]
        );
    }

    #[test]
    fn test_removes_duplicates() {
        let requested = [f("woff"), f("woff2"), f("woff"), f("woff2"), f("woff")];
        assert_eq!(normalize(&requested), vec![f("woff2"), f("woff")]);
    }

    #[test]
    fn test_unknown_formats_sort_last_alphabetically() {
        let requested = [f("otf"), f("woff"), f("afm"), f("eot"), f("otf")];
        assert_eq!(
            normalize(&requested),
            vec![f("eot"), f("woff"), f("afm"), f("otf")]
        );
    }

    #[test]
    fn test_idempotent() {
        let requested = [f("ttf"), f("zzz"), f("eot"), f("ttf"), f("woff2")];
        let once = normalize(&requested);
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn test_empty() {
        assert!(normalize(&[]).is_empty());
    }
}
