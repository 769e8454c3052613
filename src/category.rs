//! Category table
//!
//! Maps the base labels produced by the grammar to the coarser categories
//! that label tree nodes. The table is built once and never mutated.

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

/// Category of link fragments (`link_s`, `link_es`, ...)
pub const LINK: &str = "link";

/// Label of the synthetic node joining two adjacent subtrees
pub const COMP: &str = "comp";

static CATEGORY_TABLE: Lazy<FxHashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("nbase", "noun"),
        ("NSUFFIX", "noun"),
        ("SUFFIX", "affix"),
        ("vbase", "verb"),
        ("abase", "adj"),
        ("pbase", "prt"),
        ("fbase", "f"),
        ("kbase", "k"),
        ("zbase", "z"),
        ("xbase", "x"),
        ("locbase", "loc"),
        ("namebase", "name"),
        ("probase", "pro"),
        ("orgbase", "org"),
        ("evebase", "eve"),
        ("egobase", "ego"),
        ("geobase", "geo"),
        ("fmbase", "fm"),
        ("PARTICLE", "prt"),
        (LINK, LINK),
    ]
    .into_iter()
    .collect()
});

/// Category for a base label
///
/// Link labels collapse to [`LINK`]; labels missing from the table pass
/// through unchanged.
pub fn category_of(base: &str) -> &str {
    if base.starts_with(LINK) {
        return LINK;
    }
    CATEGORY_TABLE.get(base).copied().unwrap_or(base)
}

/// Categories that never become the head of a merged group
pub fn is_non_head(category: &str) -> bool {
    matches!(category, LINK | "suffix" | "affix")
}
