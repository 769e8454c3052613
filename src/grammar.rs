//! Morphological grammar for annotated compound nouns
//!
//! Tokenizes one annotated compound (e.g. `Haus#Tür~en`) into an ordered
//! sequence of [`Fragment`]s. The pest grammar in `compound.pest` recognizes
//! single productions; this module runs every production at each position
//! and keeps the one that consumes the most input, breaking ties by the
//! order of [`PRODUCTIONS`].

use pest::Parser;
use pest::iterators::{Pair, Pairs};
use pest_derive::Parser;
use thiserror::Error;
use tracing::debug;

#[derive(Parser)]
#[grammar = "compound.pest"]
struct CompoundParser;

/// Productions tried at every position, in tie-break order.
pub const PRODUCTIONS: [Rule; 14] = [
    Rule::stem_typed,
    Rule::head_stem,
    Rule::head_stem_typed,
    Rule::stem_typed_chain,
    Rule::stem_chain,
    Rule::suffix_typed,
    Rule::suffix,
    Rule::link,
    Rule::link_typed,
    Rule::prefix,
    Rule::particle,
    Rule::boundary,
    Rule::verb_prefix,
    Rule::prior,
];

/// Boundary marker separating the sub-words of a compound
pub const BOUNDARY: &str = "#";

/// Verb-prefix marker
pub const VERB_PREFIX: &str = "=";

/// Error type for grammar failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("Grammar error: empty word")]
    EmptyWord,

    #[error("Grammar error: no production matches {word:?} at offset {offset} ({rest:?})")]
    NoProduction {
        word: String,
        offset: usize,
        rest: String,
    },
}

/// What a fragment stands for in the compound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentKind {
    /// Stem with its category label (`nbase`, `vbase`, prefixes, ...)
    Stem,
    /// `SUFFIX` or `NSUFFIX`
    Suffix,
    Particle,
    Link,
    Boundary,
    VerbPrefix,
}

impl FragmentKind {
    /// Infer the kind of a bracketed fragment from its label
    pub fn from_label(label: &str) -> Self {
        match label {
            "SUFFIX" | "NSUFFIX" => FragmentKind::Suffix,
            "PARTICLE" => FragmentKind::Particle,
            l if l.starts_with("link") => FragmentKind::Link,
            _ => FragmentKind::Stem,
        }
    }
}

/// One labeled unit of grammar output: its kind and rendered text
///
/// Rendered text is either a bracket `(label word)` or a bare marker symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fragment {
    pub kind: FragmentKind,
    pub text: String,
}

impl Fragment {
    pub fn new(kind: FragmentKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// A bracketed fragment `(label word)`
    pub fn bracket(kind: FragmentKind, label: &str, word: &str) -> Self {
        Self::new(kind, format!("({} {})", label, word))
    }

    pub fn boundary() -> Self {
        Self::new(FragmentKind::Boundary, BOUNDARY)
    }

    pub fn verb_prefix() -> Self {
        Self::new(FragmentKind::VerbPrefix, VERB_PREFIX)
    }

    /// True for the two bare marker kinds
    pub fn is_marker(&self) -> bool {
        matches!(self.kind, FragmentKind::Boundary | FragmentKind::VerbPrefix)
    }
}

/// A suffix, particle or link hanging off a stem, before rendering
struct Attachment<'i> {
    kind: FragmentKind,
    label: String,
    word: &'i str,
}

impl Attachment<'_> {
    fn into_fragment(self) -> Fragment {
        Fragment::bracket(self.kind, &self.label, self.word)
    }

    /// Head-final compounding: plain suffixes of the head are nominal
    fn into_head(mut self) -> Self {
        if self.label == "SUFFIX" {
            self.label = "NSUFFIX".to_string();
        }
        self
    }
}

/// Parse an annotated compound into fragments
///
/// The fragments cover the whole input in order. Prior marks (`@`) are
/// consumed without output.
pub fn parse_compound(word: &str) -> Result<Vec<Fragment>, GrammarError> {
    if word.is_empty() {
        return Err(GrammarError::EmptyWord);
    }

    let mut fragments = Vec::new();
    let mut offset = 0;

    while offset < word.len() {
        let rest = &word[offset..];
        let Some((consumed, pair)) = longest_match(rest) else {
            return Err(GrammarError::NoProduction {
                word: word.to_string(),
                offset,
                rest: rest.to_string(),
            });
        };
        build_fragments(pair, &mut fragments);
        offset += consumed;
    }

    debug!(word, fragments = fragments.len(), "parsed compound");
    Ok(fragments)
}

/// Try every production on `input`; keep the longest, first declared on ties
fn longest_match(input: &str) -> Option<(usize, Pair<'_, Rule>)> {
    let mut best: Option<(usize, Pair<'_, Rule>)> = None;

    for rule in PRODUCTIONS {
        let Ok(mut pairs) = CompoundParser::parse(rule, input) else {
            continue;
        };
        let Some(pair) = pairs.next() else {
            continue;
        };
        let consumed = pair.as_span().end();
        if consumed == 0 {
            continue;
        }
        // Strictly longer only, so earlier productions win ties
        if best.as_ref().is_none_or(|(len, _)| consumed > *len) {
            best = Some((consumed, pair));
        }
    }

    best
}

/// Render the fragments of one matched production
fn build_fragments(pair: Pair<'_, Rule>, out: &mut Vec<Fragment>) {
    match pair.as_rule() {
        Rule::stem_typed | Rule::stem_typed_chain => {
            let (stem, tag, attachments) = split_stem(pair.into_inner());
            out.push(stem_fragment(stem, tag));
            out.extend(attachments.into_iter().map(Attachment::into_fragment));
        }
        Rule::stem_chain => {
            let (stem, _, attachments) = split_stem(pair.into_inner());
            out.push(stem_fragment(stem, None));
            out.extend(attachments.into_iter().map(Attachment::into_fragment));
        }
        Rule::head_stem | Rule::head_stem_typed => {
            let (stem, tag, attachments) = split_stem(pair.into_inner());
            out.push(stem_fragment(stem, tag));
            out.extend(
                attachments
                    .into_iter()
                    .map(|a| a.into_head().into_fragment()),
            );
        }
        Rule::suffix_typed | Rule::suffix | Rule::link | Rule::link_typed => {
            if let Some(attachment) = attachment(pair) {
                out.push(attachment.into_fragment());
            }
        }
        Rule::prefix => {
            let stem = first_inner(pair);
            out.push(Fragment::bracket(FragmentKind::Stem, stem, stem));
        }
        Rule::particle => {
            let stem = first_inner(pair);
            out.push(Fragment::bracket(FragmentKind::Particle, "PARTICLE", stem));
        }
        Rule::boundary => out.push(Fragment::boundary()),
        Rule::verb_prefix => out.push(Fragment::verb_prefix()),
        // prior marks carry no structure
        _ => {}
    }
}

/// `(nbase stem)` for untagged stems, `(<tag>base stem)` otherwise
fn stem_fragment(stem: &str, tag: Option<&str>) -> Fragment {
    let label = match tag {
        Some(tag) => format!("{}base", tag.to_lowercase()),
        None => "nbase".to_string(),
    };
    Fragment::bracket(FragmentKind::Stem, &label, stem)
}

/// Pull the stem, optional tag and attachments out of a stem production
fn split_stem(pairs: Pairs<'_, Rule>) -> (&str, Option<&str>, Vec<Attachment<'_>>) {
    let mut stem = "";
    let mut tag = None;
    let mut attachments = Vec::new();

    for inner in pairs {
        match inner.as_rule() {
            Rule::stem => stem = inner.as_str(),
            Rule::stem_tag => tag = Some(inner.as_str()),
            Rule::EOI => {}
            _ => attachments.extend(attachment(inner)),
        }
    }

    (stem, tag, attachments)
}

fn attachment(pair: Pair<'_, Rule>) -> Option<Attachment<'_>> {
    let rule = pair.as_rule();
    let mut inner = pair.into_inner();
    let word = inner.next()?.as_str();

    let (kind, label) = match rule {
        Rule::suffix_typed => match inner.next().map(|tag| tag.as_str()) {
            Some("Part") => (FragmentKind::Particle, "PARTICLE".to_string()),
            Some("n") => (FragmentKind::Suffix, "NSUFFIX".to_string()),
            _ => (FragmentKind::Suffix, "SUFFIX".to_string()),
        },
        Rule::suffix => (FragmentKind::Suffix, "SUFFIX".to_string()),
        Rule::link | Rule::link_typed => (FragmentKind::Link, format!("link_{}", word)),
        _ => return None,
    };

    Some(Attachment { kind, label, word })
}

fn first_inner(pair: Pair<'_, Rule>) -> &str {
    pair.into_inner().next().map_or("", |p| p.as_str())
}
