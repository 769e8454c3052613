//! Tree generation from grammar fragments
//!
//! The generator runs in fixed stages:
//! 1. Split fragments holding several top-level brackets
//! 2. Normalize each fragment to a unary node over a terminal
//! 3. Merge the nodes between boundary markers into one subtree per group
//! 4. Enumerate every full binary bracketing of the subtree list
//! 5. Serialize and deduplicate

use std::collections::VecDeque;

use rustc_hash::FxHashSet;
use thiserror::Error;
use tracing::debug;

use crate::category::{category_of, is_non_head};
use crate::config::Limits;
use crate::grammar::{Fragment, FragmentKind};
use crate::tree::{Node, Tree};

/// Error type for tree generation failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneratorError {
    #[error("Generator error: malformed fragment {0:?}")]
    MalformedFragment(String),

    #[error("Generator error: empty group before boundary marker at fragment {position}")]
    EmptyGroup { position: usize },

    #[error("Generator error: compound has no subtrees")]
    EmptyCompound,

    #[error("Generator error: {count} subtrees exceed the limit of {max}")]
    TooManySegments { count: usize, max: usize },

    #[error("Generator error: more than {max} distinct trees")]
    TooManyTrees { max: usize },
}

/// A normalized fragment: a node, or the separator between groups
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Node(Node),
    Boundary,
}

/// Generate every distinct tree for a fragment sequence
///
/// Returns serialized trees without duplicates, in the order they were first
/// completed.
pub fn generate(fragments: Vec<Fragment>, limits: &Limits) -> Result<Vec<String>, GeneratorError> {
    let fragments = split_fragments(fragments)?;
    let elements = normalize(&fragments)?;
    let subtrees = merge_groups(elements)?;
    debug!(subtrees = subtrees.len(), "merged boundary groups");
    bracketings(subtrees, limits)
}

/// Split fragments whose text holds more than one top-level bracket
///
/// `(nbase Tür) (NSUFFIX en)` becomes two fragments. Pieces after the first
/// get their kind from their own label.
pub fn split_fragments(fragments: Vec<Fragment>) -> Result<Vec<Fragment>, GeneratorError> {
    let mut split = Vec::with_capacity(fragments.len());

    for fragment in fragments {
        if fragment.is_marker() {
            split.push(fragment);
            continue;
        }

        let groups = top_level_groups(&fragment.text)
            .ok_or_else(|| GeneratorError::MalformedFragment(fragment.text.clone()))?;
        if groups.len() == 1 {
            split.push(fragment);
            continue;
        }

        for (i, group) in groups.into_iter().enumerate() {
            let kind = if i == 0 {
                fragment.kind
            } else {
                let (label, _) = label_and_word(group)?;
                FragmentKind::from_label(label)
            };
            split.push(Fragment::new(kind, group));
        }
    }

    Ok(split)
}

/// Top-level `(...)` groups of `text`, or `None` if brackets are unbalanced
fn top_level_groups(text: &str) -> Option<Vec<&str>> {
    let mut groups = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        match c {
            '(' => {
                if depth == 0 {
                    start = i;
                }
                depth += 1;
            }
            ')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    groups.push(&text[start..=i]);
                }
            }
            c if depth == 0 && !c.is_whitespace() => return None,
            _ => {}
        }
    }

    (depth == 0 && !groups.is_empty()).then_some(groups)
}

/// `(base word)` into its two parts
fn label_and_word(text: &str) -> Result<(&str, &str), GeneratorError> {
    let malformed = || GeneratorError::MalformedFragment(text.to_string());

    let inner = text
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .ok_or_else(malformed)?;
    let mut parts = inner.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(label), Some(word), None) => Ok((label, word)),
        _ => Err(malformed()),
    }
}

/// Turn fragments into unary nodes and boundary separators
///
/// Verb-prefix markers carry no tree content and are dropped.
pub fn normalize(fragments: &[Fragment]) -> Result<Vec<Element>, GeneratorError> {
    let mut elements = Vec::with_capacity(fragments.len());

    for fragment in fragments {
        match fragment.kind {
            FragmentKind::Boundary => elements.push(Element::Boundary),
            FragmentKind::VerbPrefix => {}
            _ => {
                let (base, word) = label_and_word(&fragment.text)?;
                elements.push(Element::Node(Node::terminal(category_of(base), base, word)));
            }
        }
    }

    Ok(elements)
}

/// Merge two nodes of the same group
///
/// The result takes `next`'s category unless that is a link or suffix
/// category, and hangs `next`'s right child under the accumulated node.
pub fn merge(acc: Node, next: Node) -> Node {
    let category = if is_non_head(&next.category) {
        acc.category.clone()
    } else {
        next.category
    };
    Node {
        category,
        left: Some(Box::new(Tree::Node(acc))),
        right: next.right,
    }
}

/// Fold the nodes between boundary markers into one subtree per group
pub fn merge_groups(elements: Vec<Element>) -> Result<Vec<Node>, GeneratorError> {
    let mut subtrees = Vec::new();
    let mut current: Option<Node> = None;
    let len = elements.len();

    for (position, element) in elements.into_iter().enumerate() {
        match element {
            Element::Boundary => {
                let Some(group) = current.take() else {
                    return Err(GeneratorError::EmptyGroup { position });
                };
                subtrees.push(group);
            }
            Element::Node(node) => {
                current = Some(match current.take() {
                    Some(acc) => merge(acc, node),
                    None => node,
                });
            }
        }
    }

    match current {
        Some(group) => subtrees.push(group),
        None if subtrees.is_empty() => return Err(GeneratorError::EmptyCompound),
        // trailing boundary marker
        None => return Err(GeneratorError::EmptyGroup { position: len }),
    }

    Ok(subtrees)
}

/// Every full binary bracketing of `subtrees`, serialized and deduplicated
///
/// Breadth-first over partial lists: each list with more than one element
/// spawns one successor per adjacent pair, with that pair joined under a
/// `comp` node. Partial lists already queued once are not queued again;
/// their completions would be identical.
pub fn bracketings(subtrees: Vec<Node>, limits: &Limits) -> Result<Vec<String>, GeneratorError> {
    if subtrees.is_empty() {
        return Err(GeneratorError::EmptyCompound);
    }
    if subtrees.len() > limits.max_segments {
        return Err(GeneratorError::TooManySegments {
            count: subtrees.len(),
            max: limits.max_segments,
        });
    }
    // every bracketing renders differently, so the count is known up front
    if shape_count(subtrees.len()).is_none_or(|count| count > limits.max_trees) {
        return Err(GeneratorError::TooManyTrees {
            max: limits.max_trees,
        });
    }

    let mut trees = Vec::new();
    let mut seen_trees: FxHashSet<String> = FxHashSet::default();
    let mut seen_states: FxHashSet<String> = FxHashSet::default();
    let mut queue = VecDeque::from([subtrees]);

    while let Some(state) = queue.pop_front() {
        if let [root] = state.as_slice() {
            let rendered = root.to_string();
            if seen_trees.insert(rendered.clone()) {
                trees.push(rendered);
            }
            continue;
        }

        for i in 0..state.len() - 1 {
            let next = join_adjacent(&state, i);
            if seen_states.insert(state_key(&next)) {
                queue.push_back(next);
            }
        }
    }

    Ok(trees)
}

/// Number of full binary bracketings of `n` items, Catalan(n - 1);
/// `None` on overflow
pub fn shape_count(n: usize) -> Option<usize> {
    (0..n.saturating_sub(1)).try_fold(1usize, |c, k| {
        c.checked_mul(2 * (2 * k + 1)).map(|c| c / (k + 2))
    })
}

/// Copy of `state` with elements `i` and `i + 1` joined under `comp`
fn join_adjacent(state: &[Node], i: usize) -> Vec<Node> {
    let mut next = Vec::with_capacity(state.len() - 1);
    next.extend_from_slice(&state[..i]);
    next.push(Node::comp(state[i].clone(), state[i + 1].clone()));
    next.extend_from_slice(&state[i + 2..]);
    next
}

fn state_key(state: &[Node]) -> String {
    state
        .iter()
        .map(|node| node.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::parse_compound;

    fn node(category: &str, base: &str, word: &str) -> Node {
        Node::terminal(category, base, word)
    }

    fn generate_str(word: &str) -> Result<Vec<String>, GeneratorError> {
        generate(parse_compound(word).unwrap(), &Limits::default())
    }

    fn catalan(n: usize) -> usize {
        (0..n).fold(1, |c, k| c * 2 * (2 * k + 1) / (k + 2))
    }

    #[test]
    fn test_single_stem() {
        assert_eq!(generate_str("Wort").unwrap(), vec!["(noun (nbase Wort))"]);
    }

    #[test]
    fn test_two_stems() {
        assert_eq!(
            generate_str("Haus#Tür").unwrap(),
            vec!["(comp (noun (nbase Haus)) (noun (nbase Tür)))"]
        );
    }

    #[test]
    fn test_three_stems() {
        let mut trees = generate_str("Haus#Tür#Schloss").unwrap();
        trees.sort();

        let h = "(noun (nbase Haus))";
        let t = "(noun (nbase Tür))";
        let s = "(noun (nbase Schloss))";
        let mut expected = vec![
            format!("(comp (comp {} {}) {})", h, t, s),
            format!("(comp {} (comp {} {}))", h, t, s),
        ];
        expected.sort();
        assert_eq!(trees, expected);
    }

    #[test]
    fn test_catalan_counts() {
        for n in 1..=7 {
            let word = vec!["Wort"; n].join("#");
            let trees = generate_str(&word).unwrap();
            assert_eq!(trees.len(), catalan(n - 1), "n = {}", n);
        }
    }

    #[test]
    fn test_suffix_does_not_promote() {
        let trees = generate_str("Kind~er#Garten").unwrap();
        assert_eq!(
            trees,
            vec!["(comp (noun (noun (nbase Kind)) (SUFFIX er)) (noun (nbase Garten)))"]
        );
    }

    #[test]
    fn test_link_does_not_promote() {
        let trees = generate_str("fahr<V>\\s#Weg").unwrap();
        assert_eq!(
            trees,
            vec!["(comp (verb (verb (vbase fahr)) (link_s s)) (noun (nbase Weg)))"]
        );
    }

    #[test]
    fn test_head_suffix_promotes_to_noun() {
        let trees = generate_str("fahr<V>~er").unwrap();
        assert_eq!(trees, vec!["(noun (verb (vbase fahr)) (NSUFFIX er))"]);
    }

    #[test]
    fn test_merge_keeps_category_for_non_head() {
        let merged = merge(node("verb", "vbase", "lauf"), node("link", "link_s", "s"));
        assert_eq!(merged.category, "verb");

        let merged = merge(node("verb", "vbase", "lauf"), node("affix", "SUFFIX", "er"));
        assert_eq!(merged.category, "verb");

        let merged = merge(node("verb", "vbase", "lauf"), node("noun", "NSUFFIX", "er"));
        assert_eq!(merged.category, "noun");
    }

    #[test]
    fn test_merge_chains_right() {
        let merged = merge(
            merge(node("noun", "nbase", "a"), node("affix", "SUFFIX", "b")),
            node("affix", "SUFFIX", "c"),
        );
        assert_eq!(
            merged.to_string(),
            "(noun (noun (noun (nbase a)) (SUFFIX b)) (SUFFIX c))"
        );
    }

    #[test]
    fn test_split_fragments() {
        let fragments = vec![Fragment::new(
            FragmentKind::Stem,
            "(nbase Tür) (NSUFFIX en) (link_s s)",
        )];
        let split = split_fragments(fragments).unwrap();

        assert_eq!(
            split,
            vec![
                Fragment::bracket(FragmentKind::Stem, "nbase", "Tür"),
                Fragment::bracket(FragmentKind::Suffix, "NSUFFIX", "en"),
                Fragment::bracket(FragmentKind::Link, "link_s", "s"),
            ]
        );
    }

    #[test]
    fn test_split_rejects_unbalanced() {
        let fragments = vec![Fragment::new(FragmentKind::Stem, "(nbase Tür")];
        assert_eq!(
            split_fragments(fragments),
            Err(GeneratorError::MalformedFragment("(nbase Tür".to_string()))
        );
    }

    #[test]
    fn test_normalize() {
        let fragments = vec![
            Fragment::bracket(FragmentKind::Stem, "ur", "ur"),
            Fragment::verb_prefix(),
            Fragment::boundary(),
            Fragment::bracket(FragmentKind::Link, "link_es", "es"),
        ];
        let elements = normalize(&fragments).unwrap();

        assert_eq!(
            elements,
            vec![
                Element::Node(node("ur", "ur", "ur")),
                Element::Boundary,
                Element::Node(node("link", "link_es", "es")),
            ]
        );
    }

    #[test]
    fn test_boundary_only_is_error() {
        assert_eq!(
            generate_str("#"),
            Err(GeneratorError::EmptyGroup { position: 0 })
        );
    }

    #[test]
    fn test_leading_and_doubled_boundaries() {
        assert_eq!(
            generate_str("#Haus"),
            Err(GeneratorError::EmptyGroup { position: 0 })
        );
        assert_eq!(
            generate_str("Haus##Tür"),
            Err(GeneratorError::EmptyGroup { position: 2 })
        );
        assert_eq!(
            generate_str("Haus#"),
            Err(GeneratorError::EmptyGroup { position: 2 })
        );
    }

    #[test]
    fn test_empty_compound() {
        assert_eq!(generate_str("@"), Err(GeneratorError::EmptyCompound));
        assert_eq!(
            bracketings(Vec::new(), &Limits::default()),
            Err(GeneratorError::EmptyCompound)
        );
    }

    #[test]
    fn test_segment_limit() {
        let limits = Limits {
            max_segments: 3,
            ..Limits::default()
        };
        let fragments = parse_compound("a#b#c#d").unwrap();
        assert_eq!(
            generate(fragments, &limits),
            Err(GeneratorError::TooManySegments { count: 4, max: 3 })
        );
    }

    #[test]
    fn test_tree_limit() {
        let limits = Limits {
            max_trees: 4,
            ..Limits::default()
        };
        // Catalan(3) = 5 trees
        let fragments = parse_compound("a#b#c#d").unwrap();
        assert_eq!(
            generate(fragments, &limits),
            Err(GeneratorError::TooManyTrees { max: 4 })
        );
    }

    #[test]
    fn test_tree_limit_checked_before_enumeration() {
        let limits = Limits {
            max_segments: 40,
            max_trees: 1,
        };
        let word = (0..40)
            .map(|i| format!("S{}", char::from(b'a' + (i % 26) as u8)))
            .collect::<Vec<_>>()
            .join("#");
        let fragments = parse_compound(&word).unwrap();
        assert_eq!(
            generate(fragments, &limits),
            Err(GeneratorError::TooManyTrees { max: 1 })
        );
    }

    #[test]
    fn test_shape_count() {
        let counts: Vec<_> = (0..=7).map(|n| shape_count(n).unwrap()).collect();
        assert_eq!(counts, vec![1, 1, 1, 2, 5, 14, 42, 132]);
        assert_eq!(shape_count(200), None);
    }

    #[test]
    fn test_trees_parse_back() {
        for rendered in generate_str("Lauf<V>~en<Part>#Band#Wurm~er").unwrap() {
            let tree: Tree = rendered.parse().unwrap();
            assert_eq!(tree.to_string(), rendered);
            assert_eq!(tree.leaves(), vec!["Lauf", "en", "Band", "Wurm", "er"]);
            assert_eq!(tree.comp_count(), 2);
        }
    }
}
