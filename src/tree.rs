//! Tree data structures for compound analyses
//!
//! Trees are plain value trees: every node owns its children, nothing is
//! shared, and nothing changes after construction. The bracketed rendering
//! produced by [`std::fmt::Display`] is the wire format handed to downstream
//! scorers and visualizers; [`Tree::from_str`] reads it back.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::category::COMP;

/// A tree: either a terminal `(base word)` or an inner node
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tree {
    Terminal { base: String, word: String },
    Node(Node),
}

/// Inner node with an optional left child
///
/// A node without a left child renders as the unary bracket
/// `(category right)`, otherwise as `(category left right)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Node {
    pub category: String,
    pub left: Option<Box<Tree>>,
    pub right: Box<Tree>,
}

impl Node {
    /// Unary node over a terminal, the shape every fragment normalizes to
    pub fn terminal(category: &str, base: &str, word: &str) -> Self {
        Self {
            category: category.to_string(),
            left: None,
            right: Box::new(Tree::Terminal {
                base: base.to_string(),
                word: word.to_string(),
            }),
        }
    }

    /// `comp` node joining two adjacent subtrees
    pub fn comp(left: Node, right: Node) -> Self {
        Self {
            category: COMP.to_string(),
            left: Some(Box::new(Tree::Node(left))),
            right: Box::new(Tree::Node(right)),
        }
    }
}

impl Tree {
    /// Surface words of the terminals, left to right
    pub fn leaves(&self) -> Vec<&str> {
        let mut words = Vec::new();
        self.collect_leaves(&mut words);
        words
    }

    fn collect_leaves<'a>(&'a self, words: &mut Vec<&'a str>) {
        match self {
            Tree::Terminal { word, .. } => words.push(word),
            Tree::Node(node) => {
                if let Some(left) = &node.left {
                    left.collect_leaves(words);
                }
                node.right.collect_leaves(words);
            }
        }
    }

    /// Number of `comp` nodes in the tree
    pub fn comp_count(&self) -> usize {
        match self {
            Tree::Terminal { .. } => 0,
            Tree::Node(node) => {
                let own = usize::from(node.category == COMP);
                own + node.left.as_ref().map_or(0, |l| l.comp_count()) + node.right.comp_count()
            }
        }
    }
}

impl From<Node> for Tree {
    fn from(node: Node) -> Self {
        Tree::Node(node)
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tree::Terminal { base, word } => write!(f, "({} {})", base, word),
            Tree::Node(node) => write!(f, "{}", node),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.left {
            Some(left) => write!(f, "({} {} {})", self.category, left, self.right),
            None => write!(f, "({} {})", self.category, self.right),
        }
    }
}

/// Error reading a bracketed tree
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeParseError {
    #[error("Tree error: unexpected end of input")]
    UnexpectedEnd,

    #[error("Tree error: unexpected token {0:?}")]
    UnexpectedToken(String),

    #[error("Tree error: bracket {0:?} must have one or two children")]
    BadArity(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    Open,
    Close,
    Atom(&'a str),
}

fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;

    for (i, c) in input.char_indices() {
        if c == '(' || c == ')' || c.is_whitespace() {
            if let Some(s) = start.take() {
                tokens.push(Token::Atom(&input[s..i]));
            }
            match c {
                '(' => tokens.push(Token::Open),
                ')' => tokens.push(Token::Close),
                _ => {}
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        tokens.push(Token::Atom(&input[s..]));
    }

    tokens
}

impl FromStr for Tree {
    type Err = TreeParseError;

    /// Read a tree back from its bracketed rendering
    ///
    /// `(label atom)` is a terminal, `(label tree)` a unary node and
    /// `(label tree tree)` a binary node. Exactly one top-level bracket is
    /// accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens = tokenize(s);
        let mut pos = 0;
        let tree = parse_bracket(&tokens, &mut pos)?;
        match tokens.get(pos) {
            None => Ok(tree),
            Some(token) => Err(TreeParseError::UnexpectedToken(format!("{:?}", token))),
        }
    }
}

fn parse_bracket(tokens: &[Token<'_>], pos: &mut usize) -> Result<Tree, TreeParseError> {
    match tokens.get(*pos) {
        Some(Token::Open) => *pos += 1,
        Some(token) => return Err(TreeParseError::UnexpectedToken(format!("{:?}", token))),
        None => return Err(TreeParseError::UnexpectedEnd),
    }

    let label = match tokens.get(*pos) {
        Some(Token::Atom(label)) => *label,
        Some(token) => return Err(TreeParseError::UnexpectedToken(format!("{:?}", token))),
        None => return Err(TreeParseError::UnexpectedEnd),
    };
    *pos += 1;

    // A bracket holding a single atom is a terminal
    if let (Some(Token::Atom(word)), Some(Token::Close)) = (tokens.get(*pos), tokens.get(*pos + 1))
    {
        *pos += 2;
        return Ok(Tree::Terminal {
            base: label.to_string(),
            word: word.to_string(),
        });
    }

    let mut children = Vec::new();
    loop {
        match tokens.get(*pos) {
            Some(Token::Close) => {
                *pos += 1;
                break;
            }
            Some(Token::Open) => children.push(parse_bracket(tokens, pos)?),
            Some(token) => return Err(TreeParseError::UnexpectedToken(format!("{:?}", token))),
            None => return Err(TreeParseError::UnexpectedEnd),
        }
    }

    let mut children = children.into_iter();
    match (children.next(), children.next(), children.next()) {
        (Some(right), None, None) => Ok(Tree::Node(Node {
            category: label.to_string(),
            left: None,
            right: Box::new(right),
        })),
        (Some(left), Some(right), None) => Ok(Tree::Node(Node {
            category: label.to_string(),
            left: Some(Box::new(left)),
            right: Box::new(right),
        })),
        _ => Err(TreeParseError::BadArity(label.to_string())),
    }
}
