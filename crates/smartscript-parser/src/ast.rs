//! Abstract Syntax Tree for SmartScript.
//!
//! Contains document-level nodes (text runs, echo tags, FOR loops) and the
//! elements that appear inside tags (literals, variables, functions,
//! operators). The tree is built once by the parser and never mutated.
//!
//! Fields are public for consumers that walk the tree. The round-trip
//! guarantee (render, then parse, gives an equal tree) covers trees the
//! parser produced; a hand-built tree with a variable named `1x` or a
//! function named `a b` renders to text that does not scan back.
//!
//! Nesting depth is bounded by memory, not the call stack: dropping and
//! comparing `ForLoopNode`s walk the tree with an explicit worklist.
//! `Clone` and `Debug` are derived and still recurse per nesting level.

use std::fmt;

pub use smartscript_lexer::Operator;

// ---------------------------------------------------------------------------
// Document-level AST
// ---------------------------------------------------------------------------

/// A complete SmartScript document. Exactly one per parse.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub children: Vec<Node>,
}

/// A node below the document root.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Node {
    /// A run of literal text with escapes resolved.
    Text(TextNode),

    /// An echo tag: `{$= ... $}`.
    Echo(EchoNode),

    /// A loop: `{$FOR ... $}` ... `{$END$}`.
    ForLoop(ForLoopNode),
}

/// Literal document text. `\{` and `\\` are already resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    pub text: String,
}

/// An echo tag with one or more elements.
#[derive(Debug, Clone, PartialEq)]
pub struct EchoNode {
    pub elements: Vec<Element>,
}

/// A FOR loop with its header and body.
#[derive(Debug, Clone)]
pub struct ForLoopNode {
    /// Loop variable name.
    pub variable: String,
    pub start: Element,
    pub end: Element,
    pub step: Option<Element>,
    pub children: Vec<Node>,
}

impl ForLoopNode {
    /// Start, end and (if present) step, in source order.
    pub fn bounds(&self) -> impl Iterator<Item = &Element> {
        [Some(&self.start), Some(&self.end), self.step.as_ref()]
            .into_iter()
            .flatten()
    }

    /// Header equality, ignoring the body.
    fn same_header(&self, other: &Self) -> bool {
        self.variable == other.variable
            && self.start == other.start
            && self.end == other.end
            && self.step == other.step
    }
}

impl PartialEq for ForLoopNode {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];

        while let Some((left, right)) = pending.pop() {
            if !left.same_header(right) || left.children.len() != right.children.len() {
                return false;
            }
            for pair in left.children.iter().zip(&right.children) {
                match pair {
                    (Node::ForLoop(a), Node::ForLoop(b)) => pending.push((a, b)),
                    (Node::Text(a), Node::Text(b)) if a == b => {}
                    (Node::Echo(a), Node::Echo(b)) if a == b => {}
                    _ => return false,
                }
            }
        }

        true
    }
}

impl Drop for ForLoopNode {
    fn drop(&mut self) {
        // Detach nested bodies first so each inner node drops with no children
        let mut pending = std::mem::take(&mut self.children);
        while let Some(node) = pending.pop() {
            if let Node::ForLoop(mut inner) = node {
                pending.append(&mut inner.children);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tag elements
// ---------------------------------------------------------------------------

/// A value inside a tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// Integer literal: `42`, `-7`
    Integer(i64),

    /// Double literal: `3.14`, `1e-3`
    Double(f64),

    /// String literal with escapes resolved: `"hello"`
    String(String),

    /// Variable reference: `i`, `total_2`
    Variable(String),

    /// Function reference without its `@`: `@sin` is `Function("sin")`
    Function(String),

    /// Arithmetic operator symbol.
    Operator(Operator),
}

impl Element {
    /// Canonical source text; re-scanning it yields an equal element.
    pub fn as_text(&self) -> String {
        self.to_string()
    }

    /// Whether this element may be a FOR loop start, end or step.
    pub fn is_loop_bound(&self) -> bool {
        matches!(
            self,
            Element::Integer(_) | Element::Double(_) | Element::String(_) | Element::Variable(_)
        )
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Integer(value) => write!(f, "{value}"),
            // Debug keeps a `.0` or exponent, so the text scans back as a double
            Element::Double(value) => write!(f, "{value:?}"),
            Element::String(value) => {
                f.write_str("\"")?;
                for c in value.chars() {
                    if matches!(c, '"' | '\\') {
                        f.write_str("\\")?;
                    }
                    write!(f, "{c}")?;
                }
                f.write_str("\"")
            }
            Element::Variable(name) => f.write_str(name),
            Element::Function(name) => write!(f, "@{name}"),
            Element::Operator(op) => write!(f, "{}", op.symbol()),
        }
    }
}
