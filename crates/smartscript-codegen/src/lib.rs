//! SmartScript Code Generator
//!
//! Walks the SmartScript AST. The [`Visitor`] trait is the traversal
//! contract for consumers of the tree; two visitors ship with the crate:
//!
//! ```text
//! Document AST → render()  → SmartScript source (re-parses to an equal tree)
//! Document AST → outline() → indented one-node-per-line dump
//! ```

pub mod outline;
pub mod source;

pub use outline::outline;
pub use source::{render, render_node};

use smartscript_parser::ast::{Document, EchoNode, ForLoopNode, Node, TextNode};

/// Code generation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodegenError {
    #[error("Codegen error: no node to render")]
    NullNode,

    #[error("Codegen error: unsupported node kind")]
    UnsupportedNodeKind,
}

/// One method per node kind, driven by [`walk_document`] / [`walk_nodes`].
///
/// The walk keeps its own stack, so visitors never recurse and nesting
/// depth is bounded by memory. A FOR loop is reported twice: on entry
/// (before its body) and on leaving (after its body).
pub trait Visitor {
    fn visit_document(&mut self, _doc: &Document) -> Result<(), CodegenError> {
        Ok(())
    }

    fn visit_text(&mut self, node: &TextNode) -> Result<(), CodegenError>;

    fn visit_echo(&mut self, node: &EchoNode) -> Result<(), CodegenError>;

    fn enter_for_loop(&mut self, node: &ForLoopNode) -> Result<(), CodegenError>;

    fn leave_for_loop(&mut self, _node: &ForLoopNode) -> Result<(), CodegenError> {
        Ok(())
    }
}

enum Step<'a> {
    Enter(&'a Node),
    Leave(&'a ForLoopNode),
}

/// Visit the document, then every node below it in source order.
pub fn walk_document<V: Visitor + ?Sized>(
    visitor: &mut V,
    doc: &Document,
) -> Result<(), CodegenError> {
    visitor.visit_document(doc)?;
    walk_nodes(visitor, &doc.children)
}

/// Visit a node and its subtree.
pub fn walk_node<V: Visitor + ?Sized>(visitor: &mut V, node: &Node) -> Result<(), CodegenError> {
    walk_nodes(visitor, std::slice::from_ref(node))
}

/// Visit each node and its subtree in order, stopping at the first error.
pub fn walk_nodes<V: Visitor + ?Sized>(
    visitor: &mut V,
    nodes: &[Node],
) -> Result<(), CodegenError> {
    let mut pending: Vec<Step<'_>> = nodes.iter().rev().map(Step::Enter).collect();

    while let Some(step) = pending.pop() {
        match step {
            Step::Enter(Node::Text(text)) => visitor.visit_text(text)?,
            Step::Enter(Node::Echo(echo)) => visitor.visit_echo(echo)?,
            Step::Enter(Node::ForLoop(for_loop)) => {
                visitor.enter_for_loop(for_loop)?;
                pending.push(Step::Leave(for_loop));
                pending.extend(for_loop.children.iter().rev().map(Step::Enter));
            }
            Step::Enter(_) => return Err(CodegenError::UnsupportedNodeKind),
            Step::Leave(for_loop) => visitor.leave_for_loop(for_loop)?,
        }
    }

    Ok(())
}
