//! Source reconstruction.
//!
//! Regenerates SmartScript text from the AST. The output is not
//! byte-identical to the original input (whitespace inside tags and number
//! formatting are normalized), but parsing it yields an equal tree.

use crate::{walk_document, walk_node, CodegenError, Visitor};
use smartscript_parser::ast::{Document, EchoNode, Element, ForLoopNode, Node, TextNode};

/// Render a whole document back to SmartScript source.
pub fn render(doc: &Document) -> Result<String, CodegenError> {
    let mut writer = SourceWriter::default();
    walk_document(&mut writer, doc)?;
    Ok(writer.out)
}

/// Render a single subtree. An absent node fails with `NullNode`.
pub fn render_node(node: Option<&Node>) -> Result<String, CodegenError> {
    let node = node.ok_or(CodegenError::NullNode)?;
    let mut writer = SourceWriter::default();
    walk_node(&mut writer, node)?;
    Ok(writer.out)
}

/// Escape literal text so the scanner reads it back unchanged.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '{') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[derive(Default)]
struct SourceWriter {
    out: String,
}

impl SourceWriter {
    fn push_elements<'a>(&mut self, elements: impl IntoIterator<Item = &'a Element>) {
        for (i, element) in elements.into_iter().enumerate() {
            if i > 0 {
                self.out.push(' ');
            }
            self.out.push_str(&element.as_text());
        }
    }
}

impl Visitor for SourceWriter {
    fn visit_text(&mut self, node: &TextNode) -> Result<(), CodegenError> {
        self.out.push_str(&escape_text(&node.text));
        Ok(())
    }

    fn visit_echo(&mut self, node: &EchoNode) -> Result<(), CodegenError> {
        self.out.push_str("{$=");
        self.push_elements(&node.elements);
        self.out.push_str("$}");
        Ok(())
    }

    fn enter_for_loop(&mut self, node: &ForLoopNode) -> Result<(), CodegenError> {
        self.out.push_str("{$FOR ");
        self.out.push_str(&node.variable);
        self.out.push(' ');
        self.push_elements(node.bounds());
        self.out.push_str("$}");
        Ok(())
    }

    fn leave_for_loop(&mut self, _node: &ForLoopNode) -> Result<(), CodegenError> {
        self.out.push_str("{$END$}");
        Ok(())
    }
}
