//! Outline dump of a parsed document, one node per line, indented by depth.

use crate::{walk_document, CodegenError, Visitor};
use smartscript_parser::ast::{Document, EchoNode, Element, ForLoopNode, TextNode};

/// Produce an indented outline of the tree.
pub fn outline(doc: &Document) -> Result<String, CodegenError> {
    let mut writer = OutlineWriter::default();
    walk_document(&mut writer, doc)?;
    Ok(writer.out)
}

#[derive(Default)]
struct OutlineWriter {
    out: String,
    depth: usize,
}

impl OutlineWriter {
    fn line(&mut self, text: &str) {
        self.out.push_str(&"  ".repeat(self.depth));
        self.out.push_str(text);
        self.out.push('\n');
    }
}

fn describe(element: &Element) -> String {
    match element {
        Element::Integer(_) => format!("Integer({element})"),
        Element::Double(_) => format!("Double({element})"),
        Element::String(_) => format!("String({element})"),
        Element::Variable(_) => format!("Variable({element})"),
        Element::Function(_) => format!("Function({element})"),
        Element::Operator(_) => format!("Operator({element})"),
    }
}

fn describe_all<'a>(elements: impl IntoIterator<Item = &'a Element>) -> String {
    elements
        .into_iter()
        .map(describe)
        .collect::<Vec<_>>()
        .join(" ")
}

impl Visitor for OutlineWriter {
    fn visit_document(&mut self, _doc: &Document) -> Result<(), CodegenError> {
        self.line("Document");
        self.depth = 1;
        Ok(())
    }

    fn visit_text(&mut self, node: &TextNode) -> Result<(), CodegenError> {
        self.line(&format!("Text {:?}", node.text));
        Ok(())
    }

    fn visit_echo(&mut self, node: &EchoNode) -> Result<(), CodegenError> {
        self.line(&format!("Echo {}", describe_all(&node.elements)));
        Ok(())
    }

    fn enter_for_loop(&mut self, node: &ForLoopNode) -> Result<(), CodegenError> {
        self.line(&format!(
            "For Variable({}) {}",
            node.variable,
            describe_all(node.bounds())
        ));
        self.depth += 1;
        Ok(())
    }

    fn leave_for_loop(&mut self, _node: &ForLoopNode) -> Result<(), CodegenError> {
        self.depth -= 1;
        Ok(())
    }
}
