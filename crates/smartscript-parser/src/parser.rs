//! Document parser for SmartScript.
//!
//! Pulls tokens from a `Scanner` and builds a `Document` AST.
//! Open FOR loops live on an explicit stack of mutable frames; a frame is
//! frozen into an immutable `ForLoopNode` when its END tag is consumed and
//! appended to the frame below it.

use crate::ast::{Document, EchoNode, Element, ForLoopNode, Node, TextNode};
use crate::{ParseError, ParseErrorKind};
use smartscript_lexer::{Scanner, Span, TokenKind};

/// SmartScript document parser.
///
/// The document root is the implicit bottom of the construct stack, so
/// "only the document is open" is `open.is_empty()`.
pub struct Parser {
    scanner: Scanner,
    root: Vec<Node>,
    open: Vec<OpenLoop>,
}

/// A FOR loop whose END tag has not been seen yet.
struct OpenLoop {
    header: LoopHeader,
    span: Span,
    children: Vec<Node>,
}

impl OpenLoop {
    fn close(self) -> ForLoopNode {
        let LoopHeader {
            variable,
            start,
            end,
            step,
        } = self.header;
        ForLoopNode {
            variable,
            start,
            end,
            step,
            children: self.children,
        }
    }
}

/// A validated FOR header: variable, start, end and optional step.
struct LoopHeader {
    variable: String,
    start: Element,
    end: Element,
    step: Option<Element>,
}

impl LoopHeader {
    fn from_elements(elements: Vec<Element>) -> Result<Self, String> {
        let count = elements.len();
        let mut iter = elements.into_iter();

        let (Some(first), Some(start), Some(end)) = (iter.next(), iter.next(), iter.next()) else {
            return Err(format!("expected 3 or 4 elements, found {count}"));
        };
        let step = iter.next();
        if iter.next().is_some() {
            return Err(format!("expected 3 or 4 elements, found {count}"));
        }

        let variable = match first {
            Element::Variable(name) => name,
            other => return Err(format!("loop variable must be a variable name, found '{other}'")),
        };

        for bound in [&start, &end].into_iter().chain(step.as_ref()) {
            if !bound.is_loop_bound() {
                return Err(format!("'{bound}' cannot be a loop bound"));
            }
        }

        Ok(Self {
            variable,
            start,
            end,
            step,
        })
    }
}

impl Parser {
    /// Create a new parser over the given source.
    pub fn new(source: &str) -> Self {
        Self {
            scanner: Scanner::new(source),
            root: Vec::new(),
            open: Vec::new(),
        }
    }

    /// Parse source code into a document AST.
    pub fn parse(source: &str) -> Result<Document, ParseError> {
        Parser::new(source).parse_document()
    }

    /// Parse the full document, consuming the parser.
    pub fn parse_document(mut self) -> Result<Document, ParseError> {
        loop {
            let token = self.scanner.next_token()?;
            match token.kind {
                TokenKind::Text(text) => self.append(Node::Text(TextNode { text })),
                TokenKind::TagStart => self.parse_tag(token.span)?,
                TokenKind::Eof => return self.finish(),
                other => {
                    return Err(ParseError::at(
                        ParseErrorKind::UnexpectedToken(other.to_string()),
                        token.span,
                    ));
                }
            }
        }
    }

    fn finish(mut self) -> Result<Document, ParseError> {
        if let Some(unclosed) = self.open.pop() {
            return Err(ParseError::at(
                ParseErrorKind::UnclosedFor(unclosed.header.variable),
                unclosed.span,
            ));
        }
        Ok(Document {
            children: self.root,
        })
    }

    // =========================================================================
    // Tags
    // =========================================================================

    /// Parse a tag after its `{$`. `open` is the span of the `{$`.
    fn parse_tag(&mut self, open: Span) -> Result<(), ParseError> {
        let head = self.scanner.next_token()?;

        let name = match head.kind {
            TokenKind::TagName(name) => name,
            TokenKind::TagEnd => {
                return Err(ParseError::at(
                    ParseErrorKind::UnknownTag(String::new()),
                    head.span,
                ));
            }
            other => {
                return Err(ParseError::at(
                    ParseErrorKind::UnknownTag(other.to_string()),
                    head.span,
                ));
            }
        };

        if name == "=" {
            let elements = self.parse_elements()?;
            if elements.is_empty() {
                return Err(ParseError::at(ParseErrorKind::EmptyEchoTag, open));
            }
            self.append(Node::Echo(EchoNode { elements }));
        } else if name.eq_ignore_ascii_case("FOR") {
            let elements = self.parse_elements()?;
            let header = LoopHeader::from_elements(elements)
                .map_err(|msg| ParseError::at(ParseErrorKind::InvalidForHeader(msg), open))?;
            self.open.push(OpenLoop {
                header,
                span: open,
                children: Vec::new(),
            });
        } else if name.eq_ignore_ascii_case("END") {
            let elements = self.parse_elements()?;
            if let Some(extra) = elements.first() {
                return Err(ParseError::at(
                    ParseErrorKind::UnexpectedToken(format!("'{extra}' after END")),
                    open,
                ));
            }
            let Some(closed) = self.open.pop() else {
                return Err(ParseError::at(ParseErrorKind::UnexpectedEnd, open));
            };
            self.append(Node::ForLoop(closed.close()));
        } else {
            return Err(ParseError::at(ParseErrorKind::UnknownTag(name), head.span));
        }

        Ok(())
    }

    /// Collect elements up to and including the closing `$}`.
    fn parse_elements(&mut self) -> Result<Vec<Element>, ParseError> {
        let mut elements = Vec::new();

        loop {
            let token = self.scanner.next_token()?;
            let element = match token.kind {
                TokenKind::TagEnd => return Ok(elements),
                TokenKind::Integer(value) => Element::Integer(value),
                TokenKind::Double(value) => Element::Double(value),
                TokenKind::String(value) => Element::String(value),
                TokenKind::Variable(name) => Element::Variable(name),
                TokenKind::Function(name) => Element::Function(name),
                TokenKind::Operator(op) => Element::Operator(op),
                other => {
                    return Err(ParseError::at(
                        ParseErrorKind::UnexpectedToken(other.to_string()),
                        token.span,
                    ));
                }
            };
            elements.push(element);
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Append a finished node to the innermost open container.
    fn append(&mut self, node: Node) {
        match self.open.last_mut() {
            Some(open) => open.children.push(node),
            None => self.root.push(node),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Operator;
    use pretty_assertions::assert_eq;
    use smartscript_lexer::LexErrorKind;

    fn parse(source: &str) -> Document {
        Parser::parse(source).unwrap()
    }

    fn parse_err(source: &str) -> ParseErrorKind {
        Parser::parse(source).unwrap_err().kind
    }

    fn first_for(doc: &Document) -> &ForLoopNode {
        match &doc.children[0] {
            Node::ForLoop(node) => node,
            other => panic!("Expected ForLoop, got {other:?}"),
        }
    }

    fn text(s: &str) -> Node {
        Node::Text(TextNode { text: s.into() })
    }

    fn echo(elements: Vec<Element>) -> Node {
        Node::Echo(EchoNode { elements })
    }

    fn var(name: &str) -> Element {
        Element::Variable(name.into())
    }

    // =========================================================================
    // Empty / text only
    // =========================================================================

    #[test]
    fn test_empty_document() {
        let doc = parse("");
        assert!(doc.children.is_empty());
    }

    #[test]
    fn test_plain_text_only() {
        let doc = parse("plain text only");
        assert_eq!(doc.children, vec![text("plain text only")]);
    }

    #[test]
    fn test_escaped_text() {
        let doc = parse("Example \\{$=1$}. Now actually write one {$=1$}");
        assert_eq!(
            doc.children,
            vec![
                text("Example {$=1$}. Now actually write one "),
                echo(vec![Element::Integer(1)]),
            ]
        );
    }

    // =========================================================================
    // Echo tags
    // =========================================================================

    #[test]
    fn test_echo_all_element_kinds() {
        let doc = parse("{$= i 1 2.5 \"s\" @sin * $}");
        assert_eq!(
            doc.children,
            vec![echo(vec![
                var("i"),
                Element::Integer(1),
                Element::Double(2.5),
                Element::String("s".into()),
                Element::Function("sin".into()),
                Element::Operator(Operator::Mul),
            ])]
        );
    }

    #[test]
    fn test_empty_echo() {
        assert_eq!(parse_err("{$=$}"), ParseErrorKind::EmptyEchoTag);
        assert_eq!(parse_err("a {$=   $}"), ParseErrorKind::EmptyEchoTag);
    }

    #[test]
    fn test_text_between_tags() {
        let doc = parse("a{$=x$}b{$=y$}c");
        assert_eq!(
            doc.children,
            vec![
                text("a"),
                echo(vec![var("x")]),
                text("b"),
                echo(vec![var("y")]),
                text("c"),
            ]
        );
    }

    // =========================================================================
    // FOR loops
    // =========================================================================

    #[test]
    fn test_for_with_step() {
        let doc = parse("{$FOR i 1 10 1$}{$=i$}{$END$}");
        assert_eq!(
            doc.children,
            vec![Node::ForLoop(ForLoopNode {
                variable: "i".into(),
                start: Element::Integer(1),
                end: Element::Integer(10),
                step: Some(Element::Integer(1)),
                children: vec![echo(vec![var("i")])],
            })]
        );
    }

    #[test]
    fn test_for_without_step() {
        let doc = parse("{$FOR i 0 10$}{$END$}");
        let node = first_for(&doc);
        assert_eq!(node.step, None);
        assert!(node.children.is_empty());
    }

    #[test]
    fn test_for_mixed_bounds() {
        let doc = parse("{$ FOR sco_re \"-1\"10 \"1\" $}{$END$}");
        let node = first_for(&doc);
        assert_eq!(node.variable, "sco_re");
        assert_eq!(node.start, Element::String("-1".into()));
        assert_eq!(node.end, Element::Integer(10));
        assert_eq!(node.step, Some(Element::String("1".into())));
    }

    #[test]
    fn test_for_variable_and_double_bounds() {
        let doc = parse("{$FOR year n 2.5 -1$}{$END$}");
        let node = first_for(&doc);
        assert_eq!(node.start, var("n"));
        assert_eq!(node.end, Element::Double(2.5));
        assert_eq!(node.step, Some(Element::Integer(-1)));
    }

    #[test]
    fn test_keywords_case_insensitive() {
        let doc = parse("{$for i 1 2$}x{$eNd$}");
        assert_eq!(first_for(&doc).children, vec![text("x")]);
    }

    #[test]
    fn test_nested_for() {
        let doc = parse("{$FOR i 1 3$}a{$FOR j 1 2$}b{$=i j$}{$END$}c{$END$}d");
        assert_eq!(doc.children.len(), 2);
        assert_eq!(doc.children[1], text("d"));

        let outer = first_for(&doc);
        assert_eq!(outer.variable, "i");
        assert_eq!(outer.children.len(), 3);
        assert_eq!(outer.children[0], text("a"));
        assert_eq!(outer.children[2], text("c"));

        let inner = match &outer.children[1] {
            Node::ForLoop(node) => node,
            other => panic!("Expected ForLoop, got {other:?}"),
        };
        assert_eq!(inner.variable, "j");
        assert_eq!(
            inner.children,
            vec![text("b"), echo(vec![var("i"), var("j")])]
        );
    }

    fn nested_loops(depth: usize) -> String {
        format!("{}{}", "{$FOR i 0 1$}".repeat(depth), "{$END$}".repeat(depth))
    }

    #[test]
    fn test_deep_nesting() {
        let depth = 100_000;
        let doc = parse(&nested_loops(depth));

        let mut level = 0;
        let mut children = &doc.children;
        while let Some(Node::ForLoop(node)) = children.first() {
            level += 1;
            children = &node.children;
        }
        assert_eq!(level, depth);

        drop(doc);
    }

    #[test]
    fn test_deep_trees_compare() {
        let depth = 100_000;
        let first = parse(&nested_loops(depth));
        let second = parse(&nested_loops(depth));
        assert!(first == second);

        let differs = parse(&format!("{}x{}", "{$FOR i 0 1$}".repeat(depth), "{$END$}".repeat(depth)));
        assert!(first != differs);
    }

    #[test]
    fn test_deep_nesting_then_extra_end() {
        let source = format!("{}{{$END$}}", nested_loops(100_000));
        assert_eq!(parse_err(&source), ParseErrorKind::UnexpectedEnd);
    }

    #[test]
    fn test_deep_nesting_then_error_inside() {
        let depth = 100_000;
        let source = format!("{}{{$IF$}}", "{$FOR i 0 1$}".repeat(depth));
        assert_eq!(parse_err(&source), ParseErrorKind::UnknownTag("IF".into()));
    }

    // =========================================================================
    // FOR header validation
    // =========================================================================

    fn assert_invalid_header(source: &str) {
        match parse_err(source) {
            ParseErrorKind::InvalidForHeader(_) => {}
            other => panic!("Expected InvalidForHeader for {source:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_for_too_few_elements() {
        assert_invalid_header("{$FOR i 1$}{$END$}");
        assert_invalid_header("{$FOR$}{$END$}");
    }

    #[test]
    fn test_for_too_many_elements() {
        assert_invalid_header("{$FOR i 1 2 3 4$}{$END$}");
    }

    #[test]
    fn test_for_variable_must_be_variable() {
        assert_invalid_header("{$FOR 3 1 10 1$}{$END$}");
        assert_invalid_header("{$FOR \"i\" 1 10$}{$END$}");
        assert_invalid_header("{$FOR @f 1 10$}{$END$}");
    }

    #[test]
    fn test_for_bounds_reject_functions_and_operators() {
        assert_invalid_header("{$FOR i @sin 10$}{$END$}");
        assert_invalid_header("{$FOR i 1 * 1$}{$END$}");
        assert_invalid_header("{$FOR i 1 10 +$}{$END$}");
    }

    #[test]
    fn test_invalid_header_message() {
        assert_eq!(
            parse_err("{$FOR i 1$}{$END$}"),
            ParseErrorKind::InvalidForHeader("expected 3 or 4 elements, found 2".into())
        );
    }

    // =========================================================================
    // Nesting errors
    // =========================================================================

    #[test]
    fn test_end_alone() {
        assert_eq!(parse_err("{$END$}"), ParseErrorKind::UnexpectedEnd);
    }

    #[test]
    fn test_extra_end() {
        assert_eq!(
            parse_err("{$FOR i 1 2$}{$END$}{$END$}"),
            ParseErrorKind::UnexpectedEnd
        );
    }

    #[test]
    fn test_end_with_elements() {
        assert_eq!(
            parse_err("{$FOR i 1 2$}{$END i$}"),
            ParseErrorKind::UnexpectedToken("'i' after END".into())
        );
    }

    #[test]
    fn test_unclosed_for() {
        assert_eq!(
            parse_err("{$FOR i 1 2$}body"),
            ParseErrorKind::UnclosedFor("i".into())
        );
    }

    #[test]
    fn test_unclosed_inner_for() {
        assert_eq!(
            parse_err("{$FOR i 1 2$}{$FOR j 1 2$}{$END$}"),
            ParseErrorKind::UnclosedFor("i".into())
        );
        assert_eq!(
            parse_err("{$FOR i 1 2$}{$FOR j 1 2$}"),
            ParseErrorKind::UnclosedFor("j".into())
        );
    }

    // =========================================================================
    // Unknown tags
    // =========================================================================

    #[test]
    fn test_unknown_tag_name() {
        assert_eq!(parse_err("{$IF x$}"), ParseErrorKind::UnknownTag("IF".into()));
    }

    #[test]
    fn test_empty_tag() {
        assert_eq!(parse_err("{$ $}"), ParseErrorKind::UnknownTag(String::new()));
    }

    #[test]
    fn test_tag_starting_with_literal() {
        assert_eq!(
            parse_err("{$ 5 $}"),
            ParseErrorKind::UnknownTag("INTEGER 5".into())
        );
    }

    #[test]
    fn test_keyword_prefix_is_not_keyword() {
        assert_eq!(
            parse_err("{$FORi 1 2 3$}"),
            ParseErrorKind::UnknownTag("FORi".into())
        );
    }

    // =========================================================================
    // Lexer errors and positions
    // =========================================================================

    #[test]
    fn test_lexer_error_propagates() {
        let err = Parser::parse("ok\n{$= \"open").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Lexer(LexErrorKind::UnterminatedString));
        assert_eq!((err.line, err.column), (2, 5));
    }

    #[test]
    fn test_unterminated_tag() {
        assert_eq!(
            parse_err("{$FOR i 1 2"),
            ParseErrorKind::Lexer(LexErrorKind::UnterminatedTag)
        );
    }

    #[test]
    fn test_error_position_and_message() {
        let err = Parser::parse("line one\n  {$END$}").unwrap_err();
        assert_eq!((err.line, err.column), (2, 3));
        assert_eq!(
            err.to_string(),
            "Parse error at line 2, column 3: END tag without an open FOR"
        );
    }

    #[test]
    fn test_lexer_message_passes_through() {
        let err = Parser::parse("{$= 99999999999999999999 $}").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Parse error at line 1, column 5: invalid number '99999999999999999999'"
        );
    }
}
