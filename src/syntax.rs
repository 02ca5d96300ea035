//! Tree-sitter plumbing shared by the catalogue loader and the bundled tools.

use tracing::trace;
use tree_sitter::{Node, Parser, Tree};

use crate::cli::Language;
use crate::error::ParseError;

pub fn parse(language: Language, source: &str) -> Result<Tree, ParseError> {
    let mut parser = Parser::new();
    parser
        .set_language(&language.tree_sitter_language())
        .map_err(|_| ParseError::language_setup_failed(language.as_str()))?;

    trace!(language = language.as_str(), bytes = source.len(), "parsing");
    parser
        .parse(source, None)
        .ok_or_else(|| ParseError::parse_failed(language.as_str()))
}

/// Parse and reject any tree containing error or missing nodes.
pub fn parse_strict(language: Language, source: &str) -> Result<Tree, ParseError> {
    let tree = parse(language, source)?;
    if let Some(node) = first_error(tree.root_node()) {
        return Err(syntax_error_at(node, source));
    }
    Ok(tree)
}

/// Depth-first search for the first error or missing node.
pub fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = first_error(child) {
            return Some(found);
        }
    }
    Some(node)
}

fn syntax_error_at(node: Node<'_>, source: &str) -> ParseError {
    let position = node.start_position();
    let message = if node.is_missing() {
        format!("missing {}", node.kind())
    } else {
        let text = node.utf8_text(source.as_bytes()).unwrap_or("");
        let first_line = text.lines().next().unwrap_or("");
        format!("unexpected `{first_line}`")
    };
    ParseError::syntax_error(position.row + 1, position.column + 1, message)
}

/// Visit every leaf of the tree in source order.
pub fn for_each_leaf<'t>(tree: &'t Tree, mut visit: impl FnMut(Node<'t>)) {
    let mut cursor = tree.walk();
    loop {
        let node = cursor.node();
        if node.child_count() > 0 && cursor.goto_first_child() {
            continue;
        }
        visit(node);

        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_python() {
        let tree = parse(Language::Python, "a = 1\n").unwrap();
        assert_eq!(tree.root_node().kind(), "module");
        assert!(!tree.root_node().has_error());
    }

    #[test]
    fn test_parse_strict_reports_position() {
        let err = parse_strict(Language::Python, "a = 1\nb = (\n").unwrap_err();
        match err {
            ParseError::SyntaxError { line, column, .. } => assert!(line >= 1 && column >= 1),
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_strict_accepts_rust_statements() {
        assert!(parse_strict(Language::Rust, "let a = 1;\nlet b = a + 2;\n").is_ok());
    }

    #[test]
    fn test_for_each_leaf_covers_tokens_in_order() {
        let source = "x = f(1)\n";
        let tree = parse(Language::Python, source).unwrap();
        let mut tokens = Vec::new();
        for_each_leaf(&tree, |leaf| {
            tokens.push(leaf.utf8_text(source.as_bytes()).unwrap().to_string());
        });
        assert_eq!(tokens, vec!["x", "=", "f", "(", "1", ")"]);
    }
}
