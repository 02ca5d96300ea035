use serde::Serialize;
use tree_sitter::Node;

/// What a snippet demonstrates, derived from the node kinds in its parse tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Feature {
    Import,
    Decorator,
    Generator,
    Coroutine,
    ContextManager,
    Lambda,
    ExceptionHandling,
    Loop,
    Conditional,
    Class,
    Function,
    FormattedString,
    InPlaceOperator,
    ScopeDeclaration,
    Assertion,
    Deletion,
}

impl Feature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Import => "import",
            Feature::Decorator => "decorator",
            Feature::Generator => "generator",
            Feature::Coroutine => "coroutine",
            Feature::ContextManager => "context-manager",
            Feature::Lambda => "lambda",
            Feature::ExceptionHandling => "exception-handling",
            Feature::Loop => "loop",
            Feature::Conditional => "conditional",
            Feature::Class => "class",
            Feature::Function => "function",
            Feature::FormattedString => "formatted-string",
            Feature::InPlaceOperator => "in-place-operator",
            Feature::ScopeDeclaration => "scope-declaration",
            Feature::Assertion => "assertion",
            Feature::Deletion => "deletion",
        }
    }

    /// Node kinds are shared across the bundled grammars where they overlap
    /// (`if_statement`, `for_statement`, ...), so one table serves them all.
    fn from_kind(kind: &str) -> Option<Self> {
        let feature = match kind {
            "import_statement"
            | "import_from_statement"
            | "future_import_statement"
            | "import_declaration"
            | "use_declaration" => Feature::Import,
            "decorator" => Feature::Decorator,
            "yield" | "yield_expression" => Feature::Generator,
            "async" | "await" | "await_expression" | "async_block" => Feature::Coroutine,
            "with_statement" => Feature::ContextManager,
            "lambda" | "arrow_function" | "closure_expression" | "func_literal" => Feature::Lambda,
            "try_statement" | "raise_statement" | "throw_statement" => {
                Feature::ExceptionHandling
            }
            "for_statement" | "for_in_statement" | "while_statement" | "for_expression"
            | "while_expression" | "loop_expression" => Feature::Loop,
            "if_statement" | "if_expression" | "conditional_expression" | "ternary_expression" => {
                Feature::Conditional
            }
            "class_definition" | "class_declaration" => Feature::Class,
            "function_definition" | "function_declaration" | "function_item"
            | "method_declaration" => Feature::Function,
            "interpolation" | "template_substitution" => Feature::FormattedString,
            "augmented_assignment" | "augmented_assignment_expression"
            | "compound_assignment_expr" => Feature::InPlaceOperator,
            "global_statement" | "nonlocal_statement" => Feature::ScopeDeclaration,
            "assert_statement" => Feature::Assertion,
            "delete_statement" => Feature::Deletion,
            _ => return None,
        };
        Some(feature)
    }
}

/// Collect the features demonstrated anywhere under `node`, sorted and deduplicated.
pub fn detect(node: Node<'_>) -> Vec<Feature> {
    let mut features = Vec::new();
    collect(node, &mut features);
    features.sort();
    features.dedup();
    features
}

fn collect(node: Node<'_>, features: &mut Vec<Feature>) {
    if let Some(feature) = Feature::from_kind(node.kind()) {
        features.push(feature);
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect(child, features);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Language;
    use crate::syntax;

    fn detect_python(source: &str) -> Vec<Feature> {
        let tree = syntax::parse(Language::Python, source).unwrap();
        detect(tree.root_node())
    }

    #[test]
    fn test_detect_decorated_generator() {
        let features = detect_python("@contextmanager\ndef my_ctx():\n    yield 1\n");
        assert_eq!(
            features,
            vec![Feature::Decorator, Feature::Generator, Feature::Function]
        );
    }

    #[test]
    fn test_detect_coroutine() {
        let features = detect_python("async def foo() -> int:\n    return await bar()\n");
        assert!(features.contains(&Feature::Coroutine));
        assert!(features.contains(&Feature::Function));
    }

    #[test]
    fn test_detect_in_place_and_scope() {
        assert_eq!(detect_python("i1 += a\n"), vec![Feature::InPlaceOperator]);
        assert_eq!(
            detect_python("def f():\n    global i\n    return i\n"),
            vec![Feature::Function, Feature::ScopeDeclaration]
        );
    }

    #[test]
    fn test_detect_plain_expression_has_no_features() {
        assert!(detect_python("print(a + b)\n").is_empty());
    }

    #[test]
    fn test_feature_as_str() {
        assert_eq!(Feature::ContextManager.as_str(), "context-manager");
        assert_eq!(Feature::InPlaceOperator.as_str(), "in-place-operator");
    }
}
