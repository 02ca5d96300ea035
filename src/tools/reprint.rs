use tree_sitter::Node;

use crate::cli::Language;
use crate::error::ParseError;
use crate::harness::RoundTripTool;
use crate::syntax;

/// Parses the snippet and re-emits every leaf token, copying the text between
/// tokens verbatim. A correct grammar reproduces its input byte for byte.
pub struct LosslessPrinter {
    language: Language,
}

impl LosslessPrinter {
    pub fn new(language: Language) -> Self {
        Self { language }
    }
}

impl RoundTripTool for LosslessPrinter {
    fn name(&self) -> &str {
        "lossless"
    }

    fn round_trip(&self, source: &str) -> Result<String, ParseError> {
        reprint(self.language, source, |_, _| None)
    }
}

/// Reprints like [`LosslessPrinter`], but rewrites single-quoted Python
/// string delimiters to double quotes when the literal holds no `"`.
pub struct QuoteNormalizer {
    language: Language,
}

impl QuoteNormalizer {
    pub fn new(language: Language) -> Self {
        Self { language }
    }
}

impl RoundTripTool for QuoteNormalizer {
    fn name(&self) -> &str {
        "normalize-quotes"
    }

    fn round_trip(&self, source: &str) -> Result<String, ParseError> {
        if self.language != Language::Python {
            return reprint(self.language, source, |_, _| None);
        }
        reprint(self.language, source, |leaf, text| {
            normalize_python_delimiter(leaf, text, source)
        })
    }
}

fn normalize_python_delimiter(leaf: Node<'_>, text: &str, source: &str) -> Option<String> {
    if !matches!(leaf.kind(), "string_start" | "string_end") || !text.contains('\'') {
        return None;
    }

    let literal = leaf.parent()?;
    let literal_text = source.get(literal.byte_range())?;
    if literal_text.contains('"') {
        return None;
    }
    Some(text.replace('\'', "\""))
}

fn reprint(
    language: Language,
    source: &str,
    mut rewrite: impl FnMut(Node<'_>, &str) -> Option<String>,
) -> Result<String, ParseError> {
    let tree = syntax::parse_strict(language, source)?;
    let mut out = String::with_capacity(source.len());
    let mut pos = 0;

    syntax::for_each_leaf(&tree, |leaf| {
        let range = leaf.byte_range();
        if range.start > pos {
            out.push_str(source.get(pos..range.start).unwrap_or_default());
        }
        let text = source.get(range.clone()).unwrap_or_default();
        match rewrite(leaf, text) {
            Some(replacement) => out.push_str(&replacement),
            None => out.push_str(text),
        }
        pos = pos.max(range.end);
    });

    out.push_str(source.get(pos..).unwrap_or_default());
    Ok(out)
}
