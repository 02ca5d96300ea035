use serde::Serialize;
use std::fmt;

/// First point where observed output departs from the expected text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnippetDiff {
    pub expected_len: usize,
    pub observed_len: usize,
    /// 1-based line of the first difference.
    pub first_diff_line: usize,
    pub expected_excerpt: Option<String>,
    pub observed_excerpt: Option<String>,
}

impl SnippetDiff {
    /// `None` when the texts are identical.
    pub fn new(expected: &str, observed: &str) -> Option<Self> {
        if expected == observed {
            return None;
        }

        // Keep terminators so a lost trailing newline still shows up as a line.
        let expected_lines: Vec<&str> = expected.split_inclusive('\n').collect();
        let observed_lines: Vec<&str> = observed.split_inclusive('\n').collect();

        let index = expected_lines
            .iter()
            .zip(observed_lines.iter())
            .position(|(e, o)| e != o)
            .unwrap_or_else(|| expected_lines.len().min(observed_lines.len()));

        Some(Self {
            expected_len: expected.len(),
            observed_len: observed.len(),
            first_diff_line: index + 1,
            expected_excerpt: expected_lines.get(index).map(|s| s.to_string()),
            observed_excerpt: observed_lines.get(index).map(|s| s.to_string()),
        })
    }
}

impl fmt::Display for SnippetDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "line {}:", self.first_diff_line)?;
        match &self.expected_excerpt {
            Some(line) => writeln!(f, "-{line:?}")?,
            None => writeln!(f, "-<end of input>")?,
        }
        match &self.observed_excerpt {
            Some(line) => write!(f, "+{line:?}"),
            None => write!(f, "+<end of input>"),
        }
    }
}
