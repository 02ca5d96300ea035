//! Splitting catalogue text into comment-delimited sections.
//!
//! A header is a line comment at column 0 that opens the file or follows a
//! blank line, e.g. `# float literals` or `// closures [edge-case]`. Every
//! line up to the next header belongs to that header's section body.

use crate::error::LoadError;

const EDGE_CASE: &str = "edge-case";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Section {
    pub id: String,
    pub title: String,
    pub edge_case: bool,
    /// 1-based line of the header.
    pub header_line: usize,
    pub body: String,
}

impl Section {
    /// 1-based line of the first body line.
    pub fn body_line(&self) -> usize {
        self.header_line + 1
    }
}

pub(crate) fn split_sections(text: &str, comment_prefix: &str) -> Result<Vec<Section>, LoadError> {
    let mut sections: Vec<Section> = Vec::new();
    let mut previous_blank = true;

    for (i, line) in text.split_inclusive('\n').enumerate() {
        let line_no = i + 1;
        let content = line.trim_end();
        let is_blank = content.is_empty();

        let header = content
            .strip_prefix(comment_prefix)
            .filter(|rest| !is_directive(rest))
            .filter(|_| previous_blank || sections.is_empty());

        if let Some(rest) = header {
            sections.push(parse_header(rest, line_no)?);
        } else if let Some(current) = sections.last_mut() {
            current.body.push_str(line);
        } else if !is_blank && !content.starts_with(comment_prefix) {
            return Err(LoadError::OrphanContent { line: line_no });
        }

        previous_blank = is_blank;
    }

    Ok(sections)
}

/// Shebangs, doc comments and `#!`/`//!` attributes never open a section.
fn is_directive(rest: &str) -> bool {
    rest.starts_with('!') || rest.starts_with('/')
}

fn parse_header(rest: &str, line: usize) -> Result<Section, LoadError> {
    let rest = rest.trim();
    let (title, annotations) = split_annotations(rest);

    let mut edge_case = false;
    for annotation in annotations.split(',').map(str::trim).filter(|a| !a.is_empty()) {
        if annotation == EDGE_CASE {
            edge_case = true;
        } else {
            return Err(LoadError::UnknownAnnotation {
                line,
                annotation: annotation.to_string(),
            });
        }
    }

    let title = title.trim();
    let id = slugify(title);
    if id.is_empty() {
        return Err(LoadError::EmptyHeader { line });
    }

    Ok(Section {
        id,
        title: title.to_string(),
        edge_case,
        header_line: line,
        body: String::new(),
    })
}

/// A trailing `[a, b]` group is an annotation list only when set off by
/// whitespace and made of slug-like words; `c[a]` stays part of the title.
fn split_annotations(header: &str) -> (&str, &str) {
    let Some(inner) = header.strip_suffix(']') else {
        return (header, "");
    };
    let Some(open) = inner.rfind('[') else {
        return (header, "");
    };

    let title = &inner[..open];
    let list = &inner[open + 1..];
    let set_off = title.is_empty() || title.ends_with(char::is_whitespace);
    let slug_like = list.split(',').map(str::trim).all(|entry| {
        !entry.is_empty()
            && entry
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    });

    if set_off && slug_like {
        (title, list)
    } else {
        (header, "")
    }
}

/// Lower-case, collapse runs of non-alphanumerics into `-`, trim the ends.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for ch in title.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}
