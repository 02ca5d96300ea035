//! The feature catalogue: ordered categories of syntax snippets.
//!
//! A catalogue is loaded once, either from the embedded definitions or from
//! a comment-sectioned source file, and is read-only afterwards.

mod feature;
mod loader;
mod section;

use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::cli::Language;
use crate::error::{LoadError, NotFoundError};

pub use feature::Feature;
pub use loader::{expected_path, is_expected_file, load, load_dir};
pub use section::slugify;

const BUILTIN_NAME: &str = "basic_syntax";
const BUILTIN_SOURCE: &str = include_str!("../../catalogues/python/basic_syntax.py");

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tag {
    Multiline,
    EdgeCase,
    Feature(Feature),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snippet {
    category: String,
    index: usize,
    line: usize,
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    expected: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tags: Vec<Tag>,
}

impl Snippet {
    pub fn category(&self) -> &str {
        &self.category
    }

    /// 0-based position within the category.
    pub fn index(&self) -> usize {
        self.index
    }

    /// 1-based line in the catalogue source.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Canonical output for normalization checks, if the catalogue has one.
    pub fn expected(&self) -> Option<&str> {
        self.expected.as_deref()
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn has_tag(&self, tag: Tag) -> bool {
        self.tags.contains(&tag)
    }

    pub fn features(&self) -> impl Iterator<Item = Feature> + '_ {
        self.tags.iter().filter_map(|tag| match tag {
            Tag::Feature(feature) => Some(*feature),
            _ => None,
        })
    }

    /// `<category>/<index>`, the identifier used in reports.
    pub fn id(&self) -> String {
        format!("{}/{}", self.category, self.index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureCategory {
    id: String,
    title: String,
    line: usize,
    snippets: Vec<Snippet>,
}

impl FeatureCategory {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// 1-based line of the section header.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn snippets(&self) -> &[Snippet] {
        &self.snippets
    }

    pub fn has_expected(&self) -> bool {
        self.snippets.iter().any(|s| s.expected.is_some())
    }
}

#[derive(Debug, Clone)]
pub struct Catalogue {
    name: String,
    language: Language,
    path: Option<PathBuf>,
    categories: Vec<FeatureCategory>,
    index: HashMap<String, usize>,
}

impl Catalogue {
    /// The embedded Python catalogue.
    pub fn builtin() -> Result<Self, LoadError> {
        Self::from_source(BUILTIN_NAME, Language::Python, BUILTIN_SOURCE)
    }

    pub fn from_source(
        name: impl Into<String>,
        language: Language,
        text: &str,
    ) -> Result<Self, LoadError> {
        let categories = loader::build_categories(language, text)?;
        Ok(Self::new(name.into(), language, None, categories))
    }

    /// Load one catalogue file, plus its `.expected` sidecar when present.
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        loader::load_file(path, name)
    }

    fn new(
        name: String,
        language: Language,
        path: Option<PathBuf>,
        categories: Vec<FeatureCategory>,
    ) -> Self {
        let index = categories
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), i))
            .collect();

        Self {
            name,
            language,
            path,
            categories,
            index,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn list_categories(&self) -> &[FeatureCategory] {
        &self.categories
    }

    pub fn category(&self, id: &str) -> Result<&FeatureCategory, NotFoundError> {
        self.index
            .get(id)
            .map(|&i| &self.categories[i])
            .ok_or_else(|| NotFoundError::new(id))
    }

    pub fn snippets_for(&self, id: &str) -> Result<&[Snippet], NotFoundError> {
        self.category(id).map(FeatureCategory::snippets)
    }

    /// Every snippet, in category order then snippet order.
    pub fn snippets(&self) -> impl Iterator<Item = &Snippet> {
        self.categories.iter().flat_map(|c| c.snippets.iter())
    }

    pub fn snippet_count(&self) -> usize {
        self.categories.iter().map(|c| c.snippets.len()).sum()
    }

    /// Snippets of the requested categories, in request order. Unknown ids
    /// are returned separately and do not affect the others. An empty
    /// request selects the whole catalogue.
    pub fn select(&self, ids: &[String]) -> (Vec<&Snippet>, Vec<NotFoundError>) {
        if ids.is_empty() {
            return (self.snippets().collect(), Vec::new());
        }

        let mut snippets = Vec::new();
        let mut missing = Vec::new();
        for id in ids {
            match self.snippets_for(id) {
                Ok(found) => snippets.extend(found.iter()),
                Err(err) => missing.push(err),
            }
        }
        (snippets, missing)
    }
}
