use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};
use walkdir::WalkDir;

use super::section::{split_sections, Section};
use super::{feature, Catalogue, FeatureCategory, Snippet, Tag};
use crate::cli::{detect_language, Language};
use crate::error::{LoadError, ParseError};
use crate::syntax;

const EXPECTED_MARKER: &str = ".expected";

/// Load a catalogue file or every catalogue under a directory.
pub fn load(path: &Path) -> Result<Vec<Catalogue>, LoadError> {
    if path.is_dir() {
        load_dir(path)
    } else {
        Catalogue::from_path(path).map(|catalogue| vec![catalogue])
    }
}

/// Load each catalogue file under `root` as its own snapshot, sorted by path.
///
/// Snapshots are named by their path relative to `root` without extension,
/// so `v1/basic_syntax.py` and `v2/basic_syntax.py` stay distinct.
pub fn load_dir(root: &Path) -> Result<Vec<Catalogue>, LoadError> {
    let mut catalogues = Vec::new();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));

    for entry in walker {
        let entry = entry.map_err(|e| LoadError::DirectoryScanError {
            path: root.to_path_buf(),
            source: e,
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if detect_language(path).is_none() {
            trace!(path = %path.display(), "skipping non-catalogue file");
            continue;
        }
        if is_expected_file(path) {
            continue;
        }

        let name = snapshot_name(root, path);
        catalogues.push(load_file(path, name)?);
    }

    warn_orphan_sidecars(root, &catalogues);

    if catalogues.is_empty() {
        return Err(LoadError::NoCatalogues {
            path: root.to_path_buf(),
        });
    }

    debug!(count = catalogues.len(), root = %root.display(), "loaded catalogue snapshots");
    Ok(catalogues)
}

pub(super) fn load_file(path: &Path, name: String) -> Result<Catalogue, LoadError> {
    let language = detect_language(path).ok_or_else(|| LoadError::unknown_language(path))?;
    trace!(path = %path.display(), language = language.as_str(), "loading catalogue");

    let text = fs::read_to_string(path).map_err(|e| LoadError::read_error(path, e))?;
    let mut categories = build_categories(language, &text).map_err(|e| e.in_file(path))?;

    if let Some(sidecar) = expected_path(path).filter(|p| p.is_file()) {
        let expected_text =
            fs::read_to_string(&sidecar).map_err(|e| LoadError::read_error(&sidecar, e))?;
        let expected =
            build_categories(language, &expected_text).map_err(|e| e.in_file(&sidecar))?;
        attach_expected(&mut categories, expected, &sidecar)?;
        debug!(path = %sidecar.display(), "attached expected outputs");
    }

    Ok(Catalogue::new(
        name,
        language,
        Some(path.to_path_buf()),
        categories,
    ))
}

/// `dir/name.py` -> `dir/name.expected.py`
pub fn expected_path(path: &Path) -> Option<PathBuf> {
    let stem = path.file_stem()?.to_str()?;
    let ext = path.extension()?.to_str()?;
    Some(path.with_file_name(format!("{stem}{EXPECTED_MARKER}.{ext}")))
}

pub fn is_expected_file(path: &Path) -> bool {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .is_some_and(|stem| stem.ends_with(EXPECTED_MARKER))
}

pub(super) fn build_categories(
    language: Language,
    text: &str,
) -> Result<Vec<FeatureCategory>, LoadError> {
    let sections = split_sections(text, language.comment_prefix())?;
    let mut seen = HashSet::new();
    let mut categories = Vec::with_capacity(sections.len());

    for section in sections {
        if !seen.insert(section.id.clone()) {
            return Err(LoadError::duplicate_category(
                section.header_line,
                &section.id,
            ));
        }
        categories.push(build_category(language, section)?);
    }

    Ok(categories)
}

fn build_category(language: Language, section: Section) -> Result<FeatureCategory, LoadError> {
    let tree = syntax::parse_strict(language, &section.body).map_err(|err| match err {
        ParseError::SyntaxError {
            line,
            column,
            message,
        } => LoadError::malformed(&section.id, section.body_line() + line - 1, column, message),
        ParseError::LanguageSetupFailed { language } => LoadError::LanguageSetupFailed { language },
        other => LoadError::malformed(&section.id, section.header_line, 1, other.to_string()),
    })?;

    let root = tree.root_node();
    let mut cursor = root.walk();
    let mut snippets = Vec::new();

    for node in root.named_children(&mut cursor) {
        if node.is_extra() {
            continue;
        }

        let text = section.body.get(node.byte_range()).unwrap_or_default();
        let mut tags = Vec::new();
        if text.contains('\n') {
            tags.push(Tag::Multiline);
        }
        if section.edge_case {
            tags.push(Tag::EdgeCase);
        }
        tags.extend(feature::detect(node).into_iter().map(Tag::Feature));

        snippets.push(Snippet {
            category: section.id.clone(),
            index: snippets.len(),
            line: section.body_line() + node.start_position().row,
            text: text.to_string(),
            expected: None,
            tags,
        });
    }

    if snippets.is_empty() {
        return Err(LoadError::empty_category(&section.id));
    }

    trace!(category = %section.id, snippets = snippets.len(), "built category");
    Ok(FeatureCategory {
        id: section.id,
        title: section.title,
        line: section.header_line,
        snippets,
    })
}

fn attach_expected(
    categories: &mut [FeatureCategory],
    expected: Vec<FeatureCategory>,
    sidecar: &Path,
) -> Result<(), LoadError> {
    if categories.len() != expected.len() {
        return Err(LoadError::expected_mismatch(
            sidecar,
            format!(
                "{} categories, expected file has {}",
                categories.len(),
                expected.len()
            ),
        ));
    }

    for (category, expected) in categories.iter_mut().zip(expected) {
        if category.id != expected.id {
            return Err(LoadError::expected_mismatch(
                sidecar,
                format!(
                    "category '{}' is '{}' in the expected file",
                    category.id, expected.id
                ),
            ));
        }
        if category.snippets.len() != expected.snippets.len() {
            return Err(LoadError::expected_mismatch(
                sidecar,
                format!(
                    "category '{}' has {} snippets, expected file has {}",
                    category.id,
                    category.snippets.len(),
                    expected.snippets.len()
                ),
            ));
        }

        for (snippet, canonical) in category.snippets.iter_mut().zip(expected.snippets) {
            snippet.expected = Some(canonical.text);
        }
    }

    Ok(())
}

fn snapshot_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let without_ext = relative.with_extension("");
    without_ext
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn warn_orphan_sidecars(root: &Path, catalogues: &[Catalogue]) {
    let attached: HashSet<PathBuf> = catalogues
        .iter()
        .filter_map(|c| c.path())
        .filter_map(expected_path)
        .collect();

    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if entry.file_type().is_file() && is_expected_file(path) && !attached.contains(path) {
            warn!(path = %path.display(), "expected file has no matching catalogue");
        }
    }
}
