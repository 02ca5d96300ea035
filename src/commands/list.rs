use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Write;

use super::load_catalogues;
use crate::catalogue::{Catalogue, Feature, Tag};
use crate::cli::{Language, ListArgs, OutputFormat};

#[derive(Debug, Serialize)]
pub struct CatalogueListing {
    pub snapshot: String,
    pub language: Language,
    pub snippets: usize,
    pub categories: Vec<CategoryListing>,
}

#[derive(Debug, Serialize)]
pub struct CategoryListing {
    pub id: String,
    pub title: String,
    pub line: usize,
    pub snippets: usize,
    pub edge_case: bool,
    pub has_expected: bool,
    pub features: Vec<Feature>,
}

pub fn execute_list(args: &ListArgs) -> Result<()> {
    args.source.validate().context("Invalid arguments")?;
    let catalogues = load_catalogues(&args.source).context("Failed to load catalogue")?;
    let listings: Vec<CatalogueListing> = catalogues.iter().map(listing).collect();

    let rendered = match args.format {
        OutputFormat::Text => render_text(&listings),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&listings)?;
            json.push('\n');
            json
        }
    };
    print!("{rendered}");
    Ok(())
}

pub fn listing(catalogue: &Catalogue) -> CatalogueListing {
    let categories = catalogue
        .list_categories()
        .iter()
        .map(|category| {
            let mut features: Vec<Feature> = category
                .snippets()
                .iter()
                .flat_map(|s| s.features())
                .collect();
            features.sort();
            features.dedup();

            CategoryListing {
                id: category.id().to_string(),
                title: category.title().to_string(),
                line: category.line(),
                snippets: category.snippets().len(),
                edge_case: category
                    .snippets()
                    .iter()
                    .any(|s| s.has_tag(Tag::EdgeCase)),
                has_expected: category.has_expected(),
                features,
            }
        })
        .collect();

    CatalogueListing {
        snapshot: catalogue.name().to_string(),
        language: catalogue.language(),
        snippets: catalogue.snippet_count(),
        categories,
    }
}

pub fn render_text(listings: &[CatalogueListing]) -> String {
    let mut out = String::new();

    for listing in listings {
        let _ = writeln!(
            out,
            "{} ({}, {} snippets)",
            listing.snapshot,
            listing.language.as_str(),
            listing.snippets
        );

        let width = listing
            .categories
            .iter()
            .map(|c| c.id.len())
            .max()
            .unwrap_or(0);
        for category in &listing.categories {
            let mut markers = Vec::new();
            if category.edge_case {
                markers.push("edge-case");
            }
            if category.has_expected {
                markers.push("expected");
            }
            let markers = if markers.is_empty() {
                String::new()
            } else {
                format!("  [{}]", markers.join(", "))
            };
            let features: Vec<&str> = category.features.iter().map(Feature::as_str).collect();
            let features = if features.is_empty() {
                String::new()
            } else {
                format!("  {}", features.join(", "))
            };
            let _ = writeln!(
                out,
                "  {:<width$}  {:>3}{}{}",
                category.id,
                category.snippets,
                markers,
                features,
                width = width
            );
        }
    }

    out
}
