use pretty_assertions::assert_eq;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use syntax_catalogue::catalogue::{self, Catalogue, Feature, Tag};
use syntax_catalogue::cli::{Language, ToolKind};
use syntax_catalogue::error::LoadError;
use syntax_catalogue::harness::{Harness, HarnessConfig, Outcome, DEFAULT_TIMEOUT};
use syntax_catalogue::report::summarize;
use syntax_catalogue::tools;
use tempfile::TempDir;

fn demo_catalogue() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("catalogues/python/string_quotes.py")
}

fn harness_for(catalogue: &Catalogue, kind: ToolKind) -> Harness {
    let tool = tools::build(kind, catalogue.language(), None, DEFAULT_TIMEOUT).unwrap();
    Harness::new(tool, HarnessConfig::default())
}

#[test]
fn test_builtin_categories_in_file_order() {
    let catalogue = Catalogue::builtin().unwrap();
    let ids: Vec<&str> = catalogue.list_categories().iter().map(|c| c.id()).collect();

    assert_eq!(
        ids,
        vec![
            "imports",
            "int-literals",
            "float-literals",
            "other-literals",
            "dict-literals",
            "string-literals",
            "boolean",
            "maths",
            "in-place-maths",
            "bitwise",
            "in-place-bitwise",
            "identity",
            "collections",
            "conditionals",
            "exceptions",
            "assertions",
            "loops",
            "functions",
            "lambdas",
            "classes-and-decorators",
            "generators",
            "context-managers",
            "asyncio",
        ]
    );
}

#[test]
fn test_builtin_snippet_counts() {
    let catalogue = Catalogue::builtin().unwrap();
    let count = |id: &str| catalogue.snippets_for(id).unwrap().len();

    assert_eq!(count("imports"), 3);
    assert_eq!(count("int-literals"), 5);
    assert_eq!(count("float-literals"), 1);
    assert_eq!(count("boolean"), 9);
    assert_eq!(count("loops"), 3);
    assert_eq!(count("asyncio"), 2);
}

#[test]
fn test_builtin_snippet_tags() {
    let catalogue = Catalogue::builtin().unwrap();

    let floats = &catalogue.snippets_for("float-literals").unwrap()[0];
    assert!(floats.has_tag(Tag::Multiline));
    assert_eq!(floats.line(), 14);

    let ctx = &catalogue.snippets_for("context-managers").unwrap()[0];
    let features: Vec<Feature> = ctx.features().collect();
    assert!(features.contains(&Feature::Decorator));
    assert!(features.contains(&Feature::Generator));
    assert!(features.contains(&Feature::Function));

    let bar = &catalogue.snippets_for("asyncio").unwrap()[1];
    assert!(bar.has_tag(Tag::Feature(Feature::Coroutine)));
    assert!(bar.has_tag(Tag::Feature(Feature::ScopeDeclaration)));
}

#[test]
fn test_builtin_round_trips_losslessly() {
    let catalogue = Catalogue::builtin().unwrap();
    let harness = harness_for(&catalogue, ToolKind::Lossless);
    let snippets: Vec<_> = catalogue.snippets().collect();

    let results = harness.run_all(&snippets);
    let failed: Vec<String> = results
        .iter()
        .filter(|r| !r.success)
        .map(|r| format!("{}: {:?}", r.id(), r.diff))
        .collect();
    assert_eq!(failed, Vec::<String>::new());
    assert_eq!(results.len(), catalogue.snippet_count());
}

#[test]
fn test_runs_are_deterministic() {
    let catalogue = Catalogue::builtin().unwrap();
    let snippets: Vec<_> = catalogue.snippets().collect();

    let first = summarize(&harness_for(&catalogue, ToolKind::NormalizeQuotes).run_all(&snippets));
    let second = summarize(&harness_for(&catalogue, ToolKind::NormalizeQuotes).run_all(&snippets));
    assert_eq!(first, second);
    assert_eq!(first.failed, 4);
}

#[test]
fn test_demo_catalogue_with_expected_outputs() {
    let catalogue = Catalogue::from_path(&demo_catalogue()).unwrap();
    assert_eq!(catalogue.name(), "string_quotes");

    let single = catalogue.category("single-quoted").unwrap();
    assert!(single.has_expected());
    assert_eq!(single.snippets()[0].text(), "s1 = 'abc'");
    assert_eq!(single.snippets()[0].expected(), Some("s1 = \"abc\""));

    let embedded = catalogue.category("embedded-quotes").unwrap();
    assert!(embedded.snippets().iter().all(|s| s.has_tag(Tag::EdgeCase)));
}

#[test]
fn test_demo_catalogue_normalizes_cleanly() {
    let catalogue = Catalogue::from_path(&demo_catalogue()).unwrap();
    let snippets: Vec<_> = catalogue.snippets().collect();

    let normalized = summarize(&harness_for(&catalogue, ToolKind::NormalizeQuotes).run_all(&snippets));
    assert!(normalized.all_passed());

    let lossless = summarize(&harness_for(&catalogue, ToolKind::Lossless).run_all(&snippets));
    assert_eq!(lossless.failed, 5);
    assert!(lossless
        .failures
        .iter()
        .all(|f| f.category == "single-quoted" && f.outcome == Outcome::Mismatch));
}

#[test]
fn test_snapshot_directory() {
    let temp_dir = TempDir::new().unwrap();
    let v1 = temp_dir.path().join("v1");
    let v2 = temp_dir.path().join("v2");
    fs::create_dir_all(&v1).unwrap();
    fs::create_dir_all(&v2).unwrap();
    fs::write(v1.join("basic.py"), "# ints\na = 1\n").unwrap();
    fs::write(v2.join("basic.py"), "# ints\na = 1\n\n# floats\nb = 1.0\n").unwrap();
    fs::write(v2.join("closures.rs"), "// closures\nlet add = |x, y| x + y;\n").unwrap();
    fs::write(temp_dir.path().join("NOTES.md"), "not a catalogue").unwrap();

    let catalogues = catalogue::load(temp_dir.path()).unwrap();
    let names: Vec<&str> = catalogues.iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["v1/basic", "v2/basic", "v2/closures"]);
    assert_eq!(catalogues[0].list_categories().len(), 1);
    assert_eq!(catalogues[1].list_categories().len(), 2);
    assert_eq!(catalogues[2].language(), Language::Rust);
}

#[test]
fn test_unknown_category_lookup() {
    let catalogue = Catalogue::builtin().unwrap();
    let err = catalogue.snippets_for("matmul").unwrap_err();
    assert_eq!(err.to_string(), "category not found: matmul");
}

#[test]
fn test_malformed_catalogue_is_load_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.py");
    fs::write(&path, "# ints\na = 1\n\n# calls\nprint(a\n").unwrap();

    let err = Catalogue::from_path(&path).unwrap_err();
    match err {
        LoadError::InFile { source, .. } => {
            assert!(matches!(*source, LoadError::Malformed { ref category, .. } if category == "calls"))
        }
        other => panic!("expected malformed catalogue, got {other:?}"),
    }
}

#[test]
fn test_mismatched_sidecar_is_load_error() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("quotes.py"), "# strings\na = 'x'\nb = 'y'\n").unwrap();
    fs::write(
        temp_dir.path().join("quotes.expected.py"),
        "# strings\na = \"x\"\n",
    )
    .unwrap();

    let err = catalogue::load(temp_dir.path()).unwrap_err();
    assert!(matches!(err, LoadError::ExpectedMismatch { .. }), "{err:?}");
}

#[test]
fn test_custom_tool_through_public_api() {
    struct Upper;

    impl syntax_catalogue::RoundTripTool for Upper {
        fn name(&self) -> &str {
            "upper"
        }

        fn round_trip(
            &self,
            source: &str,
        ) -> Result<String, syntax_catalogue::error::ParseError> {
            Ok(source.to_uppercase())
        }
    }

    let catalogue = Catalogue::builtin().unwrap();
    let harness = Harness::new(Arc::new(Upper), HarnessConfig::default());
    let snippets = catalogue.snippets_for("identity").unwrap();
    let results: Vec<_> = snippets.iter().map(|s| harness.run(s)).collect();

    assert!(results.iter().all(|r| r.outcome == Outcome::Mismatch));
    assert_eq!(results[1].observed.as_deref(), Some("PRINT(A IS NOT B)"));
}
