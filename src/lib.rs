/// Syntax Catalogue
///
/// A catalogue of language constructs, each a small source snippet, and a
/// harness that round-trips every snippet through a parser/printer to check
/// that nothing is lost or mangled. Catalogues are parsed with Tree-sitter.
pub mod catalogue;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod harness;
pub mod logging;
pub mod report;
pub mod syntax;
pub mod tools;

pub use catalogue::{Catalogue, FeatureCategory, Snippet, Tag};
pub use error::{Error, Result};
pub use harness::{Harness, HarnessConfig, Outcome, RoundTripResult, RoundTripTool};
pub use report::{summarize, Summary};
