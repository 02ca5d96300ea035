mod catalogue;
mod config;
mod harness;
mod parser;

pub use catalogue::{LoadError, NotFoundError};
pub use config::ConfigError;
pub use harness::TimeoutError;
pub use parser::ParseError;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Timeout(#[from] TimeoutError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;
