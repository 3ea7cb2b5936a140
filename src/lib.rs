pub mod action;
pub mod changelog;
pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod forge;
pub mod git;

pub use cli::Args;
pub use error::{ChangelogPrError, Result};
