#![forbid(unsafe_code)]

pub mod cli;
pub mod error;
pub mod render;
pub mod script;

pub use cli::run_from_env;
pub use error::{CliError, Result};
