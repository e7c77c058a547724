//! # CLI Command Implementations
//!
//! One module per subcommand. Each has an `Args` struct derived with `clap`
//! and an `execute` function that calls into the `kubegraph` library.

pub mod build;
pub mod completions;
pub mod query;
pub mod validate;
