//! Helpers shared by the workspace crates.

pub mod env;
