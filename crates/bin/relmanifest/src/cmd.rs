//! Subcommands of the `relmanifest` binary

pub mod check;
pub mod resolve;
