//! Library side of the `relmanifest` binary, split out so commands can be tested.

pub mod args;
pub mod cmd;
pub mod ui;
