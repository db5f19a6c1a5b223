//! Command line interface shared by the `triage-train` and `triage-predict`
//! binaries.

pub mod args;
pub mod commands;
pub mod output;

pub use args::*;
pub use commands::*;
pub use output::*;
