//! Subcommand implementations.

pub mod completion;
pub mod lookup;
pub mod unpack;
