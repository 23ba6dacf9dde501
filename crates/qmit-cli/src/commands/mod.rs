//! CLI command implementations.

pub mod common;
pub mod fold;
pub mod pad;
pub mod run;
pub mod version;
