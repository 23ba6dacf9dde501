//! Device-independent passes.

pub mod folding;

pub use folding::{FoldPolicy, ScaleFactor, UnitaryFolding, fold, fold_with_policy};
