//! Tabular data loading and row/column partitioning.

pub mod loader;
pub mod split;
pub mod table;

pub use loader::load_table;
pub use split::{
    SplitIndices, SplitOptions, StratifiedSplit, split_features_target, stratified_split,
};
pub use table::{Column, ColumnData, Table};
