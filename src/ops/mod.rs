pub mod ids;
pub mod tree_ops;
