//! netsync tree: merges leaf objects into the parent-child shape the hierarchical patch API
//! expects and serializes it.

#![forbid(unsafe_code)]

pub mod builder;
mod node;
pub mod serialize;

pub use builder::{build, build_chain, build_with_report, resolve_path, split_path, BuildReport};
pub use node::{NodeKey, TreeNode};
pub use serialize::{render, serialize, to_envelope};
