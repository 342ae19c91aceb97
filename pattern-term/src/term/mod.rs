//! Pattern-term trees, and the operations to build, traverse and order them.

mod builder;
mod iter;
pub mod ordering;
mod tree;
#[cfg(test)]
mod tests;

pub use builder::{Config, TreeBuilder};
pub use iter::{Ancestors, Preorder};
pub use ordering::{compare, less};
pub use tree::{TermId, TermRef, TermTree};
