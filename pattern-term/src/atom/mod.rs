//! The atoms a pattern-term tree is built over.
//!
//! The tree only relies on the [`AtomRef`] and [`Classify`] traits. This module also contains a
//! concrete atom representation, hash-consed expression atoms stored in an [`AtomPool`], which is
//! what the tests and examples use.

#[macro_use]
mod macros;
mod context;
mod expr;
mod pool;
mod rc;

pub use context::ClauseContext;
pub use expr::{Atom, Expr, LinkType, NodeType};
pub use pool::AtomPool;
pub use rc::Rc;

use std::hash::Hash;

/// A reference to an atom in a query graph.
///
/// Implementors must be cheap to clone, and their `Ord`, `Eq` and `Hash` implementations must agree
/// on atom identity: two references are equal iff they denote the same atom.
pub trait AtomRef: Clone + Ord + Hash {
    /// Returns the ordered child atoms of this atom. Nodes have no children.
    fn children(&self) -> &[Self];

    /// Returns a stable numeric identifier for this atom. This is only used for diagnostics.
    fn id(&self) -> u64;
}

/// How an atom should be treated when it appears in a clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomClass {
    /// A quotation wrapper. Its descendants are matched literally.
    Quote,

    /// An unquotation wrapper, which cancels the innermost enclosing quotation.
    Unquote,

    /// A variable that the pattern compiler declared as bound in this clause.
    BoundVar,

    /// Anything else.
    Plain,
}

/// Classifies atoms of a clause. This is furnished per clause by the query compiler.
pub trait Classify<A> {
    fn classify(&self, atom: &A) -> AtomClass;
}

impl<A, F> Classify<A> for F
where
    F: Fn(&A) -> AtomClass,
{
    fn classify(&self, atom: &A) -> AtomClass {
        self(atom)
    }
}
