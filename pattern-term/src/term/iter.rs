//! Iterators over the nodes of a term tree.

use super::{TermId, TermRef};
use crate::atom::AtomRef;

/// An iterator over a subtree, in preorder.
///
/// The traversal keeps an explicit stack of pending nodes, so deep trees can't overflow the call
/// stack. This struct is created by [`TermRef::descendants`] and [`TermTree::iter`].
///
/// [`TermTree::iter`]: super::TermTree::iter
pub struct Preorder<'t, A> {
    start: TermRef<'t, A>,
    stack: Vec<TermId>,
}

impl<'t, A: AtomRef> Preorder<'t, A> {
    pub(super) fn new(start: TermRef<'t, A>) -> Self {
        let stack = if start.is_sentinel() { Vec::new() } else { vec![start.id()] };
        Self { start, stack }
    }
}

impl<'t, A: AtomRef> Iterator for Preorder<'t, A> {
    type Item = TermRef<'t, A>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.start.tree().get(id).ok()?;
        self.stack.extend(node.child_ids().iter().rev());
        Some(node)
    }
}

/// An iterator over the proper ancestors of a node, from its parent up to the placeholder root.
///
/// This struct is created by [`TermRef::ancestors`].
pub struct Ancestors<'t, A> {
    current: TermRef<'t, A>,
}

impl<'t, A: AtomRef> Ancestors<'t, A> {
    pub(super) fn new(first: TermRef<'t, A>) -> Self {
        Self { current: first }
    }
}

impl<'t, A: AtomRef> Iterator for Ancestors<'t, A> {
    type Item = TermRef<'t, A>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_sentinel() {
            return None;
        }
        let result = self.current;
        self.current = result.parent();
        Some(result)
    }
}
