//! The total order over term nodes.
//!
//! Two occurrences are compared by their atoms first. If the atoms are the same, they are compared
//! by their positions in their parents' children, and then their parents are compared in the same
//! way, walking up until one of the chains reaches a node without an atom (the placeholder root or
//! the sentinel). Two nodes without atoms are always equivalent.
//!
//! Node identity is never consulted, so this is meaningful across trees: two nodes of
//! independently built trees are equivalent iff they are the same positional occurrence of the
//! same atom in the same clause. Within one tree, equivalent nodes are the same node. This is what
//! allows matcher bookkeeping to key ordered containers by `TermRef`.

use super::TermRef;
use crate::atom::AtomRef;
use std::cmp::Ordering;

/// Compares two term nodes, possibly from different trees.
pub fn compare<A: AtomRef>(lhs: TermRef<'_, A>, rhs: TermRef<'_, A>) -> Ordering {
    let (mut lhs, mut rhs) = (lhs, rhs);
    loop {
        match (lhs.atom(), rhs.atom()) {
            (None, None) => return Ordering::Equal,
            (l, r) if l != r => return l.cmp(&r),
            _ => (),
        }
        match lhs.position().cmp(&rhs.position()) {
            Ordering::Equal => (),
            other => return other,
        }
        lhs = lhs.parent();
        rhs = rhs.parent();
    }
}

/// Returns `true` if `lhs` is strictly less than `rhs`.
pub fn less<A: AtomRef>(lhs: TermRef<'_, A>, rhs: TermRef<'_, A>) -> bool {
    compare(lhs, rhs) == Ordering::Less
}
