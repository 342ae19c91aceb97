use super::{ordering, Ancestors, Preorder, TreeBuilder};
use crate::{
    atom::{AtomRef, Classify},
    TermError, TermResult,
};
use indexmap::IndexMap;
use std::{cmp::Ordering, fmt};

/// The index of a node in a term tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TermId(usize);

impl TermId {
    /// The sentinel id. It is the parent of every tree's root, and is also used as a universal "no
    /// such node" marker.
    pub const UNDEFINED: TermId = TermId(usize::MAX);

    /// The id of the placeholder root of every tree.
    pub const ROOT: TermId = TermId(0);

    pub(super) fn new(index: usize) -> Self {
        TermId(index)
    }

    pub fn is_undefined(self) -> bool {
        self == Self::UNDEFINED
    }

    pub(super) fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for TermId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_undefined() {
            write!(f, "#undefined")
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

/// The data stored for one occurrence.
#[derive(Debug, Clone)]
pub(super) struct TermNode<A> {
    /// `None` only for the placeholder root.
    pub(super) atom: Option<A>,
    pub(super) parent: TermId,

    /// The index of this node in its parent's children, or `None` if it is not attached yet.
    pub(super) position: Option<usize>,
    pub(super) children: Vec<TermId>,

    /// Number of quotations on the path from the root down to and including this node, minus the
    /// number of unquotations.
    pub(super) quote_depth: usize,

    /// `true` if the subtree rooted at this node contains a bound variable. If this is `false`, the
    /// subtree is a constant, and may be grounded by itself.
    pub(super) has_any_bound_var: bool,
}

impl<A> TermNode<A> {
    pub(super) fn root() -> Self {
        Self {
            atom: None,
            parent: TermId::UNDEFINED,
            position: None,
            children: Vec::new(),
            quote_depth: 0,
            has_any_bound_var: false,
        }
    }

    /// Creates a node for `atom` under `parent`. The quote depth is inherited from the parent, and
    /// the node still has to be attached to the parent's children.
    pub(super) fn child(parent_id: TermId, parent: &TermNode<A>, atom: A) -> Self {
        Self {
            atom: Some(atom),
            parent: parent_id,
            position: None,
            children: Vec::new(),
            quote_depth: parent.quote_depth,
            has_any_bound_var: false,
        }
    }
}

/// A pattern-term tree, built from a single clause.
///
/// The tree is an overlay on the clause's atom graph in which every positional occurrence of an
/// atom has its own node. For example, in the clause `(set $a (blah $a $b))`, the atom `$a` occurs
/// twice, and the tree has two distinct nodes for it.
///
/// Every tree has a placeholder root, with no atom and the sentinel as its parent. The node for the
/// clause itself is the only child of this root. Nodes are stored in an arena owned by the tree,
/// and are accessed through [`TermRef`] handles.
///
/// A `TermTree` is immutable. It is built by a [`TreeBuilder`], and since the builder is consumed
/// when the tree is sealed, no construction operation can be called on a finished tree.
#[derive(Debug, Clone)]
pub struct TermTree<A> {
    pub(super) nodes: Vec<TermNode<A>>,
    pub(super) occurrences: IndexMap<A, Vec<TermId>>,
}

impl<A: AtomRef> TermTree<A> {
    /// Builds the term tree for `clause`, using the default configuration.
    pub fn build<C>(clause: &A, classifier: &C) -> TermResult<Self>
    where
        C: Classify<A> + ?Sized,
    {
        TreeBuilder::default().build(clause, classifier)
    }

    /// Returns the placeholder root of the tree.
    pub fn root(&self) -> TermRef<'_, A> {
        TermRef { tree: self, id: TermId::ROOT }
    }

    /// Returns the node for the clause itself, or `None` if no clause was added to the tree.
    pub fn clause_root(&self) -> Option<TermRef<'_, A>> {
        self.root().children().next()
    }

    /// Returns the sentinel node. It has no atom, no children, and is its own parent.
    pub fn sentinel(&self) -> TermRef<'_, A> {
        TermRef { tree: self, id: TermId::UNDEFINED }
    }

    /// Resolves a `TermId` against this tree. `TermId::UNDEFINED` resolves to the sentinel.
    pub fn get(&self, id: TermId) -> TermResult<TermRef<'_, A>> {
        if id.is_undefined() || id.index() < self.nodes.len() {
            Ok(TermRef { tree: self, id })
        } else {
            Err(TermError::DanglingChild(id))
        }
    }

    /// Returns the number of nodes in the tree, including the placeholder root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always returns `false`, since a tree contains at least its placeholder root. This exists
    /// only to go along with [`TermTree::len`].
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over every node of the tree in preorder, starting with the placeholder root.
    pub fn iter(&self) -> Preorder<'_, A> {
        self.root().descendants()
    }

    /// Returns every occurrence of `atom` in the tree, in construction order.
    pub fn occurrences<'t>(&'t self, atom: &A) -> impl Iterator<Item = TermRef<'t, A>> + 't {
        let ids = self.occurrences.get(atom).map_or(&[][..], Vec::as_slice);
        ids.iter().map(move |&id| TermRef { tree: self, id })
    }

    /// Returns the distinct atoms of the tree, in order of first occurrence.
    pub fn distinct_atoms(&self) -> impl Iterator<Item = &A> {
        self.occurrences.keys()
    }

    fn node(&self, id: TermId) -> Option<&TermNode<A>> {
        if id.is_undefined() {
            None
        } else {
            self.nodes.get(id.index())
        }
    }
}

impl<'t, A: AtomRef> IntoIterator for &'t TermTree<A> {
    type Item = TermRef<'t, A>;
    type IntoIter = Preorder<'t, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A handle to one node of a [`TermTree`].
///
/// The handle borrows the tree, so the parent of a node is always reachable, and a child can never
/// outlive the tree that owns it. The sentinel is also represented by a `TermRef`, so walking
/// upwards never needs to deal with `Option`s: the parent of the placeholder root is the sentinel,
/// and the parent of the sentinel is the sentinel itself.
///
/// `TermRef`s are ordered and compared by atom, position and parent chain, never by identity (see
/// [`ordering`](super::ordering)). This lets nodes of independently built trees be used as keys in
/// the same ordered container.
pub struct TermRef<'t, A> {
    tree: &'t TermTree<A>,
    id: TermId,
}

// Deriving these would require `A: Clone`/`A: Copy`
impl<A> Clone for TermRef<'_, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A> Copy for TermRef<'_, A> {}

impl<'t, A: AtomRef> TermRef<'t, A> {
    fn node(&self) -> Option<&'t TermNode<A>> {
        self.tree.node(self.id)
    }

    pub fn id(&self) -> TermId {
        self.id
    }

    /// Returns the tree this node belongs to.
    pub fn tree(&self) -> &'t TermTree<A> {
        self.tree
    }

    pub fn is_sentinel(&self) -> bool {
        self.id.is_undefined()
    }

    /// Returns `true` if this is the placeholder root of its tree.
    pub fn is_root(&self) -> bool {
        self.id == TermId::ROOT
    }

    /// Returns `true` if this node and `other` are the same node of the same tree.
    ///
    /// Note that this is not the same as `==`, which compares occurrences structurally.
    pub fn same_node(&self, other: &TermRef<'_, A>) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }

    /// Returns the underlying atom. This is `None` only for the placeholder root and the sentinel.
    pub fn atom(&self) -> Option<&'t A> {
        self.node().and_then(|n| n.atom.as_ref())
    }

    /// Returns the parent occurrence. For the placeholder root and the sentinel, this is the
    /// sentinel.
    pub fn parent(&self) -> TermRef<'t, A> {
        let parent = self.node().map_or(TermId::UNDEFINED, |n| n.parent);
        TermRef { tree: self.tree, id: parent }
    }

    /// Returns the index of this node among its parent's children. This is 0 for the placeholder
    /// root and the sentinel.
    pub fn position(&self) -> usize {
        self.node().and_then(|n| n.position).unwrap_or(0)
    }

    pub(super) fn child_ids(&self) -> &'t [TermId] {
        self.node().map_or(&[][..], |n| n.children.as_slice())
    }

    /// Returns the children of this node, in positional order. The child at index `i` corresponds
    /// to the `i`-th child of this node's atom.
    pub fn children(&self) -> impl ExactSizeIterator<Item = TermRef<'t, A>> + 't {
        let tree = self.tree;
        self.child_ids().iter().map(move |&id| TermRef { tree, id })
    }

    pub fn arity(&self) -> usize {
        self.child_ids().len()
    }

    /// Returns the `i`-th child of this node.
    pub fn child(&self, i: usize) -> TermResult<TermRef<'t, A>> {
        let ids = self.child_ids();
        match ids.get(i) {
            Some(&id) => Ok(TermRef { tree: self.tree, id }),
            None => Err(TermError::IndexOutOfRange { index: i, arity: ids.len() }),
        }
    }

    pub fn quote_depth(&self) -> usize {
        self.node().map_or(0, |n| n.quote_depth)
    }

    /// Returns `true` if this node is inside a quotation.
    ///
    /// This looks at the parent's quote depth instead of this node's own, so a quotation wrapper
    /// that is not itself quoted is still recognised as an operator: only its contents are quoted.
    pub fn is_quoted(&self) -> bool {
        self.parent().quote_depth() > 0
    }

    /// Returns `true` if the subtree rooted at this node contains at least one bound variable.
    pub fn has_any_bound_var(&self) -> bool {
        self.node().is_some_and(|n| n.has_any_bound_var)
    }

    /// Returns `true` if the subtree rooted at this node is ground, that is, it contains no bound
    /// variables and can only match itself.
    pub fn is_constant(&self) -> bool {
        !self.has_any_bound_var()
    }

    /// Returns the number of parent links between this node and the placeholder root.
    pub fn depth(&self) -> usize {
        self.ancestors().count()
    }

    /// Iterates over the proper ancestors of this node, from its parent up to the placeholder root.
    pub fn ancestors(&self) -> Ancestors<'t, A> {
        Ancestors::new(self.parent())
    }

    /// Iterates over the subtree rooted at this node, in preorder.
    pub fn descendants(&self) -> Preorder<'t, A> {
        Preorder::new(*self)
    }

    /// Renders the path from the root to this node, for diagnostics.
    ///
    /// The rendering is the parent's rendering, followed by `indent`, followed by the id of this
    /// node's atom. The placeholder root is rendered as `-`, and the sentinel as an empty string,
    /// so a node at depth `d` contains `indent` exactly `d + 1` times.
    pub fn render(&self, indent: &str) -> String {
        let mut path: Vec<_> = self.ancestors().collect();
        path.reverse();
        if !self.is_sentinel() {
            path.push(*self);
        }

        let mut result = String::new();
        for node in path {
            result.push_str(indent);
            match node.atom() {
                Some(atom) => result.push_str(&atom.id().to_string()),
                None => result.push('-'),
            }
        }
        result
    }
}

impl<A: AtomRef> fmt::Display for TermRef<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.render(":"))
    }
}

impl<A: AtomRef + fmt::Debug> fmt::Debug for TermRef<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("TermRef")
            .field("id", &self.id)
            .field("atom", &self.atom())
            .field("parent", &self.parent().id)
            .finish()
    }
}

impl<A: AtomRef> PartialEq for TermRef<'_, A> {
    fn eq(&self, other: &Self) -> bool {
        ordering::compare(*self, *other) == Ordering::Equal
    }
}

impl<A: AtomRef> Eq for TermRef<'_, A> {}

impl<A: AtomRef> PartialOrd for TermRef<'_, A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<A: AtomRef> Ord for TermRef<'_, A> {
    fn cmp(&self, other: &Self) -> Ordering {
        ordering::compare(*self, *other)
    }
}
