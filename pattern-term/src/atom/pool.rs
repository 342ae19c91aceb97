//! This module implements `AtomPool`, a structure that stores atoms and implements hash consing.

//* The pool could be modeled by a hash map from `Expr` to `Rc<Atom>`, but that would store two
//* copies of each expression, one in the key and one inside the `Rc`. Instead, we store a set of
//* `Rc<Atom>`s, combining the key and the value into a single object. We access this set using an
//* `&Expr`, and if the entry is present, we clone it; otherwise, we allocate a new `Rc`.

use super::{Atom, Expr, LinkType, NodeType, Rc};
use indexmap::{IndexMap, IndexSet};
use std::{borrow::Borrow, hash::Hash};

/// Since `Rc` intentionally implements hashing and equality by reference (instead of by value), we
/// cannot implement `Borrow<Expr>` for `Rc<Atom>`, so we cannot look up an `IndexSet<Rc<Atom>>`
/// using an `&Expr` as a key. To go around that, this struct wraps an `Rc<Atom>` and re-implements
/// hashing and equality by value (ignoring the id), so it can implement `Borrow<Expr>`.
#[derive(Debug, Clone, Eq)]
struct ByValue(Rc<Atom>);

impl PartialEq for ByValue {
    fn eq(&self, other: &Self) -> bool {
        self.0.expr == other.0.expr
    }
}

impl Hash for ByValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.expr.hash(state);
    }
}

impl Borrow<Expr> for ByValue {
    fn borrow(&self) -> &Expr {
        &self.0.expr
    }
}

/// A structure to store and manage all allocated atoms.
///
/// You can add an `Expr` to the pool using [`AtomPool::add`], which will return an `Rc<Atom>`. If
/// two equal expressions are added to a pool, they will be in the same allocation, and will have
/// the same id. This invariant is what lets a query be a DAG: an atom that appears in several
/// places of a clause is literally the same `Rc<Atom>` in each of them.
#[derive(Debug, Default)]
pub struct AtomPool {
    storage: IndexSet<ByValue>,
    variables_cache: IndexMap<Rc<Atom>, IndexSet<Rc<Atom>>>,
}

impl Drop for AtomPool {
    // The arguments of an atom are always added before it, so dropping the newest atom first never
    // frees a long chain of atoms recursively
    fn drop(&mut self) {
        self.variables_cache.clear();
        while self.storage.pop().is_some() {}
    }
}

impl AtomPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes an expression and returns a possibly newly allocated `Rc` that references it.
    ///
    /// If the expression was not already in the pool, it is added to it, and receives the next
    /// free id. Otherwise, this method just returns an `Rc` pointing to the existing allocation.
    pub fn add(&mut self, expr: Expr) -> Rc<Atom> {
        // If the `hash_set_entry` feature was stable, this would be much simpler to do using
        // `get_or_insert_with` (and would avoid rehashing the expression)
        match self.storage.get(&expr) {
            Some(ByValue(atom)) => atom.clone(),
            None => {
                let id = self.storage.len() as u64;
                let atom = Rc::new(Atom { id, expr });
                self.storage.insert(ByValue(atom.clone()));
                atom
            }
        }
    }

    /// Returns the atom for the given expression, if it was already added to the pool.
    pub fn get(&self, expr: &Expr) -> Option<&Rc<Atom>> {
        self.storage.get(expr).map(|ByValue(atom)| atom)
    }

    /// Returns the atom with the given id, if there is one.
    pub fn get_by_id(&self, id: u64) -> Option<&Rc<Atom>> {
        let index = usize::try_from(id).ok()?;
        self.storage.get_index(index).map(|ByValue(atom)| atom)
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    pub fn node(&mut self, node_type: NodeType, name: impl Into<String>) -> Rc<Atom> {
        self.add(Expr::Node(node_type, name.into()))
    }

    pub fn concept(&mut self, name: impl Into<String>) -> Rc<Atom> {
        self.node(NodeType::Concept, name)
    }

    pub fn variable(&mut self, name: impl Into<String>) -> Rc<Atom> {
        self.node(NodeType::Variable, name)
    }

    pub fn link(&mut self, link_type: LinkType, args: Vec<Rc<Atom>>) -> Rc<Atom> {
        self.add(Expr::Link(link_type, args))
    }

    /// Returns an `IndexSet` containing every variable node that occurs in the given atom,
    /// including inside quotations, in order of first occurrence.
    ///
    /// This method uses a cache, so there is no additional cost to computing the variables of an
    /// atom multiple times.
    pub fn variables(&mut self, atom: &Rc<Atom>) -> IndexSet<Rc<Atom>> {
        if let Some(vars) = self.variables_cache.get(atom) {
            return vars.clone();
        }
        let set = match atom.expr() {
            Expr::Node(NodeType::Variable, _) => IndexSet::from([atom.clone()]),
            Expr::Node(..) => IndexSet::new(),
            Expr::Link(_, args) => {
                let mut set = IndexSet::new();
                for a in args {
                    set.extend(self.variables(a));
                }
                set
            }
        };
        self.variables_cache.insert(atom.clone(), set.clone());
        set
    }
}
