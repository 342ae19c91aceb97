use super::{Atom, AtomClass, AtomPool, Classify, Rc};
use indexmap::IndexSet;

/// The variable declarations of a single clause.
///
/// This classifies `quote` and `unquote` links as quotation wrappers, declared variables as bound
/// variables, and everything else as plain atoms.
#[derive(Debug, Clone, Default)]
pub struct ClauseContext {
    bound: IndexSet<Rc<Atom>>,
}

impl ClauseContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context that declares every variable node that occurs in `clause` as bound.
    pub fn for_clause(pool: &mut AtomPool, clause: &Rc<Atom>) -> Self {
        Self { bound: pool.variables(clause) }
    }

    pub fn with_variables<I: IntoIterator<Item = Rc<Atom>>>(vars: I) -> Self {
        Self { bound: vars.into_iter().collect() }
    }

    /// Declares `var` as a bound variable. Returns `false` if it was already declared.
    pub fn declare(&mut self, var: Rc<Atom>) -> bool {
        self.bound.insert(var)
    }

    pub fn is_bound(&self, atom: &Rc<Atom>) -> bool {
        self.bound.contains(atom)
    }

    /// Returns the declared variables, in declaration order.
    pub fn variables(&self) -> impl Iterator<Item = &Rc<Atom>> {
        self.bound.iter()
    }
}

impl Classify<Rc<Atom>> for ClauseContext {
    fn classify(&self, atom: &Rc<Atom>) -> AtomClass {
        if atom.is_quote() {
            AtomClass::Quote
        } else if atom.is_unquote() {
            AtomClass::Unquote
        } else if self.is_bound(atom) {
            AtomClass::BoundVar
        } else {
            AtomClass::Plain
        }
    }
}
