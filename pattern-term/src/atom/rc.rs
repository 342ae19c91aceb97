//! A variant of `Rc` where equality and hashing are done by reference.

use std::{fmt, hash::Hash, ops::Deref, sync};

/// A wrapper for `std::sync::Arc` where equality and hashing are done by reference, instead of by
/// value.
///
/// Atoms are hash consed by the [`AtomPool`](super::AtomPool): structurally equal expressions are
/// only allocated once. Because of that, two atoms are the same atom exactly when they point to the
/// same allocation, and comparing or hashing them never needs to traverse their children. This is
/// also what lets a shared atom in a query be recognised at every position it occurs in.
///
/// Since atom references are cloned into every term tree built over them, the inner pointer is an
/// `Arc`, so sealed trees can be read from several threads.
///
/// # Examples
///
/// ```
/// # use pattern_term::atom::{AtomPool, Expr, NodeType};
/// let mut pool = AtomPool::new();
/// let a = pool.add(Expr::Node(NodeType::Concept, "a".to_owned()));
/// let b = pool.add(Expr::Node(NodeType::Concept, "a".to_owned()));
/// assert_eq!(a, b);
///
/// let c = pool.add(Expr::Node(NodeType::Concept, "c".to_owned()));
/// assert_ne!(a, c);
/// ```
#[derive(Eq)]
pub struct Rc<T: ?Sized>(sync::Arc<T>);

// If we simply `#[derive(Clone)]`, it would require that the type parameter `T` also implements
// `Clone`, even though it is of course not needed. For more info, see:
// https://github.com/rust-lang/rust/issues/26925
impl<T: ?Sized> Clone for Rc<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: ?Sized> PartialEq for Rc<T> {
    fn eq(&self, other: &Self) -> bool {
        sync::Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: ?Sized> Hash for Rc<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        sync::Arc::as_ptr(&self.0).cast::<()>().hash(state);
    }
}

impl<T: ?Sized> Deref for Rc<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

// Note: Since `Eq` and `Hash` are implemented differently for `Rc<T>` than they are for `T`, we
// _cannot_ implement `Borrow<T>` for `Rc<T>`
impl<T: ?Sized> AsRef<T> for Rc<T> {
    fn as_ref(&self) -> &T {
        self.0.as_ref()
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Rc<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl<T: ?Sized + fmt::Display> fmt::Display for Rc<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl<T> Rc<T> {
    /// Allocates a new `Rc`. Only the atom pool should call this, since two allocations of the
    /// same atom would never compare as equal.
    pub(super) fn new(value: T) -> Self {
        #[allow(clippy::disallowed_methods)]
        Self(sync::Arc::new(value))
    }

    /// Returns the address of the allocation, used to break ties between atoms of different pools.
    pub(super) fn addr(this: &Self) -> usize {
        sync::Arc::as_ptr(&this.0) as usize
    }
}
