#![deny(clippy::disallowed_methods)]
#![deny(clippy::self_named_module_files)]
#![deny(clippy::undocumented_unsafe_blocks)]
#![warn(clippy::branches_sharing_code)]
#![warn(clippy::cloned_instead_of_copied)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::doc_markdown)]
#![warn(clippy::explicit_into_iter_loop)]
#![warn(clippy::explicit_iter_loop)]
#![warn(clippy::from_iter_instead_of_collect)]
#![warn(clippy::get_unwrap)]
#![warn(clippy::implicit_clone)]
#![warn(clippy::inconsistent_struct_constructor)]
#![warn(clippy::items_after_statements)]
#![warn(clippy::manual_assert)]
#![warn(clippy::map_unwrap_or)]
#![warn(clippy::match_wildcard_for_single_variants)]
#![warn(clippy::redundant_closure_for_method_calls)]
#![warn(clippy::redundant_pub_crate)]
#![warn(clippy::semicolon_if_nothing_returned)]
#![warn(clippy::str_to_string)]
#![warn(clippy::trivially_copy_pass_by_ref)]
#![warn(clippy::unnecessary_wraps)]
#![warn(clippy::unnested_or_patterns)]
#![warn(clippy::unused_self)]

//! Pattern-term trees: a positional overlay on query expressions.
//!
//! A query is a directed acyclic graph of atoms, where the same atom may be referenced from many
//! places. A pattern matcher, however, needs to keep per-occurrence state (for example, the
//! permutation it is currently trying for an unordered link), so it cannot walk the DAG directly.
//! This crate converts each clause of a query into a [`TermTree`](term::TermTree), in which every
//! positional occurrence of an atom gets its own node.
//!
//! # Examples
//!
//! ```
//! use pattern_term::{atom::*, build_atom, term::TermTree};
//!
//! let mut pool = AtomPool::new();
//! let clause = build_atom!(pool, (set (var "a") (blah (var "a") (var "b"))));
//! let context = ClauseContext::for_clause(&mut pool, &clause);
//!
//! let tree = TermTree::build(&clause, &context)?;
//! let a = pool.variable("a");
//! assert_eq!(tree.occurrences(&a).count(), 2);
//! assert!(tree.clause_root().unwrap().has_any_bound_var());
//! # Ok::<(), pattern_term::TermError>(())
//! ```

#[macro_use]
pub mod atom;
mod error;
pub mod term;

pub use error::{TermError, TermResult};
