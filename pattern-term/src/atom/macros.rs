//! Some useful helper macros.

/// A macro to help build atoms.
///
/// Given an atom pool and an s-expression, this macro adds every atom of the expression to the
/// pool, and returns the outermost one. Links are written as `(<link type> <args>...)`, where the
/// built-in link types are `list`, `set`, `and`, `or`, `not`, `eval`, `quote` and `unquote`; any
/// other identifier becomes a named link type. Nodes are written as `(var "x")`, `(concept "a")`
/// or `(num 3)`. An existing atom can be spliced in with `{<expr>}`.
///
/// # Examples
///
/// ```
/// # use pattern_term::{atom::*, build_atom};
/// let mut pool = AtomPool::new();
/// let x = pool.variable("x");
/// let t = build_atom!(pool, (quote (foo {x.clone()} (concept "a"))));
/// assert!(t.is_quote());
/// assert_eq!(t.to_string(), "(quote (foo $x \"a\"))");
/// ```
#[macro_export]
macro_rules! build_atom {
    (@LINK_TYPE list) => { $crate::atom::LinkType::List };
    (@LINK_TYPE set) => { $crate::atom::LinkType::Set };
    (@LINK_TYPE and) => { $crate::atom::LinkType::And };
    (@LINK_TYPE or) => { $crate::atom::LinkType::Or };
    (@LINK_TYPE not) => { $crate::atom::LinkType::Not };
    (@LINK_TYPE eval) => { $crate::atom::LinkType::Eval };
    (@LINK_TYPE quote) => { $crate::atom::LinkType::Quote };
    (@LINK_TYPE unquote) => { $crate::atom::LinkType::Unquote };
    (@LINK_TYPE $other:ident) => {
        $crate::atom::LinkType::Named(::std::string::String::from(stringify!($other)))
    };
    ($pool:expr, {$atom:expr}) => { $atom };
    ($pool:expr, (var $name:literal)) => {
        $pool.node($crate::atom::NodeType::Variable, $name)
    };
    ($pool:expr, (concept $name:literal)) => {
        $pool.node($crate::atom::NodeType::Concept, $name)
    };
    ($pool:expr, (num $value:literal)) => {
        $pool.node($crate::atom::NodeType::Number, ($value).to_string())
    };
    ($pool:expr, ($link:ident $($args:tt)*)) => {{
        let args = vec![ $($crate::build_atom!($pool, $args)),* ];
        $pool.link($crate::build_atom!(@LINK_TYPE $link), args)
    }};
}
