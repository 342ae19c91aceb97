use super::{AtomRef, Rc};
use std::{cmp::Ordering, fmt};

/// An atom, as stored in an [`AtomPool`](super::AtomPool).
///
/// Atoms are always handled through an [`Rc<Atom>`], and many of the accessors are most useful
/// through it.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Atom {
    pub(super) id: u64,
    pub(super) expr: Expr,
}

/// The contents of an atom.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    /// A named node. Nodes have no children.
    Node(NodeType, String),

    /// A link over an ordered list of child atoms.
    Link(LinkType, Vec<Rc<Atom>>),
}

/// The type of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Concept,
    Variable,
    Number,
}

/// The type of a link.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LinkType {
    List,
    Set,
    And,
    Or,
    Not,
    Eval,

    /// A quotation wrapper: its contents are matched literally.
    Quote,

    /// Cancels the innermost enclosing `Quote`.
    Unquote,

    /// Any other, user-named link type.
    Named(String),
}

impl Atom {
    /// Returns the identifier the pool assigned to this atom. Identifiers are given out in
    /// insertion order, starting from zero.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Returns the child atoms of a link, or an empty slice if the atom is a node.
    pub fn args(&self) -> &[Rc<Atom>] {
        match &self.expr {
            Expr::Link(_, args) => args,
            Expr::Node(..) => &[],
        }
    }

    /// Returns the name of a node, or `None` if the atom is a link.
    pub fn name(&self) -> Option<&str> {
        match &self.expr {
            Expr::Node(_, name) => Some(name),
            Expr::Link(..) => None,
        }
    }

    pub fn link_type(&self) -> Option<&LinkType> {
        match &self.expr {
            Expr::Link(t, _) => Some(t),
            Expr::Node(..) => None,
        }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self.expr, Expr::Node(NodeType::Variable, _))
    }

    pub fn is_quote(&self) -> bool {
        matches!(self.expr, Expr::Link(LinkType::Quote, _))
    }

    pub fn is_unquote(&self) -> bool {
        matches!(self.expr, Expr::Link(LinkType::Unquote, _))
    }
}

impl AtomRef for Rc<Atom> {
    fn children(&self) -> &[Self] {
        self.args()
    }

    fn id(&self) -> u64 {
        self.id
    }
}

// Atoms are ordered by the id their pool gave them. Atoms from different pools may share an id,
// so the allocation address breaks the tie, which keeps the order consistent with `Eq`
impl PartialOrd for Rc<Atom> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rc<Atom> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id
            .cmp(&other.id)
            .then_with(|| Rc::addr(self).cmp(&Rc::addr(other)))
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            LinkType::List => "list",
            LinkType::Set => "set",
            LinkType::And => "and",
            LinkType::Or => "or",
            LinkType::Not => "not",
            LinkType::Eval => "eval",
            LinkType::Quote => "quote",
            LinkType::Unquote => "unquote",
            LinkType::Named(name) => name.as_str(),
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.expr {
            Expr::Node(NodeType::Variable, name) => write!(f, "${}", name),
            Expr::Node(NodeType::Concept, name) => write!(f, "{:?}", name),
            Expr::Node(NodeType::Number, value) => write!(f, "{}", value),
            Expr::Link(link_type, args) => {
                write!(f, "({}", link_type)?;
                for a in args {
                    write!(f, " {}", a)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
