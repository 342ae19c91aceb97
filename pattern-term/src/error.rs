use crate::term::TermId;
use thiserror::Error;

pub type TermResult<T> = Result<T, TermError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TermError {
    #[error("child index {index} is out of range for a term of arity {arity}")]
    IndexOutOfRange { index: usize, arity: usize },

    #[error("term {0} does not refer to a live node of this tree")]
    DanglingChild(TermId),

    #[error("term {child} was not created under {parent}, or is already attached")]
    MisplacedChild { child: TermId, parent: TermId },

    #[error("unquote at term {0} has no enclosing quotation")]
    UnbalancedQuote(TermId),

    // Atom graphs are required to be acyclic, so this is a contract violation of the caller. We
    // only report it when cycle detection is enabled
    #[error("atom {0} appears among its own descendants")]
    CyclicAtomGraph(u64),

    #[error("term tree exceeds the maximum depth of {0}")]
    DepthLimitExceeded(usize),
}
