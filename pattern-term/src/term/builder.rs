use super::tree::{TermId, TermNode, TermTree};
use crate::{
    atom::{AtomClass, AtomRef, Classify},
    TermError, TermResult,
};
use ahash::AHashSet;
use indexmap::IndexMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    max_depth: Option<usize>,
    detect_cycles: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self { max_depth: None, detect_cycles: true }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects clauses whose term tree would have a node deeper than `limit`. The clause itself is
    /// at depth one.
    pub fn max_depth(mut self, limit: impl Into<Option<usize>>) -> Self {
        self.max_depth = limit.into();
        self
    }

    /// Rejects atom graphs in which an atom is its own descendant. Without this, building a tree
    /// for such a graph never terminates.
    pub fn detect_cycles(mut self, value: bool) -> Self {
        self.detect_cycles = value;
        self
    }
}

/// A pending step of the top-down walk in [`TreeBuilder::add_subtree`]. `Exit` is scheduled below
/// the children of an atom, and takes the atom off the current path once they are all done.
#[derive(Debug)]
enum Step<A> {
    Enter { parent: TermId, atom: A, depth: usize },
    Exit(A),
}

/// The state of a builder before a call to [`TreeBuilder::add_subtree`].
#[derive(Debug)]
struct Checkpoint {
    len: usize,
    parent: TermId,
    arity: usize,
    unmarked: Vec<TermId>,
}

/// Builds a [`TermTree`].
///
/// Usually, a tree is built in one go with [`TreeBuilder::build`], which walks the clause top-down
/// and creates one node per position it visits. The lower-level construction operations are also
/// exposed, for callers that need to build the tree node by node. Once the tree is complete,
/// [`TreeBuilder::seal`] consumes the builder and returns the read-only tree.
#[derive(Debug)]
pub struct TreeBuilder<A> {
    config: Config,
    nodes: Vec<TermNode<A>>,
    occurrences: IndexMap<A, Vec<TermId>>,

    // The atoms on the path from the clause down to the node currently being visited
    on_path: AHashSet<A>,
}

impl<A: AtomRef> Default for TreeBuilder<A> {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl<A: AtomRef> TreeBuilder<A> {
    /// Creates a builder holding only the placeholder root.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            nodes: vec![TermNode::root()],
            occurrences: IndexMap::new(),
            on_path: AHashSet::new(),
        }
    }

    pub fn root(&self) -> TermId {
        TermId::ROOT
    }

    fn node(&self, id: TermId) -> TermResult<&TermNode<A>> {
        if id.is_undefined() {
            return Err(TermError::DanglingChild(id));
        }
        self.nodes.get(id.index()).ok_or(TermError::DanglingChild(id))
    }

    fn node_mut(&mut self, id: TermId) -> TermResult<&mut TermNode<A>> {
        if id.is_undefined() {
            return Err(TermError::DanglingChild(id));
        }
        self.nodes.get_mut(id.index()).ok_or(TermError::DanglingChild(id))
    }

    /// Returns the current quote depth of a node.
    pub fn quote_depth(&self, id: TermId) -> TermResult<usize> {
        Ok(self.node(id)?.quote_depth)
    }

    pub fn has_any_bound_var(&self, id: TermId) -> TermResult<bool> {
        Ok(self.node(id)?.has_any_bound_var)
    }

    /// Creates a node for `atom` whose parent is `parent`, inheriting the parent's quote depth. The
    /// new node is not yet one of the parent's children; see [`TreeBuilder::add_child`].
    pub fn new_child(&mut self, parent: TermId, atom: A) -> TermResult<TermId> {
        let node = TermNode::child(parent, self.node(parent)?, atom.clone());
        let id = TermId::new(self.nodes.len());
        self.nodes.push(node);
        self.occurrences.entry(atom).or_default().push(id);
        Ok(id)
    }

    /// Appends `child` to the children of `parent`. `child` must have been created with `parent`
    /// as its parent, and must not be attached yet.
    pub fn add_child(&mut self, parent: TermId, child: TermId) -> TermResult<()> {
        let position = self.node(parent)?.children.len();
        let child_node = self.node_mut(child)?;
        if child_node.parent != parent || child_node.position.is_some() {
            return Err(TermError::MisplacedChild { child, parent });
        }
        child_node.position = Some(position);
        self.node_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Marks the subtree rooted at `id` as containing a bound variable. This propagates upwards,
    /// stopping at the placeholder root or at the first ancestor that was already marked.
    pub fn mark_bound_variable(&mut self, id: TermId) -> TermResult<()> {
        let mut current = id;
        loop {
            let node = self.node_mut(current)?;
            if node.has_any_bound_var {
                return Ok(());
            }
            node.has_any_bound_var = true;
            if node.parent.is_undefined() {
                return Ok(());
            }
            current = node.parent;
        }
    }

    pub fn enter_quote(&mut self, id: TermId) -> TermResult<()> {
        self.node_mut(id)?.quote_depth += 1;
        Ok(())
    }

    /// Decrements the quote depth of a node. Fails with `UnbalancedQuote` if the node is not
    /// quoted.
    pub fn exit_quote(&mut self, id: TermId) -> TermResult<()> {
        let node = self.node_mut(id)?;
        match node.quote_depth.checked_sub(1) {
            Some(depth) => {
                node.quote_depth = depth;
                Ok(())
            }
            None => Err(TermError::UnbalancedQuote(id)),
        }
    }

    /// Walks `atom` top-down, adding one node per position under `parent`, and returns the id of
    /// the node created for `atom` itself.
    ///
    /// If this fails, the builder is left as it was before the call: no node created for `atom`
    /// remains, and the bound-variable marks of `parent` and its ancestors are restored.
    pub fn add_subtree<C>(
        &mut self,
        parent: TermId,
        atom: &A,
        classifier: &C,
    ) -> TermResult<TermId>
    where
        C: Classify<A> + ?Sized,
    {
        let checkpoint = self.checkpoint(parent)?;
        let depth = self.depth_of(parent)? + 1;
        let result = self.visit(parent, atom, classifier, depth);
        self.on_path.clear();
        if let Err(e) = &result {
            log::warn!("failed to build term tree for atom {}: {}", atom.id(), e);
            self.rollback(checkpoint);
        }
        result
    }

    fn depth_of(&self, id: TermId) -> TermResult<usize> {
        let mut depth = 0;
        let mut current = self.node(id)?.parent;
        while !current.is_undefined() {
            depth += 1;
            current = self.node(current)?.parent;
        }
        Ok(depth)
    }

    fn checkpoint(&self, parent: TermId) -> TermResult<Checkpoint> {
        let arity = self.node(parent)?.children.len();

        // Marked nodes are closed upwards, so only the unmarked prefix of the path can change
        let mut unmarked = Vec::new();
        let mut current = parent;
        while !current.is_undefined() {
            let node = self.node(current)?;
            if node.has_any_bound_var {
                break;
            }
            unmarked.push(current);
            current = node.parent;
        }
        Ok(Checkpoint { len: self.nodes.len(), parent, arity, unmarked })
    }

    fn rollback(&mut self, checkpoint: Checkpoint) {
        let len = checkpoint.len;
        self.nodes.truncate(len);
        if let Some(parent) = self.nodes.get_mut(checkpoint.parent.index()) {
            parent.children.truncate(checkpoint.arity);
        }
        for id in checkpoint.unmarked {
            if let Some(node) = self.nodes.get_mut(id.index()) {
                node.has_any_bound_var = false;
            }
        }
        self.occurrences.retain(|_, ids| {
            ids.retain(|id| id.index() < len);
            !ids.is_empty()
        });
    }

    fn visit<C>(
        &mut self,
        parent: TermId,
        atom: &A,
        classifier: &C,
        depth: usize,
    ) -> TermResult<TermId>
    where
        C: Classify<A> + ?Sized,
    {
        let mut stack = Vec::new();
        let id = self.enter(parent, atom, classifier, depth, &mut stack)?;
        while let Some(step) = stack.pop() {
            match step {
                Step::Enter { parent, atom, depth } => {
                    self.enter(parent, &atom, classifier, depth, &mut stack)?;
                }
                Step::Exit(atom) => {
                    self.on_path.remove(&atom);
                }
            }
        }
        Ok(id)
    }

    /// Creates and attaches the node for `atom`, and schedules its children on `stack`.
    fn enter<C>(
        &mut self,
        parent: TermId,
        atom: &A,
        classifier: &C,
        depth: usize,
        stack: &mut Vec<Step<A>>,
    ) -> TermResult<TermId>
    where
        C: Classify<A> + ?Sized,
    {
        if let Some(limit) = self.config.max_depth {
            if depth > limit {
                return Err(TermError::DepthLimitExceeded(limit));
            }
        }
        if self.config.detect_cycles && !self.on_path.insert(atom.clone()) {
            return Err(TermError::CyclicAtomGraph(atom.id()));
        }

        let id = self.new_child(parent, atom.clone())?;
        match classifier.classify(atom) {
            AtomClass::Quote => self.enter_quote(id)?,
            AtomClass::Unquote => self.exit_quote(id)?,
            AtomClass::BoundVar => self.mark_bound_variable(id)?,
            AtomClass::Plain => (),
        }
        self.add_child(parent, id)?;
        log::trace!("created term {} for atom {} under {}", id, atom.id(), parent);

        if self.config.detect_cycles {
            stack.push(Step::Exit(atom.clone()));
        }
        let children = atom.children().iter().rev();
        stack.extend(children.map(|child| Step::Enter {
            parent: id,
            atom: child.clone(),
            depth: depth + 1,
        }));
        Ok(id)
    }

    /// Builds the term tree for a clause, and seals it.
    pub fn build<C>(mut self, clause: &A, classifier: &C) -> TermResult<TermTree<A>>
    where
        C: Classify<A> + ?Sized,
    {
        self.add_subtree(TermId::ROOT, clause, classifier)?;
        Ok(self.seal())
    }

    /// Finishes construction, returning the read-only tree.
    pub fn seal(self) -> TermTree<A> {
        let tree = TermTree {
            nodes: self.nodes,
            occurrences: self.occurrences,
        };
        log::debug!(
            "sealed term tree with {} nodes over {} distinct atoms (constant: {})",
            tree.len(),
            tree.occurrences.len(),
            tree.root().is_constant(),
        );
        tree
    }
}
