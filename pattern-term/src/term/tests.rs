use super::*;
use crate::{atom::*, TermError, TermResult};
use std::{collections::BTreeMap, sync::OnceLock};

fn classify_by_name(atom: &Rc<Atom>) -> AtomClass {
    if atom.is_quote() {
        AtomClass::Quote
    } else if atom.is_unquote() {
        AtomClass::Unquote
    } else if atom.is_variable() {
        AtomClass::BoundVar
    } else {
        AtomClass::Plain
    }
}

#[test]
fn test_construction_operations() {
    let mut pool = AtomPool::new();
    let [a, b, c] = ["a", "b", "c"].map(|n| pool.concept(n));
    let mut builder = TreeBuilder::new(Config::new());

    let root = builder.root();
    let first = builder.new_child(root, a.clone()).unwrap();
    assert_eq!(builder.quote_depth(first), Ok(0));
    builder.enter_quote(first).unwrap();
    builder.add_child(root, first).unwrap();

    // Children inherit the quote depth of their parent when they are created
    let x = builder.new_child(first, b.clone()).unwrap();
    let y = builder.new_child(first, c.clone()).unwrap();
    assert_eq!(builder.quote_depth(x), Ok(1));
    builder.add_child(first, x).unwrap();
    builder.add_child(first, y).unwrap();

    builder.exit_quote(y).unwrap();
    assert_eq!(builder.exit_quote(y), Err(TermError::UnbalancedQuote(y)));

    let tree = builder.seal();
    assert_eq!(tree.len(), 4);
    let clause = tree.clause_root().unwrap();
    assert_eq!(clause.atom(), Some(&a));
    assert_eq!(clause.arity(), 2);
    assert_eq!(clause.child(0).unwrap().atom(), Some(&b));
    assert_eq!(clause.child(1).unwrap().atom(), Some(&c));
    assert_eq!(clause.child(1).unwrap().position(), 1);
    assert_eq!(clause.child(1).unwrap().quote_depth(), 0);
    assert!(clause.child(1).unwrap().is_quoted());
}

#[test]
fn test_mark_bound_variable() {
    let mut pool = AtomPool::new();
    let [a, b, c, d] = ["a", "b", "c", "d"].map(|n| pool.concept(n));
    let mut builder = TreeBuilder::default();

    let n1 = builder.new_child(TermId::ROOT, a).unwrap();
    builder.add_child(TermId::ROOT, n1).unwrap();
    let n2 = builder.new_child(n1, b).unwrap();
    builder.add_child(n1, n2).unwrap();
    let n3 = builder.new_child(n2, c).unwrap();
    builder.add_child(n2, n3).unwrap();
    let sibling = builder.new_child(n1, d).unwrap();
    builder.add_child(n1, sibling).unwrap();

    builder.mark_bound_variable(n3).unwrap();
    for id in [TermId::ROOT, n1, n2, n3] {
        assert_eq!(builder.has_any_bound_var(id), Ok(true));
    }
    assert_eq!(builder.has_any_bound_var(sibling), Ok(false));

    // Marking twice, or marking below an already marked ancestor, changes nothing
    builder.mark_bound_variable(n3).unwrap();
    builder.mark_bound_variable(n2).unwrap();
    let tree = builder.seal();
    let marked: Vec<_> = tree.iter().filter(|t| t.has_any_bound_var()).map(|t| t.id()).collect();
    assert_eq!(marked, [TermId::ROOT, n1, n2, n3]);
}

#[test]
fn test_misplaced_children() {
    let mut pool = AtomPool::new();
    let [a, b] = ["a", "b"].map(|n| pool.concept(n));
    let mut builder = TreeBuilder::default();

    let n = builder.new_child(TermId::ROOT, a).unwrap();
    builder.add_child(TermId::ROOT, n).unwrap();
    let first = builder.new_child(n, b.clone()).unwrap();
    builder.add_child(n, first).unwrap();
    let second = builder.new_child(n, b).unwrap();

    let misplaced = |child: TermId, parent: TermId| -> TermResult<()> {
        Err(TermError::MisplacedChild { child, parent })
    };
    assert_eq!(builder.add_child(n, first), misplaced(first, n));
    assert_eq!(builder.add_child(TermId::ROOT, second), misplaced(second, TermId::ROOT));
    assert_eq!(builder.add_child(first, second), misplaced(second, first));
    assert_eq!(builder.add_child(n, TermId::ROOT), misplaced(TermId::ROOT, n));
    builder.add_child(n, second).unwrap();

    let tree = builder.seal();
    let node = tree.clause_root().unwrap();
    assert_eq!(node.arity(), 2);
    let (x, y) = (node.child(0).unwrap(), node.child(1).unwrap());
    assert!(!x.same_node(&y));
    assert_eq!((x.position(), y.position()), (0, 1));
}

#[test]
fn test_failed_subtree_is_rolled_back() {
    let mut pool = AtomPool::new();
    let clause = build_atom!(pool, (and (concept "a")));
    let broken = build_atom!(pool, (or (var "y") (unquote (var "x"))));
    let c = pool.concept("c");

    let mut builder = TreeBuilder::default();
    let and = builder.add_subtree(TermId::ROOT, &clause, &classify_by_name).unwrap();
    let err = builder.add_subtree(and, &broken, &classify_by_name).unwrap_err();
    assert!(matches!(err, TermError::UnbalancedQuote(_)));
    for id in [TermId::ROOT, and] {
        assert_eq!(builder.has_any_bound_var(id), Ok(false));
    }

    // The builder is still usable, and the next child gets the position the failed one had
    builder.add_subtree(and, &c, &classify_by_name).unwrap();
    let tree = builder.seal();
    assert_eq!(tree.len(), 4);
    assert_eq!(tree.iter().count(), tree.len());
    assert!(tree.root().is_constant());
    assert_eq!(tree.occurrences(&broken).count(), 0);
    assert_eq!(tree.distinct_atoms().count(), 3);

    let and = tree.clause_root().unwrap();
    assert_eq!(and.arity(), 2);
    assert_eq!(and.child(1).unwrap().atom(), Some(&c));
    assert_eq!(and.child(1).unwrap().position(), 1);

    // Marks that were already there before the failure stay
    let marked = build_atom!(pool, (and (var "z")));
    let mut builder = TreeBuilder::default();
    let and = builder.add_subtree(TermId::ROOT, &marked, &classify_by_name).unwrap();
    assert!(builder.add_subtree(and, &broken, &classify_by_name).is_err());
    assert_eq!(builder.has_any_bound_var(and), Ok(true));
    assert_eq!(builder.seal().len(), 3);
}

#[test]
fn test_deep_clause() {
    const DEPTH: usize = 100_000;
    let mut pool = AtomPool::new();
    let leaf = pool.concept("a");
    let mut clause = leaf.clone();
    for _ in 0..DEPTH {
        clause = pool.link(LinkType::Not, vec![clause]);
    }

    let tree = TermTree::build(&clause, &classify_by_name).unwrap();
    assert_eq!(tree.len(), DEPTH + 2);
    let last = tree.iter().last().unwrap();
    assert_eq!(last.atom(), Some(&leaf));
    assert_eq!(last.depth(), DEPTH + 1);
    assert!(tree.root().is_constant());

    let other = TermTree::build(&clause, &classify_by_name).unwrap();
    assert!(other.iter().last().is_some_and(|t| t == last));
}

#[test]
fn test_dangling_ids() {
    let mut pool = AtomPool::new();
    let a = pool.concept("a");
    let mut builder = TreeBuilder::default();
    let bogus = TermId::new(17);

    assert_eq!(builder.new_child(bogus, a.clone()), Err(TermError::DanglingChild(bogus)));
    assert_eq!(builder.mark_bound_variable(bogus), Err(TermError::DanglingChild(bogus)));
    assert_eq!(
        builder.new_child(TermId::UNDEFINED, a.clone()),
        Err(TermError::DanglingChild(TermId::UNDEFINED))
    );

    let tree = TermTree::build(&a, &classify_by_name).unwrap();
    assert_eq!(tree.get(bogus).unwrap_err(), TermError::DanglingChild(bogus));
    assert!(tree.get(TermId::UNDEFINED).unwrap().is_sentinel());
    assert!(tree.get(TermId::ROOT).unwrap().is_root());
}

#[test]
fn test_sentinel_and_root() {
    let mut pool = AtomPool::new();
    let clause = build_atom!(pool, (and (concept "a") (var "x")));
    let tree = TermTree::build(&clause, &classify_by_name).unwrap();

    let root = tree.root();
    assert!(root.is_root());
    assert_eq!(root.atom(), None);
    assert!(root.parent().is_sentinel());
    assert_eq!(root.quote_depth(), 0);
    assert_eq!(root.arity(), 1);

    let sentinel = tree.sentinel();
    assert!(sentinel.parent().is_sentinel());
    assert_eq!(sentinel.arity(), 0);
    assert_eq!(sentinel.depth(), 0);
    assert!(!sentinel.has_any_bound_var());
    assert_eq!(sentinel.render(":"), "");
    assert_eq!(sentinel.descendants().count(), 0);

    let clause_root = tree.clause_root().unwrap();
    assert!(clause_root.parent().same_node(&root));
    assert_eq!(clause_root.depth(), 1);
}

#[test]
fn test_child_out_of_range() {
    let mut pool = AtomPool::new();
    let clause = build_atom!(pool, (pair (var "x") (var "x")));
    let tree = TermTree::build(&clause, &classify_by_name).unwrap();
    let pair = tree.clause_root().unwrap();

    for (node, arity) in [(pair, 2), (pair.child(0).unwrap(), 0), (tree.sentinel(), 0)] {
        assert_eq!(node.arity(), arity);
        assert_eq!(
            node.child(arity).unwrap_err(),
            TermError::IndexOutOfRange { index: arity, arity }
        );
    }
}

#[test]
fn test_quote_depths() {
    fn run_tests(cases: &[(Rc<Atom>, &[(usize, bool)])]) {
        for (clause, expected) in cases {
            let tree = TermTree::build(clause, &classify_by_name).unwrap();
            let got: Vec<_> = tree
                .iter()
                .skip(1)
                .map(|t| (t.quote_depth(), t.is_quoted()))
                .collect();
            assert_eq!(&got[..], *expected, "wrong quote depths for `{}`", clause);
        }
    }
    let mut pool = AtomPool::new();
    run_tests(&[
        (build_atom!(pool, (foo (concept "a"))), &[(0, false), (0, false)]),
        (
            build_atom!(pool, (quote (foo (var "x")))),
            &[(1, false), (1, true), (1, true)],
        ),
        (
            build_atom!(pool, (quote (quote (concept "a")))),
            &[(1, false), (2, true), (2, true)],
        ),
        (
            build_atom!(pool, (quote (foo (unquote (var "x")) (concept "a")))),
            &[(1, false), (1, true), (0, true), (0, false), (1, true)],
        ),
        (
            build_atom!(pool, (and (quote (concept "a")) (concept "b"))),
            &[(0, false), (1, false), (1, true), (0, false)],
        ),
    ]);
}

#[test]
fn test_unbalanced_unquote() {
    let mut pool = AtomPool::new();
    let clause = build_atom!(pool, (and (concept "a") (unquote (var "x"))));
    let err = TermTree::build(&clause, &classify_by_name).unwrap_err();
    assert!(matches!(err, TermError::UnbalancedQuote(_)));
}

#[test]
fn test_depth_limit() {
    let mut pool = AtomPool::new();
    let clause = build_atom!(pool, (and (not (not (concept "a")))));
    let build = |limit: Option<usize>| {
        TreeBuilder::new(Config::new().max_depth(limit)).build(&clause, &classify_by_name)
    };

    assert_eq!(build(Some(3)).unwrap_err(), TermError::DepthLimitExceeded(3));
    assert_eq!(build(Some(4)).unwrap().len(), 5);
    assert_eq!(build(None).unwrap().len(), 5);
}

#[test]
fn test_occurrences() {
    let mut pool = AtomPool::new();
    let clause = build_atom!(pool, (set (var "a") (blah (var "a") (var "b"))));
    let tree = TermTree::build(&clause, &classify_by_name).unwrap();
    let [a, b] = ["a", "b"].map(|n| pool.variable(n));

    let occurrences: Vec<_> = tree.occurrences(&a).collect();
    assert_eq!(occurrences.len(), 2);
    assert!(!occurrences[0].same_node(&occurrences[1]));
    assert_ne!(occurrences[0], occurrences[1]);
    assert_eq!(tree.occurrences(&b).count(), 1);
    assert_eq!(tree.occurrences(&pool.concept("c")).count(), 0);

    let distinct: Vec<_> = tree.distinct_atoms().map(|a| a.to_string()).collect();
    assert_eq!(distinct, ["(set $a (blah $a $b))", "$a", "(blah $a $b)", "$b"]);
}

#[test]
fn test_render() {
    let mut pool = AtomPool::new();
    let a = pool.concept("a");
    let clause = build_atom!(pool, (foo {a.clone()} (bar {a.clone()})));
    let tree = TermTree::build(&clause, &classify_by_name).unwrap();

    let bar = tree.clause_root().unwrap().child(1).unwrap();
    let inner = bar.child(0).unwrap();
    let expected = format!(":-:{}:{}:{}", clause.id(), bar.atom().unwrap().id(), a.id());
    assert_eq!(inner.render(":"), expected);
    assert_eq!(inner.to_string(), expected);
    assert_eq!(tree.root().render("/"), "/-");
}

#[test]
fn test_ordered_container_keys() {
    let mut pool = AtomPool::new();
    let clause = build_atom!(pool, (pair (var "x") (and (var "x") (var "x"))));
    let tree = TermTree::build(&clause, &classify_by_name).unwrap();
    let other = TermTree::build(&clause, &classify_by_name).unwrap();

    let mut map = BTreeMap::new();
    for (i, node) in tree.iter().enumerate() {
        assert!(map.insert(node, i).is_none());
    }
    assert_eq!(map.len(), tree.len());

    // An independent tree for the same clause gives equivalent keys for the same occurrences
    for (i, node) in other.iter().enumerate() {
        assert_eq!(map.get(&node), Some(&i));
    }
}

/// A graph of atoms whose edges are set after allocation, so it may contain cycles.
#[derive(Debug)]
struct GraphAtom {
    id: u64,
    children: OnceLock<Vec<&'static GraphAtom>>,
}

impl PartialEq for GraphAtom {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for GraphAtom {}

impl std::hash::Hash for GraphAtom {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for GraphAtom {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GraphAtom {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

impl AtomRef for &'static GraphAtom {
    fn children(&self) -> &[Self] {
        self.children.get().map_or(&[][..], Vec::as_slice)
    }

    fn id(&self) -> u64 {
        self.id
    }
}

fn graph_atom(id: u64) -> &'static GraphAtom {
    Box::leak(Box::new(GraphAtom { id, children: OnceLock::new() }))
}

#[test]
fn test_cycle_detection() {
    let plain = |_: &&'static GraphAtom| AtomClass::Plain;

    let [a, b, c] = [0, 1, 2].map(graph_atom);
    a.children.set(vec![b, c]).unwrap();
    b.children.set(vec![c]).unwrap();
    c.children.set(vec![a]).unwrap();
    let err = TermTree::build(&a, &plain).unwrap_err();
    assert!(matches!(err, TermError::CyclicAtomGraph(_)));

    // Sharing without a cycle is fine: `y` occurs twice, and gets two nodes
    let [x, y, z] = [3, 4, 5].map(graph_atom);
    x.children.set(vec![y, z]).unwrap();
    z.children.set(vec![y]).unwrap();
    let tree = TermTree::build(&x, &plain).unwrap();
    assert_eq!(tree.len(), 5);
    assert_eq!(tree.occurrences(&y).count(), 2);

    // With detection disabled but a depth limit, the cycle is still caught
    let config = Config::new().detect_cycles(false).max_depth(16);
    let err = TreeBuilder::new(config).build(&a, &plain).unwrap_err();
    assert_eq!(err, TermError::DepthLimitExceeded(16));
}
