//! The term algebra.
//!
//! A grammar is a graph of shared terms. [`Parser`] is a cheap-to-clone
//! handle on one term; the variants live in the submodules and implement
//! [`Combinator`], which carries the per-variant derivative rule, the
//! fix-point hooks, and the graph-walk hooks. Everything the variants share
//! — the attribute cache and the derivative memo — sits in [`Attrs`].
//!
//! # Derivative memo
//!
//! Each term memoizes its derivative per terminal, and the memo guarantees
//! pointer identity: deriving the same term by equal terminals twice yields
//! the same object. That identity is what keeps cyclic derivative graphs
//! finite. When a derivative's construction re-enters itself — the graph is
//! cyclic — the memo hands every re-entrant caller one shared pending
//! derivative that resolves to the finished term once construction
//! completes; see [`deferred`].

use std::cell::{Cell, RefCell};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use indexmap::IndexSet;
use tracing::trace;

use crate::error::Result;
use crate::fixpoint::{self, Worklist};
use crate::graph::{Label, TermGraph, TermId, TermNode};

pub(crate) mod concat;
pub(crate) mod deferred;
pub(crate) mod empty;
pub(crate) mod epsilon;
pub(crate) mod literal;
pub(crate) mod recur;
pub(crate) mod reduce;
pub(crate) mod repeat;
pub(crate) mod union;

pub use concat::con;
pub use deferred::derivative_future;
pub use empty::empty;
pub use epsilon::epsilon;
pub use literal::terminal;
pub use recur::{recursion, Recursion};
pub use reduce::red;
pub use repeat::rep;
pub use union::alt;

/// Input symbols a grammar consumes.
///
/// Satisfied by `char`, `u8`, token enums, and anything else comparable,
/// hashable, and cloneable.
pub trait Terminal: Clone + Eq + Hash + fmt::Debug + 'static {}
impl<T> Terminal for T where T: Clone + Eq + Hash + fmt::Debug + 'static {}

/// Semantic values a grammar produces. Parse forests are sets, so values
/// must be comparable and hashable.
pub trait Value: Clone + Eq + Hash + fmt::Debug + 'static {}
impl<V> Value for V where V: Clone + Eq + Hash + fmt::Debug + 'static {}

/// State of one derivative memo slot.
pub(crate) enum MemoEntry<T: Terminal, A: Value> {
    /// Construction is in flight. The payload is the shared pending
    /// derivative handed to re-entrant callers, allocated on first demand.
    Pending(Option<Parser<T, A>>),
    /// Construction finished with this term.
    Ready(Parser<T, A>),
}

/// A non-borrowing snapshot of a memo slot.
pub(crate) enum MemoState<T: Terminal, A: Value> {
    Absent,
    Pending,
    Ready(Parser<T, A>),
}

/// Attribute cache and derivative memo shared by every variant.
pub(crate) struct Attrs<T: Terminal, A: Value> {
    pub(crate) id: TermId,
    /// True once the fix-point engine has proven the attribute values final.
    pub(crate) settled: Cell<bool>,
    /// True while a fix-point run rooted at this term is in progress.
    pub(crate) solving: Cell<bool>,
    /// Language-is-empty; starts `true` for composites and only decreases.
    pub(crate) empty: Cell<bool>,
    /// ε-is-in-the-language; starts `false` and only increases.
    pub(crate) nullable: Cell<bool>,
    /// Null-parse forest; starts empty and only grows.
    pub(crate) parse_null: RefCell<IndexSet<A>>,
    memo: RefCell<HashMap<T, MemoEntry<T, A>>>,
}

impl<T: Terminal, A: Value> Attrs<T, A> {
    /// Attributes known at construction; the term never enters the engine.
    pub(crate) fn settled(empty: bool, nullable: bool, parse_null: IndexSet<A>) -> Self {
        Attrs {
            id: TermId::fresh(),
            settled: Cell::new(true),
            solving: Cell::new(false),
            empty: Cell::new(empty),
            nullable: Cell::new(nullable),
            parse_null: RefCell::new(parse_null),
            memo: RefCell::new(HashMap::new()),
        }
    }

    /// Attributes to be computed by fix-point iteration, starting at each
    /// lattice's pre-refinement value.
    pub(crate) fn open() -> Self {
        Attrs {
            id: TermId::fresh(),
            settled: Cell::new(false),
            solving: Cell::new(false),
            empty: Cell::new(true),
            nullable: Cell::new(false),
            parse_null: RefCell::new(IndexSet::new()),
            memo: RefCell::new(HashMap::new()),
        }
    }

    /// Writes a freshly recomputed attribute triple, reporting whether
    /// anything changed. Set comparison is order-insensitive.
    pub(crate) fn store(&self, empty: bool, nullable: bool, parse_null: IndexSet<A>) -> bool {
        let mut changed = false;
        if self.empty.get() != empty {
            self.empty.set(empty);
            changed = true;
        }
        if self.nullable.get() != nullable {
            self.nullable.set(nullable);
            changed = true;
        }
        if *self.parse_null.borrow() != parse_null {
            *self.parse_null.borrow_mut() = parse_null;
            changed = true;
        }
        changed
    }
}

/// One term variant. Object-safe; every variant is held behind
/// `Rc<dyn Combinator>` inside a [`Parser`] handle.
pub(crate) trait Combinator<T: Terminal, A: Value> {
    fn attrs(&self) -> &Attrs<T, A>;

    fn label(&self) -> Label;

    /// The derivative rule for this variant, compaction included. Called at
    /// most once per terminal; the memo in [`Parser::derive`] does the rest.
    fn derive_inner(&self, me: &Parser<T, A>, t: &T) -> Result<Parser<T, A>>;

    /// Recurses worklist collection into children. `me` is already admitted.
    fn enlist_children(&self, _me: &Parser<T, A>, _work: &mut Worklist) -> Result<()> {
        Ok(())
    }

    /// Recomputes this term's attributes from its children's current
    /// values. True if anything changed. Fixed-attribute variants keep the
    /// default.
    fn refresh(&self) -> bool {
        false
    }

    /// The term this one currently stands for. Pending derivatives resolve
    /// to their finished target (constructing it when `force` is set and it
    /// is constructible); every other variant stands for itself.
    fn stand_in(&self, me: &Parser<T, A>, _force: bool) -> Result<Option<Parser<T, A>>> {
        Ok(Some(me.clone()))
    }

    /// Child identities for graph inspection. Must not force derivatives.
    fn child_ids(&self) -> Result<Vec<TermId>> {
        Ok(Vec::new())
    }

    /// Recurses a graph walk into children. Must not force derivatives.
    fn walk_children(&self, _graph: &mut TermGraph) -> Result<()> {
        Ok(())
    }

    /// Parses the whole input, yielding the forest of values. Variants
    /// other than reduction use the generic derivative chain.
    fn parse_full(&self, me: &Parser<T, A>, input: &[T]) -> Result<IndexSet<A>> {
        if input.is_empty() {
            me.parse_null()
        } else {
            me.derive(&input[0])?.parse_full(&input[1..])
        }
    }

    /// Parses every matching prefix, yielding `(value, remaining input)`
    /// pairs.
    fn parse(&self, me: &Parser<T, A>, input: &[T]) -> Result<IndexSet<(A, Vec<T>)>> {
        if input.is_empty() {
            let mut pairs = IndexSet::new();
            for value in me.parse_null()? {
                pairs.insert((value, Vec::new()));
            }
            return Ok(pairs);
        }
        let mut pairs = me.derive(&input[0])?.parse(&input[1..])?;
        for value in me.parse_full(&[])? {
            pairs.insert((value, input.to_vec()));
        }
        Ok(pairs)
    }
}

/// A handle on one grammar term over terminals `T` and values `A`.
///
/// Handles are reference-counted: cloning shares the term, and grammars are
/// graphs of shared terms (cyclic once recursion is involved). All queries
/// take `&self`; caches live behind interior mutability. Not `Send` — a
/// grammar belongs to one thread.
pub struct Parser<T: Terminal, A: Value>(pub(crate) Rc<dyn Combinator<T, A>>);

impl<T: Terminal, A: Value> Clone for Parser<T, A> {
    fn clone(&self) -> Self {
        Parser(Rc::clone(&self.0))
    }
}

impl<T: Terminal, A: Value> PartialEq for Parser<T, A> {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl<T: Terminal, A: Value> Eq for Parser<T, A> {}

impl<T: Terminal, A: Value> fmt::Debug for Parser<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.0.label(), self.id())
    }
}

impl<T: Terminal, A: Value> Parser<T, A> {
    /// The term's process-stable identity.
    pub fn id(&self) -> TermId {
        self.0.attrs().id
    }

    /// Whether the language of this term is empty (recognizes nothing).
    pub fn is_empty(&self) -> Result<bool> {
        fixpoint::solve(self)?;
        Ok(self.0.attrs().empty.get())
    }

    /// Whether ε is in the language of this term.
    pub fn is_nullable(&self) -> Result<bool> {
        if self.is_empty()? {
            return Ok(false);
        }
        Ok(self.0.attrs().nullable.get())
    }

    /// The forest of values this term assigns to the empty input.
    /// Non-empty exactly when the term is nullable.
    pub fn parse_null(&self) -> Result<IndexSet<A>> {
        if self.is_empty()? {
            return Ok(IndexSet::new());
        }
        Ok(self.0.attrs().parse_null.borrow().clone())
    }

    /// The derivative of this term by `t`: the grammar of everything that
    /// may follow after consuming `t`. Memoized; repeated calls return the
    /// same object.
    pub fn derive(&self, t: &T) -> Result<Parser<T, A>> {
        {
            let mut memo = self.0.attrs().memo.borrow_mut();
            match memo.entry(t.clone()) {
                Entry::Occupied(mut slot) => match slot.get_mut() {
                    MemoEntry::Ready(derived) => return Ok(derived.clone()),
                    MemoEntry::Pending(shared) => {
                        // Cyclic derivative graph: every re-entrant caller
                        // gets the same pending derivative, which resolves
                        // once the in-flight construction lands in the memo.
                        let pending = shared
                            .get_or_insert_with(|| deferred::make(self.clone(), t.clone()))
                            .clone();
                        return Ok(pending);
                    }
                },
                Entry::Vacant(slot) => {
                    slot.insert(MemoEntry::Pending(None));
                }
            }
        }
        trace!(term = %self.id(), terminal = ?t, "constructing derivative");
        let derived = self.0.derive_inner(self, t);
        let mut memo = self.0.attrs().memo.borrow_mut();
        match derived {
            Ok(derived) => {
                memo.insert(t.clone(), MemoEntry::Ready(derived.clone()));
                Ok(derived)
            }
            Err(err) => {
                // Leave the slot retryable: the caller may bind the missing
                // recursion and derive again.
                memo.remove(t);
                Err(err)
            }
        }
    }

    /// Parses the whole input, yielding the set of values the grammar
    /// assigns to it. Empty set means the input is not in the language.
    pub fn parse_full(&self, input: &[T]) -> Result<IndexSet<A>> {
        self.0.parse_full(self, input)
    }

    /// Parses every prefix of the input that the grammar matches, yielding
    /// `(value, remaining input)` pairs. Empty set means no prefix matches.
    pub fn parse(&self, input: &[T]) -> Result<IndexSet<(A, Vec<T>)>> {
        self.0.parse(self, input)
    }

    /// Walks the term graph, yielding a labeled DAG of every reachable
    /// term. Pending derivatives are reported unforced.
    pub fn graph(&self) -> Result<TermGraph> {
        let mut graph = TermGraph::new();
        self.walk(&mut graph)?;
        Ok(graph)
    }

    pub(crate) fn walk(&self, graph: &mut TermGraph) -> Result<()> {
        if graph.visited(self.id()) {
            return Ok(());
        }
        graph.record(TermNode {
            id: self.id(),
            label: self.0.label(),
            children: self.0.child_ids()?,
        });
        self.0.walk_children(graph)
    }

    // ---- fix-point plumbing -------------------------------------------

    /// Adds this term and everything reachable from it to a worklist.
    /// Settled terms (and their subgraphs) are skipped.
    pub(crate) fn enlist(&self, work: &mut Worklist) -> Result<()> {
        if self.0.attrs().settled.get() {
            return Ok(());
        }
        if !work.admit(self.id()) {
            return Ok(());
        }
        work.push(self);
        self.0.enlist_children(self, work)
    }

    pub(crate) fn refresh(&self) -> bool {
        self.0.refresh()
    }

    pub(crate) fn settled(&self) -> bool {
        self.0.attrs().settled.get()
    }

    pub(crate) fn settle(&self) {
        self.0.attrs().settled.set(true);
    }

    pub(crate) fn solving(&self) -> bool {
        self.0.attrs().solving.get()
    }

    pub(crate) fn set_solving(&self, solving: bool) {
        self.0.attrs().solving.set(solving);
    }

    /// Emptiness for compaction decisions: only a settled term counts as
    /// empty. While a cyclic derivative is mid-construction a term's
    /// emptiness may be provisional, and discarding an alternative on
    /// provisional evidence would lose parses; keeping it never does.
    pub(crate) fn is_provably_empty(&self) -> Result<bool> {
        fixpoint::solve(self)?;
        let attrs = self.0.attrs();
        Ok(attrs.settled.get() && attrs.empty.get())
    }

    // ---- raw attribute reads for refresh equations --------------------

    pub(crate) fn current_empty(&self) -> bool {
        self.0.attrs().empty.get()
    }

    pub(crate) fn current_nullable(&self) -> bool {
        self.0.attrs().nullable.get()
    }

    pub(crate) fn current_parse_null(&self) -> IndexSet<A> {
        self.0.attrs().parse_null.borrow().clone()
    }

    /// Snapshot of this term's memo slot for `t`, without borrowing it.
    pub(crate) fn memo_state(&self, t: &T) -> MemoState<T, A> {
        match self.0.attrs().memo.borrow().get(t) {
            None => MemoState::Absent,
            Some(MemoEntry::Pending(_)) => MemoState::Pending,
            Some(MemoEntry::Ready(derived)) => MemoState::Ready(derived.clone()),
        }
    }

    /// Resolves what this term currently stands for; see
    /// [`Combinator::stand_in`].
    pub(crate) fn stand_in(&self, force: bool) -> Result<Option<Parser<T, A>>> {
        self.0.stand_in(self, force)
    }
}
