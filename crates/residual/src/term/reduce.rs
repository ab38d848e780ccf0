//! Reduction: rewrites a child's values through a function.

use std::rc::Rc;

use indexmap::IndexSet;

use crate::error::Result;
use crate::fixpoint::Worklist;
use crate::graph::{Label, TermGraph, TermId};
use crate::term::{empty, Attrs, Combinator, Parser, Terminal, Value};

pub(crate) struct Reduce<T: Terminal, A: Value, B: Value> {
    attrs: Attrs<T, B>,
    inner: Parser<T, A>,
    reducer: Rc<dyn Fn(A) -> B>,
}

impl<T: Terminal, A: Value, B: Value> Reduce<T, A, B> {
    pub(crate) fn make(inner: Parser<T, A>, reducer: Rc<dyn Fn(A) -> B>) -> Parser<T, B> {
        Parser(Rc::new(Reduce { attrs: Attrs::open(), inner, reducer }))
    }
}

/// A parser recognizing the same language as `child` with every value
/// passed through `f`.
pub fn red<T: Terminal, A: Value, B: Value>(
    child: Parser<T, A>,
    f: impl Fn(A) -> B + 'static,
) -> Parser<T, B> {
    Reduce::make(child, Rc::new(f))
}

impl<T: Terminal, A: Value, B: Value> Combinator<T, B> for Reduce<T, A, B> {
    fn attrs(&self) -> &Attrs<T, B> {
        &self.attrs
    }

    fn label(&self) -> Label {
        Label::Reduction
    }

    fn derive_inner(&self, _me: &Parser<T, B>, t: &T) -> Result<Parser<T, B>> {
        let derived = self.inner.derive(t)?;
        if derived.is_provably_empty()? {
            return Ok(empty());
        }
        // The derivative of a reduction is the reduction of the derivative.
        Ok(Reduce::make(derived, Rc::clone(&self.reducer)))
    }

    fn enlist_children(&self, _me: &Parser<T, B>, work: &mut Worklist) -> Result<()> {
        self.inner.enlist(work)
    }

    fn refresh(&self) -> bool {
        let parse_null: IndexSet<B> =
            self.inner.current_parse_null().into_iter().map(|a| (self.reducer)(a)).collect();
        self.attrs.store(self.inner.current_empty(), self.inner.current_nullable(), parse_null)
    }

    fn child_ids(&self) -> Result<Vec<TermId>> {
        Ok(vec![self.inner.id()])
    }

    fn walk_children(&self, graph: &mut TermGraph) -> Result<()> {
        self.inner.walk(graph)
    }

    fn parse_full(&self, _me: &Parser<T, B>, input: &[T]) -> Result<IndexSet<B>> {
        // Parse with the child, then rewrite the forest.
        Ok(self.inner.parse_full(input)?.into_iter().map(|a| (self.reducer)(a)).collect())
    }

    fn parse(&self, _me: &Parser<T, B>, input: &[T]) -> Result<IndexSet<(B, Vec<T>)>> {
        Ok(self
            .inner
            .parse(input)?
            .into_iter()
            .map(|(a, rest)| ((self.reducer)(a), rest))
            .collect())
    }
}
