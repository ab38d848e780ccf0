//! Kleene star: zero or more of a child, producing a sequence of values.

use std::rc::Rc;

use indexmap::IndexSet;

use crate::error::Result;
use crate::graph::{Label, TermGraph, TermId};
use crate::term::{con, reduce::Reduce, Attrs, Combinator, Parser, Terminal, Value};

pub(crate) struct Repeat<T: Terminal, A: Value> {
    attrs: Attrs<T, Vec<A>>,
    inner: Parser<T, A>,
}

/// Zero or more repetitions of `child`; values are collected in order.
/// Always nullable: the empty input parses to the empty sequence.
pub fn rep<T: Terminal, A: Value>(child: Parser<T, A>) -> Parser<T, Vec<A>> {
    let mut seed = IndexSet::new();
    seed.insert(Vec::new());
    Parser(Rc::new(Repeat { attrs: Attrs::settled(false, true, seed), inner: child }))
}

impl<T: Terminal, A: Value> Combinator<T, Vec<A>> for Repeat<T, A> {
    fn attrs(&self) -> &Attrs<T, Vec<A>> {
        &self.attrs
    }

    fn label(&self) -> Label {
        Label::Kleene
    }

    fn derive_inner(&self, me: &Parser<T, Vec<A>>, t: &T) -> Result<Parser<T, Vec<A>>> {
        // ∂t(p*) = ∂t(p) · p*, with the head parsed by p prepended to the
        // tail parsed by the repetition itself.
        let head = self.inner.derive(t)?;
        let step = con(head, me.clone());
        Ok(Reduce::make(
            step,
            Rc::new(|(first, rest): (A, Vec<A>)| {
                let mut items = Vec::with_capacity(rest.len() + 1);
                items.push(first);
                items.extend(rest);
                items
            }),
        ))
    }

    fn child_ids(&self) -> Result<Vec<TermId>> {
        Ok(vec![self.inner.id()])
    }

    fn walk_children(&self, graph: &mut TermGraph) -> Result<()> {
        self.inner.walk(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::terminal;

    #[test]
    fn rep_matches_the_empty_input() {
        let stars = rep(terminal('a'));
        let forest = stars.parse_full(&[]).unwrap();
        assert_eq!(forest.len(), 1);
        assert!(forest.contains(&Vec::new()));
    }

    #[test]
    fn rep_collects_values_in_order() {
        let stars = rep(terminal('a'));
        let forest = stars.parse_full(&['a', 'a', 'a']).unwrap();
        assert_eq!(forest.len(), 1);
        assert!(forest.contains(&vec!['a', 'a', 'a']));
    }

    #[test]
    fn rep_rejects_foreign_symbols() {
        let stars = rep(terminal('a'));
        assert!(stars.parse_full(&['b']).unwrap().is_empty());
        assert!(stars.parse_full(&['a', 'b']).unwrap().is_empty());
    }

    #[test]
    fn rep_reports_every_nullable_prefix() {
        let stars = rep(terminal('a'));
        let pairs = stars.parse(&['a', 'a']).unwrap();
        assert!(pairs.contains(&(vec![], vec!['a', 'a'])));
        assert!(pairs.contains(&(vec!['a'], vec!['a'])));
        assert!(pairs.contains(&(vec!['a', 'a'], vec![])));
    }

    #[test]
    fn rep_exposes_its_child_in_the_graph() {
        let inner = terminal('a');
        let stars = rep(inner.clone());
        let graph = stars.graph().unwrap();
        let root = graph.get(stars.id()).unwrap();
        assert_eq!(root.children, vec![inner.id()]);
    }
}
