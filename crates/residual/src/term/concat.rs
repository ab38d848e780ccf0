//! Sequencing: a left term followed by a right term, producing a pair.

use std::rc::Rc;

use indexmap::IndexSet;

use crate::error::Result;
use crate::fixpoint::Worklist;
use crate::graph::{Label, TermGraph, TermId};
use crate::term::{empty, epsilon, union::Union, Attrs, Combinator, Parser, Terminal, Value};

pub(crate) struct Concat<T: Terminal, A: Value, B: Value> {
    attrs: Attrs<T, (A, B)>,
    left: Parser<T, A>,
    right: Parser<T, B>,
}

/// A parser matching `left` followed by `right`, pairing their values.
pub fn con<T: Terminal, A: Value, B: Value>(
    left: Parser<T, A>,
    right: Parser<T, B>,
) -> Parser<T, (A, B)> {
    Parser(Rc::new(Concat { attrs: Attrs::open(), left, right }))
}

impl<T: Terminal, A: Value, B: Value> Combinator<T, (A, B)> for Concat<T, A, B> {
    fn attrs(&self) -> &Attrs<T, (A, B)> {
        &self.attrs
    }

    fn label(&self) -> Label {
        Label::Concatenation
    }

    fn derive_inner(&self, _me: &Parser<T, (A, B)>, t: &T) -> Result<Parser<T, (A, B)>> {
        // ∂t(L·R) = ∂t(L)·R  ∪  ε(L)·∂t(R), the second disjunct existing
        // only when L is nullable. Each branch collapses to the empty
        // language as soon as one side is proven empty.
        let left_derived = self.left.derive(t)?;
        let left_derived_empty = left_derived.is_provably_empty()?;
        let first: Parser<T, (A, B)> = if left_derived_empty {
            empty()
        } else {
            con(left_derived, self.right.clone())
        };

        if !self.left.is_nullable()? {
            return Ok(first);
        }

        // The ε-bridge carries the values L assigns to the empty string.
        let bridge = epsilon(self.left.parse_null()?);
        let right_derived = self.right.derive(t)?;
        if left_derived_empty {
            if right_derived.is_provably_empty()? {
                return Ok(first);
            }
            return Ok(con(bridge, right_derived));
        }
        Ok(Union::make(vec![first, con(bridge, right_derived)]))
    }

    fn enlist_children(&self, _me: &Parser<T, (A, B)>, work: &mut Worklist) -> Result<()> {
        self.left.enlist(work)?;
        self.right.enlist(work)
    }

    fn refresh(&self) -> bool {
        let left_null = self.left.current_parse_null();
        let right_null = self.right.current_parse_null();
        let mut parse_null = IndexSet::new();
        for a in &left_null {
            for b in &right_null {
                parse_null.insert((a.clone(), b.clone()));
            }
        }
        let empty = self.left.current_empty() || self.right.current_empty();
        let nullable = !empty && self.left.current_nullable() && self.right.current_nullable();
        self.attrs.store(empty, nullable, parse_null)
    }

    fn child_ids(&self) -> Result<Vec<TermId>> {
        Ok(vec![self.left.id(), self.right.id()])
    }

    fn walk_children(&self, graph: &mut TermGraph) -> Result<()> {
        self.left.walk(graph)?;
        self.right.walk(graph)
    }
}
