//! Alternation over a set of children.

use std::rc::Rc;

use indexmap::IndexSet;

use crate::error::Result;
use crate::fixpoint::Worklist;
use crate::graph::{Label, TermGraph, TermId};
use crate::term::{Attrs, Combinator, Parser, Terminal, Value};

pub(crate) struct Union<T: Terminal, A: Value> {
    attrs: Attrs<T, A>,
    children: Vec<Parser<T, A>>,
}

impl<T: Terminal, A: Value> Union<T, A> {
    pub(crate) fn make(children: Vec<Parser<T, A>>) -> Parser<T, A> {
        Parser(Rc::new(Union { attrs: Attrs::open(), children }))
    }
}

/// The union of the children's languages. Children form a set: order is
/// irrelevant and duplicates (by identity) are dropped.
pub fn alt<T: Terminal, A: Value>(children: impl IntoIterator<Item = Parser<T, A>>) -> Parser<T, A> {
    let mut unique: Vec<Parser<T, A>> = Vec::new();
    for child in children {
        if unique.iter().all(|seen| seen.id() != child.id()) {
            unique.push(child);
        }
    }
    Union::make(unique)
}

impl<T: Terminal, A: Value> Combinator<T, A> for Union<T, A> {
    fn attrs(&self) -> &Attrs<T, A> {
        &self.attrs
    }

    fn label(&self) -> Label {
        Label::Union
    }

    fn derive_inner(&self, _me: &Parser<T, A>, t: &T) -> Result<Parser<T, A>> {
        // Children already proven empty contribute nothing to the
        // derivative, and a union of one is that one: both rewrites are
        // load-bearing for keeping derivative graphs bounded.
        let mut derived: Vec<Parser<T, A>> = Vec::new();
        for child in &self.children {
            if child.is_provably_empty()? {
                continue;
            }
            let d = child.derive(t)?;
            if derived.iter().all(|seen| seen.id() != d.id()) {
                derived.push(d);
            }
        }
        if derived.len() == 1 {
            return Ok(derived.remove(0));
        }
        Ok(Union::make(derived))
    }

    fn enlist_children(&self, _me: &Parser<T, A>, work: &mut Worklist) -> Result<()> {
        for child in &self.children {
            child.enlist(work)?;
        }
        Ok(())
    }

    fn refresh(&self) -> bool {
        let mut parse_null = IndexSet::new();
        let mut empty = true;
        let mut any_nullable = false;
        for child in &self.children {
            parse_null.extend(child.current_parse_null());
            empty &= child.current_empty();
            any_nullable |= child.current_nullable();
        }
        let nullable = !empty && any_nullable;
        self.attrs.store(empty, nullable, parse_null)
    }

    fn child_ids(&self) -> Result<Vec<TermId>> {
        Ok(self.children.iter().map(Parser::id).collect())
    }

    fn walk_children(&self, graph: &mut TermGraph) -> Result<()> {
        for child in &self.children {
            child.walk(graph)?;
        }
        Ok(())
    }
}
